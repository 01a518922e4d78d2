use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{WorkoutEntry, WorkoutId},
    error::ApiErrorBody,
    protocol::{
        CompletedWorkoutResponse, Credentials, LoginResponse, NewWorkout,
        UpdatedWorkoutResponse, WorkoutListResponse, WorkoutUpdate,
    },
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::session::SessionStore;

pub const DEFAULT_API_BASE_URL: &str = "https://fitnessapp-api-ln8u.onrender.com";

const GENERIC_FAILURE: &str = "Something went wrong.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResult<T> {
    Ok(T),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOperation {
    Register,
    Login,
    ListMine,
    AddWorkout,
    UpdateWorkout,
    CompleteWorkout,
    DeleteWorkout,
}

impl ApiOperation {
    pub fn name(&self) -> &'static str {
        match self {
            ApiOperation::Register => "register",
            ApiOperation::Login => "login",
            ApiOperation::ListMine => "list_mine",
            ApiOperation::AddWorkout => "add_workout",
            ApiOperation::UpdateWorkout => "update_workout",
            ApiOperation::CompleteWorkout => "complete_workout",
            ApiOperation::DeleteWorkout => "delete_workout",
        }
    }

    /// Shown when the server rejects the call without a message of its own.
    pub fn failure_fallback(&self) -> &'static str {
        match self {
            ApiOperation::Register => "Registration failed.",
            ApiOperation::Login => "Login failed.",
            ApiOperation::ListMine => "Failed to load workouts.",
            ApiOperation::AddWorkout => "Failed to add workout.",
            ApiOperation::UpdateWorkout => "Failed to update workout.",
            ApiOperation::CompleteWorkout => "Failed to complete workout.",
            ApiOperation::DeleteWorkout => "Failed to delete workout.",
        }
    }

    /// Shown when the server could not be reached or answered garbage.
    pub fn transport_fallback(&self) -> &'static str {
        match self {
            ApiOperation::ListMine => "Failed to load workouts.",
            _ => GENERIC_FAILURE,
        }
    }

    fn requires_auth(&self) -> bool {
        !matches!(self, ApiOperation::Register | ApiOperation::Login)
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid API base url '{0}'")]
    InvalidBaseUrl(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server rejected request with status {status}")]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    fn user_message(self, operation: ApiOperation) -> String {
        match self {
            GatewayError::Rejected {
                message: Some(message),
                ..
            } => message,
            GatewayError::Rejected { message: None, .. } => {
                operation.failure_fallback().to_string()
            }
            GatewayError::InvalidBaseUrl(_)
            | GatewayError::Transport(_)
            | GatewayError::Decode(_) => operation.transport_fallback().to_string(),
        }
    }
}

#[async_trait]
pub trait WorkoutApi: Send + Sync {
    async fn register(&self, credentials: &Credentials) -> ApiResult<()>;
    async fn login(&self, credentials: &Credentials) -> ApiResult<String>;
    async fn list_mine(&self) -> ApiResult<Vec<WorkoutEntry>>;
    async fn add_workout(&self, workout: &NewWorkout) -> ApiResult<WorkoutEntry>;
    async fn update_workout(
        &self,
        id: &WorkoutId,
        update: &WorkoutUpdate,
    ) -> ApiResult<WorkoutEntry>;
    async fn complete_workout(&self, id: &WorkoutId) -> ApiResult<WorkoutEntry>;
    async fn delete_workout(&self, id: &WorkoutId) -> ApiResult<()>;
}

pub struct HttpApiGateway {
    http: Client,
    base_url: Url,
    session: Arc<SessionStore>,
}

impl HttpApiGateway {
    pub fn new(base_url: &str, session: Arc<SessionStore>) -> Result<Self, GatewayError> {
        Self::with_client(Client::new(), base_url, session)
    }

    pub fn with_timeout(
        base_url: &str,
        session: Arc<SessionStore>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::with_client(http, base_url, session)
    }

    pub fn with_client(
        http: Client,
        base_url: &str,
        session: Arc<SessionStore>,
    ) -> Result<Self, GatewayError> {
        Ok(Self {
            http,
            base_url: parse_base_url(base_url)?,
            session,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn request(
        &self,
        operation: ApiOperation,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestBuilder, GatewayError> {
        let url = self.endpoint(segments)?;
        debug!(operation = operation.name(), %method, %url, "api request");
        let mut request = self.http.request(method, url);
        if operation.requires_auth() {
            if let Some(token) = self.session.read().await {
                request = request.bearer_auth(token);
            }
        }
        Ok(request)
    }

    async fn dispatch(&self, request: RequestBuilder) -> Result<Vec<u8>, GatewayError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(GatewayError::Rejected {
                status,
                message: ApiErrorBody::message_from_bytes(&body),
            });
        }
        Ok(body.to_vec())
    }
}

fn parse_base_url(raw: &str) -> Result<Url, GatewayError> {
    let url = Url::parse(raw.trim()).map_err(|_| GatewayError::InvalidBaseUrl(raw.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(GatewayError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url)
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, GatewayError> {
    Ok(serde_json::from_slice(body)?)
}

fn settle<T>(operation: ApiOperation, result: Result<T, GatewayError>) -> ApiResult<T> {
    match result {
        Ok(value) => {
            debug!(operation = operation.name(), "api call succeeded");
            ApiResult::Ok(value)
        }
        Err(err) => {
            warn!(operation = operation.name(), "api call failed: {err}");
            ApiResult::Failed(err.user_message(operation))
        }
    }
}

#[async_trait]
impl WorkoutApi for HttpApiGateway {
    async fn register(&self, credentials: &Credentials) -> ApiResult<()> {
        let operation = ApiOperation::Register;
        let result: Result<(), GatewayError> = async {
            let request = self
                .request(operation, Method::POST, &["users", "register"])
                .await?
                .json(credentials);
            self.dispatch(request).await?;
            Ok(())
        }
        .await;
        settle(operation, result)
    }

    async fn login(&self, credentials: &Credentials) -> ApiResult<String> {
        let operation = ApiOperation::Login;
        let result: Result<String, GatewayError> = async {
            let request = self
                .request(operation, Method::POST, &["users", "login"])
                .await?
                .json(credentials);
            let body: LoginResponse = decode(&self.dispatch(request).await?)?;
            Ok(body.access)
        }
        .await;
        settle(operation, result)
    }

    async fn list_mine(&self) -> ApiResult<Vec<WorkoutEntry>> {
        let operation = ApiOperation::ListMine;
        let result: Result<Vec<WorkoutEntry>, GatewayError> = async {
            let request = self
                .request(operation, Method::GET, &["workouts", "getMyWorkouts"])
                .await?;
            let body: WorkoutListResponse = decode(&self.dispatch(request).await?)?;
            Ok(body.workouts)
        }
        .await;
        settle(operation, result)
    }

    async fn add_workout(&self, workout: &NewWorkout) -> ApiResult<WorkoutEntry> {
        let operation = ApiOperation::AddWorkout;
        let result: Result<WorkoutEntry, GatewayError> = async {
            let request = self
                .request(operation, Method::POST, &["workouts", "addWorkout"])
                .await?
                .json(workout);
            decode(&self.dispatch(request).await?)
        }
        .await;
        settle(operation, result)
    }

    async fn update_workout(
        &self,
        id: &WorkoutId,
        update: &WorkoutUpdate,
    ) -> ApiResult<WorkoutEntry> {
        let operation = ApiOperation::UpdateWorkout;
        let result: Result<WorkoutEntry, GatewayError> = async {
            let request = self
                .request(
                    operation,
                    Method::PATCH,
                    &["workouts", "updateWorkout", id.as_str()],
                )
                .await?
                .json(update);
            let body: UpdatedWorkoutResponse = decode(&self.dispatch(request).await?)?;
            Ok(body.updated_workout)
        }
        .await;
        settle(operation, result)
    }

    async fn complete_workout(&self, id: &WorkoutId) -> ApiResult<WorkoutEntry> {
        let operation = ApiOperation::CompleteWorkout;
        let result: Result<WorkoutEntry, GatewayError> = async {
            let request = self
                .request(
                    operation,
                    Method::PATCH,
                    &["workouts", "completeWorkout", id.as_str()],
                )
                .await?;
            let body: CompletedWorkoutResponse = decode(&self.dispatch(request).await?)?;
            Ok(body.workout)
        }
        .await;
        settle(operation, result)
    }

    async fn delete_workout(&self, id: &WorkoutId) -> ApiResult<()> {
        let operation = ApiOperation::DeleteWorkout;
        let result: Result<(), GatewayError> = async {
            let request = self
                .request(
                    operation,
                    Method::DELETE,
                    &["workouts", "deleteWorkout", id.as_str()],
                )
                .await?;
            self.dispatch(request).await?;
            Ok(())
        }
        .await;
        settle(operation, result)
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
