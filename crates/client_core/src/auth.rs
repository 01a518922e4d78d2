use std::sync::Arc;

use shared::protocol::Credentials;
use tracing::{info, warn};

use crate::{
    controller::OperationOutcome,
    gateway::{ApiResult, WorkoutApi},
    routing::Route,
    session::SessionStore,
};

pub const REGISTRATION_SUCCEEDED: &str = "Registration successful! You can now login.";
pub const LOGIN_SUCCEEDED: &str = "Login successful!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub status: OperationOutcome,
    pub message: Option<String>,
    pub navigate_to: Option<Route>,
}

impl AuthOutcome {
    fn aborted() -> Self {
        Self {
            status: OperationOutcome::Aborted,
            message: None,
            navigate_to: None,
        }
    }

    fn succeeded(message: Option<&str>, navigate_to: Route) -> Self {
        Self {
            status: OperationOutcome::Succeeded,
            message: message.map(str::to_string),
            navigate_to: Some(navigate_to),
        }
    }

    fn failed(message: String) -> Self {
        Self {
            status: OperationOutcome::Failed(message.clone()),
            message: Some(message),
            navigate_to: None,
        }
    }
}

pub struct AuthController {
    api: Arc<dyn WorkoutApi>,
    session: Arc<SessionStore>,
}

impl AuthController {
    pub fn new(api: Arc<dyn WorkoutApi>, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    pub async fn register(&self, credentials: &Credentials) -> AuthOutcome {
        if !credentials.is_complete() {
            return AuthOutcome::aborted();
        }
        match self.api.register(credentials).await {
            ApiResult::Ok(()) => {
                info!(email = %credentials.email, "registered");
                AuthOutcome::succeeded(Some(REGISTRATION_SUCCEEDED), Route::Login)
            }
            ApiResult::Failed(message) => {
                warn!("registration failed: {message}");
                AuthOutcome::failed(message)
            }
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> AuthOutcome {
        if !credentials.is_complete() {
            return AuthOutcome::aborted();
        }
        match self.api.login(credentials).await {
            ApiResult::Ok(access) => {
                self.session.set(access).await;
                info!(email = %credentials.email, "logged in");
                AuthOutcome::succeeded(Some(LOGIN_SUCCEEDED), Route::Workouts)
            }
            ApiResult::Failed(message) => {
                warn!("login failed: {message}");
                AuthOutcome::failed(message)
            }
        }
    }

    pub async fn logout(&self) -> AuthOutcome {
        self.session.clear().await;
        info!("logged out");
        AuthOutcome::succeeded(None, Route::Login)
    }
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
