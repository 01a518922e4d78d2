use super::*;
use async_trait::async_trait;
use shared::{
    domain::{WorkoutEntry, WorkoutId},
    protocol::{NewWorkout, WorkoutUpdate},
};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct AuthApi {
    calls: AtomicUsize,
}

#[async_trait]
impl WorkoutApi for AuthApi {
    async fn register(&self, credentials: &Credentials) -> ApiResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if credentials.email == "taken@example.com" {
            ApiResult::Failed("Email already in use".to_string())
        } else {
            ApiResult::Ok(())
        }
    }

    async fn login(&self, credentials: &Credentials) -> ApiResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if credentials.password == "secret" {
            ApiResult::Ok("tok123".to_string())
        } else {
            ApiResult::Failed("Login failed.".to_string())
        }
    }

    async fn list_mine(&self) -> ApiResult<Vec<WorkoutEntry>> {
        ApiResult::Failed("unexpected".to_string())
    }

    async fn add_workout(&self, _workout: &NewWorkout) -> ApiResult<WorkoutEntry> {
        ApiResult::Failed("unexpected".to_string())
    }

    async fn update_workout(
        &self,
        _id: &WorkoutId,
        _update: &WorkoutUpdate,
    ) -> ApiResult<WorkoutEntry> {
        ApiResult::Failed("unexpected".to_string())
    }

    async fn complete_workout(&self, _id: &WorkoutId) -> ApiResult<WorkoutEntry> {
        ApiResult::Failed("unexpected".to_string())
    }

    async fn delete_workout(&self, _id: &WorkoutId) -> ApiResult<()> {
        ApiResult::Failed("unexpected".to_string())
    }
}

fn auth() -> (AuthController, Arc<AuthApi>, Arc<SessionStore>) {
    let api = Arc::new(AuthApi::default());
    let session = SessionStore::in_memory();
    (
        AuthController::new(api.clone(), session.clone()),
        api,
        session,
    )
}

#[tokio::test]
async fn register_success_points_to_login() {
    let (auth, _api, session) = auth();
    let outcome = auth
        .register(&Credentials::new("new@example.com", "pw"))
        .await;

    assert_eq!(outcome.status, OperationOutcome::Succeeded);
    assert_eq!(outcome.message.as_deref(), Some(REGISTRATION_SUCCEEDED));
    assert_eq!(outcome.navigate_to, Some(Route::Login));
    assert_eq!(session.read().await, None);
}

#[tokio::test]
async fn register_failure_stays_put() {
    let (auth, _api, _session) = auth();
    let outcome = auth
        .register(&Credentials::new("taken@example.com", "pw"))
        .await;

    assert_eq!(
        outcome.status,
        OperationOutcome::Failed("Email already in use".to_string())
    );
    assert_eq!(outcome.navigate_to, None);
}

#[tokio::test]
async fn blank_credentials_never_reach_the_api() {
    let (auth, api, _session) = auth();
    assert_eq!(
        auth.register(&Credentials::new(" ", "pw")).await.status,
        OperationOutcome::Aborted
    );
    assert_eq!(
        auth.login(&Credentials::new("me@example.com", "")).await.status,
        OperationOutcome::Aborted
    );
    assert_eq!(api.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn login_stores_token_and_logout_clears_it() {
    let (auth, _api, session) = auth();

    let outcome = auth
        .login(&Credentials::new("me@example.com", "secret"))
        .await;
    assert_eq!(outcome.navigate_to, Some(Route::Workouts));
    assert_eq!(session.read().await, Some("tok123".to_string()));

    let outcome = auth.logout().await;
    assert_eq!(outcome.navigate_to, Some(Route::Login));
    assert_eq!(session.read().await, None);
}

#[tokio::test]
async fn failed_login_leaves_session_empty() {
    let (auth, _api, session) = auth();
    let outcome = auth
        .login(&Credentials::new("me@example.com", "wrong"))
        .await;

    assert_eq!(outcome.message.as_deref(), Some("Login failed."));
    assert_eq!(session.read().await, None);
}
