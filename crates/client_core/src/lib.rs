pub mod auth;
pub mod controller;
pub mod gateway;
pub mod routing;
pub mod session;

pub use auth::{AuthController, AuthOutcome};
pub use controller::{
    DeleteConfirmation, FormDraft, ListEvent, OperationOutcome, UpdateDraft,
    WorkoutListController,
};
pub use gateway::{
    ApiOperation, ApiResult, GatewayError, HttpApiGateway, WorkoutApi, DEFAULT_API_BASE_URL,
};
pub use routing::{evaluate, guard, Route, RouteDecision};
pub use session::{MemoryTokenPersistence, SessionStore, TokenPersistence, TOKEN_KEY};
