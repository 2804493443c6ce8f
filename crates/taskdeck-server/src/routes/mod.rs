pub mod health;
pub mod tasks;

use std::sync::Arc;

use axum::{http::StatusCode, middleware, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use taskdeck_db::Database;
use taskdeck_service::TaskService;
use taskdeck_store::ObjectStore;

use crate::auth::{auth_middleware, AuthConfig};

pub struct InnerAppState {
    pub service: Arc<dyn TaskService>,
    pub db: Arc<dyn Database>,
    pub auth: Option<Arc<AuthConfig>>,
    pub store: Arc<dyn ObjectStore>,
}

pub type AppState = Arc<InnerAppState>;

/// Status plus the `{message}` envelope every non-2xx response uses.
pub(crate) type ApiError = (StatusCode, Json<Value>);

pub(crate) fn error_message(status: StatusCode, text: impl Into<String>) -> ApiError {
    (status, Json(json!({ "message": text.into() })))
}

pub fn build_router(state: AppState) -> Router {
    let public = Router::new().merge(health::routes());

    let protected = Router::new().merge(tasks::routes()).route_layer(
        middleware::from_fn_with_state(state.clone(), auth_middleware),
    );

    public
        .merge(protected)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
