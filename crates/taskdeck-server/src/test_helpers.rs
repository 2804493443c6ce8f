use std::sync::Arc;

use axum::Router;

use taskdeck_notify::MemoryNotifier;
use taskdeck_service::LocalService;
use taskdeck_store::{create_store, StoreConfig};

use crate::auth::AuthConfig;
use crate::routes::{build_router, AppState, InnerAppState};

/// Build a test state with in-memory SQLite, a temp local store, a
/// memory notifier, and no auth.
pub fn test_state() -> (AppState, Arc<MemoryNotifier>) {
    let db = Arc::new(taskdeck_db::SqliteDatabase::open_in_memory().unwrap());
    let notifier = Arc::new(MemoryNotifier::new());
    let service = Arc::new(LocalService::new(
        db.clone(),
        notifier.clone(),
        Some("ops@example.com".to_string()),
    ));
    let store_config = StoreConfig {
        local_data_dir: Some(
            tempfile::tempdir()
                .unwrap()
                .keep()
                .to_string_lossy()
                .to_string(),
        ),
    };
    let store = create_store(&store_config).unwrap();
    let state = Arc::new(InnerAppState {
        service,
        db,
        auth: None,
        store,
    });
    (state, notifier)
}

pub fn test_router() -> Router {
    let (state, _notifier) = test_state();
    build_router(state)
}

/// Build a test router with auth enabled, returning (router, api_key).
pub async fn test_router_with_auth() -> (Router, String) {
    let (state, _notifier) = test_state();
    let api_key = crate::auth::generate_api_key();
    let auth = Arc::new(AuthConfig {
        env_key_hash: Some(crate::auth::sha256_hex(&api_key)),
        db: state.db.clone(),
    });
    let state = Arc::new(InnerAppState {
        service: state.service.clone(),
        db: state.db.clone(),
        auth: Some(auth),
        store: state.store.clone(),
    });
    (build_router(state), api_key)
}
