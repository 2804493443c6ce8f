use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

use taskdeck_db::Database;

use crate::routes::{error_message, AppState};

const KEY_PREFIX: &str = "td_";
const KEY_RANDOM_LEN: usize = 43;

/// Where API keys come from: an env-provided key, database-stored keys,
/// or both. `auth: None` in the AppState means open access.
pub struct AuthConfig {
    /// SHA-256 hex digest of the `TASKDECK_API_KEY` env var, if set.
    pub env_key_hash: Option<String>,
    pub db: Arc<dyn Database>,
}

impl AuthConfig {
    /// Check a bearer token against the env key and the stored keys.
    /// A stored-key hit also bumps its last_used_at, fire-and-forget.
    async fn authorize(&self, token: &str) -> bool {
        let token_hash = sha256_hex(token);

        if let Some(env_hash) = &self.env_key_hash {
            if digests_match(token_hash.as_bytes(), env_hash.as_bytes()) {
                return true;
            }
        }

        match self.db.find_api_key_by_hash(&token_hash).await {
            Ok(Some(key)) => {
                let db = self.db.clone();
                tokio::spawn(async move {
                    let _ = db.touch_api_key(&key.id).await;
                });
                true
            }
            Ok(None) | Err(_) => false,
        }
    }
}

/// SHA-256 hex digest of a raw key. Only digests are stored or compared.
pub fn sha256_hex(input: &str) -> String {
    format!("{:x}", Sha256::digest(input.as_bytes()))
}

/// Generate a raw API key: `td_` plus 43 random alphanumeric chars.
pub fn generate_api_key() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{KEY_PREFIX}{suffix}")
}

/// Digest comparison that does not short-circuit on the first mismatch.
fn digests_match(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Requires `Authorization: Bearer <key>` when auth is configured;
/// passes every request through otherwise.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(auth) = &state.auth else {
        return next.run(request).await;
    };

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(token) if auth.authorize(token).await => next.run(request).await,
        _ => error_message(StatusCode::UNAUTHORIZED, "missing or invalid API key")
            .into_response(),
    }
}

/// Build an `Option<AuthConfig>` from env + DB state. `None` (open
/// access) when neither `TASKDECK_API_KEY` nor any stored key exists.
pub async fn build_auth_config(db: Arc<dyn Database>) -> Option<Arc<AuthConfig>> {
    let env_key = std::env::var("TASKDECK_API_KEY").ok();
    build_auth_config_with_key(db, env_key.as_deref()).await
}

/// Same, from an explicit key value (testable without env mutation).
pub async fn build_auth_config_with_key(
    db: Arc<dyn Database>,
    env_key: Option<&str>,
) -> Option<Arc<AuthConfig>> {
    let env_key_hash = env_key.filter(|k| !k.is_empty()).map(sha256_hex);
    let has_db_keys = db.has_api_keys().await.unwrap_or(false);

    if env_key_hash.is_none() && !has_db_keys {
        return None;
    }
    Some(Arc::new(AuthConfig { env_key_hash, db }))
}
