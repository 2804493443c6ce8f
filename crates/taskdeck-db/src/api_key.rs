use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for a stored API key. Only the SHA-256 hash of the raw key
/// is kept; the raw key is shown once at generation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub key_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}
