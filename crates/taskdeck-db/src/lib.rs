mod sqlite;

pub use sqlite::SqliteDatabase;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use taskdeck_core::task::{CreateTask, Task, TaskFilter, TaskPage, UpdateTask};

pub mod api_key;
pub use api_key::ApiKey;

/// Records are purged this many days after their `expire_at` timestamp,
/// regardless of any edits made in between.
pub const TASK_RETENTION_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Internal(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistence backend for tasks and API keys.
///
/// The service and both binaries program against this trait;
/// `SqliteDatabase` bridges to a blocking connection via `spawn_blocking`.
#[async_trait]
pub trait Database: Send + Sync {
    // -- Tasks --
    async fn create_task(&self, input: &CreateTask) -> Result<Task, DbError>;
    async fn get_task(&self, id: &str) -> Result<Task, DbError>;
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<TaskPage, DbError>;
    async fn update_task(&self, id: &str, update: &UpdateTask) -> Result<Task, DbError>;
    /// Delete by id. Absent ids are a successful no-op.
    async fn delete_task(&self, id: &str) -> Result<(), DbError>;
    /// All not-completed tasks whose stored due date equals `due_date`.
    async fn list_tasks_due(&self, due_date: &str) -> Result<Vec<Task>, DbError>;
    /// Remove tasks whose `expire_at` is at or before `cutoff`.
    /// Returns the number of rows removed.
    async fn purge_expired_tasks(&self, cutoff: DateTime<Utc>) -> Result<u64, DbError>;

    // -- API keys --
    async fn insert_api_key(&self, name: &str, key_hash: &str) -> Result<ApiKey, DbError>;
    async fn find_api_key_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DbError>;
    async fn touch_api_key(&self, id: &str) -> Result<(), DbError>;
    async fn has_api_keys(&self) -> Result<bool, DbError>;
    async fn list_api_keys(&self) -> Result<Vec<ApiKey>, DbError>;
    async fn delete_api_key(&self, id: &str) -> Result<(), DbError>;
}

/// Default data directory: `$XDG_DATA_HOME/taskdeck` or `~/.local/share/taskdeck`.
pub fn data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("taskdeck")
}
