use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use taskdeck_core::task::{FileDescriptor, Task, TaskFilter, TaskPage};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Raw form fields as they arrive from a multipart request, before
/// validation. `comments` is a JSON-encoded array of `{text}` entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub due_date: Option<String>,
    pub comments: Option<String>,
}

/// Task lifecycle operations. The HTTP layer programs against this trait;
/// `LocalService` wraps a `Database` plus a `Notifier`.
#[async_trait]
pub trait TaskService: Send + Sync {
    async fn create_task(
        &self,
        form: &TaskForm,
        file: Option<FileDescriptor>,
    ) -> Result<Task, ServiceError>;

    async fn update_task(
        &self,
        id: &str,
        form: &TaskForm,
        file: Option<FileDescriptor>,
    ) -> Result<Task, ServiceError>;

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<TaskPage, ServiceError>;

    /// Idempotent: an absent id is a successful no-op.
    async fn delete_task(&self, id: &str) -> Result<(), ServiceError>;
}
