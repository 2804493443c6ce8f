use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use taskdeck_core::due_date;
use taskdeck_core::task::{
    Category, CommentInput, CreateTask, FileDescriptor, Status, Task, TaskFilter, TaskPage,
    UpdateTask,
};
use taskdeck_db::Database;
use taskdeck_notify::Notifier;

use crate::{ServiceError, TaskForm, TaskService};

/// Service backed by a local database handle and a mail transport.
pub struct LocalService {
    db: Arc<dyn Database>,
    notifier: Arc<dyn Notifier>,
    /// Fixed recipient for status notifications. `None` disables them.
    operator_email: Option<String>,
}

impl LocalService {
    pub fn new(
        db: Arc<dyn Database>,
        notifier: Arc<dyn Notifier>,
        operator_email: Option<String>,
    ) -> Self {
        Self {
            db,
            notifier,
            operator_email,
        }
    }

    /// Send a status notification to the operator address, if configured.
    /// Failures are logged and swallowed; the triggering operation has
    /// already succeeded and must stay successful.
    async fn notify_operator(&self, subject: &str, html_body: &str) {
        let Some(to) = &self.operator_email else {
            return;
        };
        if let Err(e) = self.notifier.send(to, subject, html_body).await {
            warn!("status notification failed: {e}");
        }
    }
}

impl From<taskdeck_db::DbError> for ServiceError {
    fn from(e: taskdeck_db::DbError) -> Self {
        match e {
            taskdeck_db::DbError::NotFound(msg) => ServiceError::NotFound(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Parse the JSON-encoded comments field. Absent or empty means no comments.
fn parse_comments(raw: Option<&str>) -> Result<Vec<CommentInput>, ServiceError> {
    match raw {
        None => Ok(vec![]),
        Some(s) if s.is_empty() => Ok(vec![]),
        Some(s) => serde_json::from_str(s)
            .map_err(|_| ServiceError::InvalidInput("invalid comments format".into())),
    }
}

fn parse_category(raw: &str) -> Result<Category, ServiceError> {
    Category::parse_str(raw)
        .ok_or_else(|| ServiceError::InvalidInput("invalid category value".into()))
}

fn parse_status(raw: &str) -> Result<Status, ServiceError> {
    Status::parse_str(raw)
        .ok_or_else(|| ServiceError::InvalidInput("invalid status value".into()))
}

fn parse_due_date(raw: &str) -> Result<String, ServiceError> {
    due_date::normalize(raw).ok_or_else(|| ServiceError::InvalidInput("invalid due date".into()))
}

#[async_trait]
impl TaskService for LocalService {
    async fn create_task(
        &self,
        form: &TaskForm,
        file: Option<FileDescriptor>,
    ) -> Result<Task, ServiceError> {
        // Validation order matters: bad comments JSON is reported before
        // missing required fields, which is reported before a bad category.
        let comments = parse_comments(form.comments.as_deref())?;

        let (Some(title), Some(description), Some(status_raw), Some(category_raw)) = (
            non_empty(&form.title),
            non_empty(&form.description),
            non_empty(&form.status),
            non_empty(&form.category),
        ) else {
            return Err(ServiceError::InvalidInput("missing required fields".into()));
        };

        let category = parse_category(category_raw)?;
        let status = parse_status(status_raw)?;
        let due_date = non_empty(&form.due_date)
            .map(parse_due_date)
            .transpose()?;

        let task = self
            .db
            .create_task(&CreateTask {
                title: title.to_string(),
                description: description.to_string(),
                status,
                category,
                due_date,
                comments,
                file,
            })
            .await?;

        if task.status == Status::Completed {
            self.notify_operator(
                &format!("Task Created as Completed: {}", task.title),
                &format!(
                    "<p>The task <strong>{}</strong> has been created with status <strong>completed</strong>.</p>",
                    task.title
                ),
            )
            .await;
        }

        Ok(task)
    }

    async fn update_task(
        &self,
        id: &str,
        form: &TaskForm,
        file: Option<FileDescriptor>,
    ) -> Result<Task, ServiceError> {
        let comments = parse_comments(form.comments.as_deref())?;

        if uuid::Uuid::parse_str(id).is_err() {
            return Err(ServiceError::InvalidInput("invalid task id".into()));
        }

        let prior = self.db.get_task(id).await?;

        let status = non_empty(&form.status).map(parse_status).transpose()?;
        let category = non_empty(&form.category).map(parse_category).transpose()?;
        let due_date = non_empty(&form.due_date)
            .map(parse_due_date)
            .transpose()?;

        let update = UpdateTask {
            title: non_empty(&form.title).map(str::to_string),
            description: non_empty(&form.description).map(str::to_string),
            status,
            category,
            due_date,
            // A supplied-but-empty comment array is ignored, matching the
            // historical behavior of this API.
            comments: (!comments.is_empty()).then_some(comments),
            file,
        };

        let task = self.db.update_task(id, &update).await?;

        if let Some(new_status) = status {
            if new_status != prior.status {
                self.notify_operator(
                    &format!("Task Status Changed: {}", task.title),
                    &format!(
                        "<p>The task <strong>{}</strong> status changed from <strong>{}</strong> to <strong>{}</strong>.</p>",
                        task.title, prior.status, new_status
                    ),
                )
                .await;
            }
        }

        Ok(task)
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<TaskPage, ServiceError> {
        Ok(self.db.list_tasks(filter).await?)
    }

    async fn delete_task(&self, id: &str) -> Result<(), ServiceError> {
        Ok(self.db.delete_task(id).await?)
    }
}
