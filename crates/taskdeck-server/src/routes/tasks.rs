use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use taskdeck_core::task::{FileDescriptor, TaskFilter};
use taskdeck_service::{ServiceError, TaskForm};
use taskdeck_store::upload_key;

use super::{error_message, ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/{id}", axum::routing::put(update_task).delete(delete_task))
}

/// Pagination params arrive as strings so a bad value answers with the
/// same `{message}` envelope as every other client error instead of the
/// extractor's plain-text rejection.
#[derive(Debug, Deserialize)]
struct TaskQuery {
    page: Option<String>,
    limit: Option<String>,
    #[serde(rename = "dueDate")]
    due_date: Option<String>,
    search: Option<String>,
}

fn positive_param(raw: Option<&str>, default: i64, name: &str) -> Result<i64, ApiError> {
    match raw {
        None => Ok(default),
        Some(s) => match s.parse::<i64>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(error_message(
                StatusCode::BAD_REQUEST,
                format!("invalid {name} value"),
            )),
        },
    }
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(q): Query<TaskQuery>,
) -> Result<Json<Value>, ApiError> {
    let defaults = TaskFilter::default();
    let filter = TaskFilter {
        page: positive_param(q.page.as_deref(), defaults.page, "page")?,
        limit: positive_param(q.limit.as_deref(), defaults.limit, "limit")?,
        due_date: q.due_date,
        search: q.search,
    };
    state
        .service
        .list_tasks(&filter)
        .await
        .map(|page| Json(json!(page)))
        .map_err(to_error)
}

async fn create_task(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (form, file) = read_task_form(&state, multipart).await?;
    state
        .service
        .create_task(&form, file)
        .await
        .map(|task| {
            (
                StatusCode::CREATED,
                Json(json!({ "message": "Task created successfully", "task": task })),
            )
        })
        .map_err(to_error)
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let (form, file) = read_task_form(&state, multipart).await?;
    state
        .service
        .update_task(&id, &form, file)
        .await
        .map(|task| Json(json!({ "message": "Task updated", "task": task })))
        .map_err(to_error)
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .service
        .delete_task(&id)
        .await
        .map(|_| Json(json!({ "message": "Task deleted" })))
        .map_err(to_error)
}

/// Pull the task fields out of a multipart body. An uploaded file is
/// written to the object store before the task row will reference it;
/// nothing cleans it up if the subsequent database write fails.
async fn read_task_form(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<(TaskForm, Option<FileDescriptor>), ApiError> {
    let mut form = TaskForm::default();
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error_message(
            StatusCode::BAD_REQUEST,
            format!("invalid multipart payload: {e}"),
        )
    })? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => form.title = Some(read_text(field).await?),
            Some("description") => form.description = Some(read_text(field).await?),
            Some("status") => form.status = Some(read_text(field).await?),
            Some("category") => form.category = Some(read_text(field).await?),
            Some("dueDate") => form.due_date = Some(read_text(field).await?),
            Some("comments") => form.comments = Some(read_text(field).await?),
            Some("file") => {
                let original_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "upload.bin".to_string());
                let mime_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field.bytes().await.map_err(|e| {
                    error_message(StatusCode::BAD_REQUEST, format!("invalid file field: {e}"))
                })?;

                let upload_id = uuid::Uuid::new_v4().to_string();
                let key = upload_key(&upload_id, &original_name);
                let size = data.len() as i64;
                state.store.put(&key, data).await.map_err(|e| {
                    error!("upload write failed: {e}");
                    internal_error()
                })?;

                file = Some(FileDescriptor {
                    file_name: format!("{upload_id}/{original_name}"),
                    original_name,
                    size,
                    path: key,
                    mime_type,
                });
            }
            _ => {}
        }
    }

    Ok((form, file))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| error_message(StatusCode::BAD_REQUEST, format!("invalid field: {e}")))
}

fn internal_error() -> ApiError {
    error_message(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
}

fn to_error(e: ServiceError) -> ApiError {
    match &e {
        ServiceError::NotFound(_) => error_message(StatusCode::NOT_FOUND, e.to_string()),
        ServiceError::InvalidInput(_) => error_message(StatusCode::BAD_REQUEST, e.to_string()),
        ServiceError::Internal(detail) => {
            // Details are logged, never put on the wire.
            error!("task operation failed: {detail}");
            internal_error()
        }
    }
}
