use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use taskdeck_core::task::{
    Category, Color, Comment, CreateTask, Status, Task, TaskFilter, TaskPage, UpdateTask,
};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    let status_str: String = row.get("status")?;
    let category_str: String = row.get("category")?;
    let color_str: String = row.get("color")?;
    let comments_json: String = row.get("comments")?;
    let file_json: Option<String> = row.get("file")?;
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: Status::parse_str(&status_str).unwrap_or(Status::Pending),
        category: Category::parse_str(&category_str).unwrap_or(Category::Low),
        color: Color::parse_str(&color_str).unwrap_or(Color::Yellow),
        file: file_json.and_then(|s| serde_json::from_str(&s).ok()),
        due_date: row.get("due_date")?,
        comments: serde_json::from_str(&comments_json).unwrap_or_default(),
        expire_at: row.get("expire_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn comments_to_json(comments: &[Comment]) -> Result<String, DbError> {
    serde_json::to_string(comments).map_err(|e| DbError::Internal(e.to_string()))
}

/// Assign a fresh id to each client-supplied comment.
fn assign_comment_ids(inputs: &[taskdeck_core::task::CommentInput]) -> Vec<Comment> {
    inputs
        .iter()
        .map(|c| Comment {
            id: uuid::Uuid::new_v4().to_string(),
            text: c.text.clone(),
        })
        .collect()
}

impl SqliteDatabase {
    pub fn create_task_sync(&self, input: &CreateTask) -> Result<Task, DbError> {
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            let comments = assign_comment_ids(&input.comments);
            let file_json = input
                .file
                .as_ref()
                .map(|f| serde_json::to_string(f))
                .transpose()
                .map_err(|e| DbError::Internal(e.to_string()))?;

            conn.execute(
                "INSERT INTO tasks (
                    id, title, description, status, category, color,
                    file, due_date, comments, expire_at, created_at, updated_at
                 )
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    id,
                    input.title,
                    input.description,
                    input.status.as_str(),
                    input.category.as_str(),
                    input.category.color().as_str(),
                    file_json,
                    input.due_date,
                    comments_to_json(&comments)?,
                    now,
                    now,
                    now,
                ],
            )
            .to_db()?;

            conn.query_row("SELECT * FROM tasks WHERE id = ?1", params![id], row_to_task)
                .to_db()
        })
    }

    pub fn get_task_sync(&self, id: &str) -> Result<Task, DbError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT * FROM tasks WHERE id = ?1", params![id], row_to_task)
                .map_err(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => {
                        DbError::NotFound(format!("task {id}"))
                    }
                    other => DbError::Internal(other.to_string()),
                })
        })
    }

    pub fn list_tasks_sync(&self, filter: &TaskFilter) -> Result<TaskPage, DbError> {
        self.with_conn(|conn| {
            let mut where_clause = String::from(" WHERE 1=1");
            let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

            if let Some(ref due_date) = filter.due_date {
                param_values.push(Box::new(due_date.clone()));
                where_clause.push_str(&format!(" AND due_date = ?{}", param_values.len()));
            }
            if let Some(ref search) = filter.search {
                param_values.push(Box::new(format!("%{search}%")));
                let n = param_values.len();
                where_clause.push_str(&format!(
                    " AND (title LIKE ?{n} OR description LIKE ?{n})"
                ));
            }

            let params_ref: Vec<&dyn rusqlite::types::ToSql> =
                param_values.iter().map(|p| p.as_ref()).collect();

            let total: i64 = conn
                .query_row(
                    &format!("SELECT count(*) FROM tasks{where_clause}"),
                    params_ref.as_slice(),
                    |row| row.get(0),
                )
                .to_db()?;

            // page and limit are used as given; the HTTP layer rejects
            // values below 1 before a filter is built.
            let limit = filter.limit;
            let offset = (filter.page - 1) * limit;

            let sql = format!(
                "SELECT * FROM tasks{where_clause}
                 ORDER BY created_at DESC
                 LIMIT ?{} OFFSET ?{}",
                param_values.len() + 1,
                param_values.len() + 2,
            );
            let mut param_values = param_values;
            param_values.push(Box::new(limit));
            param_values.push(Box::new(offset));
            let params_ref: Vec<&dyn rusqlite::types::ToSql> =
                param_values.iter().map(|p| p.as_ref()).collect();

            let mut stmt = conn.prepare(&sql).to_db()?;
            let data = stmt
                .query_map(params_ref.as_slice(), row_to_task)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;

            Ok(TaskPage { total, data })
        })
    }

    pub fn update_task_sync(&self, id: &str, update: &UpdateTask) -> Result<Task, DbError> {
        self.with_conn(|conn| {
            let now = Utc::now();
            let mut sets = vec!["updated_at = ?1".to_string()];
            let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(now)];

            if let Some(ref title) = update.title {
                param_values.push(Box::new(title.clone()));
                sets.push(format!("title = ?{}", param_values.len()));
            }
            if let Some(ref description) = update.description {
                param_values.push(Box::new(description.clone()));
                sets.push(format!("description = ?{}", param_values.len()));
            }
            if let Some(status) = update.status {
                param_values.push(Box::new(status.as_str().to_string()));
                sets.push(format!("status = ?{}", param_values.len()));
            }
            if let Some(category) = update.category {
                param_values.push(Box::new(category.as_str().to_string()));
                sets.push(format!("category = ?{}", param_values.len()));
                param_values.push(Box::new(category.color().as_str().to_string()));
                sets.push(format!("color = ?{}", param_values.len()));
            }
            if let Some(ref due_date) = update.due_date {
                param_values.push(Box::new(due_date.clone()));
                sets.push(format!("due_date = ?{}", param_values.len()));
            }
            if let Some(ref comment_inputs) = update.comments {
                let comments = assign_comment_ids(comment_inputs);
                param_values.push(Box::new(comments_to_json(&comments)?));
                sets.push(format!("comments = ?{}", param_values.len()));
            }
            if let Some(ref file) = update.file {
                let file_json =
                    serde_json::to_string(file).map_err(|e| DbError::Internal(e.to_string()))?;
                param_values.push(Box::new(file_json));
                sets.push(format!("file = ?{}", param_values.len()));
            }

            // expire_at is deliberately never part of the SET list: a task
            // still expires 7 days after original creation even if edited.

            param_values.push(Box::new(id.to_string()));
            let id_param = param_values.len();

            let sql = format!(
                "UPDATE tasks SET {} WHERE id = ?{}",
                sets.join(", "),
                id_param
            );

            let params_ref: Vec<&dyn rusqlite::types::ToSql> =
                param_values.iter().map(|p| p.as_ref()).collect();

            let changed = conn.execute(&sql, params_ref.as_slice()).to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("task {id}")));
            }

            conn.query_row("SELECT * FROM tasks WHERE id = ?1", params![id], row_to_task)
                .map_err(|e| DbError::Internal(e.to_string()))
        })
    }

    pub fn delete_task_sync(&self, id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            // Idempotent: 0 affected rows is still success.
            conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])
                .to_db()?;
            Ok(())
        })
    }

    pub fn list_tasks_due_sync(&self, due_date: &str) -> Result<Vec<Task>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT * FROM tasks
                     WHERE due_date = ?1 AND status != 'completed'
                     ORDER BY created_at DESC",
                )
                .to_db()?;
            let tasks = stmt
                .query_map(params![due_date], row_to_task)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(tasks)
        })
    }

    pub fn purge_expired_tasks_sync(&self, cutoff: DateTime<Utc>) -> Result<u64, DbError> {
        self.with_conn(|conn| {
            let removed = conn
                .execute("DELETE FROM tasks WHERE expire_at <= ?1", params![cutoff])
                .to_db()?;
            Ok(removed as u64)
        })
    }
}
