use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    Todo,
    InProgress,
    Done,
    Completed,
}

impl Status {
    pub const ALL: &[Status] = &[
        Status::Pending,
        Status::Todo,
        Status::InProgress,
        Status::Done,
        Status::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
            Status::Completed => "completed",
        }
    }

    /// Case-insensitive parse of the stored/wire form.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Some(Status::Pending),
            "todo" => Some(Status::Todo),
            "in-progress" => Some(Status::InProgress),
            "done" => Some(Status::Done),
            "completed" => Some(Status::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    High,
    Medium,
    Low,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::High => "high",
            Category::Medium => "medium",
            Category::Low => "low",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Some(Category::High),
            "medium" => Some(Category::Medium),
            "low" => Some(Category::Low),
            _ => None,
        }
    }

    /// The display color is a pure function of the category.
    pub fn color(&self) -> Color {
        match self {
            Category::High => Color::Red,
            Category::Medium => Color::Green,
            Category::Low => Color::Yellow,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Yellow,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Yellow => "yellow",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "red" => Some(Color::Red),
            "green" => Some(Color::Green),
            "yellow" => Some(Color::Yellow),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored comment. The id is assigned when the task row is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub text: String,
}

/// Comment as supplied by the client, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentInput {
    pub text: String,
}

/// Descriptor for an uploaded attachment, stored alongside the task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub original_name: String,
    pub file_name: String,
    pub size: i64,
    pub path: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub category: Category,
    pub color: Color,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub comments: Vec<Comment>,
    pub expire_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub status: Status,
    pub category: Category,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub comments: Vec<CommentInput>,
    #[serde(default)]
    pub file: Option<FileDescriptor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub category: Option<Category>,
    pub due_date: Option<String>,
    /// Replacement comment set; `None` leaves the stored comments alone.
    pub comments: Option<Vec<CommentInput>>,
    pub file: Option<FileDescriptor>,
}

#[derive(Debug, Clone)]
pub struct TaskFilter {
    pub page: i64,
    pub limit: i64,
    pub due_date: Option<String>,
    pub search: Option<String>,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 100,
            due_date: None,
            search: None,
        }
    }
}

/// One page of list results. `total` counts every matching row,
/// not just the page returned in `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPage {
    pub total: i64,
    pub data: Vec<Task>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_color_mapping() {
        assert_eq!(Category::High.color(), Color::Red);
        assert_eq!(Category::Medium.color(), Color::Green);
        assert_eq!(Category::Low.color(), Color::Yellow);
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(Status::parse_str("Completed"), Some(Status::Completed));
        assert_eq!(Status::parse_str("IN-PROGRESS"), Some(Status::InProgress));
        assert_eq!(Status::parse_str("cancelled"), None);
    }

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!(Category::parse_str("HIGH"), Some(Category::High));
        assert_eq!(Category::parse_str("Medium"), Some(Category::Medium));
        assert_eq!(Category::parse_str("urgent"), None);
    }

    #[test]
    fn status_round_trips_through_as_str() {
        for s in Status::ALL {
            assert_eq!(Status::parse_str(s.as_str()), Some(*s));
        }
    }

    #[test]
    fn task_serializes_camel_case() {
        let task = Task {
            id: "t1".into(),
            title: "Title".into(),
            description: "Desc".into(),
            status: Status::InProgress,
            category: Category::High,
            color: Color::Red,
            file: None,
            due_date: Some("01/02/2026".into()),
            comments: vec![],
            expire_at: chrono::Utc::now(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let v = serde_json::to_value(&task).unwrap();
        assert_eq!(v["status"], "in-progress");
        assert_eq!(v["dueDate"], "01/02/2026");
        assert!(v.get("expireAt").is_some());
        assert!(v.get("file").is_none());
    }

    #[test]
    fn file_descriptor_serializes_camel_case() {
        let file = FileDescriptor {
            original_name: "report.pdf".into(),
            file_name: "abc-report.pdf".into(),
            size: 1024,
            path: "uploads/abc/report.pdf".into(),
            mime_type: "application/pdf".into(),
        };
        let v = serde_json::to_value(&file).unwrap();
        assert_eq!(v["originalName"], "report.pdf");
        assert_eq!(v["mimeType"], "application/pdf");
    }
}
