use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::project::Priority;

/// A unit of work within a project.
///
/// Tasks can optionally nest via `parent_id` for sub-task relationships and
/// can be assigned to a user. Unlike timeline events they carry workflow
/// state rather than a calendar position; a task may still have a `due_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,
    /// Optional parent task for sub-task relationships.
    pub parent_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    /// Free-form grouping label, e.g. "backend".
    pub category: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    /// Estimated effort in hours.
    pub time_estimate: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The workflow status of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::Review => "REVIEW",
            Self::Done => "DONE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "TODO" => Some(Self::Todo),
            "IN_PROGRESS" => Some(Self::InProgress),
            "REVIEW" => Some(Self::Review),
            "DONE" => Some(Self::Done),
            _ => None,
        }
    }
}

/// Input for creating a new task within a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskInput {
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `Todo` if not specified.
    pub status: Option<TaskStatus>,
    /// Defaults to `Medium` if not specified.
    pub priority: Option<Priority>,
    pub assignee_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub category: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub time_estimate: Option<f64>,
}

/// Input for updating an existing task. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub assignee_id: Option<Uuid>,
    pub category: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub time_estimate: Option<f64>,
}
