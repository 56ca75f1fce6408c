use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event::{CreateTimelineEventInput, TimelineEvent};
use super::user::UserSummary;

/// A tracked project with its schedule boundaries and classification tags.
///
/// Projects are the top-level organizational unit. Each project owns a set of
/// tasks and a timeline of dated events; ownership by a user is optional so
/// the API can run without an authentication layer in front of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// What the project is trying to achieve, free text.
    pub project_goal: Option<String>,
    /// Monetary value or budget of the project.
    pub project_value: Option<f64>,
    pub website: Option<String>,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub project_type: ProjectType,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The lifecycle status of a project.
///
/// `Completed` and `Cancelled` are terminal: events belonging to projects in
/// either state are excluded from the overdue aggregation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Planning,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "PLANNING",
            Self::InProgress => "IN_PROGRESS",
            Self::OnHold => "ON_HOLD",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PLANNING" => Some(Self::Planning),
            "IN_PROGRESS" => Some(Self::InProgress),
            "ON_HOLD" => Some(Self::OnHold),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether work on the project is considered finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Priority level shared by projects and tasks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Urgent => "URGENT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            "URGENT" => Some(Self::Urgent),
            _ => None,
        }
    }
}

/// Broad category of work a project represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectType {
    Development,
    Design,
    Marketing,
    Research,
    Other,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "DEVELOPMENT",
            Self::Design => "DESIGN",
            Self::Marketing => "MARKETING",
            Self::Research => "RESEARCH",
            Self::Other => "OTHER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "DEVELOPMENT" => Some(Self::Development),
            "DESIGN" => Some(Self::Design),
            "MARKETING" => Some(Self::Marketing),
            "RESEARCH" => Some(Self::Research),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Input for creating a new project.
///
/// `timeline_events` carries generator drafts (after any user edits); they are
/// persisted in the same transaction as the project row, all-or-nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectInput {
    pub name: String,
    pub description: Option<String>,
    pub project_goal: Option<String>,
    pub project_value: Option<f64>,
    pub website: Option<String>,
    /// Defaults to `Planning` if not specified.
    pub status: Option<ProjectStatus>,
    /// Defaults to `Medium` if not specified.
    pub priority: Option<Priority>,
    /// Defaults to `Development` if not specified.
    pub project_type: Option<ProjectType>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub timeline_events: Vec<CreateTimelineEventInput>,
}

/// Input for updating an existing project. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub project_goal: Option<String>,
    pub project_value: Option<f64>,
    pub website: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub project_type: Option<ProjectType>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// A project with its owner and timeline, used for detailed responses.
///
/// The `project` fields are flattened into the JSON response; events are
/// ordered ascending by date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithTimeline {
    #[serde(flatten)]
    pub project: Project,
    pub owner: Option<UserSummary>,
    pub timeline_events: Vec<TimelineEvent>,
}

/// Minimal project fields joined onto timeline events for dashboard queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub project_type: ProjectType,
    pub owner: Option<UserSummary>,
}
