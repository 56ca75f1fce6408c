use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::project::ProjectSummary;

/// A titled, dated record attached to a project, used for scheduling and
/// milestone tracking.
///
/// The `event_type` tag is deliberately an open string: the generator emits
/// `"milestone"` and dashboards group by a known subset ("milestone", "task",
/// "deadline", "meeting", "release"), but nothing is enforced at creation
/// time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a timeline event, either standalone or as part of a
/// project creation batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimelineEventInput {
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    #[serde(rename = "type", default = "default_event_type")]
    pub event_type: String,
}

fn default_event_type() -> String {
    "milestone".to_string()
}

/// Input for updating a timeline event. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimelineEventInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}

/// A timeline event joined with minimal parent-project fields, as returned by
/// the dashboard aggregation queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWithProject {
    #[serde(flatten)]
    pub event: TimelineEvent,
    pub project: ProjectSummary,
}
