use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Database;
use crate::markdown::{self, MarkdownParseResult, UploadMeta};
use crate::models::*;
use crate::timeline::{self, DraftEvent, OverdueEvent};

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
/// The full error is logged server-side for debugging, but clients only
/// see a generic message to avoid leaking internal details.
///
/// Some errors are validation errors that should be exposed to the client
/// (e.g., "Project not found" from a nested create). These are returned
/// as-is with a BAD_REQUEST status.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    let msg = e.to_string();

    // Known validation errors that are safe to expose
    if msg.contains("not found") || msg.contains("required") {
        tracing::warn!("Validation error: {}", msg);
        return (StatusCode::BAD_REQUEST, msg);
    }

    tracing::error!("Internal error: {}", msg);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Projects
// ============================================================

pub async fn list_projects(
    State(db): State<Database>,
) -> Result<Json<Vec<ProjectWithTimeline>>, (StatusCode, String)> {
    db.get_all_projects_with_timeline()
        .map(Json)
        .map_err(internal_error)
}

pub async fn get_project(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectWithTimeline>, (StatusCode, String)> {
    db.get_project_with_timeline(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Project not found".to_string()))
}

pub async fn create_project(
    State(db): State<Database>,
    Json(input): Json<CreateProjectInput>,
) -> Result<(StatusCode, Json<ProjectWithTimeline>), (StatusCode, String)> {
    if input.name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Project name is required".to_string(),
        ));
    }

    db.create_project(input)
        .map(|p| (StatusCode::CREATED, Json(p)))
        .map_err(internal_error)
}

pub async fn update_project(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProjectInput>,
) -> Result<Json<Project>, (StatusCode, String)> {
    db.update_project(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Project not found".to_string()))
}

pub async fn delete_project(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if db.delete_project(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Project not found".to_string()))
    }
}

// ============================================================
// Tasks
// ============================================================

pub async fn list_project_tasks(
    State(db): State<Database>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<Task>>, (StatusCode, String)> {
    // First verify project exists
    db.get_project(project_id)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Project not found".to_string()))?;

    db.get_tasks_by_project(project_id)
        .map(Json)
        .map_err(internal_error)
}

pub async fn create_task(
    State(db): State<Database>,
    Path(project_id): Path<Uuid>,
    Json(input): Json<CreateTaskInput>,
) -> Result<(StatusCode, Json<Task>), (StatusCode, String)> {
    if input.title.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Task title is required".to_string(),
        ));
    }

    db.get_project(project_id)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Project not found".to_string()))?;

    db.create_task(project_id, input)
        .map(|t| (StatusCode::CREATED, Json(t)))
        .map_err(internal_error)
}

pub async fn get_task(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, (StatusCode, String)> {
    db.get_task(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Task not found".to_string()))
}

pub async fn update_task(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTaskInput>,
) -> Result<Json<Task>, (StatusCode, String)> {
    db.update_task(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Task not found".to_string()))
}

pub async fn delete_task(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if db.delete_task(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Task not found".to_string()))
    }
}

// ============================================================
// Timeline events (persisted)
// ============================================================

pub async fn list_project_events(
    State(db): State<Database>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<TimelineEvent>>, (StatusCode, String)> {
    db.get_project(project_id)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Project not found".to_string()))?;

    db.get_events_by_project(project_id)
        .map(Json)
        .map_err(internal_error)
}

pub async fn create_event(
    State(db): State<Database>,
    Path(project_id): Path<Uuid>,
    Json(input): Json<CreateTimelineEventInput>,
) -> Result<(StatusCode, Json<TimelineEvent>), (StatusCode, String)> {
    if input.title.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Event title is required".to_string(),
        ));
    }

    db.create_event(project_id, input)
        .map(|e| (StatusCode::CREATED, Json(e)))
        .map_err(internal_error)
}

pub async fn get_event(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<TimelineEvent>, (StatusCode, String)> {
    db.get_event(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Event not found".to_string()))
}

pub async fn update_event(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTimelineEventInput>,
) -> Result<Json<TimelineEvent>, (StatusCode, String)> {
    db.update_event(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Event not found".to_string()))
}

pub async fn delete_event(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if db.delete_event(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Event not found".to_string()))
    }
}

// ============================================================
// Users
// ============================================================

pub async fn list_users(
    State(db): State<Database>,
) -> Result<Json<Vec<User>>, (StatusCode, String)> {
    db.get_all_users().map(Json).map_err(internal_error)
}

pub async fn create_user(
    State(db): State<Database>,
    Json(input): Json<CreateUserInput>,
) -> Result<(StatusCode, Json<User>), (StatusCode, String)> {
    if input.email.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "User email is required".to_string(),
        ));
    }

    db.create_user(input)
        .map(|u| (StatusCode::CREATED, Json(u)))
        .map_err(internal_error)
}

pub async fn get_user(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, (StatusCode, String)> {
    db.get_user(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "User not found".to_string()))
}

// ============================================================
// Markdown intake
// ============================================================

/// Body for the markdown upload intake endpoint: declared file metadata plus
/// the already-decoded text content.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseMarkdownInput {
    #[serde(flatten)]
    pub meta: UploadMeta,
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseMarkdownResponse {
    pub valid: bool,
    #[serde(flatten)]
    pub result: MarkdownParseResult,
}

#[derive(Debug, Serialize)]
pub struct UploadRejection {
    pub valid: bool,
    pub error: String,
}

/// Validate declared upload metadata, then extract H1 headers and a preview.
///
/// Validation failures are a structured `{valid: false, error}` with 400, not
/// an internal error. A document with zero H1 headers still parses cleanly
/// here; refusing to generate from it is the generation endpoint's call.
pub async fn parse_markdown(
    Json(input): Json<ParseMarkdownInput>,
) -> Result<Json<ParseMarkdownResponse>, (StatusCode, Json<UploadRejection>)> {
    if let Err(e) = markdown::validate_upload(&input.meta) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(UploadRejection {
                valid: false,
                error: e.to_string(),
            }),
        ));
    }

    Ok(Json(ParseMarkdownResponse {
        valid: true,
        result: markdown::extract_headers(&input.content),
    }))
}

// ============================================================
// Timeline generation and aggregation
// ============================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTimelineInput {
    pub headers: Vec<String>,
    pub start_date: NaiveDate,
    pub spacing_days: u32,
}

pub async fn generate_timeline(
    Json(input): Json<GenerateTimelineInput>,
) -> Result<Json<Vec<DraftEvent>>, (StatusCode, String)> {
    if input.headers.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Cannot generate a timeline with zero events. The document has no H1 headers."
                .to_string(),
        ));
    }

    Ok(Json(timeline::generate(
        &input.headers,
        input.start_date,
        input.spacing_days,
    )))
}

pub async fn timeline_today(
    State(db): State<Database>,
) -> Result<Json<Vec<EventWithProject>>, (StatusCode, String)> {
    let events = db.get_events_with_projects().map_err(internal_error)?;
    Ok(Json(timeline::today(&events, Utc::now())))
}

#[derive(Debug, Deserialize)]
pub struct TomorrowQuery {
    /// Optional comma-separated subset of event types, e.g.
    /// `types=milestone,deadline,release` for a milestones-only view.
    pub types: Option<String>,
}

pub async fn timeline_tomorrow(
    State(db): State<Database>,
    Query(query): Query<TomorrowQuery>,
) -> Result<Json<Vec<EventWithProject>>, (StatusCode, String)> {
    let events = db.get_events_with_projects().map_err(internal_error)?;
    let mut selected = timeline::tomorrow(&events, Utc::now());

    if let Some(types) = query.types {
        let types: Vec<String> = types
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        selected = timeline::filter_event_types(selected, &types);
    }

    Ok(Json(selected))
}

pub async fn timeline_overdue(
    State(db): State<Database>,
) -> Result<Json<Vec<OverdueEvent>>, (StatusCode, String)> {
    let events = db.get_events_with_projects().map_err(internal_error)?;
    Ok(Json(timeline::overdue(&events, Utc::now())))
}
