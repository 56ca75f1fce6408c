mod handlers;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;

pub fn create_router(db: Database) -> Router {
    let api = Router::new()
        // Projects
        .route("/projects", get(handlers::list_projects))
        .route("/projects", post(handlers::create_project))
        .route("/projects/{id}", get(handlers::get_project))
        .route("/projects/{id}", put(handlers::update_project))
        .route("/projects/{id}", delete(handlers::delete_project))
        // Tasks
        .route("/projects/{id}/tasks", get(handlers::list_project_tasks))
        .route("/projects/{id}/tasks", post(handlers::create_task))
        .route("/tasks/{id}", get(handlers::get_task))
        .route("/tasks/{id}", put(handlers::update_task))
        .route("/tasks/{id}", delete(handlers::delete_task))
        // Timeline events (persisted)
        .route("/projects/{id}/events", get(handlers::list_project_events))
        .route("/projects/{id}/events", post(handlers::create_event))
        .route("/events/{id}", get(handlers::get_event))
        .route("/events/{id}", put(handlers::update_event))
        .route("/events/{id}", delete(handlers::delete_event))
        // Users
        .route("/users", get(handlers::list_users))
        .route("/users", post(handlers::create_user))
        .route("/users/{id}", get(handlers::get_user))
        // Markdown intake and timeline derivation
        .route("/markdown/parse", post(handlers::parse_markdown))
        .route("/timeline/generate", post(handlers::generate_timeline))
        // Dashboard aggregation queries
        .route("/timeline/today", get(handlers::timeline_today))
        .route("/timeline/tomorrow", get(handlers::timeline_tomorrow))
        .route("/timeline/overdue", get(handlers::timeline_overdue))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}
