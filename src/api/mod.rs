// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter

pub mod errors;
pub mod handlers;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::workspace::Workspace;
use handlers::{history, templates, workspace};

/// Shared router state
#[derive(Clone)]
pub struct AppState {
    pub workspace: Arc<Mutex<Workspace>>,
}

impl AppState {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            workspace: Arc::new(Mutex::new(workspace)),
        }
    }
}

/// Builds the router for the local workspace API
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Catalog routes
        .route(
            "/api/templates",
            get(templates::list_templates).post(templates::create_template),
        )
        .route("/api/templates/refresh", post(templates::refresh_templates))
        .route(
            "/api/templates/:id",
            put(templates::update_template).delete(templates::delete_template),
        )
        // Workspace routes
        .route("/api/workspace", get(workspace::get_workspace))
        .route("/api/workspace/select", post(workspace::select_template))
        .route("/api/workspace/variables/:name", put(workspace::set_variable))
        .route("/api/workspace/use", post(workspace::use_template))
        .route("/api/notices", get(workspace::take_notices))
        // History routes
        .route(
            "/api/history",
            get(history::get_history).delete(history::clear_history),
        )
        .with_state(state)
}
