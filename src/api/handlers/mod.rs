// HTTP handlers for the local template workspace API

pub mod history;
pub mod templates;
pub mod workspace;

/// Health check
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
