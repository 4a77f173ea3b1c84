use axum::{extract::State, http::StatusCode, Json};

use crate::api::errors::ApiError;
use crate::api::AppState;
use crate::domain::usage::UsageRecord;

/// Local usage history, newest first
///
/// GET /api/history
pub async fn get_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<UsageRecord>>, ApiError> {
    let usage_log = state.workspace.lock().await.usage_log();
    let records = usage_log.load_all().await?;

    Ok(Json(records))
}

/// Clear the local usage history
///
/// DELETE /api/history
pub async fn clear_history(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    let usage_log = state.workspace.lock().await.usage_log();
    usage_log.clear().await?;

    Ok(StatusCode::NO_CONTENT)
}
