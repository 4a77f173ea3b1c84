use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::api::errors::ApiError;
use crate::api::AppState;
use crate::domain::workspace::{Notice, Preview};

/// Request body for selecting a template
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    pub template_id: String,
}

/// Request body for editing a variable
#[derive(Debug, Deserialize)]
pub struct SetVariableRequest {
    pub value: String,
}

/// Current editing session
///
/// GET /api/workspace
pub async fn get_workspace(State(state): State<AppState>) -> Json<Preview> {
    let workspace = state.workspace.lock().await;
    Json(workspace.preview())
}

/// Select a template from the catalog
///
/// POST /api/workspace/select
pub async fn select_template(
    State(state): State<AppState>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<Preview>, ApiError> {
    let mut workspace = state.workspace.lock().await;
    let preview = workspace.select_template(&req.template_id)?;

    Ok(Json(preview))
}

/// Set one variable value of the selected template
///
/// PUT /api/workspace/variables/:name
pub async fn set_variable(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<SetVariableRequest>,
) -> Result<Json<Preview>, ApiError> {
    let mut workspace = state.workspace.lock().await;
    let preview = workspace
        .set_variable(&name, req.value)
        .ok_or_else(|| ApiError::conflict("No template selected"))?;

    Ok(Json(preview))
}

/// Use the selected template
///
/// POST /api/workspace/use
///
/// Returns 201 with the new usage record, or 204 when nothing is selected.
pub async fn use_template(State(state): State<AppState>) -> Result<Response, ApiError> {
    let mut workspace = state.workspace.lock().await;
    let response = match workspace.use_template().await? {
        Some(record) => (StatusCode::CREATED, Json(record)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    };

    Ok(response)
}

/// Drain pending notices
///
/// GET /api/notices
pub async fn take_notices(State(state): State<AppState>) -> Json<Vec<Notice>> {
    let mut workspace = state.workspace.lock().await;
    Json(workspace.take_notices())
}
