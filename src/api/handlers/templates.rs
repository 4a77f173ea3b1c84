use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::AppState;
use crate::domain::catalog::SortKey;
use crate::domain::template::{NewTemplate, Template};

/// Query string for listing templates
#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    /// Free-text search over name, description and tags
    #[serde(default)]
    pub q: String,
    /// Exact category, or "all"
    pub category: Option<String>,
    pub sort: Option<SortKey>,
}

/// Response from a catalog refresh
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub count: usize,
}

/// List cached templates, filtered and optionally sorted
///
/// GET /api/templates?q=&category=&sort=
pub async fn list_templates(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Json<Vec<Template>> {
    let workspace = state.workspace.lock().await;
    let templates = workspace
        .catalog()
        .query(&query.q, query.category.as_deref(), query.sort)
        .into_iter()
        .cloned()
        .collect();

    Json(templates)
}

/// Reload the catalog from the template service
///
/// POST /api/templates/refresh
///
/// Failures are reported through notices, never as an error status.
pub async fn refresh_templates(State(state): State<AppState>) -> Json<RefreshResponse> {
    let mut workspace = state.workspace.lock().await;
    let count = workspace.fetch_templates().await;

    Json(RefreshResponse { count })
}

/// Create a template
///
/// POST /api/templates
pub async fn create_template(
    State(state): State<AppState>,
    Json(req): Json<NewTemplate>,
) -> Result<(StatusCode, Json<Template>), ApiError> {
    req.validate().map_err(ApiError::bad_request)?;

    let mut workspace = state.workspace.lock().await;
    let template = workspace.create_template(&req).await?;

    Ok((StatusCode::CREATED, Json(template)))
}

/// Update a template
///
/// PUT /api/templates/:id
pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NewTemplate>,
) -> Result<Json<Template>, ApiError> {
    req.validate().map_err(ApiError::bad_request)?;

    let mut workspace = state.workspace.lock().await;
    let template = workspace.update_template(&id, &req).await?;

    Ok(Json(template))
}

/// Delete a template
///
/// DELETE /api/templates/:id
pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut workspace = state.workspace.lock().await;
    workspace.delete_template(&id).await?;

    Ok(StatusCode::NO_CONTENT)
}
