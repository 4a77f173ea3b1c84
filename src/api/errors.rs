use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::errors::TemplateError;

/// API error type with HTTP status code and message
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 409 Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Creates a 502 Bad Gateway error
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    /// Creates a 500 Internal Server Error
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<TemplateError> for ApiError {
    fn from(error: TemplateError) -> Self {
        match &error {
            TemplateError::TemplateNotFound(_) => Self::not_found(error.to_string()),
            TemplateError::RemoteStatus { status, .. } if (400..500).contains(status) => {
                Self::bad_request(error.to_string())
            }
            e if e.is_remote() => Self::bad_gateway(error.to_string()),
            _ => Self::internal_server_error(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let error = ApiError::from(TemplateError::TemplateNotFound("t-1".to_string()));
        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert!(error.message.contains("t-1"));
    }

    #[test]
    fn remote_client_errors_map_to_400() {
        let error = ApiError::from(TemplateError::RemoteStatus {
            status: 422,
            message: "name required".to_string(),
        });
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn remote_failures_map_to_502() {
        let error = ApiError::from(TemplateError::Remote("connection refused".to_string()));
        assert_eq!(error.status, StatusCode::BAD_GATEWAY);

        let error = ApiError::from(TemplateError::RemoteStatus {
            status: 503,
            message: "maintenance".to_string(),
        });
        assert_eq!(error.status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn storage_errors_map_to_500() {
        let error = ApiError::from(TemplateError::Storage("disk full".to_string()));
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
