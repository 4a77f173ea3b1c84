use thiserror::Error;

/// Errors that can occur in the template workflow
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template service request failed: {0}")]
    Remote(String),

    #[error("Template service returned {status}: {message}")]
    RemoteStatus { status: u16, message: String },

    #[error("Malformed template service response: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TemplateError {
    /// True for failures of the remote template service
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            TemplateError::Remote(_) | TemplateError::RemoteStatus { .. } | TemplateError::Decode(_)
        )
    }
}

pub type TemplateResult<T> = Result<T, TemplateError>;
