use config_sheet_core::{SheetError, ValidationError};
use thiserror::Error;

/// Errors that can occur while exporting a workbook.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Reading or writing the workbook failed
    #[error(transparent)]
    Sheet(#[from] SheetError),

    /// Input rows or the assembled config failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// I/O error while writing outputs
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The build service failed or never answered
    #[error("Build failed: {0}")]
    Build(#[from] BuildError),

    /// An icon could not be packaged
    #[error("Icon '{name}': {message}")]
    Icon { name: String, message: String },
}

impl ExportError {
    pub fn icon(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Icon {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Errors from the remote build service.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    GaveUp(String),
}

impl BuildError {
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Whether another attempt might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::ServerError { status, .. } => *status >= 500 || *status == 429,
            Self::InvalidResponse(_) | Self::Json(_) | Self::GaveUp(_) => false,
        }
    }
}
