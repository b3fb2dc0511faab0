use config_sheet_core::{SheetError, ValidationError};
use thiserror::Error;

/// Errors that can occur while importing a configuration.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Writing to the workbook failed
    #[error(transparent)]
    Sheet(#[from] SheetError),

    /// The normalized config failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The payload did not look like any known configuration layout
    #[error("Unrecognized format: {0}")]
    Format(String),

    /// The input file type is not supported
    #[error("Unsupported input: {0}")]
    Unsupported(String),
}

impl ImportError {
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}
