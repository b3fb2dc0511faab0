use config_sheet_core::SheetError;
use config_sheet_export::{BuildError, ExportError};
use config_sheet_icons::IconError;
use config_sheet_import::ImportError;
use config_sheet_lang::CatalogError;
use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Opening or creating the workbook failed
    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Import(#[from] ImportError),

    /// Upload to the build service failed
    #[error("Build failed: {0}")]
    Build(#[from] BuildError),

    /// The icon client could not be set up
    #[error("Icon service: {0}")]
    Icon(#[from] IconError),

    #[error("Language catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// Invalid combination of arguments
    #[error("Usage error: {0}")]
    Usage(String),
}

impl CliError {
    pub(crate) fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}
