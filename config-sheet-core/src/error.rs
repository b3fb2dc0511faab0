use std::fmt;

use thiserror::Error;

/// Errors raised by a [`Workbook`](crate::workbook::Workbook) backend.
#[derive(Debug, Error)]
pub enum SheetError {
    /// I/O error while reading or writing the backing store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding or decoding failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook descriptor could not be parsed
    #[error("Workbook descriptor error: {0}")]
    Descriptor(String),

    /// A sheet the operation requires does not exist
    #[error("Sheet not found: {0}")]
    MissingSheet(String),

    /// A cell address outside the writable area
    #[error("Invalid cell address {sheet}!R{row}C{col}")]
    InvalidCell {
        sheet: String,
        row: usize,
        col: usize,
    },
}

impl SheetError {
    pub fn descriptor(msg: impl Into<String>) -> Self {
        Self::Descriptor(msg.into())
    }

    pub fn missing_sheet(name: impl Into<String>) -> Self {
        Self::MissingSheet(name.into())
    }
}

/// Where a validation problem was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A 1-based spreadsheet row (header is row 1).
    Row { sheet: String, row: usize },
    /// A named entity of the assembled config (field key, preset slug, language).
    Entity { kind: &'static str, id: String },
    /// The configuration as a whole.
    Config,
}

impl Location {
    /// Location of the `index`-th data row (0-based, header excluded) of a sheet.
    pub fn data_row(sheet: impl Into<String>, index: usize) -> Self {
        Self::Row {
            sheet: sheet.into(),
            row: index + 2,
        }
    }

    pub fn entity(kind: &'static str, id: impl Into<String>) -> Self {
        Self::Entity {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row { sheet, row } => write!(f, "{sheet} row {row}"),
            Self::Entity { kind, id } => write!(f, "{kind} '{id}'"),
            Self::Config => write!(f, "config"),
        }
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub location: Location,
    pub message: String,
}

impl Issue {
    pub fn new(location: Location, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Aggregated, fatal validation failure.
///
/// Always carries every violation found in the checked input so the user can
/// fix all of them in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub context: String,
    pub issues: Vec<Issue>,
}

impl ValidationError {
    pub fn new(context: impl Into<String>, issues: Vec<Issue>) -> Self {
        Self {
            context: context.into(),
            issues,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed with {} problem(s):",
            self.context,
            self.issues.len()
        )?;
        for issue in &self.issues {
            write!(f, "\n  - {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
