//! Core types shared by every config-sheet crate: the canonical configuration
//! model, slug generation, the workbook storage seam and the ambient pieces
//! (run log, progress, retry, settings) each pipeline stage is handed.

pub mod cell;
pub mod error;
pub mod model;
pub mod progress;
pub mod retry;
pub mod run_log;
pub mod settings;
pub mod slug;
pub mod translations;
pub mod validate;
pub mod workbook;

pub use cell::{CellValue, Grid};
pub use error::{Issue, Location, SheetError, ValidationError};
pub use model::{
    Config, Field, FieldType, Icon, LanguageMessages, Message, MessageValue, Messages, Metadata,
    PackageJson, Preset, SelectOption,
};
pub use progress::{LogProgress, ProgressSink, SilentProgress, Throttled};
pub use retry::{Attempt, RetryError, RetryPolicy};
pub use run_log::{FileSink, LogSink, MemorySink, NullSink, RunLog, RunSummary};
pub use settings::{MissingIconPolicy, Settings};
pub use slug::{build_slug_with_fallback, normalize_name, slugify};
pub use validate::{ValidationReport, validate_config};
pub use workbook::{CsvWorkbook, MemoryWorkbook, Workbook, sheets};
