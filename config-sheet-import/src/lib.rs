//! Import configuration archives and JSON documents into a workbook.
//!
//! This crate owns the reverse direction of the export: reading the input,
//! detecting which of the known layouts it uses, normalizing it into the
//! canonical model, unpacking icons next to the workbook and writing every
//! sheet back so the next export reproduces the same fields and presets.

pub mod error;
pub mod icons;
pub mod normalize;
pub mod pipeline;
pub mod reader;
pub mod schema;
pub mod writer;

pub use error::ImportError;
pub use icons::{IconData, IconFolder, PngIndex, merge_icons};
pub use normalize::{Normalized, normalize};
pub use pipeline::{ImportContext, ImportSummary, STEPS, import_config, import_input};
pub use reader::{ARCHIVE_EXTENSIONS, RawInput, read_archive, read_input};
pub use schema::{SchemaVariant, detect_schema};
pub use writer::{WriteStats, write_workbook};
