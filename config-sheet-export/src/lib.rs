//! Workbook → configuration export.
//!
//! [`generate_config`] runs the whole pipeline against any [`Workbook`]:
//! row validation, field and category extraction, icon resolution,
//! translation mapping and metadata refresh. The result can be written as
//! JSON, packed into an archive, or uploaded to the build service.
//!
//! [`Workbook`]: config_sheet_core::Workbook

pub mod archive;
pub mod assemble;
pub mod build_api;
pub mod error;
pub mod extract;
pub mod metadata;
pub mod translate;

pub use archive::{
    ArchiveSummary, HttpIconFetcher, IconFetcher, write_archive, write_archive_to,
    write_config_json,
};
pub use assemble::{ExportContext, STEPS, generate_config};
pub use build_api::{BuildApi, HttpBuildApi, upload_config};
pub use error::{BuildError, ExportError};
pub use extract::{extract_fields, extract_presets, split_list, validate_inputs};
pub use metadata::{current_version, package_json, refresh_metadata};
pub use translate::{MatchStrategy, TranslationKind, Unresolved, map_translations};
