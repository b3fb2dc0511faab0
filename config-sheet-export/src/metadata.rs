//! The Metadata sheet: dataset identity, version and primary language.
//!
//! Metadata is stored as key/value rows under a `Key | Value` header. The
//! version is regenerated as `yy.MM.dd` every time metadata is touched.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use config_sheet_core::cell::cell_at;
use config_sheet_core::{
    CellValue, Grid, Metadata, PackageJson, RunLog, SheetError, Workbook, sheets, slugify,
};

pub mod keys {
    pub const DATASET_ID: &str = "dataset_id";
    pub const NAME: &str = "name";
    pub const VERSION: &str = "version";
    pub const DESCRIPTION: &str = "description";
    pub const PRIMARY_LANGUAGE: &str = "primary_language";

    /// Keys written first, in this order; anything else follows.
    pub const ORDER: [&str; 5] = [DATASET_ID, NAME, VERSION, DESCRIPTION, PRIMARY_LANGUAGE];
}

/// Version string for a date, `yy.MM.dd`.
pub fn version_for(date: NaiveDate) -> String {
    date.format("%y.%m.%d").to_string()
}

/// Version string for today in local time.
pub fn current_version() -> String {
    version_for(Local::now().date_naive())
}

/// Read key/value rows. Keys are lowercased; blank keys are skipped.
pub fn read_entries(grid: &Grid) -> BTreeMap<String, String> {
    grid.non_blank_rows()
        .filter_map(|(_, row)| {
            let key = cell_at(row, 0).as_text().to_ascii_lowercase();
            (!key.is_empty()).then(|| (key, cell_at(row, 1).as_text().to_string()))
        })
        .collect()
}

/// Build metadata from sheet entries, filling defaults from the workbook title.
pub fn metadata_from_entries(
    entries: &BTreeMap<String, String>,
    title: &str,
    version: String,
) -> Metadata {
    let get = |key: &str| entries.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());
    let dataset_id = get(keys::DATASET_ID)
        .map(str::to_string)
        .unwrap_or_else(|| default_dataset_id(title));
    let name = get(keys::NAME)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Config-{}", title.trim()));
    Metadata {
        dataset_id,
        name,
        version,
        description: get(keys::DESCRIPTION).map(str::to_string),
        primary_language: get(keys::PRIMARY_LANGUAGE).map(str::to_string),
    }
}

pub fn default_dataset_id(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        "config".to_string()
    } else {
        format!("config-{slug}")
    }
}

/// Render metadata as a Metadata sheet, keeping unknown keys from `extra`.
pub fn metadata_grid(
    metadata: &Metadata,
    primary_language: &str,
    extra: &BTreeMap<String, String>,
) -> Grid {
    let mut grid = Grid::from_strings([["Key", "Value"]]);
    let known = [
        (keys::DATASET_ID, metadata.dataset_id.as_str()),
        (keys::NAME, metadata.name.as_str()),
        (keys::VERSION, metadata.version.as_str()),
        (keys::DESCRIPTION, metadata.description.as_deref().unwrap_or("")),
        (keys::PRIMARY_LANGUAGE, primary_language),
    ];
    for (key, value) in known {
        grid.push_row(vec![CellValue::text(key), CellValue::text(value)]);
    }
    for (key, value) in extra {
        if !keys::ORDER.contains(&key.as_str()) {
            grid.push_row(vec![CellValue::text(key), CellValue::text(value)]);
        }
    }
    grid
}

/// Read metadata, stamp a fresh version and write the sheet back.
pub fn refresh_metadata(
    workbook: &mut dyn Workbook,
    primary_language: &str,
    run_log: &mut RunLog,
) -> Result<Metadata, SheetError> {
    refresh_metadata_with_version(workbook, primary_language, current_version(), run_log)
}

pub fn refresh_metadata_with_version(
    workbook: &mut dyn Workbook,
    primary_language: &str,
    version: String,
    run_log: &mut RunLog,
) -> Result<Metadata, SheetError> {
    let entries = match workbook.read_sheet(sheets::METADATA)? {
        Some(grid) => read_entries(&grid),
        None => {
            run_log.info("No Metadata sheet found, creating one");
            BTreeMap::new()
        }
    };
    let mut metadata = metadata_from_entries(&entries, workbook.title(), version);
    metadata.primary_language = Some(primary_language.to_string());
    if let Some(previous) = entries.get(keys::VERSION)
        && previous != &metadata.version
    {
        run_log.debug(format!("Version {previous} -> {}", metadata.version));
    }
    workbook.write_sheet(
        sheets::METADATA,
        &metadata_grid(&metadata, primary_language, &entries),
    )?;
    Ok(metadata)
}

/// The npm-style descriptor shipped with an export.
pub fn package_json(metadata: &Metadata) -> PackageJson {
    PackageJson {
        name: metadata.dataset_id.clone(),
        version: metadata.version.clone(),
        description: metadata.description.clone(),
        extra: BTreeMap::new(),
    }
}
