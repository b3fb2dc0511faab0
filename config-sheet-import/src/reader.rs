//! Reading import inputs: zip archives or bare JSON documents.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use config_sheet_core::RunLog;
use config_sheet_icons::parse_sprite;
use serde_json::{Map, Value};
use zip::ZipArchive;

use crate::error::ImportError;
use crate::icons::PngIndex;

/// Extensions treated as zip archives.
pub const ARCHIVE_EXTENSIONS: [&str; 3] = ["zip", "comapeocat", "mapeosettings"];

/// Everything read from an input before normalization.
#[derive(Debug, Default)]
pub struct RawInput {
    /// The config document (`presets.json` contents, or the whole JSON file).
    pub document: Value,
    pub translations: Option<Value>,
    pub metadata: Option<Value>,
    pub package_json: Option<Value>,
    pub pngs: PngIndex,
    pub sprite: Vec<config_sheet_core::Icon>,
}

/// Read a zip archive or a JSON file, chosen by extension.
pub fn read_input(path: &Path, run_log: &mut RunLog) -> Result<RawInput, ImportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if ext == "json" {
        let document: Value = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        return Ok(split_json_document(document));
    }
    if ARCHIVE_EXTENSIONS.contains(&ext.as_str()) {
        return read_archive(File::open(path)?, run_log);
    }
    Err(ImportError::unsupported(format!(
        "{} (expected .json or one of: {})",
        path.display(),
        ARCHIVE_EXTENSIONS.join(", ")
    )))
}

/// Pull metadata and packageJson out of a bare JSON config.
fn split_json_document(document: Value) -> RawInput {
    let metadata = document.get("metadata").cloned();
    let package_json = document.get("packageJson").cloned();
    RawInput {
        document,
        metadata,
        package_json,
        ..Default::default()
    }
}

fn parse_json(name: &str, bytes: &[u8], run_log: &mut RunLog) -> Option<Value> {
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            run_log.warn(format!("{name} is not valid JSON, ignoring it: {e}"));
            None
        }
    }
}

/// Read an archive. Entries may sit under a single top-level folder.
pub fn read_archive<R: Read + Seek>(
    reader: R,
    run_log: &mut RunLog,
) -> Result<RawInput, ImportError> {
    let mut archive = ZipArchive::new(reader)?;
    let mut input = RawInput::default();
    let mut presets = None;
    let mut sprite_text = None;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let path = entry.name().trim_start_matches("./").to_string();
        let file_name = path.rsplit('/').next().unwrap_or(&path).to_string();
        let in_icon_dir = path.split('/').rev().nth(1) == Some("icons");

        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;

        match file_name.as_str() {
            "presets.json" => presets = parse_json(&path, &bytes, run_log),
            "translations.json" => input.translations = parse_json(&path, &bytes, run_log),
            "metadata.json" => input.metadata = parse_json(&path, &bytes, run_log),
            "package.json" => input.package_json = parse_json(&path, &bytes, run_log),
            "icons.svg" => sprite_text = Some(String::from_utf8_lossy(&bytes).into_owned()),
            name if in_icon_dir && name.to_ascii_lowercase().ends_with(".png") => {
                input.pngs.insert(name, bytes);
            }
            _ => log::debug!("Ignoring archive entry {path}"),
        }
    }

    input.document = presets.ok_or_else(|| ImportError::format("archive has no presets.json"))?;
    if let Some(sprite) = sprite_text {
        match parse_sprite(&sprite) {
            Ok(icons) => input.sprite = icons,
            Err(e) => run_log.warn(format!("icons.svg could not be parsed, ignoring it: {e}")),
        }
    }
    run_log.debug(format!(
        "Archive: {} PNG file(s), {} sprite symbol(s)",
        input.pngs.len(),
        input.sprite.len()
    ));
    Ok(input)
}

/// Metadata fields from either `metadata.json` or an embedded object.
pub fn metadata_entries(metadata: Option<&Value>) -> Map<String, Value> {
    metadata
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}
