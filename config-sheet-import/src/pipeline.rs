//! The import pipeline: an archive or JSON document in, workbook sheets out.
//!
//! Icons are unpacked before validation so their cell values end up in the
//! config being checked. Any failure after the icon folder exists drops the
//! folder, which removes it again.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use config_sheet_core::{
    Config, Icon, Metadata, PackageJson, ProgressSink, RunLog, Settings, Workbook, validate_config,
};
use config_sheet_export::metadata::{self, current_version, metadata_from_entries};
use config_sheet_lang::LanguageResolver;
use config_sheet_lang::resolver::DEFAULT_PRIMARY_LANGUAGE;
use serde_json::{Map, Value};

use crate::error::ImportError;
use crate::icons::{IconData, IconFolder, merge_icons};
use crate::normalize::{Normalized, normalize};
use crate::reader::{RawInput, metadata_entries, read_input};
use crate::schema::{SchemaVariant, detect_schema};
use crate::writer::write_workbook;

/// Pipeline checkpoints, in order.
pub const STEPS: [&str; 6] = [
    "Reading input",
    "Detecting format",
    "Normalizing",
    "Unpacking icons",
    "Validating config",
    "Writing sheets",
];

/// Collaborators the import pipeline needs.
pub struct ImportContext<'a> {
    pub settings: &'a Settings,
    pub resolver: &'a LanguageResolver,
    /// Parent directory for the icon folder. Defaults to the directory the
    /// workbook lives in; with neither, icons are stored as `data:` URLs.
    pub icon_dir: Option<&'a Path>,
}

/// Outcome of a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub variant: SchemaVariant,
    pub primary_language: String,
    pub categories: usize,
    pub fields: usize,
    /// Translation languages besides the primary one.
    pub languages: Vec<String>,
    pub icons: usize,
    /// The committed icon folder, if one was created.
    pub icon_folder: Option<PathBuf>,
}

/// Import a file into the workbook.
pub fn import_config(
    path: &Path,
    workbook: &mut dyn Workbook,
    ctx: &ImportContext<'_>,
    run_log: &mut RunLog,
    progress: &dyn ProgressSink,
) -> Result<ImportSummary, ImportError> {
    progress.on_step(STEPS[0], 1, STEPS.len());
    run_log.info(format!("Reading {}", path.display()));
    let input = read_input(path, run_log)?;
    import_input(input, workbook, ctx, run_log, progress)
}

/// Import already-read input into the workbook.
pub fn import_input(
    input: RawInput,
    workbook: &mut dyn Workbook,
    ctx: &ImportContext<'_>,
    run_log: &mut RunLog,
    progress: &dyn ProgressSink,
) -> Result<ImportSummary, ImportError> {
    let total = STEPS.len();
    let step = |n: usize| progress.on_step(STEPS[n], n + 1, total);

    step(1);
    let variant = detect_schema(&input.document);
    run_log.info(format!("Detected {variant} layout"));

    step(2);
    let normalized = normalize(
        &input.document,
        variant,
        input.translations.as_ref(),
        run_log,
    )?;
    run_log.info(format!(
        "Normalized {} field(s), {} categor(ies), {} language(s)",
        normalized.fields.len(),
        normalized.presets.len(),
        normalized.messages.len()
    ));

    let entries = metadata_strings(&metadata_entries(
        input.metadata.as_ref().or(input.document.get("metadata")),
    ));
    // The version is regenerated on import, never carried over.
    if let Some(old) = entries.get(metadata::keys::VERSION) {
        run_log.debug(format!("Replacing imported version {old}"));
    }
    let primary = primary_language(&entries, ctx.resolver);
    let mut metadata = metadata_from_entries(&entries, workbook.title(), current_version());
    metadata.primary_language = Some(primary.clone());
    run_log.debug(format!("Primary language: {primary}"));
    let package_json = input
        .package_json
        .as_ref()
        .and_then(|v| parse_package_json(v, run_log));

    step(3);
    let assets = icon_assets(&input, &normalized);
    let parent = ctx
        .icon_dir
        .map(Path::to_path_buf)
        .or_else(|| workbook_parent(workbook.location()));
    let (icons, folder) =
        unpack_icons(&normalized, &assets, parent.as_deref(), &metadata, run_log)?;
    let icon_cells: HashMap<String, String> = icons
        .iter()
        .map(|icon| (icon.name.clone(), icon.svg.clone()))
        .collect();

    step(4);
    let Normalized {
        fields,
        presets,
        messages,
        ..
    } = normalized;
    let config = Config {
        metadata,
        package_json,
        fields,
        presets,
        icons,
        messages,
    };
    let warnings = validate_config(&config, ctx.settings.missing_icon_policy)
        .into_result("Imported config validation")?;
    for warning in warnings {
        run_log.warn(warning.to_string());
    }

    step(5);
    let stats = write_workbook(workbook, &config, &primary, &icon_cells, ctx.resolver, run_log)?;

    let icon_folder = folder.map(IconFolder::commit);
    if let Some(dir) = &icon_folder {
        run_log.info(format!("Icons written to {}", dir.display()));
    }
    progress.on_complete(&format!(
        "Imported {} categor(ies) and {} field(s)",
        stats.categories, stats.fields
    ));
    Ok(ImportSummary {
        variant,
        primary_language: primary,
        categories: stats.categories,
        fields: stats.fields,
        languages: stats.languages,
        icons: icon_cells.len(),
        icon_folder,
    })
}

/// Metadata values as strings, keyed the way the Metadata sheet keys them.
fn metadata_strings(entries: &Map<String, Value>) -> BTreeMap<String, String> {
    entries
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((snake_key(key), value))
        })
        .collect()
}

/// `datasetId` -> `dataset_id`.
fn snake_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn primary_language(entries: &BTreeMap<String, String>, resolver: &LanguageResolver) -> String {
    entries
        .get(metadata::keys::PRIMARY_LANGUAGE)
        .and_then(|raw| resolver.resolve(raw))
        .unwrap_or_else(|| DEFAULT_PRIMARY_LANGUAGE.to_string())
}

fn parse_package_json(value: &Value, run_log: &mut RunLog) -> Option<PackageJson> {
    match serde_json::from_value(value.clone()) {
        Ok(package) => Some(package),
        Err(e) => {
            run_log.warn(format!("package.json is malformed, dropping it: {e}"));
            None
        }
    }
}

fn workbook_parent(location: Option<&Path>) -> Option<PathBuf> {
    let location = location?;
    Some(
        location
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(location)
            .to_path_buf(),
    )
}

/// Every icon available to the import, by asset name. Archive files win over
/// icons embedded in the document.
fn icon_assets(input: &RawInput, normalized: &Normalized) -> BTreeMap<String, IconData> {
    let mut assets = merge_icons(&input.pngs, input.sprite.clone());
    for icon in &normalized.icons {
        assets
            .entry(icon.name.clone())
            .or_insert_with(|| IconData::from_icon_value(&icon.svg));
    }
    assets
}

/// Write each preset's icon and return the icons keyed by preset, plus the
/// folder they were written to. The folder is only created when a file
/// actually needs writing.
fn unpack_icons(
    normalized: &Normalized,
    assets: &BTreeMap<String, IconData>,
    parent: Option<&Path>,
    metadata: &Metadata,
    run_log: &mut RunLog,
) -> Result<(Vec<Icon>, Option<IconFolder>), ImportError> {
    let needs_files = normalized.presets.iter().any(|p| {
        assets
            .get(normalized.icon_asset(p))
            .is_some_and(|data| !matches!(data, IconData::Url(_)))
    });
    let folder = match parent {
        Some(parent) if needs_files => Some(IconFolder::create(
            parent,
            &format!("{}-icons", metadata.dataset_id),
        )?),
        _ => None,
    };

    let mut written: BTreeMap<&str, String> = BTreeMap::new();
    let mut icons = Vec::new();
    for preset in &normalized.presets {
        let asset = normalized.icon_asset(preset);
        let Some(data) = assets.get(asset) else {
            run_log.debug(format!("No icon found for category '{}'", preset.name));
            continue;
        };
        let cell = match written.get(asset) {
            Some(cell) => cell.clone(),
            None => {
                let cell = match &folder {
                    Some(folder) => folder.write(asset, data)?,
                    None => data.to_data_url(),
                };
                written.insert(asset, cell.clone());
                cell
            }
        };
        icons.push(Icon::new(&preset.icon, cell));
    }
    Ok((icons, folder))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_metadata_keys_are_snake_cased() {
        assert_eq!(snake_key("datasetId"), "dataset_id");
        assert_eq!(snake_key("primaryLanguage"), "primary_language");
        assert_eq!(snake_key("name"), "name");

        let entries: Map<String, Value> = serde_json::from_str(
            r#"{"datasetId": "demo", "version": "1.2", "primaryLanguage": "Spanish", "tags": []}"#,
        )
        .unwrap();
        let strings = metadata_strings(&entries);
        assert_eq!(strings["dataset_id"], "demo");
        assert!(!strings.contains_key("tags"));
        assert_eq!(primary_language(&strings, &LanguageResolver::default()), "es");
    }

    #[test]
    fn primary_defaults_to_english() {
        assert_eq!(
            primary_language(&BTreeMap::new(), &LanguageResolver::default()),
            "en"
        );
    }

    #[test]
    fn workbook_parent_falls_back_to_the_location() {
        assert_eq!(
            workbook_parent(Some(Path::new("/tmp/books/demo"))),
            Some(PathBuf::from("/tmp/books"))
        );
        assert_eq!(workbook_parent(Some(Path::new("demo"))), Some(PathBuf::from("demo")));
        assert_eq!(workbook_parent(None), None);
    }
}
