//! Writing a canonical config back into the seven workbook sheets.
//!
//! The layout mirrors what the exporter reads, so an imported workbook
//! exports to the same fields and presets.

use std::collections::{BTreeMap, HashMap};

use config_sheet_core::model::keys;
use config_sheet_core::{
    CellValue, Config, Field, Grid, Messages, RunLog, SheetError, Workbook, sheets,
};
use config_sheet_export::metadata::metadata_grid;
use config_sheet_lang::LanguageResolver;

pub const CATEGORY_HEADERS: [&str; 3] = ["Icon", "Fields", "Color"];
pub const DETAIL_HEADERS: [&str; 5] = ["Label", "Helper Text", "Type", "Options", "Universal"];

/// What was written.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteStats {
    pub categories: usize,
    pub fields: usize,
    pub languages: Vec<String>,
}

fn text_row<I, S>(cells: I) -> Vec<CellValue>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    cells.into_iter().map(CellValue::text).collect()
}

fn join_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> String {
    labels.into_iter().collect::<Vec<_>>().join(", ")
}

/// Categories sheet. `icon_cells` maps preset key to the icon cell value.
/// Unlabelled fields are referenced by tag key.
pub fn categories_grid(
    config: &Config,
    primary_name: &str,
    icon_cells: &HashMap<String, String>,
) -> Grid {
    let label_by_key: HashMap<&str, &str> = config
        .fields
        .iter()
        .map(|f| {
            let reference = if f.label.trim().is_empty() { &f.tag_key } else { &f.label };
            (f.tag_key.as_str(), reference.as_str())
        })
        .collect();

    let mut rows = vec![text_row(
        std::iter::once(primary_name).chain(CATEGORY_HEADERS),
    )];
    for preset in &config.presets {
        let fields = join_labels(
            preset
                .fields
                .iter()
                .map(|k| label_by_key.get(k.as_str()).copied().unwrap_or(k.as_str())),
        );
        let icon = icon_cells.get(&preset.icon).map(String::as_str).unwrap_or("");
        rows.push(text_row([
            preset.name.as_str(),
            icon,
            fields.as_str(),
            preset.color.as_str(),
        ]));
    }
    Grid::new(rows)
}

/// Details sheet.
pub fn details_grid(fields: &[Field], run_log: &mut RunLog) -> Grid {
    let mut rows = vec![text_row(DETAIL_HEADERS)];
    for field in fields {
        if field.options().iter().any(|o| o.label.contains(',')) {
            run_log.warn(format!(
                "Field '{}' has an option label containing a comma; it will split on export",
                field.label
            ));
        }
        let options = join_labels(field.options().iter().map(|o| o.label.as_str()));
        rows.push(text_row([
            field.label.as_str(),
            field.helper_text.as_deref().unwrap_or(""),
            field.field_type.sheet_label(),
            options.as_str(),
            if field.universal { "TRUE" } else { "" },
        ]));
    }
    Grid::new(rows)
}

fn lookup<'a>(messages: &'a Messages, lang: &str, key: &str) -> Option<&'a str> {
    messages
        .get(lang)?
        .get(key)
        .map(|m| m.message.text())
        .filter(|t| !t.is_empty())
}

/// A translation sheet: one row per entity, one column per target language.
fn translation_grid<T>(
    header: &[CellValue],
    entities: &[T],
    languages: &[String],
    source: impl Fn(&T) -> String,
    translated: impl Fn(&T, &str) -> Option<String>,
) -> Grid {
    let mut rows = vec![header.to_vec()];
    for entity in entities {
        let mut row = vec![CellValue::text(source(entity))];
        row.extend(
            languages
                .iter()
                .map(|lang| CellValue::text(translated(entity, lang).unwrap_or_default())),
        );
        rows.push(row);
    }
    Grid::new(rows)
}

/// Option translations joined in option order. Gaps take the source label
/// so positions stay aligned; a language with no option translations at all
/// yields an empty cell.
fn option_translations(messages: &Messages, field: &Field, lang: &str) -> Option<String> {
    let translated: Vec<Option<&str>> = field
        .options()
        .iter()
        .map(|o| lookup(messages, lang, &keys::field_option(&field.tag_key, &o.value)))
        .collect();
    if translated.iter().all(Option::is_none) {
        return None;
    }
    Some(join_labels(
        translated
            .iter()
            .zip(field.options())
            .map(|(t, o)| t.unwrap_or(o.label.as_str())),
    ))
}

/// Write every sheet. Translation headers use `"<English name> - <iso>"`.
pub fn write_workbook(
    workbook: &mut dyn Workbook,
    config: &Config,
    primary: &str,
    icon_cells: &HashMap<String, String>,
    resolver: &LanguageResolver,
    run_log: &mut RunLog,
) -> Result<WriteStats, SheetError> {
    let primary_name = resolver
        .english_name(primary)
        .unwrap_or_else(|| primary.to_string());
    let languages: Vec<String> = config
        .messages
        .keys()
        .filter(|l| l.as_str() != primary)
        .cloned()
        .collect();

    if !config.fields.is_empty() {
        for preset in config.presets.iter().filter(|p| p.fields.is_empty()) {
            run_log.warn(format!(
                "Category '{}' has no fields; its empty Fields cell will export as every field",
                preset.name
            ));
        }
    }
    workbook.write_sheet(
        sheets::CATEGORIES,
        &categories_grid(config, &primary_name, icon_cells),
    )?;
    workbook.write_sheet(sheets::DETAILS, &details_grid(&config.fields, run_log))?;
    workbook.write_sheet(
        sheets::METADATA,
        &metadata_grid(&config.metadata, primary, &BTreeMap::new()),
    )?;

    let header: Vec<CellValue> = std::iter::once(CellValue::text(primary_name.as_str()))
        .chain(languages.iter().map(|l| CellValue::text(resolver.display_header(l))))
        .collect();
    let messages = &config.messages;

    workbook.write_sheet(
        sheets::CATEGORY_TRANSLATIONS,
        &translation_grid(
            &header,
            &config.presets,
            &languages,
            |p| p.name.clone(),
            |p, lang| lookup(messages, lang, &keys::preset_name(&p.icon)).map(str::to_string),
        ),
    )?;
    workbook.write_sheet(
        sheets::DETAIL_LABEL_TRANSLATIONS,
        &translation_grid(
            &header,
            &config.fields,
            &languages,
            |f| f.label.clone(),
            |f, lang| lookup(messages, lang, &keys::field_label(&f.tag_key)).map(str::to_string),
        ),
    )?;
    workbook.write_sheet(
        sheets::DETAIL_HELPER_TRANSLATIONS,
        &translation_grid(
            &header,
            &config.fields,
            &languages,
            |f| f.helper_text.clone().unwrap_or_default(),
            |f, lang| {
                lookup(messages, lang, &keys::field_helper_text(&f.tag_key)).map(str::to_string)
            },
        ),
    )?;
    workbook.write_sheet(
        sheets::DETAIL_OPTION_TRANSLATIONS,
        &translation_grid(
            &header,
            &config.fields,
            &languages,
            |f| join_labels(f.options().iter().map(|o| o.label.as_str())),
            |f, lang| option_translations(messages, f, lang),
        ),
    )?;

    run_log.info(format!(
        "Wrote {} categor(ies), {} field(s), {} translation language(s)",
        config.presets.len(),
        config.fields.len(),
        languages.len()
    ));
    Ok(WriteStats {
        categories: config.presets.len(),
        fields: config.fields.len(),
        languages,
    })
}

#[cfg(test)]
#[path = "tests/writer_tests.rs"]
mod tests;
