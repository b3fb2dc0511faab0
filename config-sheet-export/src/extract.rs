//! Details → fields and Categories → presets.
//!
//! Each sheet is validated in full before anything is transformed. All row
//! errors are collected into one [`ValidationError`]; warnings go to the run log.

use std::collections::HashMap;

use config_sheet_core::cell::cell_at;
use config_sheet_core::model::normalize_color;
use config_sheet_core::workbook::{category_cols, detail_cols, sheets};
use config_sheet_core::{
    CellValue, Field, FieldType, Grid, Location, Preset, RunLog, SelectOption, ValidationError,
    ValidationReport, build_slug_with_fallback, normalize_name,
};

/// Split a comma-separated cell into trimmed, non-empty items.
pub fn split_list(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_universal(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else {
        None
    }
}

// ── Validation ──────────────────────────────────────────────────────────────

/// Check every non-blank Details row.
pub fn validate_details(details: &Grid) -> ValidationReport {
    let mut report = ValidationReport::default();
    for (idx, row) in details.non_blank_rows() {
        let at = || Location::data_row(sheets::DETAILS, idx);
        let label = cell_at(row, detail_cols::LABEL).as_text();
        let type_raw = cell_at(row, detail_cols::TYPE).as_text();
        let options = split_list(cell_at(row, detail_cols::OPTIONS).as_text());
        let universal = cell_at(row, detail_cols::UNIVERSAL).as_text();

        if label.is_empty() {
            report.warn(at(), "field has no label; a positional key will be used");
        }

        match FieldType::from_indicator(type_raw) {
            None => report.error(at(), format!("field '{label}' is missing a type")),
            Some(field_type) => {
                if !FieldType::is_explicit_indicator(type_raw) {
                    report.warn(
                        at(),
                        format!("ambiguous type '{type_raw}' for '{label}', treated as select one"),
                    );
                }
                if field_type.is_select() && options.is_empty() {
                    report.error(at(), format!("select field '{label}' has no options"));
                }
                if !field_type.is_select() && !options.is_empty() {
                    report.warn(
                        at(),
                        format!("options on {field_type} field '{label}' are ignored"),
                    );
                }
            }
        }

        if parse_universal(universal).is_none() {
            report.error(
                at(),
                format!("universal flag must be TRUE or FALSE, got '{universal}'"),
            );
        }
    }
    report
}

/// Check every non-blank Categories row.
pub fn validate_categories(categories: &Grid) -> ValidationReport {
    let mut report = ValidationReport::default();
    for (idx, row) in categories.non_blank_rows() {
        let at = || Location::data_row(sheets::CATEGORIES, idx);
        let name = cell_at(row, category_cols::NAME).as_text();
        if name.is_empty() {
            report.error(at(), "category row has content but no name");
        }
        let color = cell_at(row, category_cols::COLOR).as_text();
        if !color.is_empty() && !normalize_color(color).1 {
            report.warn(at(), format!("invalid color '{color}', using the default"));
        }
    }
    report
}

/// Validate both input sheets, failing with every error at once.
pub fn validate_inputs(
    details: &Grid,
    categories: &Grid,
    run_log: &mut RunLog,
) -> Result<(), ValidationError> {
    let mut report = validate_details(details);
    report.merge(validate_categories(categories));
    let warnings = report.into_result("Spreadsheet validation")?;
    for warning in warnings {
        run_log.warn(warning.to_string());
    }
    Ok(())
}

// ── Fields ──────────────────────────────────────────────────────────────────

/// Validate and extract fields from the Details sheet.
pub fn extract_fields(details: &Grid, run_log: &mut RunLog) -> Result<Vec<Field>, ValidationError> {
    let warnings = validate_details(details).into_result("Details validation")?;
    for warning in warnings {
        run_log.warn(warning.to_string());
    }
    Ok(build_fields(details))
}

/// Transform already-validated Details rows.
pub(crate) fn build_fields(details: &Grid) -> Vec<Field> {
    details
        .non_blank_rows()
        .enumerate()
        .filter_map(|(position, (_, row))| {
            let label = cell_at(row, detail_cols::LABEL).as_text().to_string();
            let field_type = FieldType::from_indicator(cell_at(row, detail_cols::TYPE).as_text())?;
            let tag_key = build_slug_with_fallback(&label, "field", position);
            let helper_text = Some(cell_at(row, detail_cols::HELPER_TEXT).as_text())
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            let options = field_type.is_select().then(|| {
                let labels = split_list(cell_at(row, detail_cols::OPTIONS).as_text());
                SelectOption::from_labels(&labels, &tag_key)
            });
            let universal =
                parse_universal(cell_at(row, detail_cols::UNIVERSAL).as_text()).unwrap_or(false);
            Some(Field {
                tag_key,
                field_type,
                label,
                helper_text,
                options,
                universal,
            })
        })
        .collect()
}

// ── Presets ─────────────────────────────────────────────────────────────────

/// One named row of the Categories sheet.
#[derive(Debug, Clone)]
pub struct CategoryRow {
    /// 0-based grid row (header is 0), for writing back.
    pub row: usize,
    pub name: String,
    pub icon: CellValue,
    pub fields: Vec<String>,
    pub color: String,
}

/// Named category rows in sheet order.
pub fn category_rows(categories: &Grid) -> Vec<CategoryRow> {
    categories
        .non_blank_rows()
        .filter_map(|(idx, row)| {
            let name = cell_at(row, category_cols::NAME).as_text();
            (!name.is_empty()).then(|| CategoryRow {
                row: idx + 1,
                name: name.to_string(),
                icon: cell_at(row, category_cols::ICON).clone(),
                fields: split_list(cell_at(row, category_cols::FIELDS).as_text()),
                color: cell_at(row, category_cols::COLOR).as_text().to_string(),
            })
        })
        .collect()
}

/// Validate the Categories sheet and build presets, resolving field
/// references against the already-extracted fields.
pub fn extract_presets(
    categories: &Grid,
    fields: &[Field],
    run_log: &mut RunLog,
) -> Result<Vec<Preset>, ValidationError> {
    let warnings = validate_categories(categories).into_result("Categories validation")?;
    for warning in warnings {
        run_log.warn(warning.to_string());
    }
    Ok(build_presets(&category_rows(categories), fields, run_log))
}

/// A category whose Fields cell is empty offers every field, in Details order.
pub(crate) fn build_presets(
    rows: &[CategoryRow],
    fields: &[Field],
    run_log: &mut RunLog,
) -> Vec<Preset> {
    let by_label: HashMap<String, &str> = fields
        .iter()
        .map(|f| (normalize_name(&f.label), f.tag_key.as_str()))
        .collect();

    rows.iter()
        .enumerate()
        .map(|(position, row)| {
            let icon = build_slug_with_fallback(&row.name, "category", position);
            let (color, _) = normalize_color(&row.color);
            let field_keys = if row.fields.is_empty() {
                run_log.debug(format!("Category '{}' lists no fields, using all", row.name));
                fields.iter().map(|f| f.tag_key.clone()).collect()
            } else {
                row.fields
                    .iter()
                    .enumerate()
                    .map(|(j, reference)| {
                        resolve_field_ref(reference, j, &by_label, fields, &row.name, run_log)
                    })
                    .collect()
            };
            Preset::new(icon, row.name.clone(), color, field_keys, position as u32 + 1)
        })
        .collect()
}

fn resolve_field_ref(
    reference: &str,
    index: usize,
    by_label: &HashMap<String, &str>,
    fields: &[Field],
    category: &str,
    run_log: &mut RunLog,
) -> String {
    if let Some(key) = by_label.get(&normalize_name(reference)) {
        return key.to_string();
    }
    if let Some(field) = fields.iter().find(|f| f.tag_key == reference) {
        return field.tag_key.clone();
    }
    let fallback = build_slug_with_fallback(reference, "field", index);
    run_log.warn(format!(
        "Category '{category}' references unknown field '{reference}', using key '{fallback}'"
    ));
    fallback
}

#[cfg(test)]
#[path = "tests/extract_tests.rs"]
mod tests;
