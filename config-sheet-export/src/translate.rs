//! Translation sheets → per-language messages.
//!
//! Each translation sheet has the primary-language text in column A and one
//! column per target language after it, optionally preceded by an
//! `ISO | Source` metadata pair. Rows are tied back to presets and fields
//! through an explicit [`MatchStrategy`] chain.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use config_sheet_core::model::keys;
use config_sheet_core::workbook::sheets;
use config_sheet_core::{
    CellValue, Field, Grid, Message, Messages, Preset, RunLog, SheetError, Workbook,
    normalize_name, slugify,
};
use config_sheet_lang::LanguageResolver;

use crate::extract::split_list;

// ── Sheet kinds ─────────────────────────────────────────────────────────────

/// The four kinds of translation sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationKind {
    CategoryName,
    FieldLabel,
    FieldHelperText,
    FieldOption,
}

impl TranslationKind {
    pub const ALL: [TranslationKind; 4] = [
        Self::CategoryName,
        Self::FieldLabel,
        Self::FieldHelperText,
        Self::FieldOption,
    ];

    pub fn sheet_name(&self) -> &'static str {
        match self {
            Self::CategoryName => sheets::CATEGORY_TRANSLATIONS,
            Self::FieldLabel => sheets::DETAIL_LABEL_TRANSLATIONS,
            Self::FieldHelperText => sheets::DETAIL_HELPER_TRANSLATIONS,
            Self::FieldOption => sheets::DETAIL_OPTION_TRANSLATIONS,
        }
    }

    fn strategies(&self) -> &'static [MatchStrategy] {
        match self {
            Self::CategoryName => &PRESET_STRATEGIES,
            _ => &FIELD_STRATEGIES,
        }
    }
}

// ── Entity resolution ───────────────────────────────────────────────────────

/// How a translation row was tied to its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Normalized display name equals the row's source text.
    ByName,
    /// Slug/key equals the row's source text or its slug.
    ById,
    /// Same position as the row.
    ByPosition,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByName => write!(f, "name"),
            Self::ById => write!(f, "id"),
            Self::ByPosition => write!(f, "position"),
        }
    }
}

/// Presets prefer an exact name match, then the icon slug, then row position.
pub const PRESET_STRATEGIES: [MatchStrategy; 3] = [
    MatchStrategy::ByName,
    MatchStrategy::ById,
    MatchStrategy::ByPosition,
];

/// Field rows mirror the Details sheet, so they match by position only.
pub const FIELD_STRATEGIES: [MatchStrategy; 1] = [MatchStrategy::ByPosition];

/// A row that no strategy could tie to an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub position: usize,
    pub source: String,
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no entity for row {} ('{}')", self.position + 1, self.source)
    }
}

/// Something a translation row can refer to.
pub trait Translatable {
    fn display_name(&self) -> &str;
    fn id(&self) -> &str;
}

impl Translatable for Preset {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> &str {
        &self.icon
    }
}

impl Translatable for Field {
    fn display_name(&self) -> &str {
        &self.label
    }

    fn id(&self) -> &str {
        &self.tag_key
    }
}

/// Try each strategy in order and report the first that matches.
pub fn resolve_entity<'a, T: Translatable>(
    entities: &'a [T],
    source: &str,
    position: usize,
    strategies: &[MatchStrategy],
) -> Result<(&'a T, MatchStrategy), Unresolved> {
    let wanted_name = normalize_name(source);
    let wanted_id = slugify(source);
    for strategy in strategies {
        let found = match strategy {
            MatchStrategy::ByName if !wanted_name.is_empty() => entities
                .iter()
                .find(|e| normalize_name(e.display_name()) == wanted_name),
            MatchStrategy::ById if !wanted_id.is_empty() => entities
                .iter()
                .find(|e| e.id() == source.trim() || e.id() == wanted_id),
            MatchStrategy::ByPosition => entities.get(position),
            _ => None,
        };
        if let Some(entity) = found {
            return Ok((entity, *strategy));
        }
    }
    Err(Unresolved {
        position,
        source: source.to_string(),
    })
}

// ── Header parsing ──────────────────────────────────────────────────────────

/// A column holding one target language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageColumn {
    pub col: usize,
    pub iso: String,
}

/// Resolved layout of a translation sheet header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderLayout {
    /// First column that may hold a language.
    pub first_language_col: usize,
    pub columns: Vec<LanguageColumn>,
}

impl HeaderLayout {
    pub fn languages(&self) -> BTreeSet<&str> {
        self.columns.iter().map(|c| c.iso.as_str()).collect()
    }
}

fn is_meta_pair(header: &[CellValue]) -> bool {
    let at = |i: usize| header.get(i).map(CellValue::as_text).unwrap_or("");
    at(1).eq_ignore_ascii_case("iso") && at(2).eq_ignore_ascii_case("source")
}

/// Map header columns to languages. Unresolvable, primary-language and
/// duplicate columns are dropped and logged.
pub fn parse_header(
    header: &[CellValue],
    sheet: &str,
    resolver: &LanguageResolver,
    primary: &str,
    run_log: &mut RunLog,
) -> HeaderLayout {
    let first_language_col = if is_meta_pair(header) { 3 } else { 1 };
    let mut layout = HeaderLayout {
        first_language_col,
        columns: Vec::new(),
    };

    for (col, cell) in header.iter().enumerate().skip(first_language_col) {
        let text = cell.as_text();
        if text.is_empty() {
            continue;
        }
        let Some((iso, rule)) = resolver.resolve_with_rule(text) else {
            run_log.warn(format!("{sheet}: cannot resolve language column '{text}', skipping"));
            continue;
        };
        if iso == primary {
            run_log.debug(format!("{sheet}: column '{text}' is the primary language, skipping"));
            continue;
        }
        if layout.columns.iter().any(|c| c.iso == iso) {
            run_log.warn(format!(
                "{sheet}: duplicate column for '{iso}' ('{text}'), dropping it"
            ));
            continue;
        }
        run_log.debug(format!("{sheet}: column '{text}' → {iso} ({rule})"));
        layout.columns.push(LanguageColumn { col, iso });
    }
    layout
}

// ── Message generation ──────────────────────────────────────────────────────

fn preset_description(preset: &Preset) -> String {
    format!("The name of category '{}'", preset.name)
}

fn label_description(field: &Field) -> String {
    format!("Label for field '{}'", field.label)
}

fn helper_description(field: &Field) -> String {
    format!("Helper text for field '{}'", field.label)
}

fn option_description(option_label: &str, field: &Field) -> String {
    format!("Option '{option_label}' for field '{}'", field.label)
}

/// Messages for the primary language, taken from the model itself.
pub fn primary_messages(fields: &[Field], presets: &[Preset], primary: &str) -> Messages {
    let mut entries = BTreeMap::new();
    for preset in presets {
        entries.insert(
            keys::preset_name(&preset.icon),
            Message::text(&preset.name, preset_description(preset)),
        );
    }
    for field in fields {
        entries.insert(
            keys::field_label(&field.tag_key),
            Message::text(&field.label, label_description(field)),
        );
        if let Some(helper) = &field.helper_text {
            entries.insert(
                keys::field_helper_text(&field.tag_key),
                Message::text(helper, helper_description(field)),
            );
        }
        for option in field.options() {
            entries.insert(
                keys::field_option(&field.tag_key, &option.value),
                Message::option(
                    &option.label,
                    &option.value,
                    option_description(&option.label, field),
                ),
            );
        }
    }
    Messages::from([(primary.to_string(), entries)])
}

/// Build messages for every language from the four translation sheets.
///
/// Missing sheets are skipped. Row/column problems are logged, never fatal.
pub fn map_translations(
    workbook: &dyn Workbook,
    fields: &[Field],
    presets: &[Preset],
    resolver: &LanguageResolver,
    primary: &str,
    run_log: &mut RunLog,
) -> Result<Messages, SheetError> {
    let mut messages = primary_messages(fields, presets, primary);
    let mut languages_by_sheet: Vec<(&str, BTreeSet<String>)> = Vec::new();

    for kind in TranslationKind::ALL {
        let sheet = kind.sheet_name();
        let Some(grid) = workbook.read_sheet(sheet)? else {
            run_log.debug(format!("No '{sheet}' sheet, skipping"));
            continue;
        };
        let layout = parse_header(grid.header(), sheet, resolver, primary, run_log);
        languages_by_sheet.push((
            sheet,
            layout.languages().into_iter().map(str::to_string).collect(),
        ));
        map_sheet(kind, &grid, &layout, fields, presets, &mut messages, run_log);
    }

    report_language_mismatch(&languages_by_sheet, run_log);
    Ok(messages)
}

fn map_sheet(
    kind: TranslationKind,
    grid: &Grid,
    layout: &HeaderLayout,
    fields: &[Field],
    presets: &[Preset],
    messages: &mut Messages,
    run_log: &mut RunLog,
) {
    let sheet = kind.sheet_name();
    let header_len = grid.header().len();

    // Blank rows keep their slot so row N still lines up with entity N.
    for (position, row) in grid.non_blank_rows() {
        let sheet_row = position + 2;
        if row.len() < header_len {
            run_log.error(format!(
                "{sheet} row {sheet_row}: {} translation column(s) missing",
                header_len - row.len()
            ));
        } else if row[header_len..].iter().any(|c| !c.is_empty()) {
            run_log.info(format!(
                "{sheet} row {sheet_row}: ignoring cells beyond the header"
            ));
        }

        let source = row.first().map(CellValue::as_text).unwrap_or("");
        let translations = layout
            .columns
            .iter()
            .filter_map(|c| {
                let text = row.get(c.col).map(CellValue::as_text).unwrap_or("");
                (!text.is_empty()).then_some((c.iso.as_str(), text))
            });

        match kind {
            TranslationKind::CategoryName => {
                let preset = match resolve_entity(presets, source, position, kind.strategies()) {
                    Ok((preset, strategy)) => {
                        run_log.debug(format!(
                            "{sheet} row {sheet_row} → '{}' by {strategy}",
                            preset.icon
                        ));
                        preset
                    }
                    Err(e) => {
                        run_log.warn(format!("{sheet} row {sheet_row}: {e}"));
                        continue;
                    }
                };
                for (iso, text) in translations {
                    insert(
                        messages,
                        iso,
                        keys::preset_name(&preset.icon),
                        Message::text(text, preset_description(preset)),
                    );
                }
            }
            _ => {
                let field = match resolve_entity(fields, source, position, kind.strategies()) {
                    Ok((field, strategy)) => {
                        run_log.debug(format!(
                            "{sheet} row {sheet_row} → '{}' by {strategy}",
                            field.tag_key
                        ));
                        field
                    }
                    Err(e) => {
                        run_log.warn(format!("{sheet} row {sheet_row}: {e}"));
                        continue;
                    }
                };
                for (iso, text) in translations {
                    map_field_cell(kind, field, iso, text, sheet_row, messages, run_log);
                }
            }
        }
    }
}

fn map_field_cell(
    kind: TranslationKind,
    field: &Field,
    iso: &str,
    text: &str,
    sheet_row: usize,
    messages: &mut Messages,
    run_log: &mut RunLog,
) {
    match kind {
        TranslationKind::FieldLabel => insert(
            messages,
            iso,
            keys::field_label(&field.tag_key),
            Message::text(text, label_description(field)),
        ),
        TranslationKind::FieldHelperText => insert(
            messages,
            iso,
            keys::field_helper_text(&field.tag_key),
            Message::text(text, helper_description(field)),
        ),
        TranslationKind::FieldOption => {
            let labels = split_list(text);
            let options = field.options();
            if labels.len() != options.len() {
                run_log.warn(format!(
                    "{} row {sheet_row} [{iso}]: {} option translation(s) for {} option(s) of '{}'",
                    kind.sheet_name(),
                    labels.len(),
                    options.len(),
                    field.label
                ));
            }
            for (label, option) in labels.iter().zip(options) {
                insert(
                    messages,
                    iso,
                    keys::field_option(&field.tag_key, &option.value),
                    Message::option(
                        label,
                        &option.value,
                        option_description(&option.label, field),
                    ),
                );
            }
        }
        TranslationKind::CategoryName => {}
    }
}

fn insert(messages: &mut Messages, iso: &str, key: String, message: Message) {
    messages.entry(iso.to_string()).or_default().insert(key, message);
}

fn report_language_mismatch(by_sheet: &[(&str, BTreeSet<String>)], run_log: &mut RunLog) {
    let all: BTreeSet<&String> = by_sheet.iter().flat_map(|(_, langs)| langs).collect();
    for (sheet, langs) in by_sheet {
        let missing: Vec<&str> = all
            .iter()
            .filter(|l| !langs.contains(l.as_str()))
            .map(|l| l.as_str())
            .collect();
        if !missing.is_empty() {
            run_log.warn(format!(
                "{sheet} has no column for: {}",
                missing.join(", ")
            ));
        }
    }
}

#[cfg(test)]
#[path = "tests/translate_tests.rs"]
mod tests;
