//! One normalizer per [`SchemaVariant`], all producing the canonical model.

use std::collections::{BTreeMap, HashMap};

use config_sheet_core::model::normalize_color;
use config_sheet_core::translations::parse_translations;
use config_sheet_core::{
    Field, FieldType, Icon, Messages, Preset, RunLog, SelectOption, build_slug_with_fallback,
};
use serde_json::Value;

use crate::error::ImportError;
use crate::schema::SchemaVariant;

/// A payload converted to the canonical model, before icons are attached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub fields: Vec<Field>,
    /// Sorted by `sort`.
    pub presets: Vec<Preset>,
    pub messages: Messages,
    /// Preset key → icon asset name, where they differ.
    pub icon_aliases: BTreeMap<String, String>,
    /// Icons carried inside the payload itself.
    pub icons: Vec<Icon>,
}

impl Normalized {
    /// Asset name holding the icon of a preset.
    pub fn icon_asset<'a>(&'a self, preset: &'a Preset) -> &'a str {
        self.icon_aliases
            .get(&preset.icon)
            .map(String::as_str)
            .unwrap_or(&preset.icon)
    }
}

/// Normalize `doc` according to its detected layout.
///
/// `translations` is a separate translations document when the payload came
/// from an archive; otherwise translations are looked up inside `doc`.
pub fn normalize(
    doc: &Value,
    variant: SchemaVariant,
    translations: Option<&Value>,
    run_log: &mut RunLog,
) -> Result<Normalized, ImportError> {
    let mut normalized = match variant {
        SchemaVariant::Canonical => normalize_canonical(doc, run_log),
        SchemaVariant::Legacy => normalize_legacy(doc, run_log),
        SchemaVariant::BuilderV2 => normalize_builder_v2(doc, run_log),
        SchemaVariant::Unknown => normalize_unknown(doc, run_log)?,
    };

    let translations = translations
        .or_else(|| doc.get("translations"))
        .or_else(|| doc.get("messages"));
    if let Some(translations) = translations {
        let (messages, rejected) = parse_translations(translations);
        for lang in rejected {
            run_log.warn(format!("Translations for '{lang}' are in an unknown layout, skipped"));
        }
        normalized.messages = messages;
    }

    normalized.presets.sort_by_key(|p| p.sort);
    Ok(normalized)
}

// ── Shared helpers ──────────────────────────────────────────────────────────

fn str_of(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| item.get(*k))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

fn bool_of(item: &Value, key: &str) -> bool {
    match item.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn strings_of(item: &Value, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .filter_map(|k| item.get(*k)?.as_array())
        .next()
        .map(|arr| {
            arr.iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// `(id, item)` pairs from either an id-keyed object or an array.
fn entries<'a>(value: Option<&'a Value>, id_keys: &[&str]) -> Vec<(Option<String>, &'a Value)> {
    match value {
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (Some(k.clone()), v)).collect(),
        Some(Value::Array(items)) => items.iter().map(|v| (str_of(v, id_keys), v)).collect(),
        _ => Vec::new(),
    }
}

/// Field type from any spelling used across layouts.
pub fn parse_field_type(raw: &str) -> Option<FieldType> {
    let key: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    match key.as_str() {
        "text" | "textarea" | "localized" | "string" => Some(FieldType::Text),
        "number" | "integer" | "numeric" => Some(FieldType::Number),
        "selectone" | "select" | "single" | "radio" => Some(FieldType::SelectOne),
        "selectmultiple" | "multiselect" | "multiple" | "checkbox" => {
            Some(FieldType::SelectMultiple)
        }
        _ => None,
    }
}

/// Options as an array of labels, an array of `{label, value}` objects, or a
/// `{value: label}` map. Missing values are derived from labels.
fn parse_options(value: Option<&Value>, tag_key: &str) -> Vec<SelectOption> {
    let pairs: Vec<(String, Option<String>)> = match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some((s.clone(), None)),
                Value::Object(_) => {
                    let value = str_of(item, &["value", "id"]);
                    let label = str_of(item, &["label", "name"]).or_else(|| value.clone())?;
                    Some((label, value))
                }
                _ => None,
            })
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(k, v)| Some((v.as_str()?.to_string(), Some(k.clone()))))
            .collect(),
        _ => Vec::new(),
    };
    pairs
        .into_iter()
        .enumerate()
        .map(|(i, (label, value))| SelectOption {
            value: value
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| build_slug_with_fallback(&label, tag_key, i)),
            label,
        })
        .collect()
}

fn parse_field(
    item: &Value,
    id: Option<&str>,
    tag_keys: &[&str],
    position: usize,
    run_log: &mut RunLog,
) -> Field {
    let label = str_of(item, &["label", "name"]);
    let tag_key = str_of(item, tag_keys)
        .or_else(|| id.map(str::to_string))
        .unwrap_or_else(|| {
            build_slug_with_fallback(label.as_deref().unwrap_or(""), "field", position)
        });
    let raw_type = str_of(item, &["type"]).unwrap_or_default();
    let field_type = parse_field_type(&raw_type).unwrap_or_else(|| {
        run_log.warn(format!("Field '{tag_key}' has unknown type '{raw_type}', importing as text"));
        FieldType::Text
    });
    let options = field_type.is_select().then(|| parse_options(item.get("options"), &tag_key));
    Field {
        label: label.unwrap_or_else(|| tag_key.clone()),
        helper_text: str_of(item, &["helperText", "helper_text", "placeholder", "description"]),
        field_type,
        options,
        universal: bool_of(item, "universal"),
        tag_key,
    }
}

fn parse_preset(item: &Value, key: String, field_keys: Vec<String>, sort: u32) -> Preset {
    let name = str_of(item, &["name", "label"]).unwrap_or_else(|| key.clone());
    let (color, _) = normalize_color(&str_of(item, &["color"]).unwrap_or_default());
    Preset::new(key, name, color, field_keys, sort)
}

fn sort_of(item: &Value, position: usize) -> u32 {
    item.get("sort")
        .and_then(Value::as_u64)
        .map(|s| s as u32)
        .unwrap_or(position as u32 + 1)
}

fn inline_icons(doc: &Value, name_keys: &[&str], svg_keys: &[&str]) -> Vec<Icon> {
    doc.get("icons")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(Icon::new(str_of(item, name_keys)?, str_of(item, svg_keys)?))
                })
                .collect()
        })
        .unwrap_or_default()
}

// ── Per-variant normalizers ─────────────────────────────────────────────────

fn normalize_canonical(doc: &Value, run_log: &mut RunLog) -> Normalized {
    let fields = entries(doc.get("fields"), &["tagKey"])
        .into_iter()
        .enumerate()
        .map(|(i, (_, item))| {
            let mut field = parse_field(item, None, &["tagKey"], i, run_log);
            // Our own exports write an unlabelled field as `"label": ""`.
            if let Some(label) = item.get("label").and_then(Value::as_str)
                && label.trim().is_empty()
            {
                field.label = String::new();
            }
            field
        })
        .collect();
    let presets = entries(doc.get("presets"), &["icon"])
        .into_iter()
        .enumerate()
        .map(|(i, (_, item))| {
            let name = str_of(item, &["name"]).unwrap_or_default();
            let key = str_of(item, &["icon"])
                .unwrap_or_else(|| build_slug_with_fallback(&name, "category", i));
            parse_preset(item, key, strings_of(item, &["fields"]), sort_of(item, i))
        })
        .collect();
    Normalized {
        fields,
        presets,
        icons: inline_icons(doc, &["name"], &["svg"]),
        ..Default::default()
    }
}

fn normalize_legacy(doc: &Value, run_log: &mut RunLog) -> Normalized {
    let mut key_by_id = HashMap::new();
    let fields: Vec<Field> = entries(doc.get("fields"), &["id", "key"])
        .into_iter()
        .enumerate()
        .map(|(i, (id, item))| {
            let field = parse_field(item, id.as_deref(), &["key", "tagKey"], i, run_log);
            if let Some(id) = id {
                key_by_id.insert(id, field.tag_key.clone());
            }
            field
        })
        .collect();

    let mut icon_aliases = BTreeMap::new();
    let presets = entries(doc.get("presets"), &["id"])
        .into_iter()
        .enumerate()
        .map(|(i, (id, item))| {
            let name = str_of(item, &["name"]).unwrap_or_default();
            let key = id.unwrap_or_else(|| build_slug_with_fallback(&name, "category", i));
            if let Some(icon) = str_of(item, &["icon"])
                && icon != key
            {
                icon_aliases.insert(key.clone(), icon);
            }
            let field_keys = strings_of(item, &["fields"])
                .into_iter()
                .map(|f| key_by_id.get(&f).cloned().unwrap_or(f))
                .collect();
            parse_preset(item, key, field_keys, sort_of(item, i))
        })
        .collect();

    Normalized {
        fields,
        presets,
        icon_aliases,
        icons: inline_icons(doc, &["name", "id"], &["svg"]),
        ..Default::default()
    }
}

fn normalize_builder_v2(doc: &Value, run_log: &mut RunLog) -> Normalized {
    let mut key_by_id = HashMap::new();
    let fields: Vec<Field> = entries(doc.get("fields"), &["id"])
        .into_iter()
        .enumerate()
        .map(|(i, (id, item))| {
            let field = parse_field(item, id.as_deref(), &["tagKey"], i, run_log);
            if let Some(id) = id {
                key_by_id.insert(id, field.tag_key.clone());
            }
            field
        })
        .collect();

    let mut icon_aliases = BTreeMap::new();
    let presets = entries(doc.get("categories"), &["id"])
        .into_iter()
        .enumerate()
        .map(|(i, (id, item))| {
            let name = str_of(item, &["name"]).unwrap_or_default();
            let key = id.unwrap_or_else(|| build_slug_with_fallback(&name, "category", i));
            if let Some(icon) = str_of(item, &["iconId", "icon"])
                && icon != key
            {
                icon_aliases.insert(key.clone(), icon);
            }
            let field_keys = strings_of(item, &["fields", "defaultFieldIds", "fieldIds"])
                .into_iter()
                .map(|f| match key_by_id.get(&f) {
                    Some(key) => key.clone(),
                    None => {
                        run_log.warn(format!(
                            "Category '{name}' references unknown field id '{f}'"
                        ));
                        f
                    }
                })
                .collect();
            parse_preset(item, key, field_keys, sort_of(item, i))
        })
        .collect();

    Normalized {
        fields,
        presets,
        icon_aliases,
        icons: inline_icons(doc, &["id", "name"], &["svgData", "svgUrl", "svg"]),
        ..Default::default()
    }
}

/// Best effort: pull whatever fields can be found, no presets.
fn normalize_unknown(doc: &Value, run_log: &mut RunLog) -> Result<Normalized, ImportError> {
    let candidates = entries(doc.get("fields"), &["id", "key", "tagKey"]);
    if candidates.is_empty() {
        return Err(ImportError::format(
            "no presets, fields or categories found in the configuration",
        ));
    }
    run_log.warn(
        ImportError::format("layout not recognized, importing fields only").to_string(),
    );
    let fields = candidates
        .into_iter()
        .enumerate()
        .filter(|(_, (_, item))| item.is_object())
        .map(|(i, (id, item))| parse_field(item, id.as_deref(), &["tagKey", "key"], i, run_log))
        .collect();
    Ok(Normalized {
        fields,
        ..Default::default()
    })
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
