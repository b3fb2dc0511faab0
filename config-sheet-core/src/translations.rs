//! Interconversion between the flat dotted message form and the nested
//! translation layout.
//!
//! Flat: `{"es": {"presets.animal.name": {"message": "Animal", "description": ""}}}`
//!
//! Nested: `{"es": {"presets": {"presets": {"animal": {"name": "Animal"}},
//! "fields": {"animal-type": {"label": "...", "options": {"mammal": "..."}}}}}}`
//!
//! Both are legitimate on-disk representations; [`restructure`] and
//! [`flatten`] are pure and lossless over the key space the exporter produces.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{LanguageMessages, Message, MessageValue, Messages, keys};

/// Translatable strings of one preset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetStrings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Translatable strings of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldStrings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_text: Option<String>,
    /// Option value → translated label.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

/// The `presets` / `fields` sections of one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedSections {
    #[serde(default)]
    pub presets: BTreeMap<String, PresetStrings>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldStrings>,
}

/// Nested translations for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedLanguage {
    #[serde(default)]
    pub presets: NestedSections,
}

/// Nested translations keyed by language code.
pub type NestedTranslations = BTreeMap<String, NestedLanguage>;

/// A parsed dotted message key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKey<'a> {
    PresetName(&'a str),
    FieldLabel(&'a str),
    FieldHelperText(&'a str),
    FieldOption { field: &'a str, value: &'a str },
}

impl<'a> MessageKey<'a> {
    /// Split a dotted key, branching on the first segment (`presets` / `fields`)
    /// and treating `options` as a third-level marker.
    pub fn parse(key: &'a str) -> Option<Self> {
        let segments: Vec<&str> = key.split('.').collect();
        match *segments.as_slice() {
            ["presets", id, "name"] => Some(Self::PresetName(id)),
            ["fields", id, "label"] => Some(Self::FieldLabel(id)),
            ["fields", id, "helperText"] => Some(Self::FieldHelperText(id)),
            ["fields", id, "options", value] => Some(Self::FieldOption { field: id, value }),
            _ => None,
        }
    }
}

/// Convert flat messages to the nested layout.
///
/// Keys outside the exported key space are returned separately so callers can
/// report them; descriptions are not part of the nested layout.
pub fn restructure(messages: &Messages) -> (NestedTranslations, Vec<String>) {
    let mut nested = NestedTranslations::new();
    let mut skipped = Vec::new();

    for (lang, entries) in messages {
        let sections = &mut nested.entry(lang.clone()).or_default().presets;
        for (key, message) in entries {
            let text = message.message.text().to_string();
            match MessageKey::parse(key) {
                Some(MessageKey::PresetName(id)) => {
                    sections.presets.entry(id.to_string()).or_default().name = Some(text);
                }
                Some(MessageKey::FieldLabel(id)) => {
                    sections.fields.entry(id.to_string()).or_default().label = Some(text);
                }
                Some(MessageKey::FieldHelperText(id)) => {
                    sections.fields.entry(id.to_string()).or_default().helper_text = Some(text);
                }
                Some(MessageKey::FieldOption { field, value }) => {
                    sections
                        .fields
                        .entry(field.to_string())
                        .or_default()
                        .options
                        .insert(value.to_string(), text);
                }
                None => skipped.push(format!("{lang}:{key}")),
            }
        }
    }

    (nested, skipped)
}

/// Convert the nested layout back to flat dotted messages.
pub fn flatten(nested: &NestedTranslations) -> Messages {
    nested
        .iter()
        .map(|(lang, language)| (lang.clone(), flatten_language(language)))
        .collect()
}

fn flatten_language(language: &NestedLanguage) -> LanguageMessages {
    let mut out = LanguageMessages::new();
    let sections = &language.presets;

    for (id, preset) in &sections.presets {
        if let Some(name) = &preset.name {
            out.insert(keys::preset_name(id), Message::text(name, ""));
        }
    }
    for (id, field) in &sections.fields {
        if let Some(label) = &field.label {
            out.insert(keys::field_label(id), Message::text(label, ""));
        }
        if let Some(helper) = &field.helper_text {
            out.insert(keys::field_helper_text(id), Message::text(helper, ""));
        }
        for (value, label) in &field.options {
            out.insert(
                keys::field_option(id, value),
                Message::option(label, value, ""),
            );
        }
    }
    out
}

/// Parse a `translations.json` document in either layout into flat messages.
///
/// Each language is classified independently: dotted keys mean flat, a
/// `presets` object holding `presets`/`fields` sections means nested. Flat
/// values may be full message objects or bare strings. Languages that fit
/// neither layout are returned in the second element.
pub fn parse_translations(doc: &Value) -> (Messages, Vec<String>) {
    let mut messages = Messages::new();
    let mut rejected = Vec::new();

    let Some(languages) = doc.as_object() else {
        return (messages, rejected);
    };

    for (lang, body) in languages {
        let Some(obj) = body.as_object() else {
            rejected.push(lang.clone());
            continue;
        };

        if is_nested_language(body) {
            match serde_json::from_value::<NestedLanguage>(body.clone()) {
                Ok(language) => {
                    messages.insert(lang.to_lowercase(), flatten_language(&language));
                }
                Err(e) => {
                    log::warn!("Could not read nested translations for '{lang}': {e}");
                    rejected.push(lang.clone());
                }
            }
            continue;
        }

        let mut entries = LanguageMessages::new();
        for (key, value) in obj {
            if let Some(message) = parse_flat_message(key, value) {
                entries.insert(key.clone(), message);
            }
        }
        if entries.is_empty() && !obj.is_empty() {
            rejected.push(lang.clone());
        } else {
            messages.insert(lang.to_lowercase(), entries);
        }
    }

    (messages, rejected)
}

fn is_nested_language(body: &Value) -> bool {
    body.get("presets")
        .and_then(Value::as_object)
        .is_some_and(|p| p.contains_key("presets") || p.contains_key("fields"))
}

fn parse_flat_message(key: &str, value: &Value) -> Option<Message> {
    let (payload, description) = match value {
        Value::String(s) => (Value::String(s.clone()), String::new()),
        Value::Object(obj) => (
            obj.get("message")?.clone(),
            obj.get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        ),
        _ => return None,
    };

    let message = match payload {
        Value::String(text) => match MessageKey::parse(key) {
            // options always carry their value alongside the label
            Some(MessageKey::FieldOption { value, .. }) => MessageValue::Option {
                label: text,
                value: value.to_string(),
            },
            _ => MessageValue::Text(text),
        },
        other => serde_json::from_value::<MessageValue>(other).ok()?,
    };

    Some(Message {
        message,
        description,
    })
}

#[cfg(test)]
#[path = "tests/translations_tests.rs"]
mod tests;
