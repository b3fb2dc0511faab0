//! Canonical configuration model.
//!
//! Every import variant is normalized into these types and every export is
//! assembled from them. Field names serialize in the camelCase form consumed
//! by the mapping application (`tagKey`, `helperText`, `selectOne`, ...).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::slug::build_slug_with_fallback;

/// Geometry types every preset applies to.
pub const DEFAULT_GEOMETRY: [&str; 3] = ["point", "line", "area"];

/// Color used when a category has no valid hex color.
pub const DEFAULT_COLOR: &str = "#0000FF";

// ── Field ───────────────────────────────────────────────────────────────────

/// Kind of value a field collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    Text,
    Number,
    SelectOne,
    SelectMultiple,
}

impl FieldType {
    /// Derive a type from the first character of a free-text type cell.
    ///
    /// `t` → text, `n` → number, `m` → multiple choice, anything else →
    /// single choice. Returns `None` for an empty cell.
    pub fn from_indicator(raw: &str) -> Option<Self> {
        let first = raw.trim().chars().next()?.to_ascii_lowercase();
        Some(match first {
            't' => Self::Text,
            'n' => Self::Number,
            'm' => Self::SelectMultiple,
            _ => Self::SelectOne,
        })
    }

    /// Whether `raw` names a type explicitly rather than by fallback.
    pub fn is_explicit_indicator(raw: &str) -> bool {
        matches!(
            raw.trim().chars().next().map(|c| c.to_ascii_lowercase()),
            Some('t' | 'n' | 'm' | 's')
        )
    }

    pub fn is_select(&self) -> bool {
        matches!(self, Self::SelectOne | Self::SelectMultiple)
    }

    /// Text written back into a Details type cell; re-parses to the same type.
    pub fn sheet_label(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::SelectOne => "select one",
            Self::SelectMultiple => "multiple",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::SelectOne => "selectOne",
            Self::SelectMultiple => "selectMultiple",
        };
        f.write_str(s)
    }
}

/// One choice of a select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    /// Build options from labels, deriving each value with the shared fallback
    /// policy so blank or symbol-only labels still get unique values.
    ///
    /// A value already taken by an earlier option falls back to the
    /// positional form, then to a numbered suffix.
    pub fn from_labels<S: AsRef<str>>(labels: &[S], tag_key: &str) -> Vec<Self> {
        let mut taken = BTreeSet::new();
        labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let mut value = build_slug_with_fallback(label.as_ref(), tag_key, i);
                if taken.contains(&value) {
                    value = build_slug_with_fallback("", tag_key, i);
                }
                let base = value.clone();
                let mut n = 2;
                while taken.contains(&value) {
                    value = format!("{base}-{n}");
                    n += 1;
                }
                taken.insert(value.clone());
                Self {
                    label: label.as_ref().to_string(),
                    value,
                }
            })
            .collect()
    }
}

/// A detail/attribute definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub tag_key: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
    #[serde(default)]
    pub universal: bool,
}

impl Field {
    pub fn options(&self) -> &[SelectOption] {
        self.options.as_deref().unwrap_or(&[])
    }
}

// ── Preset ──────────────────────────────────────────────────────────────────

/// A top-level taxonomy entry (category).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub icon: String,
    pub color: String,
    pub fields: Vec<String>,
    pub geometry: Vec<String>,
    pub tags: BTreeMap<String, String>,
    pub name: String,
    pub sort: u32,
    pub terms: Vec<String>,
}

impl Preset {
    /// Build a preset with the derived members (`geometry`, `tags`, `terms`)
    /// filled in from the explicit ones.
    pub fn new(
        icon: impl Into<String>,
        name: impl Into<String>,
        color: impl Into<String>,
        fields: Vec<String>,
        sort: u32,
    ) -> Self {
        let icon = icon.into();
        let name = name.into();
        let mut terms = vec![name.clone()];
        if !fields.is_empty() {
            terms.push(fields.join(" "));
        }
        Self {
            tags: BTreeMap::from([(icon.clone(), "yes".to_string())]),
            geometry: DEFAULT_GEOMETRY.iter().map(|g| g.to_string()).collect(),
            icon,
            color: color.into(),
            fields,
            name,
            sort,
            terms,
        }
    }
}

/// Normalize a color cell to `#RRGGBB` (or `#RGB`), falling back to [`DEFAULT_COLOR`].
pub fn normalize_color(raw: &str) -> (String, bool) {
    let trimmed = raw.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    let valid = matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        (format!("#{}", hex.to_ascii_uppercase()), true)
    } else {
        (DEFAULT_COLOR.to_string(), false)
    }
}

// ── Icon ────────────────────────────────────────────────────────────────────

/// An icon attached to a preset. `svg` holds inline markup or a URL
/// (possibly to a PNG).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    pub name: String,
    pub svg: String,
}

impl Icon {
    pub fn new(name: impl Into<String>, svg: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            svg: svg.into(),
        }
    }

    pub fn is_inline_svg(&self) -> bool {
        self.svg.trim_start().starts_with('<')
    }
}

/// Whether a cell value is an already-hosted icon reference that can be used verbatim.
pub fn is_icon_url(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.starts_with("https://")
        || lower.starts_with("http://")
        || lower.starts_with("file://")
        || lower.starts_with("data:image/")
}

// ── Messages ────────────────────────────────────────────────────────────────

/// Payload of a translation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageValue {
    Text(String),
    Option { label: String, value: String },
}

impl MessageValue {
    /// The human-readable text of the message.
    pub fn text(&self) -> &str {
        match self {
            Self::Text(s) => s,
            Self::Option { label, .. } => label,
        }
    }
}

/// A single translated string with a translator-facing description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: MessageValue,
    #[serde(default)]
    pub description: String,
}

impl Message {
    pub fn text(message: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            message: MessageValue::Text(message.into()),
            description: description.into(),
        }
    }

    pub fn option(
        label: impl Into<String>,
        value: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            message: MessageValue::Option {
                label: label.into(),
                value: value.into(),
            },
            description: description.into(),
        }
    }
}

/// Flat dotted-key messages for one language.
pub type LanguageMessages = BTreeMap<String, Message>;

/// Messages keyed by language code, then by dotted path.
pub type Messages = BTreeMap<String, LanguageMessages>;

/// Dotted message keys for each translatable property.
pub mod keys {
    pub fn preset_name(icon: &str) -> String {
        format!("presets.{icon}.name")
    }

    pub fn field_label(tag_key: &str) -> String {
        format!("fields.{tag_key}.label")
    }

    pub fn field_helper_text(tag_key: &str) -> String {
        format!("fields.{tag_key}.helperText")
    }

    pub fn field_option(tag_key: &str, value: &str) -> String {
        format!("fields.{tag_key}.options.{value}")
    }
}

// ── Config ──────────────────────────────────────────────────────────────────

/// Identity and version of a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub dataset_id: String,
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ISO code of the language the sheets are authored in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_language: Option<String>,
}

/// npm-style package descriptor shipped alongside the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageJson {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// The aggregate configuration handed to the archiver or build API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_json: Option<PackageJson>,
    pub fields: Vec<Field>,
    pub presets: Vec<Preset>,
    #[serde(default)]
    pub icons: Vec<Icon>,
    #[serde(default)]
    pub messages: Messages,
}

impl Config {
    pub fn field(&self, tag_key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.tag_key == tag_key)
    }

    pub fn preset(&self, icon: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.icon == icon)
    }

    pub fn icon(&self, name: &str) -> Option<&Icon> {
        self.icons.iter().find(|i| i.name == name)
    }

    /// Language codes with at least one message, in sorted order.
    pub fn languages(&self) -> Vec<&str> {
        self.messages.keys().map(String::as_str).collect()
    }
}
