//! Payload layout detection.
//!
//! All heuristics live here so each normalizer can assume its layout.

use std::fmt;

use serde_json::Value;

/// Known configuration layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVariant {
    /// Array-based presets and fields carrying `tagKey`.
    Canonical,
    /// Presets and fields keyed by id, snake_case field types.
    Legacy,
    /// The v2 build API payload: `categories[]` plus `fields[]`.
    BuilderV2,
    Unknown,
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canonical => write!(f, "canonical"),
            Self::Legacy => write!(f, "legacy"),
            Self::BuilderV2 => write!(f, "builder v2"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

fn has_key(item: &Value, key: &str) -> bool {
    item.get(key).is_some()
}

/// Classify a config document by shape.
pub fn detect_schema(doc: &Value) -> SchemaVariant {
    if doc.get("categories").is_some_and(Value::is_array) {
        return SchemaVariant::BuilderV2;
    }

    let presets = doc.get("presets");
    let fields = doc.get("fields");
    if presets.is_some_and(Value::is_object) || fields.is_some_and(Value::is_object) {
        return SchemaVariant::Legacy;
    }

    match (presets.and_then(Value::as_array), fields.and_then(Value::as_array)) {
        (Some(_), Some(fields)) => {
            if fields.is_empty() || fields.iter().any(|f| has_key(f, "tagKey")) {
                SchemaVariant::Canonical
            } else if fields.iter().any(|f| has_key(f, "key")) {
                SchemaVariant::Legacy
            } else {
                SchemaVariant::Unknown
            }
        }
        (None, Some(fields)) if fields.iter().any(|f| has_key(f, "tagKey")) => {
            SchemaVariant::Canonical
        }
        _ => SchemaVariant::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn canonical_arrays_with_tag_keys() {
        let doc = json!({"presets": [], "fields": [{"tagKey": "a", "type": "text"}]});
        assert_eq!(detect_schema(&doc), SchemaVariant::Canonical);
        assert_eq!(detect_schema(&json!({"presets": [], "fields": []})), SchemaVariant::Canonical);
    }

    #[test]
    fn object_keyed_is_legacy() {
        let doc = json!({"presets": {"animal": {"name": "Animal"}}, "fields": {}});
        assert_eq!(detect_schema(&doc), SchemaVariant::Legacy);
        let doc = json!({"presets": [], "fields": [{"key": "a", "type": "select_one"}]});
        assert_eq!(detect_schema(&doc), SchemaVariant::Legacy);
    }

    #[test]
    fn categories_mean_builder_payload() {
        let doc = json!({"metadata": {}, "categories": [], "fields": []});
        assert_eq!(detect_schema(&doc), SchemaVariant::BuilderV2);
    }

    #[test]
    fn anything_else_is_unknown() {
        assert_eq!(detect_schema(&json!({"hello": 1})), SchemaVariant::Unknown);
        assert_eq!(detect_schema(&json!([1, 2])), SchemaVariant::Unknown);
        let doc = json!({"presets": [], "fields": [{"label": "x"}]});
        assert_eq!(detect_schema(&doc), SchemaVariant::Unknown);
    }
}
