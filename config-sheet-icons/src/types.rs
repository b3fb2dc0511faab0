//! Icon service response shapes.
//!
//! The service has answered with several envelopes over time (`{svg}`,
//! `{data: {svg}}`, `{data: [{svg}]}`, bare arrays, or arrays of URLs), so
//! responses are read as [`serde_json::Value`] and picked apart here rather
//! than bound to one struct.

use serde::Deserialize;
use serde_json::Value;

/// One search hit: a reference to an image the generator can recolor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchHit {
    #[serde(alias = "svg", alias = "url", alias = "image")]
    pub image: String,
    #[serde(default)]
    pub name: Option<String>,
}

const ENVELOPES: [&str; 3] = ["data", "results", "icons"];
const SVG_KEYS: [&str; 4] = ["svg", "url", "image", "icon"];

/// Pull the first SVG reference (URL or inline markup) out of a response.
pub fn extract_svg(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => items.iter().find_map(extract_svg),
        Value::Object(map) => SVG_KEYS
            .iter()
            .filter_map(|k| map.get(*k))
            .find_map(extract_svg)
            .or_else(|| {
                ENVELOPES
                    .iter()
                    .filter_map(|k| map.get(*k))
                    .find_map(extract_svg)
            }),
        _ => None,
    }
}

/// Pull all search hits out of a response, in service order.
pub fn extract_hits(value: &Value) -> Vec<SearchHit> {
    match value {
        Value::Array(items) => items.iter().filter_map(hit_from).collect(),
        Value::Object(map) => ENVELOPES
            .iter()
            .filter_map(|k| map.get(*k))
            .map(extract_hits)
            .find(|hits| !hits.is_empty())
            .or_else(|| hit_from(value).map(|h| vec![h]))
            .unwrap_or_default(),
        Value::String(_) => hit_from(value).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn hit_from(value: &Value) -> Option<SearchHit> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(SearchHit {
            image: s.trim().to_string(),
            name: None,
        }),
        Value::Object(_) => serde_json::from_value::<SearchHit>(value.clone())
            .ok()
            .filter(|h| !h.image.trim().is_empty()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn svg_from_each_envelope() {
        let url = "https://icons.test/a.svg";
        for doc in [
            json!({ "svg": url }),
            json!({ "data": { "svg": url } }),
            json!({ "data": [{ "svg": url }] }),
            json!([{ "url": url }]),
            json!(url),
        ] {
            assert_eq!(extract_svg(&doc).as_deref(), Some(url), "{doc}");
        }
        assert_eq!(extract_svg(&json!({ "data": [] })), None);
        assert_eq!(extract_svg(&json!({ "svg": "" })), None);
    }

    #[test]
    fn hits_from_arrays_and_envelopes() {
        let hits = extract_hits(&json!({
            "results": [
                { "svg": "https://icons.test/deer.svg", "name": "deer" },
                { "other": true },
                "https://icons.test/moose.svg"
            ]
        }));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name.as_deref(), Some("deer"));
        assert_eq!(hits[1].image, "https://icons.test/moose.svg");
        assert!(extract_hits(&json!({ "results": [] })).is_empty());
        assert!(extract_hits(&json!(null)).is_empty());
    }
}
