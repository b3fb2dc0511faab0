use serde_json::json;

use super::*;
use crate::model::{Message, Messages};

fn sample_messages() -> Messages {
    let mut es = LanguageMessages::new();
    es.insert(
        "presets.animal.name".into(),
        Message::text("Animal", "The name of category 'Animal'"),
    );
    es.insert(
        "fields.animal-type.label".into(),
        Message::text("Tipo de animal", "Label for field 'Animal type'"),
    );
    es.insert(
        "fields.animal-type.helperText".into(),
        Message::text("Elija uno", ""),
    );
    es.insert(
        "fields.animal-type.options.mammal".into(),
        Message::option("Mamífero", "mammal", ""),
    );
    es.insert(
        "fields.animal-type.options.bird".into(),
        Message::option("Ave", "bird", ""),
    );
    let mut pt = LanguageMessages::new();
    pt.insert("presets.animal.name".into(), Message::text("Animal", ""));
    Messages::from([("es".to_string(), es), ("pt".to_string(), pt)])
}

#[test]
fn message_key_parsing() {
    assert_eq!(
        MessageKey::parse("presets.river.name"),
        Some(MessageKey::PresetName("river"))
    );
    assert_eq!(
        MessageKey::parse("fields.depth.options.deep"),
        Some(MessageKey::FieldOption {
            field: "depth",
            value: "deep"
        })
    );
    assert_eq!(MessageKey::parse("fields.depth.placeholder"), None);
    assert_eq!(MessageKey::parse("categories.x.name"), None);
}

#[test]
fn restructure_builds_nested_sections() {
    let (nested, skipped) = restructure(&sample_messages());
    assert!(skipped.is_empty());
    let es = &nested["es"].presets;
    assert_eq!(es.presets["animal"].name.as_deref(), Some("Animal"));
    let field = &es.fields["animal-type"];
    assert_eq!(field.label.as_deref(), Some("Tipo de animal"));
    assert_eq!(field.helper_text.as_deref(), Some("Elija uno"));
    assert_eq!(field.options["mammal"], "Mamífero");
    assert_eq!(field.options.len(), 2);
}

#[test]
fn restructure_flatten_round_trip() {
    let (once, _) = restructure(&sample_messages());
    let (twice, _) = restructure(&flatten(&once));
    assert_eq!(twice, once);
}

#[test]
fn flatten_preserves_keys_and_option_values() {
    let (nested, _) = restructure(&sample_messages());
    let flat = flatten(&nested);
    let original = sample_messages();
    for (lang, entries) in &original {
        let keys: Vec<&String> = entries.keys().collect();
        let flat_keys: Vec<&String> = flat[lang].keys().collect();
        assert_eq!(keys, flat_keys);
        for (key, msg) in entries {
            assert_eq!(flat[lang][key].message, msg.message, "mismatch at {key}");
        }
    }
}

#[test]
fn unknown_keys_are_reported() {
    let mut messages = sample_messages();
    messages
        .get_mut("es")
        .unwrap()
        .insert("categories.x.name".into(), Message::text("X", ""));
    let (_, skipped) = restructure(&messages);
    assert_eq!(skipped, vec!["es:categories.x.name"]);
}

#[test]
fn nested_layout_serializes_like_archive() {
    let (nested, _) = restructure(&sample_messages());
    let value = serde_json::to_value(&nested).unwrap();
    assert_eq!(value["es"]["presets"]["presets"]["animal"]["name"], "Animal");
    assert_eq!(
        value["es"]["presets"]["fields"]["animal-type"]["helperText"],
        "Elija uno"
    );
}

#[test]
fn parse_translations_accepts_both_layouts() {
    let doc = json!({
        "es": {
            "presets.animal.name": {"message": "Animal", "description": "d"},
            "fields.animal-type.options.bird": {"message": {"label": "Ave", "value": "bird"}},
            "fields.animal-type.label": "Tipo"
        },
        "PT": {
            "presets": {
                "presets": {"animal": {"name": "Bicho"}},
                "fields": {"animal-type": {"options": {"bird": "Pássaro"}}}
            }
        },
        "broken": 12
    });
    let (messages, rejected) = parse_translations(&doc);
    assert_eq!(rejected, vec!["broken"]);
    assert_eq!(messages["es"]["presets.animal.name"].description, "d");
    assert_eq!(
        messages["es"]["fields.animal-type.label"].message,
        MessageValue::Text("Tipo".into())
    );
    assert_eq!(
        messages["pt"]["fields.animal-type.options.bird"].message,
        MessageValue::Option {
            label: "Pássaro".into(),
            value: "bird".into()
        }
    );
}

#[test]
fn flat_option_string_gains_value_from_key() {
    let doc = json!({"es": {"fields.f.options.yes": "Sí"}});
    let (messages, _) = parse_translations(&doc);
    assert_eq!(
        messages["es"]["fields.f.options.yes"].message,
        MessageValue::Option {
            label: "Sí".into(),
            value: "yes".into()
        }
    );
}
