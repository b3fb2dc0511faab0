use config_sheet_core::{FieldType, MemoryWorkbook, MessageValue, SelectOption};

use super::*;

fn fields() -> Vec<Field> {
    vec![
        Field {
            tag_key: "animal-type".into(),
            field_type: FieldType::SelectOne,
            label: "Animal type".into(),
            helper_text: Some("Pick one".into()),
            options: Some(SelectOption::from_labels(&["Mammal", "Bird"], "animal-type")),
            universal: false,
        },
        Field {
            tag_key: "count".into(),
            field_type: FieldType::Number,
            label: "Count".into(),
            helper_text: None,
            options: None,
            universal: false,
        },
    ]
}

fn presets() -> Vec<Preset> {
    vec![
        Preset::new("animal", "Animal", "#0000FF", vec!["animal-type".into()], 1),
        Preset::new("river", "River", "#0000FF", vec![], 2),
    ]
}

fn text_of<'a>(messages: &'a Messages, lang: &str, key: &str) -> Option<&'a str> {
    messages.get(lang)?.get(key).map(|m| m.message.text())
}

#[test]
fn preset_resolution_prefers_name_then_id_then_position() {
    let presets = presets();
    let (p, s) = resolve_entity(&presets, "  RIVER ", 0, &PRESET_STRATEGIES).unwrap();
    assert_eq!((p.icon.as_str(), s), ("river", MatchStrategy::ByName));
    let (p, s) = resolve_entity(&presets, "animal", 1, &PRESET_STRATEGIES).unwrap();
    assert_eq!((p.icon.as_str(), s), ("animal", MatchStrategy::ByName));
    let (p, s) = resolve_entity(&presets, "Old river name", 1, &PRESET_STRATEGIES).unwrap();
    assert_eq!((p.icon.as_str(), s), ("river", MatchStrategy::ByPosition));
    assert!(resolve_entity(&presets, "Lake", 5, &PRESET_STRATEGIES).is_err());
}

#[test]
fn id_strategy_matches_slug() {
    let mut presets = presets();
    presets[1].name = "Stream".into();
    let (p, s) = resolve_entity(&presets, "River", 9, &PRESET_STRATEGIES).unwrap();
    assert_eq!((p.icon.as_str(), s), ("river", MatchStrategy::ById));
}

#[test]
fn fields_match_by_position_only() {
    let fields = fields();
    let (f, _) = resolve_entity(&fields, "Count", 0, &FIELD_STRATEGIES).unwrap();
    assert_eq!(f.tag_key, "animal-type");
}

#[test]
fn header_skips_meta_primary_duplicate_and_unknown_columns() {
    let header: Vec<CellValue> = [
        "English", "ISO", "Source", "Español", "Portuguese - pt", "en", "es", "Notes (draft)",
    ]
    .into_iter()
    .map(CellValue::from)
    .collect();
    let mut log = RunLog::silent("test");
    let layout = parse_header(&header, "Sheet", &LanguageResolver::default(), "en", &mut log);
    assert_eq!(layout.first_language_col, 3);
    assert_eq!(
        layout.columns,
        vec![
            LanguageColumn { col: 3, iso: "es".into() },
            LanguageColumn { col: 4, iso: "pt".into() },
        ]
    );
    // duplicate "es" and unresolvable "Notes (draft)"
    assert_eq!(log.summary().warnings, 2);
}

#[test]
fn primary_messages_come_from_model() {
    let messages = primary_messages(&fields(), &presets(), "en");
    let en = &messages["en"];
    assert_eq!(en["presets.animal.name"].description, "The name of category 'Animal'");
    assert_eq!(en["fields.animal-type.label"].description, "Label for field 'Animal type'");
    assert_eq!(
        en["fields.animal-type.helperText"].description,
        "Helper text for field 'Animal type'"
    );
    assert_eq!(
        en["fields.animal-type.options.bird"],
        Message::option("Bird", "bird", "Option 'Bird' for field 'Animal type'")
    );
    assert!(!en.contains_key("fields.count.helperText"));
}

fn workbook() -> MemoryWorkbook {
    MemoryWorkbook::new("Test")
        .with_sheet(
            sheets::CATEGORY_TRANSLATIONS,
            Grid::from_strings([
                vec!["English", "Español", "Português"],
                vec!["River", "Río", "Rio"],
                vec!["Animal", "Animal", "Animal"],
            ]),
        )
        .with_sheet(
            sheets::DETAIL_LABEL_TRANSLATIONS,
            Grid::from_strings([
                vec!["English", "Español"],
                vec!["Animal type", "Tipo de animal"],
                vec!["Count", "Cantidad"],
            ]),
        )
        .with_sheet(
            sheets::DETAIL_OPTION_TRANSLATIONS,
            Grid::from_strings([
                vec!["English", "Español", "Português"],
                vec!["Mammal, Bird", "Mamífero, Ave", "Mamífero"],
                vec!["", "", ""],
            ]),
        )
}

#[test]
fn maps_all_sheets_into_messages() {
    let mut log = RunLog::silent("test");
    let messages = map_translations(
        &workbook(),
        &fields(),
        &presets(),
        &LanguageResolver::default(),
        "en",
        &mut log,
    )
    .unwrap();

    assert_eq!(messages.keys().collect::<Vec<_>>(), vec!["en", "es", "pt"]);
    assert_eq!(text_of(&messages, "es", "presets.river.name"), Some("Río"));
    assert_eq!(text_of(&messages, "pt", "presets.animal.name"), Some("Animal"));
    assert_eq!(text_of(&messages, "es", "fields.count.label"), Some("Cantidad"));
    assert_eq!(
        messages["es"]["fields.animal-type.options.bird"].message,
        MessageValue::Option {
            label: "Ave".into(),
            value: "bird".into()
        }
    );
    assert_eq!(text_of(&messages, "pt", "fields.animal-type.options.mammal"), Some("Mamífero"));
    assert_eq!(text_of(&messages, "pt", "fields.animal-type.options.bird"), None);
    assert_eq!(text_of(&messages, "en", "presets.river.name"), Some("River"));
}

#[test]
fn mismatches_are_logged_not_fatal() {
    let mut log = RunLog::silent("test");
    map_translations(
        &workbook(),
        &fields(),
        &presets(),
        &LanguageResolver::default(),
        "en",
        &mut log,
    )
    .unwrap();
    // pt option count mismatch, and the label sheet has no pt column
    assert_eq!(log.summary().warnings, 2);
    assert_eq!(log.summary().errors, 0);
}

#[test]
fn short_rows_are_reported_as_errors() {
    let wb = MemoryWorkbook::new("Test").with_sheet(
        sheets::DETAIL_LABEL_TRANSLATIONS,
        Grid::new(vec![
            vec!["English".into(), "Español".into(), "Português".into()],
            vec!["Animal type".into(), "Tipo de animal".into()],
        ]),
    );
    let mut log = RunLog::silent("test");
    let messages =
        map_translations(&wb, &fields(), &presets(), &LanguageResolver::default(), "en", &mut log)
            .unwrap();
    assert_eq!(log.summary().errors, 1);
    assert_eq!(text_of(&messages, "es", "fields.animal-type.label"), Some("Tipo de animal"));
}
