use super::*;

#[test]
fn slugify_basic_labels() {
    assert_eq!(slugify("Animal type"), "animal-type");
    assert_eq!(slugify("  Trees & Plants  "), "trees-plants");
    assert_eq!(slugify("snake_case_name"), "snake-case-name");
    assert_eq!(slugify("--Already--hyphenated--"), "already-hyphenated");
    assert_eq!(slugify("Número 5"), "nmero-5");
}

#[test]
fn slugify_empty_and_symbol_only() {
    assert_eq!(slugify(""), "");
    assert_eq!(slugify("   "), "");
    assert_eq!(slugify("!!!"), "");
    assert_eq!(slugify("森林"), "");
}

#[test]
fn slugify_is_idempotent() {
    let samples = [
        "Animal type",
        "  weird__Spacing -- here ",
        "Ünïcödé Läbel",
        "a_b-c d",
        "-x-",
        "Mammal, Bird",
        "",
        "123 Main St.",
    ];
    for s in samples {
        let once = slugify(s);
        assert_eq!(slugify(&once), once, "slugify not idempotent for {s:?}");
    }
}

#[test]
fn fallback_uses_prefix_and_position() {
    assert_eq!(build_slug_with_fallback("", "field", 0), "field-1");
    assert_eq!(build_slug_with_fallback("", "field", 4), "field-5");
    assert_eq!(build_slug_with_fallback("???", "category", 2), "category-3");
    assert_eq!(build_slug_with_fallback("", "", 0), "item-1");
    assert_eq!(build_slug_with_fallback("", "Animal type", 1), "animal-type-2");
}

#[test]
fn fallback_prefers_real_slug() {
    assert_eq!(build_slug_with_fallback("Mammal", "animal-type", 0), "mammal");
}

#[test]
fn option_values_for_blank_labels_are_unique() {
    let values: Vec<String> = ["", "", ""]
        .iter()
        .enumerate()
        .map(|(i, label)| build_slug_with_fallback(label, "animal-type", i))
        .collect();
    assert_eq!(values, vec!["animal-type-1", "animal-type-2", "animal-type-3"]);
}

#[test]
fn slugify_value_coerces_scalars() {
    assert_eq!(slugify_value(&serde_json::json!("Big Tree")), "big-tree");
    assert_eq!(slugify_value(&serde_json::json!(42)), "42");
    assert_eq!(slugify_value(&serde_json::json!(0)), "");
    assert_eq!(slugify_value(&serde_json::json!(null)), "");
    assert_eq!(slugify_value(&serde_json::json!(false)), "");
}

#[test]
fn normalize_name_collapses_whitespace_and_case() {
    assert_eq!(normalize_name("  River   Crossing "), "river crossing");
    assert_eq!(normalize_name("RIVER crossing"), "river crossing");
}
