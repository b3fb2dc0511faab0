//! Curated header aliases that are not plain English or native names.

/// `(alias, iso)` pairs; matched case-insensitively after whitespace collapse.
pub(crate) const CURATED_ALIASES: &[(&str, &str)] = &[
    ("english", "en"),
    ("inglés", "en"),
    ("ingles", "en"),
    ("anglais", "en"),
    ("spanish", "es"),
    ("español", "es"),
    ("espanol", "es"),
    ("castellano", "es"),
    ("espagnol", "es"),
    ("portuguese", "pt"),
    ("português", "pt"),
    ("portugues", "pt"),
    ("portugués", "pt"),
    ("brazilian portuguese", "pt-br"),
    ("português brasileiro", "pt-br"),
    ("french", "fr"),
    ("français", "fr"),
    ("francais", "fr"),
    ("francés", "fr"),
    ("german", "de"),
    ("deutsch", "de"),
    ("dutch", "nl"),
    ("nederlands", "nl"),
    ("italian", "it"),
    ("italiano", "it"),
    ("swahili", "sw"),
    ("kiswahili", "sw"),
    ("indonesian", "id"),
    ("bahasa indonesia", "id"),
    ("bahasa", "id"),
    ("thai", "th"),
    ("ภาษาไทย", "th"),
    ("khmer", "km"),
    ("burmese", "my"),
    ("myanmar", "my"),
    ("chinese", "zh"),
    ("mandarin", "zh"),
    ("中文", "zh"),
    ("japanese", "ja"),
    ("arabic", "ar"),
    ("farsi", "fa"),
    ("persian", "fa"),
    ("nepali", "ne"),
    ("hindi", "hi"),
    ("quechua", "qu"),
    ("runasimi", "qu"),
    ("guarani", "gn"),
    ("guaraní", "gn"),
    ("aymara", "ay"),
    ("haitian", "ht"),
    ("kreyol", "ht"),
    ("kreyòl", "ht"),
    ("tagalog", "tl"),
    ("filipino", "tl"),
    ("russian", "ru"),
    ("ukrainian", "uk"),
    ("vietnamese", "vi"),
];
