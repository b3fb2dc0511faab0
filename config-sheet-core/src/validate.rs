//! Output checks on an assembled [`Config`].
//!
//! Row-level input checks live with the extractor; this module only looks at
//! the canonical model, so it applies equally to exported and imported configs.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Issue, Location, ValidationError};
use crate::model::Config;
use crate::settings::MissingIconPolicy;
use crate::translations::MessageKey;
use crate::workbook::sheets;

/// Errors and warnings found in a config.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&mut self, location: Location, message: impl Into<String>) {
        self.errors.push(Issue::new(location, message));
    }

    pub fn warn(&mut self, location: Location, message: impl Into<String>) {
        self.warnings.push(Issue::new(location, message));
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Turn the report into a result: warnings on success, every error on failure.
    pub fn into_result(self, context: &str) -> Result<Vec<Issue>, ValidationError> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(ValidationError::new(context, self.errors))
        }
    }
}

/// Check an assembled config for structural problems.
pub fn validate_config(config: &Config, missing_icons: MissingIconPolicy) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_fields(config, &mut report);
    check_presets(config, missing_icons, &mut report);
    check_messages(config, &mut report);
    report
}

fn check_fields(config: &Config, report: &mut ValidationReport) {
    let mut seen = BTreeSet::new();
    for field in &config.fields {
        let location = Location::entity("field", &field.tag_key);
        if field.tag_key.is_empty() {
            report.error(
                location.clone(),
                format!("field '{}' has an empty tagKey", field.label),
            );
        } else if !seen.insert(field.tag_key.as_str()) {
            report.error(location.clone(), "duplicate tagKey");
        }

        if field.field_type.is_select() {
            if field.options().is_empty() {
                report.error(
                    location.clone(),
                    format!("{} field has no options", field.field_type),
                );
            }
            let mut values = BTreeSet::new();
            for option in field.options() {
                if option.value.is_empty() {
                    report.error(
                        location.clone(),
                        format!("option '{}' has an empty value", option.label),
                    );
                } else if !values.insert(option.value.as_str()) {
                    report.error(
                        location.clone(),
                        format!("option '{}' repeats the value '{}'", option.label, option.value),
                    );
                }
            }
        }
    }
}

fn check_presets(config: &Config, missing_icons: MissingIconPolicy, report: &mut ValidationReport) {
    let field_keys: BTreeSet<&str> = config.fields.iter().map(|f| f.tag_key.as_str()).collect();
    let mut rows_by_icon: BTreeMap<&str, Vec<u32>> = BTreeMap::new();

    for preset in &config.presets {
        rows_by_icon.entry(&preset.icon).or_default().push(preset.sort);
        let location = Location::entity("preset", &preset.icon);

        for key in &preset.fields {
            if !field_keys.contains(key.as_str()) {
                report.warn(location.clone(), format!("references unknown field '{key}'"));
            }
        }

        if config.icon(&preset.icon).is_none() {
            let message = format!("no icon for category '{}'", preset.name);
            match missing_icons {
                MissingIconPolicy::Warn => report.warn(location, message),
                MissingIconPolicy::Error => report.error(location, message),
            }
        }
    }

    for (icon, sorts) in rows_by_icon.into_iter().filter(|(_, s)| s.len() > 1) {
        let rows: Vec<String> = sorts.iter().map(|s| (s + 1).to_string()).collect();
        report.warn(
            Location::entity("preset", icon),
            format!(
                "{} rows {} share the icon slug '{icon}'; icons and translations will collide",
                sheets::CATEGORIES,
                rows.join(", ")
            ),
        );
    }
}

fn check_messages(config: &Config, report: &mut ValidationReport) {
    for (lang, entries) in &config.messages {
        for key in entries.keys() {
            let known = match MessageKey::parse(key) {
                Some(MessageKey::PresetName(id)) => config.preset(id).is_some(),
                Some(MessageKey::FieldLabel(id) | MessageKey::FieldHelperText(id)) => {
                    config.field(id).is_some()
                }
                Some(MessageKey::FieldOption { field, value }) => config
                    .field(field)
                    .is_some_and(|f| f.options().iter().any(|o| o.value == value)),
                None => false,
            };
            if !known {
                report.warn(
                    Location::entity("language", lang),
                    format!("message '{key}' does not match any field, option or category"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, FieldType, Icon, Message, Metadata, Preset, SelectOption};

    fn config() -> Config {
        Config {
            metadata: Metadata {
                dataset_id: "config-test".into(),
                name: "Config-Test".into(),
                version: "26.01.01".into(),
                description: None,
                primary_language: None,
            },
            package_json: None,
            fields: vec![Field {
                tag_key: "animal-type".into(),
                field_type: FieldType::SelectOne,
                label: "Animal type".into(),
                helper_text: None,
                options: Some(SelectOption::from_labels(&["Mammal", "Bird"], "animal-type")),
                universal: false,
            }],
            presets: vec![Preset::new(
                "animal",
                "Animal",
                "#0000FF",
                vec!["animal-type".into()],
                1,
            )],
            icons: vec![Icon::new("animal", "<svg/>")],
            messages: Default::default(),
        }
    }

    #[test]
    fn clean_config_passes() {
        let report = validate_config(&config(), MissingIconPolicy::Warn);
        assert_eq!(report, ValidationReport::default());
    }

    #[test]
    fn duplicate_keys_and_empty_options_are_errors() {
        let mut cfg = config();
        let mut dup = cfg.fields[0].clone();
        dup.options = Some(vec![]);
        cfg.fields.push(dup);
        let report = validate_config(&cfg, MissingIconPolicy::Warn);
        assert_eq!(report.errors.len(), 2);
        let err = report.into_result("Config validation").unwrap_err();
        assert!(err.to_string().contains("duplicate tagKey"));
        assert!(err.to_string().contains("has no options"));
    }

    #[test]
    fn repeated_option_values_are_errors() {
        let mut cfg = config();
        cfg.fields[0].options = Some(vec![
            SelectOption { label: "Yes".into(), value: "yes".into() },
            SelectOption { label: "yes".into(), value: "yes".into() },
        ]);
        let report = validate_config(&cfg, MissingIconPolicy::Warn);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.contains("repeats the value 'yes'"));
    }

    #[test]
    fn duplicate_category_slugs_name_both_rows() {
        let mut cfg = config();
        cfg.presets
            .push(Preset::new("animal", "Animal", "#0000FF", vec![], 2));
        let report = validate_config(&cfg, MissingIconPolicy::Warn);
        assert!(report.is_ok());
        assert!(
            report
                .warnings
                .iter()
                .any(|w| w.message.contains("rows 2, 3"))
        );
    }

    #[test]
    fn missing_icon_follows_policy() {
        let mut cfg = config();
        cfg.icons.clear();
        assert_eq!(validate_config(&cfg, MissingIconPolicy::Warn).warnings.len(), 1);
        assert_eq!(validate_config(&cfg, MissingIconPolicy::Error).errors.len(), 1);
    }

    #[test]
    fn unknown_message_keys_are_warned() {
        let mut cfg = config();
        let es = cfg.messages.entry("es".into()).or_default();
        es.insert("presets.animal.name".into(), Message::text("Animal", ""));
        es.insert("fields.animal-type.options.fish".into(), Message::option("Pez", "fish", ""));
        es.insert("presets.plant.name".into(), Message::text("Planta", ""));
        let report = validate_config(&cfg, MissingIconPolicy::Warn);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn unknown_field_reference_is_warning() {
        let mut cfg = config();
        cfg.presets[0].fields.push("weight".into());
        let report = validate_config(&cfg, MissingIconPolicy::Warn);
        assert!(report.is_ok());
        assert!(report.warnings[0].message.contains("weight"));
    }
}
