use std::cell::RefCell;

use config_sheet_core::*;
use config_sheet_export::*;
use config_sheet_icons::{IconApi, IconError, SearchHit};
use config_sheet_lang::LanguageResolver;

fn survey_workbook() -> MemoryWorkbook {
    MemoryWorkbook::new("Forest Survey")
        .with_sheet(
            sheets::CATEGORIES,
            Grid::from_strings([
                vec!["English", "Icon", "Fields", "Color"],
                vec!["Animal", "", "Animal type", ""],
            ]),
        )
        .with_sheet(
            sheets::DETAILS,
            Grid::from_strings([
                vec!["Label", "Helper Text", "Type", "Options", "Universal"],
                vec!["Animal type", "Pick one", "s", "Mammal, Bird", ""],
            ]),
        )
}

/// Icon service that finds everything and hands back a hosted URL.
#[derive(Default)]
struct HostedIcons {
    generated: RefCell<Vec<String>>,
}

impl IconApi for HostedIcons {
    fn search(&self, term: &str) -> Result<Vec<SearchHit>, IconError> {
        Ok(vec![SearchHit {
            image: format!("https://icons.test/src/{term}.png"),
            name: None,
        }])
    }

    fn generate(&self, image_url: &str, _color: &str) -> Result<Option<String>, IconError> {
        self.generated.borrow_mut().push(image_url.to_string());
        Ok(Some("https://icons.test/out/animal.svg".to_string()))
    }
}

fn run(
    wb: &mut MemoryWorkbook,
    api: Option<&dyn IconApi>,
    settings: &Settings,
) -> Result<(Config, RunSummary), ExportError> {
    let resolver = LanguageResolver::default();
    let ctx = ExportContext {
        settings,
        resolver: &resolver,
        icon_api: api,
    };
    let mut log = RunLog::silent("export");
    let config = generate_config(wb, &ctx, &mut log, &SilentProgress)?;
    Ok((config, log.finish()))
}

#[test]
fn animal_scenario_produces_expected_config() {
    let mut wb = survey_workbook();
    let (config, _) = run(&mut wb, None, &Settings::default()).unwrap();

    assert_eq!(config.presets.len(), 1);
    let preset = &config.presets[0];
    assert_eq!(preset.icon, "animal");
    assert_eq!(preset.name, "Animal");
    assert_eq!(preset.fields, vec!["animal-type"]);
    assert_eq!(preset.color, "#0000FF");

    assert_eq!(config.fields.len(), 1);
    let field = &config.fields[0];
    assert_eq!(field.tag_key, "animal-type");
    assert_eq!(field.field_type, FieldType::SelectOne);
    assert_eq!(
        field.options(),
        &[
            SelectOption {
                label: "Mammal".into(),
                value: "mammal".into()
            },
            SelectOption {
                label: "Bird".into(),
                value: "bird".into()
            },
        ]
    );

    assert_eq!(config.metadata.dataset_id, "config-forest-survey");
    assert_eq!(config.metadata.version, current_version());
    assert_eq!(
        config.package_json.as_ref().map(|p| p.name.as_str()),
        Some("config-forest-survey")
    );
    assert_eq!(config.languages(), vec!["en"]);
    assert!(wb.sheet(sheets::METADATA).is_some());
}

#[test]
fn animal_row_with_blank_fields_cell_gets_the_detail_field() {
    let mut wb = MemoryWorkbook::new("Forest Survey")
        .with_sheet(
            sheets::CATEGORIES,
            Grid::from_strings([
                vec!["English", "Icon", "Fields", "Color"],
                vec!["Animal", "", "", ""],
            ]),
        )
        .with_sheet(
            sheets::DETAILS,
            Grid::from_strings([
                vec!["Label", "Helper Text", "Type", "Options"],
                vec!["Animal type", "Pick one", "s", "Mammal, Bird"],
            ]),
        );
    let (config, _) = run(&mut wb, None, &Settings::default()).unwrap();
    assert_eq!(config.presets.len(), 1);
    assert_eq!(config.presets[0].icon, "animal");
    assert_eq!(config.presets[0].name, "Animal");
    assert_eq!(config.presets[0].fields, vec!["animal-type"]);
    assert_eq!(config.fields[0].tag_key, "animal-type");
    assert_eq!(config.fields[0].field_type, FieldType::SelectOne);
    let values: Vec<&str> = config.fields[0].options().iter().map(|o| o.value.as_str()).collect();
    assert_eq!(values, vec!["mammal", "bird"]);
}

#[test]
fn generated_icon_is_written_back_and_reused() {
    let mut wb = survey_workbook();
    let api = HostedIcons::default();
    let (config, _) = run(&mut wb, Some(&api), &Settings::default()).unwrap();
    assert_eq!(config.icons, vec![Icon::new("animal", "https://icons.test/out/animal.svg")]);
    assert_eq!(
        wb.sheet(sheets::CATEGORIES).unwrap().cell(1, 1),
        &CellValue::text("https://icons.test/out/animal.svg")
    );

    let (again, _) = run(&mut wb, Some(&api), &Settings::default()).unwrap();
    assert_eq!(again.icons, config.icons);
    assert_eq!(api.generated.borrow().len(), 1);

    // Without a service the stored URL is still used.
    let (offline, _) = run(&mut wb, None, &Settings::default()).unwrap();
    assert_eq!(offline.icons, config.icons);
}

#[test]
fn missing_icon_policy_controls_failure() {
    let mut wb = survey_workbook();
    let (_, summary) = run(&mut wb, None, &Settings::default()).unwrap();
    assert!(summary.warnings >= 1);

    let strict = Settings {
        missing_icon_policy: MissingIconPolicy::Error,
        ..Settings::default()
    };
    let err = run(&mut wb, None, &strict).unwrap_err();
    assert!(matches!(err, ExportError::Validation(_)), "{err}");
}

#[test]
fn row_errors_abort_before_anything_is_written() {
    let mut wb = MemoryWorkbook::new("Broken")
        .with_sheet(
            sheets::CATEGORIES,
            Grid::from_strings([
                vec!["English", "Icon", "Fields", "Color"],
                vec!["", "", "Count", ""],
            ]),
        )
        .with_sheet(
            sheets::DETAILS,
            Grid::from_strings([
                vec!["Label", "Helper Text", "Type", "Options", "Universal"],
                vec!["Species", "", "", "", ""],
                vec!["Kind", "", "select", "", "maybe"],
            ]),
        );
    let err = run(&mut wb, None, &Settings::default()).unwrap_err();
    let ExportError::Validation(validation) = err else {
        panic!("expected a validation error");
    };
    let message = validation.to_string();
    assert!(message.contains("Details row 2"), "{message}");
    assert!(message.contains("Details row 3"), "{message}");
    assert!(message.contains("Categories row 2"), "{message}");
    assert_eq!(validation.issues.len(), 4);
    assert!(wb.sheet(sheets::METADATA).is_none());
}

#[test]
fn translations_and_primary_language_flow_into_config() {
    let mut wb = survey_workbook()
        .with_sheet(
            sheets::CATEGORY_TRANSLATIONS,
            Grid::from_strings([vec!["English", "Español - es"], vec!["Animal", "Animal salvaje"]]),
        )
        .with_sheet(
            sheets::DETAIL_OPTION_TRANSLATIONS,
            Grid::from_strings([vec!["English", "Spanish"], vec!["Mammal, Bird", "Mamífero, Ave"]]),
        );
    let (config, _) = run(&mut wb, None, &Settings::default()).unwrap();
    assert_eq!(config.languages(), vec!["en", "es"]);
    let es = &config.messages["es"];
    assert_eq!(es["presets.animal.name"].message.text(), "Animal salvaje");
    assert_eq!(es["fields.animal-type.options.mammal"].message.text(), "Mamífero");
}

#[test]
fn archive_written_from_csv_workbook() {
    let tmp = tempfile::tempdir().unwrap();
    let mut wb = CsvWorkbook::create(tmp.path().join("survey"), "Survey").unwrap();
    for name in [sheets::CATEGORIES, sheets::DETAILS] {
        wb.write_sheet(name, survey_workbook().sheet(name).unwrap()).unwrap();
    }
    let resolver = LanguageResolver::default();
    let settings = Settings::default();
    let ctx = ExportContext {
        settings: &settings,
        resolver: &resolver,
        icon_api: None,
    };
    let mut log = RunLog::silent("export");
    let config = generate_config(&mut wb, &ctx, &mut log, &SilentProgress).unwrap();

    let json = tmp.path().join("config.json");
    write_config_json(&config, &json).unwrap();
    let back: Config = serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(back, config);

    let zip_path = tmp.path().join("survey.comapeocat");
    let summary = write_archive(&config, &zip_path, None, &mut log).unwrap();
    assert_eq!(summary, ArchiveSummary::default());
    assert!(zip_path.metadata().unwrap().len() > 0);
    assert!(wb.require_sheet(sheets::METADATA).is_ok());
}
