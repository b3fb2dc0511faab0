//! The export pipeline: workbook in, validated [`Config`] out.
//!
//! Steps run strictly in order and any validation failure aborts the run
//! before a config is produced.

use config_sheet_core::model::is_icon_url;
use config_sheet_core::workbook::category_cols;
use config_sheet_core::{
    CellValue, Config, Icon, Preset, ProgressSink, RunLog, Settings, SheetError, Workbook, sheets,
    validate_config,
};
use config_sheet_icons::{IconApi, IconRequest, IconResolver};
use config_sheet_lang::LanguageResolver;

use crate::error::ExportError;
use crate::extract::{CategoryRow, build_fields, build_presets, category_rows, validate_inputs};
use crate::metadata::{package_json, refresh_metadata};
use crate::translate::map_translations;

/// Pipeline checkpoints, in order.
pub const STEPS: [&str; 8] = [
    "Reading sheets",
    "Validating rows",
    "Extracting fields",
    "Extracting categories",
    "Resolving icons",
    "Mapping translations",
    "Updating metadata",
    "Validating config",
];

/// Collaborators the export pipeline needs.
pub struct ExportContext<'a> {
    pub settings: &'a Settings,
    pub resolver: &'a LanguageResolver,
    /// Icon service; without one, only icons already in the sheet are used.
    pub icon_api: Option<&'a dyn IconApi>,
}

/// Build a config from the workbook.
///
/// Newly generated icon URLs and the refreshed metadata are written back to
/// the workbook as a side effect.
pub fn generate_config(
    workbook: &mut dyn Workbook,
    ctx: &ExportContext<'_>,
    run_log: &mut RunLog,
    progress: &dyn ProgressSink,
) -> Result<Config, ExportError> {
    let total = STEPS.len();
    let step = |n: usize| progress.on_step(STEPS[n], n + 1, total);

    step(0);
    let details = workbook.require_sheet(sheets::DETAILS)?;
    let categories = workbook.require_sheet(sheets::CATEGORIES)?;

    step(1);
    validate_inputs(&details, &categories, run_log)?;

    step(2);
    let fields = build_fields(&details);
    run_log.info(format!("Extracted {} field(s)", fields.len()));

    step(3);
    let rows = category_rows(&categories);
    let presets = build_presets(&rows, &fields, run_log);
    run_log.info(format!("Extracted {} categor(ies)", presets.len()));

    step(4);
    let icons = resolve_icons(workbook, &rows, &presets, ctx, run_log)?;

    step(5);
    let primary = ctx
        .resolver
        .primary_language(categories.cell(0, category_cols::NAME).as_text());
    run_log.debug(format!("Primary language: {primary}"));
    let messages =
        map_translations(&*workbook, &fields, &presets, ctx.resolver, &primary, run_log)?;

    step(6);
    let metadata = refresh_metadata(workbook, &primary, run_log)?;

    step(7);
    let config = Config {
        package_json: Some(package_json(&metadata)),
        metadata,
        fields,
        presets,
        icons,
        messages,
    };
    let warnings = validate_config(&config, ctx.settings.missing_icon_policy)
        .into_result("Config validation")?;
    for warning in warnings {
        run_log.warn(warning.to_string());
    }

    progress.on_complete(&format!(
        "Generated config {} v{}",
        config.metadata.dataset_id, config.metadata.version
    ));
    Ok(config)
}

/// Resolve one icon per category, writing generated URLs back to the sheet.
fn resolve_icons(
    workbook: &mut dyn Workbook,
    rows: &[CategoryRow],
    presets: &[Preset],
    ctx: &ExportContext<'_>,
    run_log: &mut RunLog,
) -> Result<Vec<Icon>, SheetError> {
    let mut icons = Vec::new();
    let resolver = ctx
        .icon_api
        .map(|api| IconResolver::new(api, ctx.settings.icon_retry_policy()));

    for (row, preset) in rows.iter().zip(presets) {
        let Some(resolver) = &resolver else {
            if let CellValue::Text(url) = &row.icon
                && is_icon_url(url)
            {
                icons.push(Icon::new(&preset.icon, url));
            } else if !row.icon.is_empty() {
                run_log.debug(format!(
                    "No icon service configured, skipping icon for '{}'",
                    preset.name
                ));
            }
            continue;
        };

        let request = IconRequest {
            slug: &preset.icon,
            name: &preset.name,
            cell: &row.icon,
            color: &preset.color,
        };
        let Some(resolved) = resolver.resolve(&request, run_log) else {
            continue;
        };
        run_log.debug(format!(
            "Icon for '{}' from {}",
            preset.name, resolved.source
        ));
        if resolved.needs_write_back() && is_icon_url(&resolved.icon.svg) {
            workbook.write_cell(
                sheets::CATEGORIES,
                row.row,
                category_cols::ICON,
                CellValue::text(resolved.icon.svg.as_str()),
            )?;
        }
        icons.push(resolved.icon);
    }
    Ok(icons)
}
