use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use config_sheet_core::{
    CsvWorkbook, MemoryWorkbook, Settings, SheetError, SilentProgress, Workbook,
};
use config_sheet_export::{ExportContext, generate_config};

use super::{RunOptions, check_mark, finish_run, load_resolver};
use crate::error::CliError;

/// Copy every sheet so the export pipeline can run without touching disk.
fn scratch_copy(workbook: &dyn Workbook) -> Result<MemoryWorkbook, SheetError> {
    let mut scratch = MemoryWorkbook::new(workbook.title());
    for name in workbook.sheet_names() {
        if let Some(grid) = workbook.read_sheet(&name)? {
            scratch.write_sheet(&name, &grid)?;
        }
    }
    Ok(scratch)
}

/// Run every export check without resolving icons or writing anything.
pub(crate) fn run_validate(
    settings: &Settings,
    opts: &RunOptions,
    workbook: &Path,
    offline: bool,
) -> Result<(), CliError> {
    let source = CsvWorkbook::open(workbook)?;
    let mut scratch = scratch_copy(&source)?;
    let resolver = load_resolver(settings, offline);
    let ctx = ExportContext {
        settings,
        resolver: &resolver,
        icon_api: None,
    };

    let mut run_log = opts.run_log("validate");
    let result = generate_config(&mut scratch, &ctx, &mut run_log, &SilentProgress);
    finish_run(run_log);
    let config = result?;

    log::info!(
        "{} {} is valid: {} categor(ies), {} field(s), languages: {}",
        check_mark(),
        source.title().if_supports_color(Stdout, |t| t.bold()),
        config.presets.len(),
        config.fields.len(),
        config.languages().join(", ")
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use config_sheet_core::{Grid, sheets};

    use super::*;

    #[test]
    fn scratch_copy_leaves_the_source_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let mut source = CsvWorkbook::create(tmp.path().join("book"), "Survey").unwrap();
        source
            .write_sheet(sheets::CATEGORIES, &Grid::from_strings([["English", "Icon"]]))
            .unwrap();

        let mut scratch = scratch_copy(&source).unwrap();
        assert_eq!(scratch.title(), "Survey");
        scratch.remove_sheet(sheets::CATEGORIES).unwrap();
        assert!(source.read_sheet(sheets::CATEGORIES).unwrap().is_some());
    }
}
