use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use config_sheet_core::{CsvWorkbook, Settings, Throttled};
use config_sheet_import::{ImportContext, import_config};

use super::{RunOptions, check_mark, finish_run, load_resolver};
use crate::error::CliError;
use crate::spinner::SpinnerProgress;

pub(crate) struct ImportArgs {
    pub input: PathBuf,
    pub workbook: PathBuf,
    pub title: Option<String>,
    pub icon_dir: Option<PathBuf>,
    pub offline: bool,
}

fn default_title(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("Imported config")
        .to_string()
}

fn open_or_create(args: &ImportArgs) -> Result<CsvWorkbook, CliError> {
    if args.workbook.is_dir() {
        if args.title.is_some() {
            log::warn!("--title is ignored for an existing workbook");
        }
        return Ok(CsvWorkbook::open(&args.workbook)?);
    }
    if args.workbook.exists() {
        return Err(CliError::usage(format!(
            "{} exists and is not a workbook directory",
            args.workbook.display()
        )));
    }
    let title = args
        .title
        .clone()
        .unwrap_or_else(|| default_title(&args.input));
    log::info!("Creating workbook {}", args.workbook.display());
    Ok(CsvWorkbook::create(&args.workbook, &title)?)
}

/// Import a config into a workbook, creating the workbook if needed.
pub(crate) fn run_import(
    settings: &Settings,
    opts: &RunOptions,
    args: ImportArgs,
) -> Result<(), CliError> {
    let mut workbook = open_or_create(&args)?;
    let resolver = load_resolver(settings, args.offline);
    let ctx = ImportContext {
        settings,
        resolver: &resolver,
        icon_dir: args.icon_dir.as_deref(),
    };

    let mut run_log = opts.run_log("import");
    let result = {
        let progress = Throttled::new(SpinnerProgress::new(opts.quiet));
        import_config(&args.input, &mut workbook, &ctx, &mut run_log, &progress)
    };
    finish_run(run_log);
    let summary = result?;

    log::info!(
        "{} Imported {} layout into {}",
        check_mark(),
        summary.variant,
        args.workbook.display().if_supports_color(Stdout, |t| t.cyan())
    );
    log::info!("  Categories: {}", summary.categories);
    log::info!("  Fields:     {}", summary.fields);
    log::info!("  Primary:    {}", summary.primary_language);
    if !summary.languages.is_empty() {
        log::info!("  Languages:  {}", summary.languages.join(", "));
    }
    match &summary.icon_folder {
        Some(dir) => log::info!("  Icons:      {} in {}", summary.icons, dir.display()),
        None => log::info!("  Icons:      {}", summary.icons),
    }
    Ok(())
}
