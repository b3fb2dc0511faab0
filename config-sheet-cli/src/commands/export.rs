use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use config_sheet_core::{Config, CsvWorkbook, RunLog, Settings, Throttled, Workbook};
use config_sheet_export::{
    ExportContext, HttpBuildApi, HttpIconFetcher, IconFetcher, generate_config, upload_config,
    write_archive, write_config_json,
};
use config_sheet_icons::{HttpIconApi, IconApi};

use super::{RunOptions, check_mark, finish_run, load_resolver};
use crate::error::CliError;
use crate::spinner::SpinnerProgress;

pub(crate) struct ExportArgs {
    pub workbook: PathBuf,
    pub output: Option<PathBuf>,
    pub upload: bool,
    pub offline: bool,
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Default archive name when neither `--output` nor `--upload` is given.
fn default_output(config: &Config) -> PathBuf {
    PathBuf::from(format!(
        "{}-{}.comapeocat",
        config.metadata.dataset_id, config.metadata.version
    ))
}

/// Build a config from the workbook, then write and/or upload it.
pub(crate) fn run_export(
    settings: &Settings,
    opts: &RunOptions,
    args: ExportArgs,
) -> Result<(), CliError> {
    let mut workbook = CsvWorkbook::open(&args.workbook)?;
    log::info!(
        "Exporting {}",
        workbook.title().if_supports_color(Stdout, |t| t.bold())
    );

    let resolver = load_resolver(settings, args.offline);
    let icon_api = if args.offline {
        None
    } else {
        Some(HttpIconApi::new(&settings.icon_api_url)?)
    };
    let ctx = ExportContext {
        settings,
        resolver: &resolver,
        icon_api: icon_api.as_ref().map(|api| api as &dyn IconApi),
    };

    let mut run_log = opts.run_log("export");
    let result = export(&mut workbook, &ctx, &args, opts, &mut run_log);
    finish_run(run_log);
    result
}

fn export(
    workbook: &mut CsvWorkbook,
    ctx: &ExportContext<'_>,
    args: &ExportArgs,
    opts: &RunOptions,
    run_log: &mut RunLog,
) -> Result<(), CliError> {
    let config = {
        let progress = Throttled::new(SpinnerProgress::new(opts.quiet));
        generate_config(workbook, ctx, run_log, &progress)?
    };

    let output = match (&args.output, args.upload) {
        (None, false) => Some(default_output(&config)),
        (output, _) => output.clone(),
    };

    if let Some(path) = output {
        if is_json(&path) {
            write_config_json(&config, &path)?;
        } else {
            let fetcher = if args.offline {
                None
            } else {
                Some(HttpIconFetcher::new()?)
            };
            let summary = write_archive(
                &config,
                &path,
                fetcher.as_ref().map(|f| f as &dyn IconFetcher),
                run_log,
            )?;
            log::info!(
                "  Icons: {} PNG, {} SVG, {} skipped",
                summary.png_icons,
                summary.svg_icons,
                summary.skipped_icons.len()
            );
        }
        log::info!(
            "{} Wrote {}",
            check_mark(),
            path.display().if_supports_color(Stdout, |t| t.cyan())
        );
    }

    if args.upload {
        let api = HttpBuildApi::from_settings(ctx.settings)?;
        let url = upload_config(&api, &config, &ctx.settings.build_retry_policy(), run_log)?;
        log::info!(
            "{} Build ready: {}",
            check_mark(),
            url.if_supports_color(Stdout, |t| t.cyan())
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_outputs_are_detected_by_extension() {
        assert!(is_json(Path::new("out/config.JSON")));
        assert!(!is_json(Path::new("out/config.comapeocat")));
        assert!(!is_json(Path::new("config")));
    }
}
