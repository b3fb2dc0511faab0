//! config-sheet CLI
//!
//! Command-line interface for exporting spreadsheet-authored category configs
//! and importing existing configs back into sheets.

mod cli_types;
mod commands;
mod error;
mod spinner;

use std::fs::File;
use std::io::{self, Write};

use chrono::Local;
use clap::Parser;
use log::{Level, LevelFilter};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use config_sheet_core::Settings;

use crate::cli_types::{Cli, Commands, ConfigAction};
use crate::commands::RunOptions;
use crate::commands::config::{run_config_path, run_config_show};
use crate::commands::export::{ExportArgs, run_export};
use crate::commands::import::{ImportArgs, run_import};
use crate::commands::languages::run_languages;
use crate::commands::validate::run_validate;

/// Log writer that mirrors output to stderr and a file, stripping ANSI codes
/// from the file copy.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(&strip_ansi_escapes::strip(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

fn init_logging(cli: &Cli) -> io::Result<()> {
    let level = if cli.quiet {
        LevelFilter::Warn
    } else if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let verbose = cli.verbose;

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .parse_default_env()
        .format(move |buf, record| {
            if verbose {
                writeln!(
                    buf,
                    "{} {:<5} [{}] {}",
                    Local::now().format("%H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    record.args()
                )
            } else if record.level() <= Level::Warn {
                writeln!(
                    buf,
                    "{}: {}",
                    record.level().as_str().to_lowercase(),
                    record.args()
                )
            } else {
                writeln!(buf, "{}", record.args())
            }
        });

    if let Some(path) = &cli.logfile {
        let file = File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(Tee { file })));
    }
    builder.init();
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli) {
        eprintln!("Could not open log file: {e}");
        std::process::exit(1);
    }

    let settings = Settings::load();
    let opts = RunOptions {
        quiet: cli.quiet,
        run_log: cli.run_log,
    };

    let result = match cli.command {
        Commands::Export {
            workbook,
            output,
            upload,
            network,
        } => run_export(
            &settings,
            &opts,
            ExportArgs {
                workbook,
                output,
                upload,
                offline: network.offline,
            },
        ),
        Commands::Import {
            input,
            workbook,
            title,
            icon_dir,
            network,
        } => run_import(
            &settings,
            &opts,
            ImportArgs {
                input,
                workbook,
                title,
                icon_dir,
                offline: network.offline,
            },
        ),
        Commands::Validate { workbook, network } => {
            run_validate(&settings, &opts, &workbook, network.offline)
        }
        Commands::Languages { refresh, action } => run_languages(&settings, refresh, action),
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                run_config_show();
                Ok(())
            }
            ConfigAction::Path => {
                run_config_path();
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        log::error!(
            "{} {}",
            "\u{2718}".if_supports_color(Stderr, |t| t.red()),
            e
        );
        std::process::exit(1);
    }
}
