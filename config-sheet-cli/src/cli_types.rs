//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "config-sheet")]
#[command(
    about = "Export spreadsheet-authored category configs, or import them back into sheets",
    long_about = None
)]
pub(crate) struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    /// Append each operation's run log to this file
    #[arg(long, global = true)]
    pub run_log: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Network switches shared by commands that may reach remote services.
#[derive(Args, Clone, Copy)]
pub(crate) struct NetworkArgs {
    /// Never contact the icon service or the language catalog
    #[arg(long)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Build a config from a workbook and write or upload it
    Export {
        /// Workbook directory (one CSV file per sheet)
        workbook: PathBuf,

        /// Output file: `.json` for the bare config, anything else for an archive
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Upload the config to the build service and print the result URL
        #[arg(long)]
        upload: bool,

        #[command(flatten)]
        network: NetworkArgs,
    },

    /// Import a config archive or JSON file into a workbook
    Import {
        /// Archive (.zip, .comapeocat, .mapeosettings) or JSON config
        input: PathBuf,

        /// Workbook directory; created when it does not exist
        workbook: PathBuf,

        /// Title for a newly created workbook (default: input file name)
        #[arg(long)]
        title: Option<String>,

        /// Where to create the icon folder (default: beside the workbook)
        #[arg(long)]
        icon_dir: Option<PathBuf>,

        #[command(flatten)]
        network: NetworkArgs,
    },

    /// Check a workbook without writing anything
    Validate {
        /// Workbook directory
        workbook: PathBuf,

        #[command(flatten)]
        network: NetworkArgs,
    },

    /// Inspect the language catalog
    Languages {
        /// Fetch the catalog even if the cache is fresh
        #[arg(long)]
        refresh: bool,

        #[command(subcommand)]
        action: Option<LanguagesAction>,
    },

    /// Inspect settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum LanguagesAction {
    /// List every language in the catalog
    List,

    /// Show which language a column header resolves to
    Resolve {
        /// Header text, e.g. "Español", "pt", "French - fr"
        header: String,
    },

    /// Remove the cached catalog
    ClearCache,
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show current settings and their sources
    Show,

    /// Print the settings file path
    Path,
}
