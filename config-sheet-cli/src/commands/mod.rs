//! Command implementations and the helpers they share.

pub(crate) mod config;
pub(crate) mod export;
pub(crate) mod import;
pub(crate) mod languages;
pub(crate) mod validate;

use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use config_sheet_core::{FileSink, LogSink, NullSink, RunLog, Settings};
use config_sheet_lang::{
    CatalogCache, HttpCatalogSource, LanguageResolver, LoadedCatalog, OfflineSource, load_catalog,
};

/// Options that apply to every command.
pub(crate) struct RunOptions {
    pub quiet: bool,
    /// File the run log is appended to.
    pub run_log: Option<PathBuf>,
}

impl RunOptions {
    pub(crate) fn run_log(&self, operation: &str) -> RunLog {
        let sink: Box<dyn LogSink> = match &self.run_log {
            Some(path) => Box::new(FileSink::new(path)),
            None => Box::new(NullSink),
        };
        RunLog::new(operation, sink)
    }
}

/// Flush the run log and print its counts.
pub(crate) fn finish_run(run_log: RunLog) {
    let operation = run_log.operation().to_string();
    let summary = run_log.finish();
    if summary.errors == 0 && summary.warnings == 0 {
        log::debug!("{operation}: no warnings");
        return;
    }
    log::info!(
        "{}: {} warning(s), {} error(s)",
        operation,
        summary.warnings.if_supports_color(Stdout, |t| t.yellow()),
        summary.errors.if_supports_color(Stdout, |t| t.red()),
    );
}

pub(crate) fn check_mark() -> String {
    "\u{2714}".if_supports_color(Stdout, |t| t.green()).to_string()
}

/// Load the language catalog. Offline runs use the cache or the built-in list.
pub(crate) fn load_languages(settings: &Settings, offline: bool, refresh: bool) -> LoadedCatalog {
    let cache = match CatalogCache::default_location() {
        Ok(cache) => Some(cache),
        Err(e) => {
            log::warn!("Language cache unavailable: {e}");
            None
        }
    };
    let loaded = if offline {
        load_catalog(&OfflineSource, cache.as_ref(), false)
    } else {
        let source = HttpCatalogSource::new(&settings.language_catalog_url);
        load_catalog(&source, cache.as_ref(), refresh)
    };
    log::debug!(
        "Language catalog: {} languages ({})",
        loaded.catalog.len(),
        loaded.origin
    );
    loaded
}

pub(crate) fn load_resolver(settings: &Settings, offline: bool) -> LanguageResolver {
    LanguageResolver::new(load_languages(settings, offline, false).catalog)
}
