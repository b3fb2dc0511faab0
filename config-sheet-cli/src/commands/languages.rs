use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use config_sheet_core::Settings;
use config_sheet_lang::{CatalogCache, LanguageResolver};

use super::{check_mark, load_languages};
use crate::cli_types::LanguagesAction;
use crate::error::CliError;

pub(crate) fn run_languages(
    settings: &Settings,
    refresh: bool,
    action: Option<LanguagesAction>,
) -> Result<(), CliError> {
    match action.unwrap_or(LanguagesAction::List) {
        LanguagesAction::List => {
            run_list(settings, refresh);
            Ok(())
        }
        LanguagesAction::Resolve { header } => {
            run_resolve(settings, refresh, &header);
            Ok(())
        }
        LanguagesAction::ClearCache => run_clear_cache(),
    }
}

fn run_list(settings: &Settings, refresh: bool) {
    let loaded = load_languages(settings, false, refresh);
    let fetched = loaded
        .fetched_at
        .map(|t| format!(", fetched {}", t.format("%Y-%m-%d %H:%M UTC")))
        .unwrap_or_default();
    log::info!(
        "{} ({} languages, from {}{})",
        "Language catalog".if_supports_color(Stdout, |t| t.bold()),
        loaded.catalog.len(),
        loaded.origin,
        fetched
    );
    log::info!("");
    for (code, info) in loaded.catalog.iter() {
        if info.native_name.is_empty() || info.native_name == info.english_name {
            log::info!(
                "  {:<6} {}",
                code.if_supports_color(Stdout, |t| t.cyan()),
                info.english_name
            );
        } else {
            log::info!(
                "  {:<6} {} {}",
                code.if_supports_color(Stdout, |t| t.cyan()),
                info.english_name,
                format!("({})", info.native_name).if_supports_color(Stdout, |t| t.dimmed())
            );
        }
    }
}

fn run_resolve(settings: &Settings, refresh: bool, header: &str) {
    let resolver = LanguageResolver::new(load_languages(settings, false, refresh).catalog);
    match resolver.resolve_with_rule(header) {
        Some((iso, rule)) => {
            let name = resolver.english_name(&iso).unwrap_or_else(|| "unknown".to_string());
            log::info!(
                "{} '{}' -> {} ({}) {}",
                check_mark(),
                header,
                iso.if_supports_color(Stdout, |t| t.bold()),
                name,
                format!("[{rule}]").if_supports_color(Stdout, |t| t.dimmed())
            );
        }
        None => log::warn!("'{header}' does not name a language"),
    }
}

fn run_clear_cache() -> Result<(), CliError> {
    let cache = CatalogCache::default_location()?;
    if cache.clear()? {
        log::info!("{} Removed {}", check_mark(), cache.path().display());
    } else {
        log::info!(
            "{}",
            "No cached language catalog.".if_supports_color(Stdout, |t| t.dimmed())
        );
    }
    Ok(())
}
