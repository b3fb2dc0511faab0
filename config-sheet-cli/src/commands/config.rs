use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use config_sheet_core::Settings;
use config_sheet_core::settings::{SettingSource, settings_path};

/// Show current settings and their sources.
pub(crate) fn run_config_show() {
    let path = settings_path();
    let (settings, sources) = Settings::load_with_sources();

    log::info!(
        "{}",
        "config-sheet Settings".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");

    let status = if path.exists() { "(exists)" } else { "(not found)" };
    log::info!(
        "  Settings file: {} {}",
        path.display().if_supports_color(Stdout, |t| t.cyan()),
        status.if_supports_color(Stdout, |t| t.dimmed()),
    );
    log::info!("");

    let rows: [(&str, String, SettingSource); 6] = [
        ("icon_api_url", settings.icon_api_url.clone(), sources.icon_api_url),
        (
            "language_catalog_url",
            settings.language_catalog_url.clone(),
            sources.language_catalog_url,
        ),
        ("build_api_url", settings.build_api_url.clone(), sources.build_api_url),
        (
            "missing_icon_policy",
            settings.missing_icon_policy.to_string(),
            sources.missing_icon_policy,
        ),
        ("max_retries", settings.max_retries.to_string(), sources.max_retries),
        (
            "build_timeout_secs",
            settings.build_timeout_secs.to_string(),
            sources.build_timeout_secs,
        ),
    ];

    for (name, value, source) in rows {
        let source_str = format!("({source})");
        log::info!(
            "  {} {} {}",
            format!("{name}:").if_supports_color(Stdout, |t| t.cyan()),
            value,
            source_str.if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
}

/// Print the settings file path.
pub(crate) fn run_config_path() {
    println!("{}", settings_path().display());
}
