//! Shared application settings.
//!
//! Values resolve with the priority: environment variable > `settings.toml`
//! (`~/.config/config-sheet/settings.toml`) > built-in default. Both library
//! callers and the CLI go through [`Settings::load`] so resolution is the same
//! everywhere.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

pub const DEFAULT_ICON_API_URL: &str = "https://icons.earthdefenderstoolkit.com";
pub const DEFAULT_LANGUAGE_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/digidem/comapeo-mobile/develop/src/frontend/languages.json";
pub const DEFAULT_BUILD_API_URL: &str = "https://comapeo-config-builder-api.fly.dev";
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BUILD_TIMEOUT_SECS: u64 = 300;

const ENV_ICON_API: &str = "CONFIG_SHEET_ICON_API";
const ENV_LANGUAGE_URL: &str = "CONFIG_SHEET_LANGUAGE_URL";
const ENV_BUILD_API: &str = "CONFIG_SHEET_BUILD_API";
const ENV_MISSING_ICONS: &str = "CONFIG_SHEET_MISSING_ICONS";
const ENV_MAX_RETRIES: &str = "CONFIG_SHEET_MAX_RETRIES";

/// What to do when a preset ends up without an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingIconPolicy {
    /// Report and continue; the preset ships without an icon.
    #[default]
    Warn,
    /// Treat as a validation error.
    Error,
}

impl FromStr for MissingIconPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "warn" | "warning" => Ok(Self::Warn),
            "error" | "fail" => Ok(Self::Error),
            other => Err(format!("unknown missing-icon policy '{other}'")),
        }
    }
}

impl fmt::Display for MissingIconPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Where a setting's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingSource {
    EnvVar(&'static str),
    ConfigFile,
    Default,
}

impl fmt::Display for SettingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${var}"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Provenance of each setting, for display.
#[derive(Debug, Clone)]
pub struct SettingSources {
    pub icon_api_url: SettingSource,
    pub language_catalog_url: SettingSource,
    pub build_api_url: SettingSource,
    pub missing_icon_policy: SettingSource,
    pub max_retries: SettingSource,
    pub build_timeout_secs: SettingSource,
}

/// On-disk format of `settings.toml`; every key optional.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    icon_api_url: Option<String>,
    language_catalog_url: Option<String>,
    build_api_url: Option<String>,
    missing_icon_policy: Option<MissingIconPolicy>,
    max_retries: Option<u32>,
    build_timeout_secs: Option<u64>,
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub icon_api_url: String,
    pub language_catalog_url: String,
    pub build_api_url: String,
    pub missing_icon_policy: MissingIconPolicy,
    pub max_retries: u32,
    pub build_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            icon_api_url: DEFAULT_ICON_API_URL.to_string(),
            language_catalog_url: DEFAULT_LANGUAGE_CATALOG_URL.to_string(),
            build_api_url: DEFAULT_BUILD_API_URL.to_string(),
            missing_icon_policy: MissingIconPolicy::default(),
            max_retries: DEFAULT_MAX_RETRIES,
            build_timeout_secs: DEFAULT_BUILD_TIMEOUT_SECS,
        }
    }
}

/// Canonical path to the settings file: `~/.config/config-sheet/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("config-sheet").join("settings.toml")
}

fn load_settings_file() -> Option<SettingsFile> {
    let contents = std::fs::read_to_string(settings_path()).ok()?;
    match toml::from_str(&contents) {
        Ok(file) => Some(file),
        Err(e) => {
            log::warn!("Ignoring malformed settings file: {e}");
            None
        }
    }
}

impl Settings {
    /// Resolve settings from the process environment and the settings file.
    pub fn load() -> Self {
        Self::resolve(|var| std::env::var(var).ok(), load_settings_file())
            .0
    }

    /// Resolve settings and report where each value came from.
    pub fn load_with_sources() -> (Self, SettingSources) {
        Self::resolve(|var| std::env::var(var).ok(), load_settings_file())
    }

    /// Parse settings from TOML text without consulting the environment.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        let file: SettingsFile = toml::from_str(contents)?;
        Ok(Self::resolve(|_| None, Some(file)).0)
    }

    fn resolve(
        env: impl Fn(&'static str) -> Option<String>,
        file: Option<SettingsFile>,
    ) -> (Self, SettingSources) {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let (icon_api_url, icon_src) =
            pick(env(ENV_ICON_API), ENV_ICON_API, file.icon_api_url, defaults.icon_api_url);
        let (language_catalog_url, lang_src) = pick(
            env(ENV_LANGUAGE_URL),
            ENV_LANGUAGE_URL,
            file.language_catalog_url,
            defaults.language_catalog_url,
        );
        let (build_api_url, build_src) = pick(
            env(ENV_BUILD_API),
            ENV_BUILD_API,
            file.build_api_url,
            defaults.build_api_url,
        );
        let (missing_icon_policy, policy_src) = pick(
            env(ENV_MISSING_ICONS).and_then(|v| v.parse().ok()),
            ENV_MISSING_ICONS,
            file.missing_icon_policy,
            defaults.missing_icon_policy,
        );
        let (max_retries, retries_src) = pick(
            env(ENV_MAX_RETRIES).and_then(|v| v.parse().ok()),
            ENV_MAX_RETRIES,
            file.max_retries,
            defaults.max_retries,
        );
        let (build_timeout_secs, timeout_src) = match file.build_timeout_secs {
            Some(v) => (v, SettingSource::ConfigFile),
            None => (defaults.build_timeout_secs, SettingSource::Default),
        };

        (
            Self {
                icon_api_url: trim_url(icon_api_url),
                language_catalog_url,
                build_api_url: trim_url(build_api_url),
                missing_icon_policy,
                max_retries: max_retries.max(1),
                build_timeout_secs,
            },
            SettingSources {
                icon_api_url: icon_src,
                language_catalog_url: lang_src,
                build_api_url: build_src,
                missing_icon_policy: policy_src,
                max_retries: retries_src,
                build_timeout_secs: timeout_src,
            },
        )
    }

    /// Retry policy for icon API calls.
    pub fn icon_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries)
    }

    /// Retry policy for the build upload, bounded by the total timeout.
    pub fn build_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries)
            .with_base_delay(Duration::from_secs(2))
            .with_deadline(Duration::from_secs(self.build_timeout_secs))
    }

    /// Serialize the resolved values as TOML, for display.
    pub fn to_toml_string(&self) -> String {
        let file = SettingsFile {
            icon_api_url: Some(self.icon_api_url.clone()),
            language_catalog_url: Some(self.language_catalog_url.clone()),
            build_api_url: Some(self.build_api_url.clone()),
            missing_icon_policy: Some(self.missing_icon_policy),
            max_retries: Some(self.max_retries),
            build_timeout_secs: Some(self.build_timeout_secs),
        };
        toml::to_string_pretty(&file).unwrap_or_default()
    }
}

fn pick<T>(
    env: Option<T>,
    var: &'static str,
    file: Option<T>,
    default: T,
) -> (T, SettingSource) {
    if let Some(v) = env {
        return (v, SettingSource::EnvVar(var));
    }
    if let Some(v) = file {
        return (v, SettingSource::ConfigFile);
    }
    (default, SettingSource::Default)
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_set() {
        let (settings, sources) = Settings::resolve(|_| None, None);
        assert_eq!(settings, Settings::default());
        assert_eq!(sources.icon_api_url, SettingSource::Default);
    }

    #[test]
    fn env_beats_file_beats_default() {
        let file = SettingsFile {
            icon_api_url: Some("https://file.test/".into()),
            build_api_url: Some("https://build-file.test".into()),
            ..Default::default()
        };
        let (settings, sources) = Settings::resolve(
            |var| (var == ENV_ICON_API).then(|| "https://env.test".to_string()),
            Some(file),
        );
        assert_eq!(settings.icon_api_url, "https://env.test");
        assert_eq!(sources.icon_api_url, SettingSource::EnvVar(ENV_ICON_API));
        assert_eq!(settings.build_api_url, "https://build-file.test");
        assert_eq!(sources.build_api_url, SettingSource::ConfigFile);
        assert_eq!(sources.language_catalog_url, SettingSource::Default);
    }

    #[test]
    fn parses_toml_and_policy() {
        let settings = Settings::from_toml(
            r#"
missing_icon_policy = "error"
max_retries = 5
icon_api_url = "https://icons.test/"
"#,
        )
        .unwrap();
        assert_eq!(settings.missing_icon_policy, MissingIconPolicy::Error);
        assert_eq!(settings.max_retries, 5);
        assert_eq!(settings.icon_api_url, "https://icons.test");
    }

    #[test]
    fn invalid_env_policy_falls_through() {
        let (settings, sources) = Settings::resolve(
            |var| (var == ENV_MISSING_ICONS).then(|| "sometimes".to_string()),
            None,
        );
        assert_eq!(settings.missing_icon_policy, MissingIconPolicy::Warn);
        assert_eq!(sources.missing_icon_policy, SettingSource::Default);
    }
}
