//! On-disk cache for the remote language catalog.
//!
//! The catalog is stored at `~/.cache/config-sheet/languages.json` together
//! with the time it was fetched. A cache younger than [`CACHE_TTL_HOURS`] is
//! used as-is; an older one is refreshed, and kept as a stale fallback if the
//! refresh fails. The committed asset is the last resort.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::LanguageCatalog;
use crate::error::CatalogError;
use crate::source::CatalogSource;

/// Cache format version. Bump to invalidate caches written by older builds.
const CACHE_VERSION: u32 = 1;

/// How long a fetched catalog is trusted before refreshing.
pub const CACHE_TTL_HOURS: i64 = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedCatalog {
    #[serde(default)]
    version: u32,
    source: String,
    /// Unix seconds.
    fetched_at: i64,
    languages: LanguageCatalog,
}

impl CachedCatalog {
    fn fetched_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.fetched_at, 0).unwrap_or_default()
    }
}

/// Where a loaded catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    /// Fetched just now.
    Remote,
    /// Read from a cache within its TTL.
    Cache,
    /// Read from an expired cache because the fetch failed.
    StaleCache,
    /// The committed fallback asset.
    Fallback,
}

impl fmt::Display for CatalogOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Cache => write!(f, "cache"),
            Self::StaleCache => write!(f, "stale cache"),
            Self::Fallback => write!(f, "built-in fallback"),
        }
    }
}

/// A catalog plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub catalog: LanguageCatalog,
    pub origin: CatalogOrigin,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Handle to the cache file.
#[derive(Debug, Clone)]
pub struct CatalogCache {
    path: PathBuf,
}

impl CatalogCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The cache in the user's cache directory.
    pub fn default_location() -> Result<Self, CatalogError> {
        let base = dirs::cache_dir()
            .ok_or_else(|| CatalogError::cache("Could not determine cache directory"))?;
        Ok(Self::new(base.join("config-sheet").join("languages.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<CachedCatalog>, CatalogError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let cached: CachedCatalog = serde_json::from_str(&contents)?;
        if cached.version != CACHE_VERSION || cached.languages.is_empty() {
            log::debug!("Discarding language cache with version {}", cached.version);
            return Ok(None);
        }
        Ok(Some(cached))
    }

    fn write(
        &self,
        catalog: &LanguageCatalog,
        source: String,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), CatalogError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let cached = CachedCatalog {
            version: CACHE_VERSION,
            source,
            fetched_at: fetched_at.timestamp(),
            languages: catalog.clone(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&cached)?)?;
        Ok(())
    }

    /// Remove the cache file. Returns whether anything was removed.
    pub fn clear(&self) -> Result<bool, CatalogError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            return Ok(true);
        }
        Ok(false)
    }
}

/// Load the catalog, preferring a fresh cache, then the source, then any
/// stale cache, then the committed fallback. Never fails.
pub fn load_catalog(
    source: &dyn CatalogSource,
    cache: Option<&CatalogCache>,
    refresh: bool,
) -> LoadedCatalog {
    load_catalog_at(source, cache, refresh, Utc::now())
}

/// [`load_catalog`] with an explicit clock.
pub fn load_catalog_at(
    source: &dyn CatalogSource,
    cache: Option<&CatalogCache>,
    refresh: bool,
    now: DateTime<Utc>,
) -> LoadedCatalog {
    let cached = cache.and_then(|c| match c.read() {
        Ok(cached) => cached,
        Err(e) => {
            log::warn!("Ignoring unreadable language cache: {e}");
            None
        }
    });

    if !refresh
        && let Some(cached) = &cached
        && now.signed_duration_since(cached.fetched_at()) < Duration::hours(CACHE_TTL_HOURS)
    {
        return LoadedCatalog {
            catalog: cached.languages.clone(),
            origin: CatalogOrigin::Cache,
            fetched_at: Some(cached.fetched_at()),
        };
    }

    match source.fetch() {
        Ok(catalog) => {
            if let Some(cache) = cache
                && let Err(e) = cache.write(&catalog, source.describe(), now)
            {
                log::warn!("Failed to write language cache: {e}");
            }
            log::info!("Loaded {} languages from {}", catalog.len(), source.describe());
            LoadedCatalog {
                catalog,
                origin: CatalogOrigin::Remote,
                fetched_at: Some(now),
            }
        }
        Err(e) => {
            log::warn!("Language catalog fetch failed: {e}");
            match cached {
                Some(cached) => LoadedCatalog {
                    fetched_at: Some(cached.fetched_at()),
                    catalog: cached.languages,
                    origin: CatalogOrigin::StaleCache,
                },
                None => LoadedCatalog {
                    catalog: LanguageCatalog::fallback(),
                    origin: CatalogOrigin::Fallback,
                    fetched_at: None,
                },
            }
        }
    }
}
