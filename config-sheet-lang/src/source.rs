use crate::catalog::LanguageCatalog;
use crate::error::CatalogError;

/// Somewhere a fresh language catalog can be fetched from.
pub trait CatalogSource {
    /// Human-readable origin, recorded in the cache metadata.
    fn describe(&self) -> String;

    fn fetch(&self) -> Result<LanguageCatalog, CatalogError>;
}

/// Fetches the catalog JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    url: String,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl CatalogSource for HttpCatalogSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<LanguageCatalog, CatalogError> {
        log::debug!("Fetching language catalog from {}", self.url);
        let response = reqwest::blocking::get(&self.url)?;
        if !response.status().is_success() {
            return Err(CatalogError::download(format!(
                "HTTP {} for {}",
                response.status(),
                self.url
            )));
        }
        let body = response.text()?;
        LanguageCatalog::from_json(&body)
    }
}

/// A source that never succeeds; used for offline runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

impl CatalogSource for OfflineSource {
    fn describe(&self) -> String {
        "offline".to_string()
    }

    fn fetch(&self) -> Result<LanguageCatalog, CatalogError> {
        Err(CatalogError::download("offline mode"))
    }
}
