//! Language catalog: ISO code → English and native display names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Committed fallback used when the remote catalog is unreachable.
const FALLBACK_JSON: &str = include_str!("../assets/languages.json");

/// Display names for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInfo {
    pub english_name: String,
    #[serde(default)]
    pub native_name: String,
}

/// A set of known languages keyed by lowercase ISO code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCatalog {
    languages: BTreeMap<String, LanguageInfo>,
}

impl LanguageCatalog {
    /// Parse a catalog document of the shape `{iso: {englishName, nativeName}}`.
    ///
    /// Codes are lowercased; entries without an English name are dropped.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: BTreeMap<String, LanguageInfo> = serde_json::from_str(json)?;
        let languages: BTreeMap<String, LanguageInfo> = raw
            .into_iter()
            .filter(|(_, info)| !info.english_name.trim().is_empty())
            .map(|(code, info)| (code.trim().to_lowercase(), info))
            .collect();
        if languages.is_empty() {
            return Err(CatalogError::invalid_catalog("no languages in catalog"));
        }
        Ok(Self { languages })
    }

    /// The committed fallback catalog.
    pub fn fallback() -> Self {
        // The asset is checked by `fallback_asset_parses`.
        Self::from_json(FALLBACK_JSON).unwrap_or_default()
    }

    pub fn get(&self, iso: &str) -> Option<&LanguageInfo> {
        self.languages.get(&iso.to_lowercase())
    }

    pub fn contains(&self, iso: &str) -> bool {
        self.get(iso).is_some()
    }

    pub fn english_name(&self, iso: &str) -> Option<&str> {
        self.get(iso).map(|l| l.english_name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LanguageInfo)> {
        self.languages.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_asset_parses() {
        let catalog = LanguageCatalog::from_json(FALLBACK_JSON).unwrap();
        assert_eq!(catalog.len(), 142);
        assert_eq!(catalog.english_name("pt"), Some("Portuguese"));
        assert_eq!(catalog.get("ES").map(|l| l.native_name.as_str()), Some("Español"));
    }

    #[test]
    fn codes_are_lowercased_and_blank_names_dropped() {
        let catalog = LanguageCatalog::from_json(
            r#"{"PT-BR": {"englishName": "Portuguese (Brazil)"}, "xx": {"englishName": " "}}"#,
        )
        .unwrap();
        assert!(catalog.contains("pt-br"));
        assert!(!catalog.contains("xx"));
        assert_eq!(catalog.get("pt-br").map(|l| l.native_name.as_str()), Some(""));
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(LanguageCatalog::from_json("{}").is_err());
        assert!(LanguageCatalog::from_json("[1, 2]").is_err());
    }
}
