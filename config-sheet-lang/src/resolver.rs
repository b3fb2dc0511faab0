//! Translation sheet header → ISO language code.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use config_sheet_core::normalize_name;

use crate::aliases::CURATED_ALIASES;
use crate::catalog::LanguageCatalog;

/// Language used when the primary-language cell is blank or unresolvable.
pub const DEFAULT_PRIMARY_LANGUAGE: &str = "en";

/// Which rule resolved a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveRule {
    /// `<name> - <iso>`
    NameWithCode,
    /// The header is a known ISO code.
    KnownCode,
    /// A curated alias or a fallback-dataset name.
    Alias,
    /// A display name from the active catalog.
    CatalogName,
    /// An unknown header shaped like an ISO code, accepted verbatim.
    CodeShaped,
}

impl fmt::Display for ResolveRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NameWithCode => "name-with-code",
            Self::KnownCode => "known code",
            Self::Alias => "alias",
            Self::CatalogName => "catalog name",
            Self::CodeShaped => "code-shaped",
        };
        f.write_str(s)
    }
}

/// Whether `s` looks like `xx`, `xxx` or `xx-yy` (2-8 letters, optional subtag).
pub fn is_iso_shaped(s: &str) -> bool {
    let (primary, subtag) = match s.split_once('-') {
        Some((p, t)) => (p, Some(t)),
        None => (s, None),
    };
    let primary_ok =
        (2..=8).contains(&primary.len()) && primary.chars().all(|c| c.is_ascii_alphabetic());
    let subtag_ok = subtag.is_none_or(|t| {
        (2..=8).contains(&t.len()) && t.chars().all(|c| c.is_ascii_alphanumeric())
    });
    primary_ok && subtag_ok
}

/// Resolves free-text column headers to language codes.
#[derive(Debug, Clone)]
pub struct LanguageResolver {
    catalog: LanguageCatalog,
    fallback: LanguageCatalog,
    known_codes: BTreeSet<String>,
    aliases: HashMap<String, String>,
    catalog_names: HashMap<String, String>,
}

impl Default for LanguageResolver {
    fn default() -> Self {
        Self::new(LanguageCatalog::fallback())
    }
}

impl LanguageResolver {
    /// Build a resolver around the active catalog. The alias table is the
    /// curated list extended with every name in the committed fallback.
    pub fn new(catalog: LanguageCatalog) -> Self {
        let fallback = LanguageCatalog::fallback();

        let mut aliases: HashMap<String, String> = CURATED_ALIASES
            .iter()
            .map(|(alias, iso)| (normalize_name(alias), iso.to_string()))
            .collect();
        for (code, info) in fallback.iter() {
            for name in [&info.english_name, &info.native_name] {
                if !name.is_empty() {
                    aliases
                        .entry(normalize_name(name))
                        .or_insert_with(|| code.to_string());
                }
            }
        }

        let mut catalog_names = HashMap::new();
        for (code, info) in catalog.iter() {
            for name in [&info.english_name, &info.native_name] {
                if !name.is_empty() {
                    catalog_names
                        .entry(normalize_name(name))
                        .or_insert_with(|| code.to_string());
                }
            }
        }

        let known_codes = catalog
            .codes()
            .chain(fallback.codes())
            .map(str::to_string)
            .collect();

        Self {
            catalog,
            fallback,
            known_codes,
            aliases,
            catalog_names,
        }
    }

    pub fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    pub fn is_known(&self, iso: &str) -> bool {
        self.known_codes.contains(&iso.to_lowercase())
    }

    /// Resolve a header to a lowercase ISO code, or `None` if nothing matches.
    pub fn resolve(&self, header: &str) -> Option<String> {
        self.resolve_with_rule(header).map(|(iso, _)| iso)
    }

    /// Resolve a header and report which rule matched.
    pub fn resolve_with_rule(&self, header: &str) -> Option<(String, ResolveRule)> {
        let header = header.trim();
        if header.is_empty() {
            return None;
        }

        if let Some((_, code)) = header.rsplit_once(" - ") {
            let code = code.trim().to_lowercase();
            if is_iso_shaped(&code) {
                return Some((code, ResolveRule::NameWithCode));
            }
        }

        let lower = header.to_lowercase();
        if self.known_codes.contains(&lower) {
            return Some((lower, ResolveRule::KnownCode));
        }

        let normalized = normalize_name(header);
        if let Some(iso) = self.aliases.get(&normalized) {
            return Some((iso.clone(), ResolveRule::Alias));
        }
        if let Some(iso) = self.catalog_names.get(&normalized) {
            return Some((iso.clone(), ResolveRule::CatalogName));
        }

        if is_iso_shaped(&lower) {
            return Some((lower, ResolveRule::CodeShaped));
        }
        None
    }

    /// Primary language from the header cell of the Categories sheet.
    pub fn primary_language(&self, cell: &str) -> String {
        if cell.trim().is_empty() {
            return DEFAULT_PRIMARY_LANGUAGE.to_string();
        }
        self.resolve(cell).unwrap_or_else(|| {
            log::warn!(
                "Could not resolve primary language '{cell}', using '{DEFAULT_PRIMARY_LANGUAGE}'"
            );
            DEFAULT_PRIMARY_LANGUAGE.to_string()
        })
    }

    /// English display name for a code, if known.
    pub fn english_name(&self, iso: &str) -> Option<String> {
        self.catalog
            .english_name(iso)
            .map(str::to_string)
            .or_else(|| self.fallback.english_name(iso).map(str::to_string))
    }

    /// Column header written for a language: `"<English name> - <iso>"`.
    ///
    /// Unknown codes are written bare, which still resolves back to themselves.
    pub fn display_header(&self, iso: &str) -> String {
        let iso = iso.to_lowercase();
        match self.english_name(&iso) {
            Some(name) => format!("{name} - {iso}"),
            None => iso,
        }
    }
}

#[cfg(test)]
#[path = "tests/resolver_tests.rs"]
mod tests;
