//! Per-category icon resolution.
//!
//! Sources are tried in order: an icon reference already in the cell, an image
//! embedded in the cell (recolored by the service), then a search by name
//! followed by generation. Every failure is logged and degrades to `None`.

use std::fmt;

use config_sheet_core::model::is_icon_url;
use config_sheet_core::{Attempt, CellValue, Icon, RetryError, RetryPolicy, RunLog};

use crate::client::IconApi;
use crate::error::IconError;
use crate::types::SearchHit;

/// Search term tried after every name-derived term.
pub const FALLBACK_TERM: &str = "marker";

/// What a category needs an icon for.
#[derive(Debug, Clone)]
pub struct IconRequest<'a> {
    /// Icon slug; becomes the icon name.
    pub slug: &'a str,
    /// Category display name, used for searching.
    pub name: &'a str,
    /// Content of the icon cell.
    pub cell: &'a CellValue,
    /// Category background color (`#RRGGBB`).
    pub color: &'a str,
}

/// Where a resolved icon came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconSource {
    /// Reused from the cell verbatim.
    Existing,
    /// Generated from an image embedded in the cell.
    Embedded,
    /// Found by searching, then generated.
    Searched,
}

impl fmt::Display for IconSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Existing => write!(f, "existing"),
            Self::Embedded => write!(f, "embedded image"),
            Self::Searched => write!(f, "search"),
        }
    }
}

/// A resolved icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIcon {
    pub icon: Icon,
    pub source: IconSource,
}

impl ResolvedIcon {
    /// Whether the icon was produced by the service this run and should be
    /// written back to the cell so later runs reuse it.
    pub fn needs_write_back(&self) -> bool {
        self.source != IconSource::Existing
    }
}

/// Search terms for a category name: the full name, each word, then [`FALLBACK_TERM`].
pub fn search_terms(name: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    let mut push = |t: String| {
        if !t.is_empty() && !terms.iter().any(|existing| existing.eq_ignore_ascii_case(&t)) {
            terms.push(t);
        }
    };
    push(name.trim().to_string());
    for word in name.split(|c: char| c.is_whitespace() || c == '-' || c == '/' || c == ',') {
        push(word.trim().to_string());
    }
    push(FALLBACK_TERM.to_string());
    terms
}

/// Resolves icons through an [`IconApi`] with a bounded retry per search term.
pub struct IconResolver<'a> {
    api: &'a dyn IconApi,
    policy: RetryPolicy,
}

impl<'a> IconResolver<'a> {
    pub fn new(api: &'a dyn IconApi, policy: RetryPolicy) -> Self {
        Self { api, policy }
    }

    pub fn resolve(&self, request: &IconRequest<'_>, run_log: &mut RunLog) -> Option<ResolvedIcon> {
        match request.cell {
            CellValue::Text(text) if is_icon_url(text) || text.trim_start().starts_with("<svg") => {
                run_log.debug(format!("Reusing icon for '{}'", request.name));
                Some(ResolvedIcon {
                    icon: Icon::new(request.slug, text.clone()),
                    source: IconSource::Existing,
                })
            }
            CellValue::ImageRef(url) => {
                run_log.debug(format!(
                    "Generating icon for '{}' from embedded image",
                    request.name
                ));
                self.generate(request, url, IconSource::Embedded, run_log)
            }
            other => {
                if let CellValue::Text(text) = other {
                    run_log.warn(format!(
                        "Icon cell for '{}' is not a URL ('{text}'); searching instead",
                        request.name
                    ));
                }
                let hit = self.search(request.name, run_log)?;
                self.generate(request, &hit.image, IconSource::Searched, run_log)
            }
        }
    }

    fn search(&self, name: &str, run_log: &mut RunLog) -> Option<SearchHit> {
        for term in search_terms(name) {
            let result = self.policy.run(|attempt| match self.api.search(&term) {
                Ok(hits) => match hits.into_iter().next() {
                    Some(hit) => Attempt::Success(hit),
                    None => Attempt::Retry(IconError::not_found(&term)),
                },
                Err(e) if e.is_retryable() => {
                    log::debug!("Icon search '{term}' attempt {attempt} failed: {e}");
                    Attempt::Retry(e)
                }
                Err(e) => Attempt::Fatal(e),
            });
            match result {
                Ok(hit) => {
                    run_log.debug(format!("Icon search for '{name}' matched term '{term}'"));
                    return Some(hit);
                }
                Err(RetryError::Fatal(e)) => {
                    run_log.warn(format!("Icon search for '{name}' failed: {e}"));
                    return None;
                }
                Err(e) => run_log.debug(format!("No icon for term '{term}': {e}")),
            }
        }
        run_log.warn(format!("No icon found for category '{name}'"));
        None
    }

    fn generate(
        &self,
        request: &IconRequest<'_>,
        image_url: &str,
        source: IconSource,
        run_log: &mut RunLog,
    ) -> Option<ResolvedIcon> {
        match self.api.generate(image_url, request.color) {
            Ok(Some(svg)) => Some(ResolvedIcon {
                icon: Icon::new(request.slug, svg),
                source,
            }),
            Ok(None) => {
                run_log.warn(format!(
                    "Icon generation returned nothing for '{}'",
                    request.name
                ));
                None
            }
            Err(e) => {
                run_log.warn(format!("Icon generation failed for '{}': {e}", request.name));
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/resolver_tests.rs"]
mod tests;
