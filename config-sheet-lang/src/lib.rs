//! Language catalog and header resolution for translation sheets.

mod aliases;
pub mod cache;
pub mod catalog;
pub mod error;
pub mod resolver;
pub mod source;

pub use cache::{CatalogCache, CatalogOrigin, LoadedCatalog, load_catalog};
pub use catalog::{LanguageCatalog, LanguageInfo};
pub use error::CatalogError;
pub use resolver::{DEFAULT_PRIMARY_LANGUAGE, LanguageResolver, ResolveRule};
pub use source::{CatalogSource, HttpCatalogSource, OfflineSource};
