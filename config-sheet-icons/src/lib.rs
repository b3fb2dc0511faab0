//! Icon resolution for categories: reuse, recolor, or search and generate.
//! Also packs and unpacks SVG sprite sheets.

pub mod client;
pub mod error;
pub mod resolver;
pub mod sprite;
pub mod types;

pub use client::{HttpIconApi, IconApi};
pub use error::IconError;
pub use resolver::{IconRequest, IconResolver, IconSource, ResolvedIcon, search_terms};
pub use sprite::{SvgParts, build_sprite, parse_sprite, parse_svg};
pub use types::SearchHit;
