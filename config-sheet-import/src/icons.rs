//! Icons found in an archive, and the folder they are unpacked into.
//!
//! Raster icons come in several size and density variants
//! (`<name>-medium@1x.png`, `<name>-small@2x.png`, ...). They are indexed by
//! file stem once, then looked up per icon name in a fixed preference order.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use config_sheet_core::Icon;
use config_sheet_core::model::is_icon_url;

use crate::error::ImportError;

const SIZES: [&str; 3] = ["medium", "small", "large"];
const DENSITIES: [&str; 3] = ["1x", "2x", "3x"];

/// Icon content as found in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconData {
    Png(Vec<u8>),
    Svg(String),
    /// Already hosted; kept as a reference.
    Url(String),
}

impl IconData {
    /// Classify the `svg` member of a payload icon.
    pub fn from_icon_value(value: &str) -> Self {
        if is_icon_url(value) {
            Self::Url(value.trim().to_string())
        } else {
            Self::Svg(value.to_string())
        }
    }

    /// Self-contained cell value for workbooks without a folder to write to.
    pub fn to_data_url(&self) -> String {
        match self {
            Self::Png(bytes) => format!("data:image/png;base64,{}", STANDARD.encode(bytes)),
            Self::Svg(svg) => format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg)),
            Self::Url(url) => url.clone(),
        }
    }
}

/// PNG files from an archive's `icons/` directory, keyed by file stem.
#[derive(Debug, Default)]
pub struct PngIndex {
    by_stem: HashMap<String, Vec<u8>>,
}

/// Strip a `-<size>` / `-<size>@<density>` / `@<density>` suffix from a stem.
pub fn base_icon_name(stem: &str) -> &str {
    let without_density = match stem.rsplit_once('@') {
        Some((head, density)) if DENSITIES.contains(&density) => head,
        _ => stem,
    };
    match without_density.rsplit_once('-') {
        Some((head, size)) if SIZES.contains(&size) && !head.is_empty() => head,
        _ => without_density,
    }
}

impl PngIndex {
    pub fn insert(&mut self, file_name: &str, bytes: Vec<u8>) {
        let stem = file_name.strip_suffix(".png").unwrap_or(file_name);
        self.by_stem.insert(stem.to_string(), bytes);
    }

    pub fn len(&self) -> usize {
        self.by_stem.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_stem.is_empty()
    }

    /// Candidate stems for an icon name, best first. Every stem that
    /// [`base_icon_name`] reduces to `name` is listed.
    pub fn candidates(name: &str) -> Vec<String> {
        let mut out = Vec::with_capacity((SIZES.len() + 1) * (DENSITIES.len() + 1));
        for size in SIZES {
            for density in DENSITIES {
                out.push(format!("{name}-{size}@{density}"));
            }
            out.push(format!("{name}-{size}"));
        }
        for density in DENSITIES {
            out.push(format!("{name}@{density}"));
        }
        out.push(name.to_string());
        out
    }

    pub fn lookup(&self, name: &str) -> Option<&[u8]> {
        Self::candidates(name)
            .iter()
            .find_map(|stem| self.by_stem.get(stem))
            .map(Vec::as_slice)
    }

    /// Distinct icon names present in the index.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_stem.keys().map(|s| base_icon_name(s)).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

/// Merge raster and sprite icons; a PNG wins when both exist for a name.
pub fn merge_icons(pngs: &PngIndex, svgs: Vec<Icon>) -> BTreeMap<String, IconData> {
    let mut icons: BTreeMap<String, IconData> = svgs
        .into_iter()
        .map(|icon| (icon.name, IconData::Svg(icon.svg)))
        .collect();
    for name in pngs.names() {
        if let Some(bytes) = pngs.lookup(name) {
            icons.insert(name.to_string(), IconData::Png(bytes.to_vec()));
        }
    }
    icons
}

/// A freshly created directory of unpacked icons.
///
/// Dropped without [`commit`](Self::commit), the directory and everything in
/// it is removed again.
#[derive(Debug)]
pub struct IconFolder {
    path: PathBuf,
    committed: bool,
}

impl IconFolder {
    /// Create `<parent>/<base>`, or `<base>-2`, `<base>-3`... if taken.
    pub fn create(parent: &Path, base: &str) -> Result<Self, ImportError> {
        fs::create_dir_all(parent)?;
        let mut path = parent.join(base);
        let mut n = 2;
        while path.exists() {
            path = parent.join(format!("{base}-{n}"));
            n += 1;
        }
        fs::create_dir(&path)?;
        log::debug!("Created icon folder {}", path.display());
        Ok(Self {
            path,
            committed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one icon and return the cell value referencing it.
    pub fn write(&self, name: &str, data: &IconData) -> Result<String, ImportError> {
        let file = match data {
            IconData::Url(url) => return Ok(url.clone()),
            IconData::Png(bytes) => {
                let file = self.path.join(format!("{name}.png"));
                fs::write(&file, bytes)?;
                file
            }
            IconData::Svg(svg) => {
                let file = self.path.join(format!("{name}.svg"));
                fs::write(&file, svg)?;
                file
            }
        };
        let absolute = fs::canonicalize(&file)?;
        Ok(format!("file://{}", absolute.display()))
    }

    /// Keep the folder.
    pub fn commit(mut self) -> PathBuf {
        self.committed = true;
        self.path.clone()
    }
}

impl Drop for IconFolder {
    fn drop(&mut self) {
        if !self.committed {
            log::info!("Removing icon folder {}", self.path.display());
            if let Err(e) = fs::remove_dir_all(&self.path) {
                log::warn!("Could not remove {}: {e}", self.path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_names_strip_size_and_density() {
        assert_eq!(base_icon_name("animal-medium@1x"), "animal");
        assert_eq!(base_icon_name("river-crossing-small@3x"), "river-crossing");
        assert_eq!(base_icon_name("animal-large"), "animal");
        assert_eq!(base_icon_name("animal@2x"), "animal");
        assert_eq!(base_icon_name("animal"), "animal");
        assert_eq!(base_icon_name("medium"), "medium");
    }

    #[test]
    fn lookup_prefers_medium_then_small_then_large() {
        let mut index = PngIndex::default();
        index.insert("animal-large@1x.png", vec![3]);
        index.insert("animal-small@2x.png", vec![2]);
        index.insert("animal.png", vec![9]);
        assert_eq!(index.lookup("animal"), Some(&[2u8][..]));
        index.insert("animal-medium@3x.png", vec![1]);
        assert_eq!(index.lookup("animal"), Some(&[1u8][..]));
        assert_eq!(index.names(), vec!["animal"]);
        assert_eq!(index.lookup("river"), None);
    }

    #[test]
    fn every_indexed_name_can_be_looked_up() {
        let mut index = PngIndex::default();
        index.insert("tree-medium.png", vec![4]);
        index.insert("rock@2x.png", vec![5]);
        assert_eq!(index.names(), vec!["rock", "tree"]);
        assert_eq!(index.lookup("tree"), Some(&[4u8][..]));
        assert_eq!(index.lookup("rock"), Some(&[5u8][..]));

        let merged = merge_icons(&index, vec![]);
        assert_eq!(merged["tree"], IconData::Png(vec![4]));
        assert_eq!(merged["rock"], IconData::Png(vec![5]));

        index.insert("tree-medium@2x.png", vec![6]);
        assert_eq!(index.lookup("tree"), Some(&[6u8][..]));
    }

    #[test]
    fn png_wins_over_sprite_symbol() {
        let mut index = PngIndex::default();
        index.insert("animal-medium@1x.png", vec![1, 2]);
        let merged = merge_icons(
            &index,
            vec![Icon::new("animal", "<svg/>"), Icon::new("river", "<svg/>")],
        );
        assert_eq!(merged["animal"], IconData::Png(vec![1, 2]));
        assert_eq!(merged["river"], IconData::Svg("<svg/>".into()));
    }

    #[test]
    fn uncommitted_folder_is_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = {
            let folder = IconFolder::create(tmp.path(), "icons").unwrap();
            let url = folder.write("animal", &IconData::Png(vec![1])).unwrap();
            assert!(url.starts_with("file://"));
            assert!(url.ends_with("animal.png"));
            folder.path().to_path_buf()
        };
        assert!(!path.exists());

        let folder = IconFolder::create(tmp.path(), "icons").unwrap();
        let kept = folder.commit();
        assert!(kept.exists());
        let second = IconFolder::create(tmp.path(), "icons").unwrap();
        assert!(second.path().ends_with("icons-2"));
    }

    #[test]
    fn data_urls_for_folderless_workbooks() {
        assert_eq!(IconData::Png(vec![1, 2, 3]).to_data_url(), "data:image/png;base64,AQID");
        assert_eq!(
            IconData::from_icon_value("https://x.test/a.png"),
            IconData::Url("https://x.test/a.png".into())
        );
    }
}
