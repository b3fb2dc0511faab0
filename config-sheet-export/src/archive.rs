//! Export outputs: the config JSON file and the zip archive.
//!
//! The archive holds `metadata.json`, `package.json`, `presets.json`,
//! `translations.json` (nested layout) and the icons, either as
//! `icons/<name>-medium@1x.png` files or as `<symbol>`s in `icons.svg`.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use config_sheet_core::translations::restructure;
use config_sheet_core::{Config, Field, Icon, Preset, RunLog};
use config_sheet_icons::build_sprite;
use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ExportError;

pub const ICON_DIR: &str = "icons";
pub const SPRITE_FILE: &str = "icons.svg";

/// File name of a raster icon inside the archive.
pub fn png_icon_path(name: &str) -> String {
    format!("{ICON_DIR}/{name}-medium@1x.png")
}

/// Fetches icon bytes referenced by URL.
pub trait IconFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ExportError>;
}

/// Fetches `http(s)://` icons with a blocking client and `file://` icons
/// from disk.
pub struct HttpIconFetcher {
    client: reqwest::blocking::Client,
}

impl HttpIconFetcher {
    pub fn new() -> Result<Self, ExportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ExportError::icon("http client", e.to_string()))?;
        Ok(Self { client })
    }
}

impl IconFetcher for HttpIconFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ExportError> {
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(std::fs::read(path)?);
        }
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| ExportError::icon(url, e.to_string()))?;
        let bytes = response
            .bytes()
            .map_err(|e| ExportError::icon(url, e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Write the config as pretty JSON.
pub fn write_config_json(config: &Config, path: &Path) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, config)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct PresetsDocument<'a> {
    presets: &'a [Preset],
    fields: &'a [Field],
}

/// What went into an archive.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub png_icons: usize,
    pub svg_icons: usize,
    pub skipped_icons: Vec<String>,
}

enum IconPayload {
    Png(Vec<u8>),
    Svg(String),
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]).to_ascii_lowercase();
    head.trim_start().starts_with('<') && head.contains("svg")
}

fn decode_icon(icon: &Icon, fetcher: Option<&dyn IconFetcher>) -> Result<IconPayload, String> {
    let svg = icon.svg.trim();
    if icon.is_inline_svg() {
        return Ok(IconPayload::Svg(svg.to_string()));
    }
    if let Some(rest) = svg.strip_prefix("data:image/") {
        let (kind, data) = rest
            .split_once(";base64,")
            .ok_or_else(|| "unsupported data URL encoding".to_string())?;
        let bytes = STANDARD.decode(data).map_err(|e| e.to_string())?;
        return match kind {
            "png" => Ok(IconPayload::Png(bytes)),
            "svg+xml" => String::from_utf8(bytes)
                .map(IconPayload::Svg)
                .map_err(|e| e.to_string()),
            other => Err(format!("unsupported image type '{other}'")),
        };
    }
    let fetcher = fetcher.ok_or_else(|| "remote icon and no fetcher available".to_string())?;
    let bytes = fetcher.fetch(svg).map_err(|e| e.to_string())?;
    if looks_like_svg(&bytes) {
        String::from_utf8(bytes)
            .map(IconPayload::Svg)
            .map_err(|e| e.to_string())
    } else {
        Ok(IconPayload::Png(bytes))
    }
}

/// Write the archive to a file path.
pub fn write_archive(
    config: &Config,
    path: &Path,
    fetcher: Option<&dyn IconFetcher>,
    run_log: &mut RunLog,
) -> Result<ArchiveSummary, ExportError> {
    let file = File::create(path)?;
    let summary = write_archive_to(config, file, fetcher, run_log)?;
    run_log.info(format!("Wrote archive {}", path.display()));
    Ok(summary)
}

/// Write the archive to any seekable writer.
pub fn write_archive_to<W: Write + Seek>(
    config: &Config,
    writer: W,
    fetcher: Option<&dyn IconFetcher>,
    run_log: &mut RunLog,
) -> Result<ArchiveSummary, ExportError> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut summary = ArchiveSummary::default();

    zip.start_file("metadata.json", options)?;
    serde_json::to_writer_pretty(&mut zip, &config.metadata)?;

    if let Some(package) = &config.package_json {
        zip.start_file("package.json", options)?;
        serde_json::to_writer_pretty(&mut zip, package)?;
    }

    zip.start_file("presets.json", options)?;
    serde_json::to_writer_pretty(
        &mut zip,
        &PresetsDocument {
            presets: &config.presets,
            fields: &config.fields,
        },
    )?;

    let (nested, skipped) = restructure(&config.messages);
    for key in skipped {
        run_log.warn(format!("Translation key '{key}' has no place in translations.json"));
    }
    zip.start_file("translations.json", options)?;
    serde_json::to_writer_pretty(&mut zip, &nested)?;

    let mut svg_icons = Vec::new();
    for icon in &config.icons {
        match decode_icon(icon, fetcher) {
            Ok(IconPayload::Png(bytes)) => {
                zip.start_file(png_icon_path(&icon.name), options)?;
                zip.write_all(&bytes)?;
                summary.png_icons += 1;
            }
            Ok(IconPayload::Svg(svg)) => svg_icons.push(Icon::new(&icon.name, svg)),
            Err(reason) => {
                run_log.warn(format!("Skipping icon '{}': {reason}", icon.name));
                summary.skipped_icons.push(icon.name.clone());
            }
        }
    }

    if !svg_icons.is_empty() {
        let (sprite, failed) = build_sprite(&svg_icons);
        summary.svg_icons = svg_icons.len() - failed.len();
        for name in failed {
            run_log.warn(format!("Skipping icon '{name}': SVG markup could not be parsed"));
            summary.skipped_icons.push(name);
        }
        zip.start_file(SPRITE_FILE, options)?;
        zip.write_all(sprite.as_bytes())?;
    }

    zip.finish()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io::{Cursor, Read};

    use config_sheet_core::{Message, Metadata};
    use zip::ZipArchive;

    use super::*;

    struct FakeFetcher {
        files: HashMap<String, Vec<u8>>,
        calls: RefCell<Vec<String>>,
    }

    impl IconFetcher for FakeFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, ExportError> {
            self.calls.borrow_mut().push(url.to_string());
            self.files
                .get(url)
                .cloned()
                .ok_or_else(|| ExportError::icon(url, "not found"))
        }
    }

    fn config(icons: Vec<Icon>) -> Config {
        let mut config = Config {
            metadata: Metadata {
                dataset_id: "config-test".into(),
                name: "Config-Test".into(),
                version: "24.01.01".into(),
                description: None,
                primary_language: None,
            },
            package_json: None,
            fields: vec![],
            presets: vec![Preset::new("river", "River", "#0000FF", vec![], 1)],
            icons,
            messages: Default::default(),
        };
        config
            .messages
            .entry("es".into())
            .or_default()
            .insert("presets.river.name".into(), Message::text("Río", ""));
        config
    }

    fn read_entry(bytes: &[u8], name: &str) -> Option<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).ok()?;
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        Some(out)
    }

    #[test]
    fn archive_contains_json_documents_and_sprite() {
        let cfg = config(vec![Icon::new("river", r#"<svg viewBox="0 0 4 4"><path/></svg>"#)]);
        let mut buf = Cursor::new(Vec::new());
        let summary = write_archive_to(&cfg, &mut buf, None, &mut RunLog::silent("test")).unwrap();
        assert_eq!(summary.svg_icons, 1);

        let bytes = buf.into_inner();
        let presets: serde_json::Value =
            serde_json::from_str(&read_entry(&bytes, "presets.json").unwrap()).unwrap();
        assert_eq!(presets["presets"][0]["icon"], "river");
        let translations: serde_json::Value =
            serde_json::from_str(&read_entry(&bytes, "translations.json").unwrap()).unwrap();
        assert_eq!(translations["es"]["presets"]["presets"]["river"]["name"], "Río");
        assert!(read_entry(&bytes, SPRITE_FILE).unwrap().contains(r#"id="river-100px""#));
        assert!(read_entry(&bytes, "package.json").is_none());
    }

    #[test]
    fn data_url_png_becomes_raster_file() {
        let encoded = STANDARD.encode([0x89, b'P', b'N', b'G']);
        let cfg = config(vec![Icon::new("river", format!("data:image/png;base64,{encoded}"))]);
        let mut buf = Cursor::new(Vec::new());
        let summary = write_archive_to(&cfg, &mut buf, None, &mut RunLog::silent("test")).unwrap();
        assert_eq!(summary.png_icons, 1);
        let mut archive = ZipArchive::new(Cursor::new(buf.into_inner())).unwrap();
        assert!(archive.by_name("icons/river-medium@1x.png").is_ok());
        assert!(archive.by_name(SPRITE_FILE).is_err());
    }

    #[test]
    fn remote_icons_use_fetcher_or_are_skipped() {
        let cfg = config(vec![
            Icon::new("river", "https://icons.test/river.png"),
            Icon::new("lake", "https://icons.test/lake.png"),
        ]);
        let fetcher = FakeFetcher {
            files: HashMap::from([("https://icons.test/river.png".to_string(), vec![1, 2, 3])]),
            calls: RefCell::new(Vec::new()),
        };
        let mut log = RunLog::silent("test");
        let mut buf = Cursor::new(Vec::new());
        let summary = write_archive_to(&cfg, &mut buf, Some(&fetcher), &mut log).unwrap();
        assert_eq!(summary.png_icons, 1);
        assert_eq!(summary.skipped_icons, vec!["lake"]);
        assert_eq!(fetcher.calls.borrow().len(), 2);
        assert_eq!(log.summary().warnings, 1);

        let mut log = RunLog::silent("test");
        let summary =
            write_archive_to(&cfg, Cursor::new(Vec::new()), None, &mut log).unwrap();
        assert_eq!(summary.skipped_icons.len(), 2);
    }

    #[test]
    fn config_json_is_pretty_and_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        write_config_json(&config(vec![]), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"metadata\""));
        assert!(text.contains("\"dataset_id\": \"config-test\""));
    }
}
