//! A workbook stored as a directory of CSV files.
//!
//! Layout:
//! ```text
//! my-config/
//!   workbook.toml          # title = "My Config"
//!   Categories.csv
//!   Details.csv
//!   Category Translations.csv
//!   ...
//! ```
//! Embedded images are stored as `=IMAGE("url")` formulas, the same text a
//! spreadsheet export produces.

use std::fs;
use std::path::{Path, PathBuf};

use super::Workbook;
use crate::cell::{CellValue, Grid};
use crate::error::SheetError;

const DESCRIPTOR: &str = "workbook.toml";
const EXTENSION: &str = "csv";

/// Directory-backed workbook.
#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    dir: PathBuf,
    title: String,
}

impl CsvWorkbook {
    /// Open an existing workbook directory.
    ///
    /// The title comes from `workbook.toml`, falling back to the directory name.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, SheetError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(SheetError::descriptor(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        let title = read_title(&dir)?.unwrap_or_else(|| {
            dir.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("Untitled")
                .to_string()
        });
        Ok(Self { dir, title })
    }

    /// Create a workbook directory (and descriptor) if it does not exist yet.
    pub fn create(dir: impl Into<PathBuf>, title: &str) -> Result<Self, SheetError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        write_title(&dir, title)?;
        Ok(Self {
            dir,
            title: title.to_string(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn sheet_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{EXTENSION}"))
    }
}

fn read_title(dir: &Path) -> Result<Option<String>, SheetError> {
    let path = dir.join(DESCRIPTOR);
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(&path)?;
    let doc: toml::Value = contents
        .parse()
        .map_err(|e| SheetError::descriptor(format!("{}: {e}", path.display())))?;
    Ok(doc
        .get("title")
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty())
        .map(str::to_string))
}

fn write_title(dir: &Path, title: &str) -> Result<(), SheetError> {
    let mut table = toml::map::Map::new();
    table.insert("title".to_string(), toml::Value::String(title.to_string()));
    let serialized = toml::to_string_pretty(&toml::Value::Table(table))
        .map_err(|e| SheetError::descriptor(e.to_string()))?;
    fs::write(dir.join(DESCRIPTOR), serialized)?;
    Ok(())
}

impl Workbook for CsvWorkbook {
    fn title(&self) -> &str {
        &self.title
    }

    fn sheet_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = fs::read_dir(&self.dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some(EXTENSION)
                    && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        names
    }

    fn read_sheet(&self, name: &str) -> Result<Option<Grid>, SheetError> {
        let path = self.sheet_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(CellValue::parse).collect());
        }
        Ok(Some(Grid::new(rows)))
    }

    fn write_sheet(&mut self, name: &str, grid: &Grid) -> Result<(), SheetError> {
        let width = grid.width();
        let tmp = self.sheet_path(name).with_extension("csv.tmp");
        {
            let mut writer = csv::WriterBuilder::new().flexible(true).from_path(&tmp)?;
            for row in grid.rows().iter().filter(|_| width > 0) {
                let mut record: Vec<String> = row.iter().map(CellValue::to_raw).collect();
                record.resize(width, String::new());
                writer.write_record(&record)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, self.sheet_path(name))?;
        Ok(())
    }

    fn remove_sheet(&mut self, name: &str) -> Result<(), SheetError> {
        let path = self.sheet_path(name);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.dir)
    }
}
