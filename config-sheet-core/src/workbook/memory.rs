use std::collections::BTreeMap;

use super::Workbook;
use crate::cell::Grid;
use crate::error::SheetError;

/// An in-memory workbook, used by tests and embedding callers.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    title: String,
    sheets: BTreeMap<String, Grid>,
}

impl MemoryWorkbook {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sheets: BTreeMap::new(),
        }
    }

    /// Builder-style sheet insertion.
    pub fn with_sheet(mut self, name: impl Into<String>, grid: Grid) -> Self {
        self.sheets.insert(name.into(), grid);
        self
    }

    pub fn sheet(&self, name: &str) -> Option<&Grid> {
        self.sheets.get(name)
    }
}

impl Workbook for MemoryWorkbook {
    fn title(&self) -> &str {
        &self.title
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.keys().cloned().collect()
    }

    fn read_sheet(&self, name: &str) -> Result<Option<Grid>, SheetError> {
        Ok(self.sheets.get(name).cloned())
    }

    fn write_sheet(&mut self, name: &str, grid: &Grid) -> Result<(), SheetError> {
        self.sheets.insert(name.to_string(), grid.clone());
        Ok(())
    }

    fn remove_sheet(&mut self, name: &str) -> Result<(), SheetError> {
        self.sheets.remove(name);
        Ok(())
    }
}
