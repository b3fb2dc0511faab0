//! The sheet storage seam.
//!
//! A [`Workbook`] is the only way the pipeline touches spreadsheet storage.
//! Row 0 of every sheet is the header row and columns are positional.

mod csv_dir;
mod memory;

use std::path::Path;

pub use csv_dir::CsvWorkbook;
pub use memory::MemoryWorkbook;

use crate::cell::{CellValue, Grid};
use crate::error::SheetError;

/// Well-known sheet names.
pub mod sheets {
    pub const CATEGORIES: &str = "Categories";
    pub const DETAILS: &str = "Details";
    pub const METADATA: &str = "Metadata";
    pub const CATEGORY_TRANSLATIONS: &str = "Category Translations";
    pub const DETAIL_LABEL_TRANSLATIONS: &str = "Detail Label Translations";
    pub const DETAIL_HELPER_TRANSLATIONS: &str = "Detail Helper Text Translations";
    pub const DETAIL_OPTION_TRANSLATIONS: &str = "Detail Option Translations";

    /// All translation sheets, in the order they are processed.
    pub const TRANSLATION_SHEETS: [&str; 4] = [
        CATEGORY_TRANSLATIONS,
        DETAIL_LABEL_TRANSLATIONS,
        DETAIL_HELPER_TRANSLATIONS,
        DETAIL_OPTION_TRANSLATIONS,
    ];
}

/// Column positions of the Categories sheet.
pub mod category_cols {
    pub const NAME: usize = 0;
    pub const ICON: usize = 1;
    pub const FIELDS: usize = 2;
    pub const COLOR: usize = 3;
}

/// Column positions of the Details sheet.
pub mod detail_cols {
    pub const LABEL: usize = 0;
    pub const HELPER_TEXT: usize = 1;
    pub const TYPE: usize = 2;
    pub const OPTIONS: usize = 3;
    pub const UNIVERSAL: usize = 4;
}

/// Spreadsheet storage: named sheets of cell grids.
pub trait Workbook {
    /// Display title of the spreadsheet document.
    fn title(&self) -> &str;

    /// Names of all sheets currently present.
    fn sheet_names(&self) -> Vec<String>;

    /// Read a whole sheet, or `None` if it does not exist.
    fn read_sheet(&self, name: &str) -> Result<Option<Grid>, SheetError>;

    /// Replace (or create) a sheet with the given grid.
    fn write_sheet(&mut self, name: &str, grid: &Grid) -> Result<(), SheetError>;

    /// Delete a sheet if present.
    fn remove_sheet(&mut self, name: &str) -> Result<(), SheetError>;

    /// Update a single cell of an existing sheet (0-based row including header).
    fn write_cell(
        &mut self,
        name: &str,
        row: usize,
        col: usize,
        value: CellValue,
    ) -> Result<(), SheetError> {
        let mut grid = self
            .read_sheet(name)?
            .ok_or_else(|| SheetError::missing_sheet(name))?;
        grid.set(row, col, value);
        self.write_sheet(name, &grid)
    }

    /// Directory the workbook lives in, for backends that have one.
    /// Used to place sibling artifacts such as imported icon folders.
    fn location(&self) -> Option<&Path> {
        None
    }

    /// Read a sheet that must exist.
    fn require_sheet(&self, name: &str) -> Result<Grid, SheetError> {
        self.read_sheet(name)?
            .ok_or_else(|| SheetError::missing_sheet(name))
    }
}
