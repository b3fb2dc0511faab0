//! Cell values and rectangular grids as read from a sheet.
//!
//! Every backend converts its raw cell content into [`CellValue`] exactly once,
//! so the rest of the pipeline matches on the tag instead of probing strings
//! for formulas or image objects.

use std::fmt;

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    /// Trimmed, non-empty text.
    Text(String),
    /// An image embedded in the cell, identified by its source URL.
    ImageRef(String),
}

impl CellValue {
    /// Build a cell from raw text, recognizing `=IMAGE("url")` formulas.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if let Some(url) = parse_image_formula(trimmed) {
            return Self::ImageRef(url);
        }
        Self::Text(trimmed.to_string())
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::parse(&value.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Text content, or `""` for empty cells and images.
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(s) => s,
            _ => "",
        }
    }

    /// Serialized form used by text-based backends.
    pub fn to_raw(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::ImageRef(url) => format!("=IMAGE(\"{}\")", url.replace('"', "\"\"")),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_raw())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

/// Parse `=IMAGE("url", ...)` (case-insensitive function name).
fn parse_image_formula(s: &str) -> Option<String> {
    let body = s.strip_prefix('=')?;
    let head = body.get(..6)?;
    if !head.eq_ignore_ascii_case("image(") {
        return None;
    }
    let args = body[6..].strip_suffix(')')?.trim_start();
    let rest = args.strip_prefix('"')?;

    let mut url = String::new();
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
                url.push('"');
                continue;
            }
            break;
        }
        url.push(c);
    }
    if url.is_empty() { None } else { Some(url) }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// A rectangular block of cells. Row 0 is the header row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Build a grid from string literals; convenient in tests and writers.
    pub fn from_strings<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|c| CellValue::parse(c.as_ref())).collect())
                .collect(),
        }
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn header(&self) -> &[CellValue] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Data rows (everything after the header).
    pub fn data_rows(&self) -> &[Vec<CellValue>] {
        if self.rows.is_empty() {
            &[]
        } else {
            &self.rows[1..]
        }
    }

    /// Data rows that contain at least one non-empty cell, paired with their
    /// 0-based data index so callers can still report the original sheet row.
    pub fn non_blank_rows(&self) -> impl Iterator<Item = (usize, &[CellValue])> {
        self.data_rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().any(|c| !c.is_empty()))
            .map(|(i, row)| (i, row.as_slice()))
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Set a cell, growing the grid as needed.
    pub fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let r = &mut self.rows[row];
        if r.len() <= col {
            r.resize(col + 1, CellValue::Empty);
        }
        r[col] = value;
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Cell `col` of a row slice, or [`CellValue::Empty`] when the row is short.
pub fn cell_at(row: &[CellValue], col: usize) -> &CellValue {
    row.get(col).unwrap_or(&EMPTY_CELL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_detects_empty() {
        assert_eq!(CellValue::parse("   "), CellValue::Empty);
        assert_eq!(CellValue::parse(" Animal "), CellValue::Text("Animal".into()));
    }

    #[test]
    fn parse_image_formula_variants() {
        assert_eq!(
            CellValue::parse("=IMAGE(\"https://x.test/a.png\")"),
            CellValue::ImageRef("https://x.test/a.png".into())
        );
        assert_eq!(
            CellValue::parse("=image(\"https://x.test/b.png\", 1)"),
            CellValue::ImageRef("https://x.test/b.png".into())
        );
        assert_eq!(
            CellValue::parse("=IMAGE()"),
            CellValue::Text("=IMAGE()".into())
        );
    }

    #[test]
    fn image_ref_round_trips_through_raw() {
        let cell = CellValue::ImageRef("https://x.test/q\"uote.png".into());
        assert_eq!(CellValue::parse(&cell.to_raw()), cell);
    }

    #[test]
    fn grid_set_grows_and_reads_back() {
        let mut grid = Grid::default();
        grid.set(2, 3, CellValue::text("x"));
        assert_eq!(grid.cell(2, 3).as_text(), "x");
        assert!(grid.cell(0, 0).is_empty());
        assert!(grid.cell(10, 10).is_empty());
        assert_eq!(grid.width(), 4);
    }

    #[test]
    fn non_blank_rows_keep_original_index() {
        let grid = Grid::from_strings(vec![
            vec!["Name", "Type"],
            vec!["a", "t"],
            vec!["", ""],
            vec!["b", "n"],
        ]);
        let indices: Vec<usize> = grid.non_blank_rows().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![0, 2]);
    }
}
