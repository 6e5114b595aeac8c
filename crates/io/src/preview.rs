//! Bounded, read-only snapshot of a workbook's first sheet.
//!
//! Used to discover cell addresses before writing a preset. The grid always
//! starts at A1 and is clipped to both the requested bounds and the sheet's
//! used area.

use std::path::Path;

use billmerge_core::{col_to_letters, CellAddress, CellValue};
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

use crate::xlsx::{SourceError, SourceSheet};

#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    /// Worksheet the grid was taken from
    pub sheet: String,
    /// Used rows in the sheet (may exceed the grid height)
    pub total_rows: u32,
    /// Used columns in the sheet (may exceed the grid width)
    pub total_cols: u32,
    /// Row-major grid; dates are ISO text, unreadable cells are empty.
    /// Blank cells serialize as `""`.
    #[serde(serialize_with = "serialize_grid")]
    pub rows: Vec<Vec<CellValue>>,
}

struct GridCell<'a>(&'a CellValue);

impl Serialize for GridCell<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            CellValue::Empty => serializer.serialize_str(""),
            value => value.serialize(serializer),
        }
    }
}

fn serialize_grid<S: Serializer>(rows: &[Vec<CellValue>], serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(rows.len()))?;
    for row in rows {
        let cells: Vec<GridCell<'_>> = row.iter().map(GridCell).collect();
        seq.serialize_element(&cells)?;
    }
    seq.end()
}

impl Preview {
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Column letters for the grid's columns (A, B, ...)
    pub fn column_labels(&self) -> Vec<String> {
        (0..self.width() as u32).map(col_to_letters).collect()
    }

    /// The grid as display strings; empty cells are "".
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(CellValue::to_text).collect())
            .collect()
    }

    pub fn is_truncated(&self) -> bool {
        self.rows.len() < self.total_rows as usize || self.width() < self.total_cols as usize
    }
}

/// Open `path` and snapshot at most `max_rows` x `max_cols` cells.
pub fn preview(path: &Path, max_rows: u32, max_cols: u32) -> Result<Preview, SourceError> {
    let sheet = SourceSheet::open(path)?;
    Ok(sheet.preview(max_rows, max_cols))
}

impl SourceSheet {
    pub fn preview(&self, max_rows: u32, max_cols: u32) -> Preview {
        let total_rows = self.last_row().map_or(0, |r| r + 1);
        let total_cols = self.last_col().map_or(0, |c| c + 1);
        let height = total_rows.min(max_rows);
        let width = total_cols.min(max_cols);

        let rows = (0..height)
            .map(|row| {
                (0..width)
                    .map(|col| self.value(CellAddress::new(row, col)).normalized())
                    .collect()
            })
            .collect();

        Preview {
            sheet: self.name().to_string(),
            total_rows,
            total_cols,
            rows,
        }
    }
}
