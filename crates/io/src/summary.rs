// Merged summary export (xlsx only)
//
// The whole table is held in memory before anything touches disk. The file is
// written next to the destination under a temporary name and renamed into
// place, so a failed save never leaves a truncated workbook at the target path.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use billmerge_core::{CellValue, ISO_DATE_FORMAT};
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet, XlsxError};
use thiserror::Error;
use tracing::{debug, warn};

/// Name of the single worksheet in the summary workbook.
pub const SHEET_NAME: &str = "Merged";

/// Header fill (light blue).
pub const HEADER_FILL: u32 = 0xCCE5FF;

/// Fixed width applied to every column, in Excel character units.
pub const COLUMN_WIDTH: f64 = 15.0;

/// Maximum columns a worksheet can hold.
const MAX_COLUMNS: usize = 16_384;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("summary has {0} columns; a worksheet holds at most 16384")]
    TooManyColumns(usize),
    #[error("summary has too many rows for one worksheet")]
    TooManyRows,
    #[error("failed to build summary worksheet: {0}")]
    Build(#[from] XlsxError),
    #[error("failed to save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },
    #[error("failed to move summary into place at {}: {source}", path.display())]
    Rename {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A header row plus data rows, ready to be written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SummaryTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }
}

/// Write `table` to `path` as a single-sheet xlsx workbook.
pub fn write_summary(table: &SummaryTable, path: &Path) -> Result<(), WriteError> {
    if table.headers.len() > MAX_COLUMNS {
        return Err(WriteError::TooManyColumns(table.headers.len()));
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;
    fill_worksheet(worksheet, table)?;

    // Atomic write: save to a sibling temp file first, then rename
    let temp_path = temp_sibling(path);
    if let Err(source) = workbook.save(&temp_path) {
        discard(&temp_path);
        return Err(WriteError::Save { path: path.to_path_buf(), source });
    }
    if let Err(source) = fs::rename(&temp_path, path) {
        discard(&temp_path);
        return Err(WriteError::Rename { path: path.to_path_buf(), source });
    }

    debug!(path = %path.display(), rows = table.rows.len(), "summary written");
    Ok(())
}

fn fill_worksheet(worksheet: &mut Worksheet, table: &SummaryTable) -> Result<(), WriteError> {
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_FILL));

    for (col, header) in table.headers.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, header, &header_format)?;
        worksheet.set_column_width(col, COLUMN_WIDTH)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_num = u32::try_from(row_idx + 1).map_err(|_| WriteError::TooManyRows)?;
        for (col, value) in row.iter().enumerate().take(MAX_COLUMNS) {
            write_value(worksheet, row_num, col as u16, value)?;
        }
    }
    Ok(())
}

fn write_value(worksheet: &mut Worksheet, row: u32, col: u16, value: &CellValue) -> Result<(), XlsxError> {
    match value {
        CellValue::Empty => {}
        CellValue::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::Date(dt) => {
            worksheet.write_string(row, col, dt.format(ISO_DATE_FORMAT).to_string())?;
        }
    }
    Ok(())
}

/// `out/summary.xlsx` -> `out/.summary.xlsx.tmp`
fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "summary.xlsx".to_string());
    path.with_file_name(format!(".{file_name}.tmp"))
}

fn discard(temp_path: &Path) {
    if temp_path.exists() {
        if let Err(e) = fs::remove_file(temp_path) {
            warn!(path = %temp_path.display(), error = %e, "could not remove temporary summary file");
        }
    }
}
