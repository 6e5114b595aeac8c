// Source workbook reading (xlsx, xls, xlsb, ods)
//
// Only the first worksheet of a workbook is ever loaded. Values are the cached
// results calamine finds in the file; formulas are never evaluated here.

use std::path::{Path, PathBuf};

use billmerge_core::{CellAddress, CellOutcome, CellValue};
use calamine::{open_workbook_auto, Data, ExcelDateTime, Range, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::debug;

/// Failure to load a source workbook. Always file-level: one of these means
/// the whole file is skipped.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("{} contains no worksheets", path.display())]
    NoSheets { path: PathBuf },
    #[error("failed to read worksheet '{sheet}' in {}: {source}", path.display())]
    Sheet {
        path: PathBuf,
        sheet: String,
        #[source]
        source: calamine::Error,
    },
}

/// The first worksheet of an opened workbook, fully loaded into memory.
#[derive(Debug, Clone)]
pub struct SourceSheet {
    name: String,
    range: Range<Data>,
}

impl SourceSheet {
    /// Open a workbook and load its first worksheet.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let mut workbook: Sheets<_> = open_workbook_auto(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| SourceError::NoSheets { path: path.to_path_buf() })?;

        let range = workbook.worksheet_range(&name).map_err(|source| SourceError::Sheet {
            path: path.to_path_buf(),
            sheet: name.clone(),
            source,
        })?;

        debug!(path = %path.display(), sheet = %name, size = ?range.get_size(), "loaded worksheet");
        Ok(Self { name, range })
    }

    /// Wrap an already-loaded range (used by callers that build sheets in memory).
    pub fn from_range(name: impl Into<String>, range: Range<Data>) -> Self {
        Self { name: name.into(), range }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve one cell to its typed value. Cells outside the used range are
    /// empty; error cells (`#DIV/0!` and friends) are reported as failed reads.
    pub fn read(&self, addr: CellAddress) -> CellOutcome {
        match self.range.get_value((addr.row, addr.col)) {
            Some(data) => data_to_outcome(data),
            None => CellOutcome::Value(CellValue::Empty),
        }
    }

    /// Like `read`, with failed reads degraded to empty.
    pub fn value(&self, addr: CellAddress) -> CellValue {
        match self.read(addr) {
            CellOutcome::Value(v) => v,
            CellOutcome::Failed(_) => CellValue::Empty,
        }
    }

    /// Last used row (0-based), or `None` for an empty sheet.
    pub fn last_row(&self) -> Option<u32> {
        self.range.end().map(|(row, _)| row)
    }

    /// Last used column (0-based), or `None` for an empty sheet.
    pub fn last_col(&self) -> Option<u32> {
        self.range.end().map(|(_, col)| col)
    }
}

/// Convert a calamine cell into a typed outcome.
pub(crate) fn data_to_outcome(data: &Data) -> CellOutcome {
    let value = match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => return CellOutcome::Failed(format!("#{:?}", e)),
        Data::DateTime(dt) => excel_datetime(dt),
        Data::DateTimeIso(s) => parse_iso_datetime(s).map(CellValue::Date).unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    };
    CellOutcome::Value(value)
}

/// Date-formatted cells become dates (calamine applies the workbook's 1900 or
/// 1904 epoch). Durations and bare times of day have no calendar date and are
/// kept as clock text instead.
fn excel_datetime(dt: &ExcelDateTime) -> CellValue {
    let serial = dt.as_f64();
    if dt.is_duration() || (0.0..1.0).contains(&serial) {
        return CellValue::Text(clock_text(serial));
    }
    dt.as_datetime()
        .map(CellValue::Date)
        .unwrap_or(CellValue::Number(serial))
}

/// Day fraction as `hh:mm:ss`; hours run past 24 for long durations.
fn clock_text(serial: f64) -> String {
    let sign = if serial < 0.0 { "-" } else { "" };
    let total = (serial.abs() * 86_400.0).round() as u64;
    format!("{sign}{:02}:{:02}:{:02}", total / 3600, total / 60 % 60, total % 60)
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{Format, Formula, Workbook};

    fn addr(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    fn write_fixture(dir: &Path) -> PathBuf {
        let path = dir.join("bill.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Bill").unwrap();
        sheet.write_string(0, 0, "Invoice 17").unwrap();
        sheet.write_number(1, 1, 42.5).unwrap();
        sheet.write_boolean(2, 2, true).unwrap();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        sheet.write_number_with_format(3, 0, 45366.0, &date_format).unwrap();
        sheet.write_number(0, 3, 2.0).unwrap();
        sheet.write_formula(1, 3, Formula::new("=D1*2").set_result("4")).unwrap();

        let second = workbook.add_worksheet();
        second.set_name("Other").unwrap();
        second.write_string(0, 0, "ignored").unwrap();

        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn reads_typed_values_from_first_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = SourceSheet::open(&write_fixture(dir.path())).unwrap();

        assert_eq!(sheet.name(), "Bill");
        assert_eq!(sheet.value(addr("A1")), CellValue::Text("Invoice 17".into()));
        assert_eq!(sheet.value(addr("B2")), CellValue::Number(42.5));
        assert_eq!(sheet.value(addr("C3")), CellValue::Bool(true));
        assert_eq!(sheet.value(addr("A4")).to_text(), "2024-03-15");
        assert!(matches!(sheet.value(addr("A4")), CellValue::Date(_)));
    }

    #[test]
    fn formula_cells_yield_cached_results() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = SourceSheet::open(&write_fixture(dir.path())).unwrap();

        let value = sheet.value(addr("D2"));
        assert_eq!(value.to_text(), "4");
    }

    #[test]
    fn out_of_range_cells_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = SourceSheet::open(&write_fixture(dir.path())).unwrap();

        assert_eq!(sheet.read(addr("Z100")), CellOutcome::Value(CellValue::Empty));
        assert_eq!(sheet.read(addr("B1")), CellOutcome::Value(CellValue::Empty));
        assert_eq!(sheet.last_row(), Some(3));
        assert_eq!(sheet.last_col(), Some(3));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceSheet::open(&dir.path().join("nope.xlsx")).unwrap_err();
        assert!(matches!(err, SourceError::Open { .. }));
        assert!(err.to_string().contains("nope.xlsx"));
    }

    #[test]
    fn corrupt_file_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"this is not a zip archive").unwrap();
        assert!(SourceSheet::open(&path).is_err());
    }

    #[test]
    fn error_cells_are_failed_reads() {
        let mut range = Range::new((0, 0), (0, 1));
        range.set_value((0, 0), Data::Error(calamine::CellErrorType::Div0));
        range.set_value((0, 1), Data::String(String::new()));
        let sheet = SourceSheet::from_range("mem", range);

        assert!(sheet.read(addr("A1")).is_failed());
        assert_eq!(sheet.value(addr("A1")), CellValue::Empty);
        assert_eq!(sheet.read(addr("B1")), CellOutcome::Value(CellValue::Empty));
    }

    #[test]
    fn times_and_durations_are_not_dates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shifts.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let time_format = Format::new().set_num_format("hh:mm");
        let duration_format = Format::new().set_num_format("[h]:mm");
        sheet.write_number_with_format(0, 0, 0.5, &time_format).unwrap();
        sheet.write_number_with_format(0, 1, 1.5, &duration_format).unwrap();
        workbook.save(&path).unwrap();

        let sheet = SourceSheet::open(&path).unwrap();

        assert_eq!(sheet.value(addr("A1")), CellValue::Text("12:00:00".into()));
        assert_eq!(sheet.value(addr("B1")), CellValue::Text("36:00:00".into()));
    }

    #[test]
    fn date_with_time_keeps_its_calendar_day() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stamp.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let format = Format::new().set_num_format("yyyy-mm-dd hh:mm");
        sheet.write_number_with_format(0, 0, 45292.75, &format).unwrap();
        workbook.save(&path).unwrap();

        let value = SourceSheet::open(&path).unwrap().value(addr("A1"));

        assert!(matches!(value, CellValue::Date(_)));
        assert_eq!(value.to_text(), "2024-01-01");
    }

    #[test]
    fn clock_text_formats_day_fractions() {
        assert_eq!(clock_text(0.0), "00:00:00");
        assert_eq!(clock_text(0.75), "18:00:00");
        assert_eq!(clock_text(1.5), "36:00:00");
        assert_eq!(clock_text(-0.25), "-06:00:00");
    }

    #[test]
    fn iso_datetime_strings_become_dates() {
        let outcome = data_to_outcome(&Data::DateTimeIso("2023-07-04T10:30:00".into()));
        assert_eq!(outcome.value().to_text(), "2023-07-04");

        let outcome = data_to_outcome(&Data::DateTimeIso("not a date".into()));
        assert_eq!(outcome.value(), &CellValue::Text("not a date".into()));
    }
}
