use std::path::{Path, PathBuf};

use billmerge_core::{CellOutcome, CellValue};
use serde::Serialize;

use crate::locator::Settlement;

// ---------------------------------------------------------------------------
// Per-file extraction
// ---------------------------------------------------------------------------

/// One mapped field of one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValue {
    pub name: String,
    pub outcome: CellOutcome,
}

/// Everything read from one source file, fields in preset order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionRecord {
    pub file_name: String,
    pub path: PathBuf,
    pub fields: Vec<FieldValue>,
    pub settlement: Settlement,
}

impl ExtractionRecord {
    pub fn field(&self, name: &str) -> Option<&CellOutcome> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.outcome)
    }

    pub fn settlement_amount(&self) -> Option<&CellValue> {
        self.settlement.amount()
    }

    /// Summary row: `[seq, file name, fields..., settlement]`.
    pub fn to_row(&self, sequence: u32) -> Vec<CellValue> {
        let mut row = Vec::with_capacity(self.fields.len() + 3);
        row.push(CellValue::Number(sequence as f64));
        row.push(CellValue::Text(self.file_name.clone()));
        row.extend(self.fields.iter().map(|f| f.outcome.value().clone()));
        row.push(self.settlement.to_cell_value());
        row
    }

    /// Fields whose cell could not be read (as opposed to being blank).
    pub fn cell_faults(&self) -> impl Iterator<Item = CellFault> + '_ {
        self.fields.iter().filter_map(move |f| {
            f.outcome.failure().map(|reason| CellFault {
                file_name: self.file_name.clone(),
                field: f.name.clone(),
                reason: reason.to_string(),
            })
        })
    }
}

/// A source file that was skipped, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl FileFailure {
    pub fn new(path: &Path, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// A mapped cell that held an unreadable value; written as blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellFault {
    pub file_name: String,
    pub field: String,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Batch result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MergeResult {
    /// False only when the summary could not be written.
    pub overall_success: bool,
    pub success_count: usize,
    pub error_count: usize,
    pub message: String,
    pub output: PathBuf,
    /// Successfully read files, in input order.
    pub records: Vec<ExtractionRecord>,
    /// Skipped files, in input order.
    pub failures: Vec<FileFailure>,
    pub cell_faults: Vec<CellFault>,
}

impl MergeResult {
    pub fn processed(&self) -> usize {
        self.success_count + self.error_count
    }

    pub fn has_failures(&self) -> bool {
        self.error_count > 0
    }
}
