//! Settlement amount search.
//!
//! The settlement label sits in a known column but on a row that varies
//! between bill templates. The column is scanned top to bottom for the first
//! cell whose text contains the keyword; the amount is the cell to its right.

use billmerge_core::{CellAddress, CellValue};
use billmerge_io::SourceSheet;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Settlement {
    /// Keyword found at `label` (A1 reference); `value` is the neighbouring cell.
    Found { label: String, value: CellValue },
    /// The keyword does not occur in the search column.
    NotFound,
}

impl Settlement {
    /// The amount to report, if the label was found and its neighbour is not blank.
    pub fn amount(&self) -> Option<&CellValue> {
        match self {
            Settlement::Found { value, .. } if !value.is_empty() => Some(value),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Settlement::Found { .. })
    }

    /// Value for the summary row; absent amounts are empty cells.
    pub fn to_cell_value(&self) -> CellValue {
        self.amount().cloned().unwrap_or_default()
    }
}

/// Scan `column` (0-based) for the first cell containing `keyword` and return
/// the value one column to the right. Numeric-looking text is returned as a
/// number.
pub fn locate_settlement(sheet: &SourceSheet, column: u32, keyword: &str) -> Settlement {
    let Some(last_row) = sheet.last_row() else {
        return Settlement::NotFound;
    };

    for row in 0..=last_row {
        let label = CellAddress::new(row, column);
        let text = sheet.value(label);
        if text.is_empty() || !text.to_text().contains(keyword) {
            continue;
        }

        let value = label
            .right()
            .map(|neighbour| sheet.value(neighbour))
            .unwrap_or_default()
            .numeric_if_parsable();
        debug!(sheet = sheet.name(), label = %label, ?value, "settlement label found");
        return Settlement::Found {
            label: label.to_string(),
            value,
        };
    }

    Settlement::NotFound
}
