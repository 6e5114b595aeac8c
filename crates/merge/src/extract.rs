use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use billmerge_core::CellOutcome;
use billmerge_io::SourceSheet;
use tracing::{debug, warn};

use crate::locator::{locate_settlement, Settlement};
use crate::model::{ExtractionRecord, FieldValue, FileFailure};
use crate::plan::ExtractionPlan;

/// Read every planned field plus the settlement amount from one file.
///
/// The file is opened once. Any problem opening or parsing it, including a
/// panic inside the reader, comes back as a `FileFailure`.
pub fn extract_file(path: &Path, plan: &ExtractionPlan) -> Result<ExtractionRecord, FileFailure> {
    match panic::catch_unwind(AssertUnwindSafe(|| extract_inner(path, plan))) {
        Ok(result) => result,
        Err(_) => {
            warn!(path = %path.display(), "reader panicked");
            Err(FileFailure::new(path, "reader panicked while parsing the workbook"))
        }
    }
}

fn extract_inner(path: &Path, plan: &ExtractionPlan) -> Result<ExtractionRecord, FileFailure> {
    let sheet = SourceSheet::open(path).map_err(|e| FileFailure::new(path, e.to_string()))?;

    let fields = plan
        .fields
        .iter()
        .map(|field| {
            let outcome = match sheet.read(field.address) {
                CellOutcome::Value(v) => v.normalized().into(),
                failed => {
                    warn!(path = %path.display(), field = %field.name, cell = %field.address, ?failed, "cell unreadable");
                    failed
                }
            };
            FieldValue {
                name: field.name.clone(),
                outcome,
            }
        })
        .collect();

    let settlement = match locate_settlement(&sheet, plan.search_column, &plan.keyword) {
        Settlement::Found { label, value } => Settlement::Found {
            label,
            value: value.normalized(),
        },
        not_found => not_found,
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    debug!(path = %path.display(), fields = plan.fields.len(), settlement = settlement.is_found(), "extracted");
    Ok(ExtractionRecord {
        file_name,
        path: path.to_path_buf(),
        fields,
        settlement,
    })
}
