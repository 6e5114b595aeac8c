use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;

use billmerge_config::Preset;
use billmerge_io::{write_summary, SummaryTable};
use tracing::{error, info, warn};

use crate::error::MergeError;
use crate::extract::extract_file;
use crate::model::{ExtractionRecord, FileFailure, MergeResult};
use crate::plan::ExtractionPlan;

#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Worker threads for extraction. `None` or 1 reads files one at a time.
    pub jobs: Option<NonZeroUsize>,
}

impl MergeOptions {
    pub fn with_jobs(jobs: usize) -> Self {
        Self {
            jobs: NonZeroUsize::new(jobs),
        }
    }

    fn workers(&self, files: usize) -> usize {
        self.jobs.map_or(1, NonZeroUsize::get).min(files).max(1)
    }
}

/// Extract every file with `preset` and write one summary workbook to `output`.
///
/// Fails up front when there is nothing to merge or the preset is unusable.
/// After that, unreadable files are counted and skipped, and a destination
/// that cannot be written is reported through `overall_success = false`.
pub fn merge(
    files: &[PathBuf],
    preset: &Preset,
    output: &Path,
    options: &MergeOptions,
) -> Result<MergeResult, MergeError> {
    if files.is_empty() {
        return Err(MergeError::NoInputFiles);
    }
    let plan = ExtractionPlan::from_preset(preset)?;
    let workers = options.workers(files.len());

    info!(preset = %plan.preset_name, files = files.len(), workers, output = %output.display(), "merge started");

    let outcomes = if workers > 1 {
        extract_parallel(files, &plan, workers)
    } else {
        files.iter().map(|path| extract_file(path, &plan)).collect()
    };

    let mut records = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(record) => records.push(record),
            Err(failure) => {
                warn!(path = %failure.path.display(), reason = %failure.reason, "file skipped");
                failures.push(failure);
            }
        }
    }

    let table = summary_table(&plan, &records);
    let cell_faults = records.iter().flat_map(ExtractionRecord::cell_faults).collect();

    let (overall_success, message) = match write_summary(&table, output) {
        Ok(()) => (true, "merge complete".to_string()),
        Err(e) => {
            error!(output = %output.display(), error = %e, "summary not written");
            (false, format!("failed to write summary: {e}"))
        }
    };

    info!(
        succeeded = records.len(),
        failed = failures.len(),
        overall_success,
        "merge finished"
    );

    Ok(MergeResult {
        overall_success,
        success_count: records.len(),
        error_count: failures.len(),
        message,
        output: output.to_path_buf(),
        records,
        failures,
        cell_faults,
    })
}

/// Sequence numbers count successful files only, so they stay contiguous.
fn summary_table(plan: &ExtractionPlan, records: &[ExtractionRecord]) -> SummaryTable {
    let mut table = SummaryTable::new(plan.headers());
    for (seq, record) in (1u32..).zip(records) {
        table.push_row(record.to_row(seq));
    }
    table
}

/// Workers pull the next index from a shared counter; results land in their
/// input slot so the output order does not depend on scheduling.
fn extract_parallel(
    files: &[PathBuf],
    plan: &ExtractionPlan,
    workers: usize,
) -> Vec<Result<ExtractionRecord, FileFailure>> {
    let next = AtomicUsize::new(0);
    let slots: Mutex<Vec<Option<Result<ExtractionRecord, FileFailure>>>> =
        Mutex::new((0..files.len()).map(|_| None).collect());

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                let index = next.fetch_add(1, Ordering::Relaxed);
                let Some(path) = files.get(index) else { break };
                let outcome = extract_file(path, plan);
                let mut slots = slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                slots[index] = Some(outcome);
            });
        }
    });

    slots
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .into_iter()
        .zip(files)
        .map(|(slot, path)| slot.unwrap_or_else(|| Err(FileFailure::new(path, "file was not processed"))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use billmerge_config::Mapping;

    fn preset() -> Preset {
        let mut preset = Preset::new("Test");
        preset.mappings = vec![Mapping::new("date", "A1")];
        preset
    }

    #[test]
    fn empty_file_list_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = merge(&[], &preset(), &dir.path().join("out.xlsx"), &MergeOptions::default());
        assert!(matches!(result, Err(MergeError::NoInputFiles)));
        assert!(!dir.path().join("out.xlsx").exists());
    }

    #[test]
    fn invalid_preset_is_rejected_before_any_io() {
        let dir = tempfile::tempdir().unwrap();
        let mut preset = preset();
        preset.mappings.clear();

        let result = merge(
            &[dir.path().join("a.xlsx")],
            &preset,
            &dir.path().join("out.xlsx"),
            &MergeOptions::default(),
        );

        assert!(matches!(result, Err(MergeError::InvalidPreset(_))));
        assert!(!dir.path().join("out.xlsx").exists());
    }

    #[test]
    fn worker_count_is_bounded_by_file_count() {
        assert_eq!(MergeOptions::default().workers(10), 1);
        assert_eq!(MergeOptions::with_jobs(0).workers(10), 1);
        assert_eq!(MergeOptions::with_jobs(8).workers(3), 3);
        assert_eq!(MergeOptions::with_jobs(4).workers(10), 4);
    }

    #[test]
    fn all_missing_files_still_write_headers() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.xlsx");
        let files = vec![dir.path().join("a.xlsx"), dir.path().join("b.xlsx")];

        let result = merge(&files, &preset(), &out, &MergeOptions::default()).unwrap();

        assert!(result.overall_success);
        assert_eq!(result.success_count, 0);
        assert_eq!(result.error_count, 2);
        assert_eq!(result.failures[0].path, files[0]);
        assert_eq!(result.failures[1].path, files[1]);
        assert!(out.exists());
    }
}
