// Input collection for `merge`: explicit files plus workbooks found under --dir

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::CliError;

const WORKBOOK_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Explicit files first, in the order given, then each folder's workbooks in
/// name order. Repeated paths keep their first position. `output` is never an
/// input, so a summary written into a scanned folder is not merged again.
pub fn collect_inputs(files: &[PathBuf], dirs: &[PathBuf], output: &Path) -> Result<Vec<PathBuf>, CliError> {
    let mut seen = HashSet::new();
    let mut inputs = Vec::new();
    let output = identity(output);

    let mut accept = |path: PathBuf, inputs: &mut Vec<PathBuf>| {
        let id = identity(&path);
        if id == output {
            debug!(path = %path.display(), "skipping the merge output");
            return;
        }
        if seen.insert(id) {
            inputs.push(path);
        }
    };

    for file in files {
        accept(file.clone(), &mut inputs);
    }

    for dir in dirs {
        if !dir.is_dir() {
            return Err(CliError::usage(format!("not a directory: {}", dir.display())));
        }
        for entry in WalkDir::new(dir)
            .follow_links(false)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = entry.map_err(|e| CliError::io(format!("failed to walk {}: {e}", dir.display())))?;
            if !entry.file_type().is_file() || !is_workbook(entry.path()) {
                continue;
            }
            accept(entry.into_path(), &mut inputs);
        }
    }

    debug!(count = inputs.len(), "inputs collected");
    Ok(inputs)
}

/// Canonical form of `path` for comparison. A file that does not exist yet is
/// resolved through its parent folder.
fn identity(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() { Path::new(".") } else { parent };
            parent
                .canonicalize()
                .map(|p| p.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

fn is_workbook(path: &Path) -> bool {
    let is_lock_file = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("~$"));
    !is_lock_file
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| WORKBOOK_EXTENSIONS.iter().any(|w| e.eq_ignore_ascii_case(w)))
}
