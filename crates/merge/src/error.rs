use billmerge_config::ConfigError;
use thiserror::Error;

/// Reasons a merge is refused before any file is read.
///
/// Per-file and per-cell problems never surface here; they are counted in the
/// `MergeResult`. Destination write failures are reported there as well.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("no input files given")]
    NoInputFiles,
    #[error(transparent)]
    InvalidPreset(#[from] ConfigError),
}
