// Configuration: extraction presets and where they live on disk

pub mod preset;
pub mod store;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use billmerge_core::validate_cell_reference;
pub use preset::{Mapping, Preset, FILE_NAME_HEADER, RESERVED_HEADERS, SEQUENCE_HEADER, SETTLEMENT_HEADER};
pub use store::{PresetStore, PresetUpdate};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize presets: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("preset '{0}' not found")]
    NotFound(String),
    #[error("preset '{0}' already exists")]
    AlreadyExists(String),
    #[error("invalid preset '{preset}': {}", issues.join("; "))]
    Invalid { preset: String, issues: Vec<String> },
}
