//! Extraction and merge engine.
//!
//! Reads a fixed set of cells plus one keyword-located settlement amount from
//! every source workbook and assembles one summary row per readable file.
//! A file that cannot be opened is counted and skipped; only a failure to
//! write the summary fails the batch.

pub mod engine;
pub mod error;
pub mod extract;
pub mod locator;
pub mod model;
pub mod plan;

pub use engine::{merge, MergeOptions};
pub use error::MergeError;
pub use extract::extract_file;
pub use locator::{locate_settlement, Settlement};
pub use model::{CellFault, ExtractionRecord, FieldValue, FileFailure, MergeResult};
pub use plan::ExtractionPlan;
