// File I/O: source workbooks in (calamine), merged summary out (rust_xlsxwriter)

pub mod preview;
pub mod summary;
pub mod xlsx;

pub use calamine::{Data, Range};
pub use preview::{preview, Preview};
pub use summary::{write_summary, SummaryTable, WriteError};
pub use xlsx::{SourceError, SourceSheet};
