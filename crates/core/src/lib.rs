// Core types shared by the reader, the preset store and the merge engine

pub mod address;
pub mod value;

pub use address::{cell_reference, col_to_letters, letters_to_col, validate_cell_reference, AddressError, CellAddress};
pub use value::{CellOutcome, CellValue, ISO_DATE_FORMAT};
