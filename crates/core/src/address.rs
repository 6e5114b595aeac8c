//! A1-style cell addressing.
//!
//! A `CellAddress` points at one cell of a worksheet. Coordinates are stored
//! 0-based (the way calamine and rust_xlsxwriter index cells); the textual form
//! is the familiar `D5` notation with 1-based rows.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Largest column Excel can address (XFD), 0-based.
pub const MAX_COL: u32 = 16_383;

/// Largest row Excel can address, 0-based.
pub const MAX_ROW: u32 = 1_048_575;

static CELL_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]+[0-9]+$").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("empty cell reference")]
    Empty,
    #[error("'{0}' is not a cell reference (expected column letters followed by a row number, e.g. D5)")]
    Malformed(String),
    #[error("'{0}' has a leading zero in its row number")]
    LeadingZero(String),
    #[error("'{0}' is outside the worksheet grid")]
    OutOfRange(String),
    #[error("'{0}' is not a column (expected letters only, e.g. D or AA)")]
    BadColumn(String),
}

/// Position of a single cell (0-based row and column).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    pub row: u32,
    pub col: u32,
}

impl CellAddress {
    #[inline]
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse an A1-style reference, case-insensitive. Rows start at 1 and may
    /// not carry leading zeros.
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }

        let split = trimmed
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| AddressError::Malformed(trimmed.to_string()))?;
        let (letters, digits) = trimmed.split_at(split);

        if letters.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(AddressError::Malformed(trimmed.to_string()));
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(AddressError::LeadingZero(trimmed.to_string()));
        }

        let col = letters_to_col(letters).map_err(|e| match e {
            AddressError::OutOfRange(_) => AddressError::OutOfRange(trimmed.to_string()),
            _ => AddressError::Malformed(trimmed.to_string()),
        })?;

        let row: u32 = digits
            .parse()
            .map_err(|_| AddressError::OutOfRange(trimmed.to_string()))?;
        if row == 0 || row - 1 > MAX_ROW {
            return Err(AddressError::OutOfRange(trimmed.to_string()));
        }

        Ok(Self { row: row - 1, col })
    }

    /// The cell one column to the right, if still on the grid.
    pub fn right(&self) -> Option<Self> {
        (self.col < MAX_COL).then(|| Self::new(self.row, self.col + 1))
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", col_to_letters(self.col), self.row + 1)
    }
}

impl FromStr for CellAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Convert 0-based column index to Excel-style letter(s).
pub fn col_to_letters(col: u32) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// Convert column letters (case-insensitive) to a 0-based index (A=0, Z=25, AA=26).
pub fn letters_to_col(letters: &str) -> Result<u32, AddressError> {
    let trimmed = letters.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AddressError::BadColumn(trimmed.to_string()));
    }

    let mut col: u64 = 0;
    for ch in trimmed.chars() {
        col = col * 26 + (ch.to_ascii_uppercase() as u64 - 'A' as u64 + 1);
        if col - 1 > MAX_COL as u64 {
            return Err(AddressError::OutOfRange(trimmed.to_string()));
        }
    }
    Ok((col - 1) as u32)
}

/// Build an A1 reference from 1-based row and column numbers.
pub fn cell_reference(row: u32, col: u32) -> String {
    format!("{}{}", col_to_letters(col.saturating_sub(1)), row)
}

/// Loose syntactic check used by preset editors: letters followed by digits
/// after uppercasing. `CellAddress::parse` is the stricter form used before a
/// merge runs.
pub fn validate_cell_reference(input: &str) -> bool {
    CELL_REF.is_match(&input.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_to_letters() {
        assert_eq!(col_to_letters(0), "A");
        assert_eq!(col_to_letters(25), "Z");
        assert_eq!(col_to_letters(26), "AA");
        assert_eq!(col_to_letters(51), "AZ");
        assert_eq!(col_to_letters(701), "ZZ");
        assert_eq!(col_to_letters(702), "AAA");
        assert_eq!(col_to_letters(MAX_COL), "XFD");
    }

    #[test]
    fn test_letters_to_col() {
        assert_eq!(letters_to_col("A"), Ok(0));
        assert_eq!(letters_to_col("d"), Ok(3));
        assert_eq!(letters_to_col("AA"), Ok(26));
        assert_eq!(letters_to_col("XFD"), Ok(MAX_COL));
        assert!(matches!(letters_to_col("XFE"), Err(AddressError::OutOfRange(_))));
        assert!(matches!(letters_to_col(""), Err(AddressError::BadColumn(_))));
        assert!(matches!(letters_to_col("D5"), Err(AddressError::BadColumn(_))));
    }

    #[test]
    fn parse_basic_references() {
        assert_eq!(CellAddress::parse("A1").unwrap(), CellAddress::new(0, 0));
        assert_eq!(CellAddress::parse("d5").unwrap(), CellAddress::new(4, 3));
        assert_eq!(CellAddress::parse(" AA10 ").unwrap(), CellAddress::new(9, 26));
    }

    #[test]
    fn parse_rejects_bad_references() {
        assert_eq!(CellAddress::parse(""), Err(AddressError::Empty));
        assert!(matches!(CellAddress::parse("5D"), Err(AddressError::Malformed(_))));
        assert!(matches!(CellAddress::parse("D"), Err(AddressError::Malformed(_))));
        assert!(matches!(CellAddress::parse("D5X"), Err(AddressError::Malformed(_))));
        assert!(matches!(CellAddress::parse("D05"), Err(AddressError::LeadingZero(_))));
        assert!(matches!(CellAddress::parse("D0"), Err(AddressError::OutOfRange(_))));
        assert!(matches!(CellAddress::parse("A99999999999"), Err(AddressError::OutOfRange(_))));
    }

    #[test]
    fn display_round_trips_through_parse() {
        let addr = CellAddress::parse("ab12").unwrap();
        assert_eq!(addr.to_string(), "AB12");
        assert_eq!(addr.right().unwrap().to_string(), "AC12");
        assert_eq!(CellAddress::new(0, MAX_COL).right(), None);
    }

    #[test]
    fn test_cell_reference() {
        assert_eq!(cell_reference(1, 1), "A1");
        assert_eq!(cell_reference(5, 2), "B5");
        assert_eq!(cell_reference(100, 26), "Z100");
        assert_eq!(cell_reference(1, 27), "AA1");
    }

    #[test]
    fn validate_is_case_insensitive_and_loose() {
        assert!(validate_cell_reference("A1"));
        assert!(validate_cell_reference("aa10"));
        assert!(validate_cell_reference("Z999"));
        assert!(validate_cell_reference("A0"));
        assert!(!validate_cell_reference(""));
        assert!(!validate_cell_reference("1A"));
        assert!(!validate_cell_reference("A1:B2"));
        assert!(!validate_cell_reference(" A1"));
    }
}
