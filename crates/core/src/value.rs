use chrono::NaiveDateTime;
use serde::Serialize;

/// Rendering used for every date that leaves the reader.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// The last computed value of a worksheet cell.
///
/// Formula cells carry their cached result; formula text never appears here.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Text form of the value, as used for keyword matching and plain output.
    /// Integral numbers print without a decimal part.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Date(dt) => dt.format(ISO_DATE_FORMAT).to_string(),
        }
    }

    /// Dates become ISO calendar-date text; everything else is unchanged.
    pub fn normalized(self) -> Self {
        match self {
            CellValue::Date(dt) => CellValue::Text(dt.format(ISO_DATE_FORMAT).to_string()),
            other => other,
        }
    }

    /// Text that parses as a finite decimal number becomes a `Number`;
    /// anything else is returned unmodified.
    pub fn numeric_if_parsable(self) -> Self {
        match self {
            CellValue::Text(s) => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => CellValue::Number(n),
                _ => CellValue::Text(s),
            },
            other => other,
        }
    }
}

/// Result of reading one mapped cell.
///
/// Keeps "the cell is genuinely empty" (`Value(CellValue::Empty)`) apart from
/// "the cell could not be read" (`Failed`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellOutcome {
    Value(CellValue),
    Failed(String),
}

impl CellOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, CellOutcome::Failed(_))
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            CellOutcome::Failed(reason) => Some(reason),
            CellOutcome::Value(_) => None,
        }
    }

    /// The value to place in output; failed reads degrade to empty.
    pub fn value(&self) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        match self {
            CellOutcome::Value(v) => v,
            CellOutcome::Failed(_) => &EMPTY,
        }
    }
}

impl From<CellValue> for CellOutcome {
    fn from(value: CellValue) -> Self {
        CellOutcome::Value(value)
    }
}
