// Extraction presets: which cells to pull from every source file, and where to
// look for the settlement amount.

use std::collections::HashSet;

use billmerge_core::{letters_to_col, validate_cell_reference, CellAddress};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Header of the running sequence-number column.
pub const SEQUENCE_HEADER: &str = "Seq";

/// Header of the source file name column.
pub const FILE_NAME_HEADER: &str = "File Name";

/// Header of the located settlement amount column.
pub const SETTLEMENT_HEADER: &str = "Settlement Amount";

/// Column headers the merge engine owns; mapping names may not reuse them.
pub const RESERVED_HEADERS: [&str; 3] = [SEQUENCE_HEADER, FILE_NAME_HEADER, SETTLEMENT_HEADER];

pub const DEFAULT_SEARCH_COLUMN: &str = "D";
pub const DEFAULT_SEARCH_KEYWORD: &str = "Total";

/// One named field read from a fixed cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub name: String,
    pub cell: String,
    #[serde(default)]
    pub description: String,
}

impl Mapping {
    pub fn new(name: impl Into<String>, cell: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cell: cell.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A named bundle of mappings plus the settlement search settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_search_column")]
    pub settlement_search_column: String,
    #[serde(default = "default_search_keyword")]
    pub settlement_search_keyword: String,
    #[serde(default)]
    pub mappings: Vec<Mapping>,
}

fn default_search_column() -> String {
    DEFAULT_SEARCH_COLUMN.to_string()
}

fn default_search_keyword() -> String {
    DEFAULT_SEARCH_KEYWORD.to_string()
}

impl Preset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            settlement_search_column: default_search_column(),
            settlement_search_keyword: default_search_keyword(),
            mappings: Vec::new(),
        }
    }

    /// The preset shipped when no preset file exists yet.
    pub fn builtin_default() -> Self {
        Self {
            name: "Default".to_string(),
            description: "Default bill layout".to_string(),
            settlement_search_column: default_search_column(),
            settlement_search_keyword: default_search_keyword(),
            mappings: vec![
                Mapping::new("Date", "A1").with_description("Bill date"),
                Mapping::new("Amount", "B2").with_description("Bill amount"),
                Mapping::new("Note", "C3").with_description("Remarks"),
            ],
        }
    }

    pub fn mapping_names(&self) -> impl Iterator<Item = &str> {
        self.mappings.iter().map(|m| m.name.as_str())
    }

    /// Check the whole preset before it is used or stored. Every problem is
    /// reported, not only the first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let issues = self.issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid {
                preset: self.name.clone(),
                issues,
            })
        }
    }

    fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.name.trim().is_empty() {
            issues.push("preset name is empty".to_string());
        }
        if letters_to_col(&self.settlement_search_column).is_err() {
            issues.push(format!(
                "settlement search column '{}' is not a column (expected letters, e.g. D)",
                self.settlement_search_column
            ));
        }
        if self.settlement_search_keyword.is_empty() {
            issues.push("settlement search keyword is empty".to_string());
        }
        if self.mappings.is_empty() {
            issues.push("preset has no mappings".to_string());
        }

        let mut seen = HashSet::new();
        for (idx, mapping) in self.mappings.iter().enumerate() {
            let label = if mapping.name.is_empty() {
                format!("mapping #{}", idx + 1)
            } else {
                format!("mapping '{}'", mapping.name)
            };

            if mapping.name.trim().is_empty() {
                issues.push(format!("{label}: name is empty"));
            } else if RESERVED_HEADERS.contains(&mapping.name.as_str()) {
                issues.push(format!("{label}: name is reserved for a summary column"));
            } else if !seen.insert(mapping.name.as_str()) {
                issues.push(format!("{label}: name is used more than once"));
            }

            if !validate_cell_reference(&mapping.cell) {
                issues.push(format!("{label}: '{}' is not a cell reference", mapping.cell));
            } else if let Err(e) = CellAddress::parse(&mapping.cell) {
                issues.push(format!("{label}: {e}"));
            }
        }

        issues
    }
}
