use billmerge_config::{ConfigError, Preset, FILE_NAME_HEADER, SEQUENCE_HEADER, SETTLEMENT_HEADER};
use billmerge_core::{letters_to_col, CellAddress};

/// One mapping with its address already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPlan {
    pub name: String,
    pub address: CellAddress,
}

/// A preset checked and resolved once, before any file is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPlan {
    pub preset_name: String,
    pub fields: Vec<FieldPlan>,
    /// 0-based column scanned for the settlement keyword
    pub search_column: u32,
    pub keyword: String,
}

impl ExtractionPlan {
    pub fn from_preset(preset: &Preset) -> Result<Self, ConfigError> {
        preset.validate()?;

        let invalid = |issue: String| ConfigError::Invalid {
            preset: preset.name.clone(),
            issues: vec![issue],
        };

        let fields = preset
            .mappings
            .iter()
            .map(|m| {
                CellAddress::parse(&m.cell)
                    .map(|address| FieldPlan { name: m.name.clone(), address })
                    .map_err(|e| invalid(format!("mapping '{}': {e}", m.name)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let search_column = letters_to_col(&preset.settlement_search_column).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            preset_name: preset.name.clone(),
            fields,
            search_column,
            keyword: preset.settlement_search_keyword.clone(),
        })
    }

    /// `[Seq, File Name, <mapping names...>, Settlement Amount]`
    pub fn headers(&self) -> Vec<String> {
        let mut headers = Vec::with_capacity(self.fields.len() + 3);
        headers.push(SEQUENCE_HEADER.to_string());
        headers.push(FILE_NAME_HEADER.to_string());
        headers.extend(self.fields.iter().map(|f| f.name.clone()));
        headers.push(SETTLEMENT_HEADER.to_string());
        headers
    }
}
