//! One-hot and ordinal encoders fitted at training time.

use std::path::Path;

use adr_model::CausalityLevel;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};

/// Categories seen for one categorical column, in fitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotColumn {
    pub name: String,
    pub categories: Vec<String>,
}

/// One-hot encoder with unknown categories treated as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<OneHotColumn>,
}

impl OneHotEncoder {
    pub fn new(columns: Vec<OneHotColumn>) -> Self {
        Self { columns }
    }

    pub fn from_json(path: &Path, bytes: &[u8]) -> Result<Self> {
        let encoder: Self = serde_json::from_slice(bytes).map_err(|e| ConfigurationError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        for column in &encoder.columns {
            if column.categories.is_empty() {
                return Err(ConfigurationError::invalid(
                    path,
                    format!("column `{}` has no categories", column.name),
                ));
            }
            let mut seen = std::collections::BTreeSet::new();
            if let Some(dup) = column.categories.iter().find(|c| !seen.insert(c.as_str())) {
                return Err(ConfigurationError::invalid(
                    path,
                    format!("column `{}` lists category `{dup}` twice", column.name),
                ));
            }
        }
        Ok(encoder)
    }

    pub fn columns(&self) -> &[OneHotColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&OneHotColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    /// Output names in `<column>_<category>` form, column by column.
    pub fn feature_names_out(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|column| {
                column
                    .categories
                    .iter()
                    .map(move |category| format!("{}_{}", column.name, category))
            })
            .collect()
    }

    /// Total number of output columns.
    pub fn width(&self) -> usize {
        self.columns.iter().map(|column| column.categories.len()).sum()
    }
}

impl OneHotColumn {
    /// Position of `category` among the fitted categories.
    pub fn position(&self, category: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == category)
    }
}

/// Maps classifier output indices to causality levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdinalEncoder {
    levels: Vec<CausalityLevel>,
}

#[derive(Deserialize)]
struct OrdinalDocument {
    categories: Vec<String>,
}

impl OrdinalEncoder {
    pub fn new(levels: Vec<CausalityLevel>) -> Self {
        Self { levels }
    }

    pub fn from_json(path: &Path, bytes: &[u8]) -> Result<Self> {
        let document: OrdinalDocument =
            serde_json::from_slice(bytes).map_err(|e| ConfigurationError::Json {
                path: path.to_path_buf(),
                source: e,
            })?;
        if document.categories.is_empty() {
            return Err(ConfigurationError::invalid(path, "no categories"));
        }
        let levels = document
            .categories
            .iter()
            .map(|category| {
                category
                    .parse::<CausalityLevel>()
                    .map_err(|e| ConfigurationError::invalid(path, e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[CausalityLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Decodes a class index.
    pub fn decode(&self, index: usize) -> Option<CausalityLevel> {
        self.levels.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_names_follow_column_order() {
        let encoder = OneHotEncoder::new(vec![
            OneHotColumn {
                name: "rechallenge".into(),
                categories: vec!["no".into(), "yes".into()],
            },
            OneHotColumn {
                name: "num_suspected_drugs".into(),
                categories: vec!["1".into(), "2".into()],
            },
        ]);
        assert_eq!(
            encoder.feature_names_out(),
            vec![
                "rechallenge_no",
                "rechallenge_yes",
                "num_suspected_drugs_1",
                "num_suspected_drugs_2"
            ]
        );
        assert_eq!(encoder.width(), 4);
        assert_eq!(encoder.column("rechallenge").unwrap().position("yes"), Some(1));
    }

    #[test]
    fn duplicate_categories_are_rejected() {
        let bytes = br#"{"columns":[{"name":"outcome","categories":["death","death"]}]}"#;
        assert!(OneHotEncoder::from_json(Path::new("one_hot.json"), bytes).is_err());
    }

    #[test]
    fn ordinal_decodes_levels() {
        let bytes = br#"{"categories":["certain","likely","possible","unlikely"]}"#;
        let encoder = OrdinalEncoder::from_json(Path::new("ordinal.json"), bytes).unwrap();
        assert_eq!(encoder.decode(2), Some(CausalityLevel::Possible));
        assert_eq!(encoder.decode(4), None);

        let bad = br#"{"categories":["probable"]}"#;
        assert!(OrdinalEncoder::from_json(Path::new("ordinal.json"), bad).is_err());
    }
}
