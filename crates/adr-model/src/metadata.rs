//! Column metadata produced at training time.

use serde::{Deserialize, Serialize};

/// Ordered column sets describing the model's training-time schema.
///
/// `prediction_columns` is the exact input order of the classifier. Every entry
/// is a boolean column, a numerical column, or a one-hot output named
/// `<categorical column>_<category>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub categorical_columns: Vec<String>,
    pub numerical_columns: Vec<String>,
    pub date_columns: Vec<String>,
    pub boolean_columns: Vec<String>,
    pub columns_to_drop: Vec<String>,
    pub prediction_columns: Vec<String>,
}

impl ColumnMetadata {
    /// Keys every metadata document must carry.
    pub const KEYS: &'static [&'static str] = &[
        "categorical_columns",
        "numerical_columns",
        "date_columns",
        "boolean_columns",
        "columns_to_drop",
        "prediction_columns",
    ];

    pub fn is_categorical(&self, column: &str) -> bool {
        self.categorical_columns.iter().any(|c| c == column)
    }

    pub fn is_numerical(&self, column: &str) -> bool {
        self.numerical_columns.iter().any(|c| c == column)
    }

    pub fn is_boolean(&self, column: &str) -> bool {
        self.boolean_columns.iter().any(|c| c == column)
    }

    /// Returns the categorical column a one-hot output name was derived from.
    ///
    /// The longest matching prefix wins so that `num_suspected_drugs_1` resolves
    /// to `num_suspected_drugs` even if a shorter column name is also a prefix.
    pub fn categorical_source(&self, encoded: &str) -> Option<&str> {
        self.categorical_columns
            .iter()
            .filter(|column| {
                encoded.len() > column.len() + 1
                    && encoded.starts_with(column.as_str())
                    && encoded.as_bytes()[column.len()] == b'_'
            })
            .max_by_key(|column| column.len())
            .map(String::as_str)
    }

    /// Number of classifier inputs.
    pub fn width(&self) -> usize {
        self.prediction_columns.len()
    }
}
