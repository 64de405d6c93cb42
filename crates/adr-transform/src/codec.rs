//! Encoding of derived features into classifier inputs.

use std::collections::HashMap;

use adr_artifacts::{ArtifactBundle, MinMaxScaler, OneHotEncoder};
use adr_model::ColumnMetadata;
use polars::prelude::DataFrame;
use tracing::debug;

use crate::derive::{MISSING_SENTINEL, categorical_strings, flag_values, float_values};
use crate::error::{FeatureError, Result};

/// Token used for a missing categorical value, matching how the encoder
/// saw missing values at training time.
pub const MISSING_CATEGORY: &str = "nan";

/// Rows of encoded features in `prediction_columns` order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, idx: usize) -> Option<&[f64]> {
        self.rows.get(idx).map(Vec::as_slice)
    }
}

/// One-hot encodes categoricals, passes booleans through as 0/1 and min-max
/// scales numericals, then selects the trained column order.
#[derive(Debug, Clone, Copy)]
pub struct FeatureCodec<'a> {
    metadata: &'a ColumnMetadata,
    one_hot: &'a OneHotEncoder,
    scaler: &'a MinMaxScaler,
}

impl<'a> FeatureCodec<'a> {
    pub fn new(
        metadata: &'a ColumnMetadata,
        one_hot: &'a OneHotEncoder,
        scaler: &'a MinMaxScaler,
    ) -> Self {
        Self {
            metadata,
            one_hot,
            scaler,
        }
    }

    pub fn from_bundle(bundle: &'a ArtifactBundle) -> Self {
        Self::new(&bundle.metadata, &bundle.one_hot, &bundle.scaler)
    }

    /// Encodes a frame produced by
    /// [`derive_features`](crate::derive::derive_features).
    pub fn encode(&self, df: &DataFrame) -> Result<FeatureMatrix> {
        let height = df.height();
        let mut encoded: HashMap<String, Vec<f64>> = HashMap::new();

        for column in self.one_hot.columns() {
            let source = df
                .column(&column.name)
                .map_err(|_| FeatureError::MissingColumn {
                    column: column.name.clone(),
                })?;
            let mut outputs = vec![vec![0.0; height]; column.categories.len()];
            for (row, value) in categorical_strings(source)?.into_iter().enumerate() {
                let token = value.as_deref().unwrap_or(MISSING_CATEGORY);
                let position =
                    column
                        .position(token)
                        .ok_or_else(|| FeatureError::UnknownCategory {
                            column: column.name.clone(),
                            value: token.to_string(),
                        })?;
                outputs[position][row] = 1.0;
            }
            for (category, values) in column.categories.iter().zip(outputs) {
                encoded.insert(format!("{}_{}", column.name, category), values);
            }
        }

        for name in &self.metadata.boolean_columns {
            let values = flag_values(df, name)?
                .into_iter()
                .map(|flag| if flag == Some(true) { 1.0 } else { 0.0 })
                .collect();
            encoded.insert(name.clone(), values);
        }

        for (idx, name) in self.scaler.feature_names().iter().enumerate() {
            let values = float_values(df, name)?
                .into_iter()
                .map(|value| self.scaler.scale(idx, value.unwrap_or(MISSING_SENTINEL)))
                .collect();
            encoded.insert(name.clone(), values);
        }

        let columns = &self.metadata.prediction_columns;
        let ordered: Vec<&Vec<f64>> = columns
            .iter()
            .map(|name| {
                encoded
                    .get(name)
                    .ok_or_else(|| FeatureError::MissingPredictionColumn {
                        column: name.clone(),
                    })
            })
            .collect::<Result<_>>()?;
        let rows = (0..height)
            .map(|row| ordered.iter().map(|values| values[row]).collect())
            .collect();

        debug!(rows = height, width = columns.len(), "encoded features");
        Ok(FeatureMatrix {
            columns: columns.clone(),
            rows,
        })
    }
}
