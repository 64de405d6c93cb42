//! Errors raised while turning case records into classifier inputs.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Per-request schema errors. None of these are retried; the request that
/// produced them is rejected.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// A column named by the metadata is absent from the frame.
    #[error("missing column: {column}")]
    MissingColumn { column: String },

    /// A categorical value was not seen when the encoder was fitted.
    #[error("unknown category `{value}` for column `{column}`")]
    UnknownCategory { column: String, value: String },

    /// The encoded features do not cover a trained prediction column.
    #[error("prediction column `{column}` was not produced by the encoder")]
    MissingPredictionColumn { column: String },

    #[error("dataframe error: {message}")]
    DataFrame { message: String },
}

impl From<PolarsError> for FeatureError {
    fn from(err: PolarsError) -> Self {
        FeatureError::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FeatureError>;
