//! Error type for the assessment pipeline.

use std::path::PathBuf;

use adr_artifacts::ConfigurationError;
use adr_explain::ExplainError;
use adr_ingest::IngestError;
use adr_model::ModelError;
use adr_transform::FeatureError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Explain(#[from] ExplainError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("background data {path} contains no cases")]
    EmptyBackground { path: PathBuf },

    #[error("classifier produced class index {index} outside the {classes} ordinal categories")]
    ClassOutOfRange { index: usize, classes: usize },
}

pub type Result<T> = std::result::Result<T, AssessmentError>;
