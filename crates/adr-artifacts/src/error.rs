#![deny(unsafe_code)]

use std::path::PathBuf;

/// Errors raised while loading or validating the artifact directory.
///
/// All of them are fatal at start-up: without a consistent artifact set no
/// assessment can be produced.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing artifact: {path}")]
    MissingFile { path: PathBuf },

    #[error("failed to parse JSON artifact {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse TOML manifest {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid manifest: {message}")]
    InvalidManifest { message: String },

    #[error("missing required role in manifest: {role}")]
    MissingRole { role: String },

    #[error("duplicate role in manifest: {role}")]
    DuplicateRole { role: String },

    #[error("invalid sha256 for {path}: {message}")]
    InvalidSha256 { path: PathBuf, message: String },

    #[error("invalid manifest path {path}: {message}")]
    InvalidPath { path: PathBuf, message: String },

    #[error("sha256 mismatch for {path} (expected {expected}, got {actual})")]
    Sha256Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("column metadata {path} is missing key `{key}`")]
    MissingKey { path: PathBuf, key: String },

    #[error("unknown column `{column}` in {set}")]
    UnknownColumn { column: String, set: &'static str },

    #[error("column `{column}` in {set} is not a {expected} field")]
    ColumnKind {
        column: String,
        set: &'static str,
        expected: &'static str,
    },

    #[error("prediction column `{column}` is not a boolean, numerical or one-hot column")]
    UndefinedPredictionColumn { column: String },

    #[error("invalid artifact {path}: {message}")]
    InvalidArtifact { path: PathBuf, message: String },

    #[error("artifact schema mismatch: {message}")]
    SchemaMismatch { message: String },
}

impl ConfigurationError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::MissingFile { path }
        } else {
            Self::Io { path, source }
        }
    }

    pub(crate) fn invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidArtifact {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;
