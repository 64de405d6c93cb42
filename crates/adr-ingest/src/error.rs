//! Error types for case ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading case records.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Case file not found.
    #[error("case file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the configured size limit.
    #[error("file too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// File extension does not map to a supported format.
    #[error("unsupported case file format: {path} (expected .csv or .json)")]
    UnsupportedFormat { path: PathBuf },

    // === Parsing Errors ===
    /// CSV structure could not be read.
    #[error("failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A CSV row could not be mapped onto a case record.
    #[error("invalid case record at {path}:{line}: {message}")]
    Record {
        path: PathBuf,
        line: u64,
        message: String,
    },

    /// JSON document could not be mapped onto case records.
    #[error("failed to parse JSON {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
