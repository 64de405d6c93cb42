//! Case file readers.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use adr_model::CaseRecord;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use crate::error::{IngestError, Result};

/// Maximum file size for case loading (200 MB default).
pub const MAX_CASE_FILE_SIZE: u64 = 200 * 1024 * 1024;

/// Supported case file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseFormat {
    Csv,
    Json,
}

impl CaseFormat {
    /// Detects the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("csv") {
            Some(CaseFormat::Csv)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(CaseFormat::Json)
        } else {
            None
        }
    }
}

/// Check file size against a custom limit.
pub fn check_file_size_with_limit(path: &Path, max_size: u64) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| open_error(path, e))?;
    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }
    Ok(())
}

/// Reads case records from a `.csv` or `.json` file.
pub fn read_cases(path: &Path) -> Result<Vec<CaseRecord>> {
    match CaseFormat::from_path(path) {
        Some(CaseFormat::Csv) => read_case_csv(path),
        Some(CaseFormat::Json) => read_case_json(path),
        None => Err(IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Reads case records from a CSV export with one case per row.
///
/// Header names are normalized (BOM and surrounding whitespace removed) and
/// cells are trimmed before deserialization.
pub fn read_case_csv(path: &Path) -> Result<Vec<CaseRecord>> {
    check_file_size_with_limit(path, MAX_CASE_FILE_SIZE)?;
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(BufReader::new(file));

    let headers = reader.headers().map_err(|e| csv_error(path, e))?;
    let normalized: StringRecord = headers.iter().map(normalize_header).collect();
    reader.set_headers(normalized);

    let mut cases = Vec::new();
    for (idx, result) in reader.deserialize::<CaseRecord>().enumerate() {
        let case = result.map_err(|e| IngestError::Record {
            path: path.to_path_buf(),
            line: e
                .position()
                .map(csv::Position::line)
                .unwrap_or(idx as u64 + 2),
            message: e.to_string(),
        })?;
        cases.push(case);
    }

    info!(path = %path.display(), cases = cases.len(), "loaded case CSV");
    Ok(cases)
}

/// Reads case records from a JSON array, or a single JSON case object.
pub fn read_case_json(path: &Path) -> Result<Vec<CaseRecord>> {
    check_file_size_with_limit(path, MAX_CASE_FILE_SIZE)?;
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    let json_error = |source| IngestError::Json {
        path: path.to_path_buf(),
        source,
    };
    let document: serde_json::Value =
        serde_json::from_reader(BufReader::new(file)).map_err(json_error)?;

    let cases = if document.is_array() {
        serde_json::from_value::<Vec<CaseRecord>>(document).map_err(json_error)?
    } else {
        debug!(path = %path.display(), "JSON document holds a single case");
        vec![serde_json::from_value::<CaseRecord>(document).map_err(json_error)?]
    };

    info!(path = %path.display(), cases = cases.len(), "loaded case JSON");
    Ok(cases)
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}

fn open_error(path: &Path, error: std::io::Error) -> IngestError {
    if error.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: error,
        }
    }
}

fn csv_error(path: &Path, source: csv::Error) -> IngestError {
    IngestError::Csv {
        path: path.to_path_buf(),
        source,
    }
}
