//! ADR case ingestion.
//!
//! Loads case exports (CSV with one case per row, or JSON) into typed
//! [`adr_model::CaseRecord`]s. Field-level problems such as unparsable dates
//! are absorbed by the record's lenient deserializers; structural problems
//! (missing required columns, unknown form values) are reported with their
//! file position.

mod error;
mod reader;

pub use error::{IngestError, Result};
pub use reader::{
    CaseFormat, MAX_CASE_FILE_SIZE, check_file_size_with_limit, read_case_csv, read_case_json,
    read_cases,
};
