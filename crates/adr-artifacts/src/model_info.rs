//! Informational training metadata shipped with the model.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::error::{ConfigurationError, Result};

/// Model identity plus optional training metrics and hyper-parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub model_id: String,
    pub classifier: &'static str,
    pub metrics: Option<BTreeMap<String, serde_json::Value>>,
    pub params: Option<BTreeMap<String, serde_json::Value>>,
}

pub(crate) fn parse_key_values(
    path: &Path,
    bytes: &[u8],
) -> Result<BTreeMap<String, serde_json::Value>> {
    serde_json::from_slice(bytes).map_err(|e| ConfigurationError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}
