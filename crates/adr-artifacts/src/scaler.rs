//! Min-max scaler fitted at training time.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};

/// Per-column `(x - min) / (max - min)` scaling without clipping.
///
/// A column whose fitted range is zero is divided by one, so its values shift
/// by `min` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    feature_names: Vec<String>,
    data_min: Vec<f64>,
    data_max: Vec<f64>,
}

impl MinMaxScaler {
    pub fn new(feature_names: Vec<String>, data_min: Vec<f64>, data_max: Vec<f64>) -> Result<Self> {
        let scaler = Self {
            feature_names,
            data_min,
            data_max,
        };
        scaler.validate(Path::new("<memory>"))?;
        Ok(scaler)
    }

    pub fn from_json(path: &Path, bytes: &[u8]) -> Result<Self> {
        let scaler: Self = serde_json::from_slice(bytes).map_err(|e| ConfigurationError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        scaler.validate(path)?;
        Ok(scaler)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let n = self.feature_names.len();
        if self.data_min.len() != n || self.data_max.len() != n {
            return Err(ConfigurationError::invalid(
                path,
                format!(
                    "{n} feature names but {} minima and {} maxima",
                    self.data_min.len(),
                    self.data_max.len()
                ),
            ));
        }
        for (idx, name) in self.feature_names.iter().enumerate() {
            let (min, max) = (self.data_min[idx], self.data_max[idx]);
            if !min.is_finite() || !max.is_finite() || max < min {
                return Err(ConfigurationError::invalid(
                    path,
                    format!("invalid range [{min}, {max}] for `{name}`"),
                ));
            }
        }
        Ok(())
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Fitted `(min, max)` for the named column.
    pub fn range(&self, name: &str) -> Option<(f64, f64)> {
        let idx = self.feature_names.iter().position(|f| f == name)?;
        Some((self.data_min[idx], self.data_max[idx]))
    }

    /// Scales `value` with the range of the column at `idx`.
    pub fn scale(&self, idx: usize, value: f64) -> f64 {
        let min = self.data_min[idx];
        (value - min) / divisor(min, self.data_max[idx])
    }

    /// Maps a scaled value back to the original unit of the named column.
    pub fn inverse(&self, name: &str, scaled: f64) -> Option<f64> {
        let (min, max) = self.range(name)?;
        Some(scaled * (max - min) + min)
    }
}

fn divisor(min: f64, max: f64) -> f64 {
    let range = max - min;
    if range == 0.0 { 1.0 } else { range }
}
