//! Assessment configuration.
//!
//! ```toml
//! artifacts_dir = "artifacts"
//! background_path = "data.csv"
//!
//! [explainer]
//! background_clusters = 10
//! seed = 0
//! # max_coalitions = 4096
//!
//! [features]
//! # today = "2024-06-01"
//! ```

use std::path::{Path, PathBuf};

use adr_explain::KernelConfig;
use adr_transform::FeatureOptions;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AssessmentError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssessmentConfig {
    pub artifacts_dir: PathBuf,
    /// Training-format case export summarized into the explainer background.
    pub background_path: PathBuf,
    pub explainer: ExplainerConfig,
    pub features: FeatureConfig,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from("artifacts"),
            background_path: PathBuf::from("data.csv"),
            explainer: ExplainerConfig::default(),
            features: FeatureConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExplainerConfig {
    pub background_clusters: usize,
    pub seed: u64,
    /// Coalition budget per explanation; unset means `2 * M + 2048`.
    pub max_coalitions: Option<usize>,
}

impl Default for ExplainerConfig {
    fn default() -> Self {
        Self {
            background_clusters: 10,
            seed: 0,
            max_coalitions: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureConfig {
    /// Fixed reference date for age derivation.
    pub today: Option<NaiveDate>,
}

impl AssessmentConfig {
    /// Reads a TOML config file. Relative paths inside it resolve against
    /// the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AssessmentError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut config: Self =
            toml::from_str(&contents).map_err(|e| AssessmentError::ConfigParse {
                path: path.to_path_buf(),
                source: e,
            })?;
        if let Some(base) = path.parent() {
            config.artifacts_dir = base.join(&config.artifacts_dir);
            config.background_path = base.join(&config.background_path);
        }
        info!(path = %path.display(), "loaded assessment config");
        Ok(config)
    }

    pub fn feature_options(&self) -> FeatureOptions {
        match self.features.today {
            Some(today) => FeatureOptions::with_today(today),
            None => FeatureOptions::current(),
        }
    }

    pub fn kernel_config(&self) -> KernelConfig {
        KernelConfig {
            max_coalitions: self.explainer.max_coalitions,
            seed: self.explainer.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: AssessmentConfig = toml::from_str("").unwrap();
        assert_eq!(config, AssessmentConfig::default());
        assert_eq!(config.explainer.background_clusters, 10);
        assert_eq!(config.kernel_config().max_coalitions, None);
    }

    #[test]
    fn parses_sections() {
        let config: AssessmentConfig = toml::from_str(
            r#"
            artifacts_dir = "model"

            [explainer]
            seed = 7
            max_coalitions = 512

            [features]
            today = "2024-06-01"
            "#,
        )
        .unwrap();
        assert_eq!(config.artifacts_dir, PathBuf::from("model"));
        assert_eq!(config.kernel_config().seed, 7);
        assert_eq!(config.kernel_config().max_coalitions, Some(512));
        assert_eq!(
            config.feature_options().today,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(toml::from_str::<AssessmentConfig>("artefacts = \"x\"").is_err());
    }
}
