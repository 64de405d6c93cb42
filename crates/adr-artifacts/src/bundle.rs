//! The complete, cross-validated artifact set.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use adr_model::{CausalityLevel, ColumnMetadata, DEFAULT_MODEL_ID};
use serde::Serialize;
use tracing::info;

use crate::classifier::Classifier;
use crate::encoders::{OneHotEncoder, OrdinalEncoder};
use crate::error::{ConfigurationError, Result};
use crate::manifest::{ArtifactLocator, ArtifactRole};
use crate::metadata::parse_column_metadata;
use crate::model_info::{ModelInfo, parse_key_values};
use crate::scaler::MinMaxScaler;

/// Everything the training pipeline exported, loaded and checked for
/// mutual consistency.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub root: PathBuf,
    pub metadata: ColumnMetadata,
    pub one_hot: OneHotEncoder,
    pub ordinal: OrdinalEncoder,
    pub scaler: MinMaxScaler,
    pub classifier: Classifier,
    pub info: ModelInfo,
    pub verified: bool,
}

/// Counts reported by `verify`.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    pub artifacts_dir: PathBuf,
    pub model_id: String,
    pub classifier: &'static str,
    pub checksums_verified: bool,
    pub categorical_columns: usize,
    pub numerical_columns: usize,
    pub boolean_columns: usize,
    pub date_columns: usize,
    pub dropped_columns: usize,
    pub prediction_columns: usize,
    pub one_hot_outputs: usize,
    pub classes: Vec<CausalityLevel>,
}

impl ArtifactBundle {
    /// Loads the artifact directory, verifying checksums when a manifest is
    /// present.
    pub fn load(dir: &Path) -> Result<Self> {
        let locator = ArtifactLocator::new(dir)?;

        let metadata_path = locator.path(ArtifactRole::ColumnMetadata);
        let metadata = parse_column_metadata(
            &metadata_path,
            &locator.read_required(ArtifactRole::ColumnMetadata)?,
        )?;
        let one_hot = OneHotEncoder::from_json(
            &locator.path(ArtifactRole::OneHotEncoder),
            &locator.read_required(ArtifactRole::OneHotEncoder)?,
        )?;
        let ordinal = OrdinalEncoder::from_json(
            &locator.path(ArtifactRole::OrdinalEncoder),
            &locator.read_required(ArtifactRole::OrdinalEncoder)?,
        )?;
        let scaler = MinMaxScaler::from_json(
            &locator.path(ArtifactRole::Scaler),
            &locator.read_required(ArtifactRole::Scaler)?,
        )?;
        let classifier = Classifier::from_json(
            &locator.path(ArtifactRole::Classifier),
            &locator.read_required(ArtifactRole::Classifier)?,
        )?;

        let metrics = match locator.read(ArtifactRole::Metrics)? {
            Some(bytes) => Some(parse_key_values(
                &locator.path(ArtifactRole::Metrics),
                &bytes,
            )?),
            None => None,
        };
        let params = match locator.read(ArtifactRole::Params)? {
            Some(bytes) => Some(parse_key_values(&locator.path(ArtifactRole::Params), &bytes)?),
            None => None,
        };

        let model_id = locator
            .manifest()
            .and_then(|m| m.model.as_ref())
            .map_or_else(|| DEFAULT_MODEL_ID.to_string(), |pin| pin.model_id());

        let bundle = Self {
            root: dir.to_path_buf(),
            info: ModelInfo {
                model_id,
                classifier: classifier.kind(),
                metrics,
                params,
            },
            metadata,
            one_hot,
            ordinal,
            scaler,
            classifier,
            verified: locator.manifest().is_some(),
        };
        bundle.cross_validate()?;

        info!(
            artifacts_dir = %dir.display(),
            model_id = %bundle.info.model_id,
            classifier = bundle.classifier.kind(),
            features = bundle.metadata.width(),
            classes = bundle.ordinal.len(),
            checksums_verified = bundle.verified,
            "artifacts loaded"
        );
        Ok(bundle)
    }

    pub fn model_id(&self) -> &str {
        &self.info.model_id
    }

    fn cross_validate(&self) -> Result<()> {
        let metadata = &self.metadata;

        if self.scaler.feature_names() != metadata.numerical_columns.as_slice() {
            return Err(ConfigurationError::SchemaMismatch {
                message: format!(
                    "scaler features {:?} differ from numerical columns {:?}",
                    self.scaler.feature_names(),
                    metadata.numerical_columns
                ),
            });
        }

        let encoded: Vec<&str> = self.one_hot.column_names().collect();
        if encoded != metadata.categorical_columns {
            return Err(ConfigurationError::SchemaMismatch {
                message: format!(
                    "one-hot columns {encoded:?} differ from categorical columns {:?}",
                    metadata.categorical_columns
                ),
            });
        }

        let outputs: BTreeSet<String> = self.one_hot.feature_names_out().into_iter().collect();
        for column in &metadata.prediction_columns {
            let defined = outputs.contains(column)
                || metadata.is_boolean(column)
                || metadata.is_numerical(column);
            if !defined {
                return Err(ConfigurationError::UndefinedPredictionColumn {
                    column: column.clone(),
                });
            }
        }

        if self.classifier.n_features() != metadata.width() {
            return Err(ConfigurationError::SchemaMismatch {
                message: format!(
                    "classifier expects {} inputs but there are {} prediction columns",
                    self.classifier.n_features(),
                    metadata.width()
                ),
            });
        }
        if self.classifier.n_classes() != self.ordinal.len() {
            return Err(ConfigurationError::SchemaMismatch {
                message: format!(
                    "classifier has {} classes but the ordinal encoder has {}",
                    self.classifier.n_classes(),
                    self.ordinal.len()
                ),
            });
        }
        Ok(())
    }

    pub fn summary(&self) -> ArtifactSummary {
        let metadata = &self.metadata;
        ArtifactSummary {
            artifacts_dir: self.root.clone(),
            model_id: self.info.model_id.clone(),
            classifier: self.classifier.kind(),
            checksums_verified: self.verified,
            categorical_columns: metadata.categorical_columns.len(),
            numerical_columns: metadata.numerical_columns.len(),
            boolean_columns: metadata.boolean_columns.len(),
            date_columns: metadata.date_columns.len(),
            dropped_columns: metadata.columns_to_drop.len(),
            prediction_columns: metadata.width(),
            one_hot_outputs: self.one_hot.width(),
            classes: self.ordinal.levels().to_vec(),
        }
    }
}
