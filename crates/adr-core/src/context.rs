//! Process-wide assessment context.
//!
//! Built once at startup and shared read-only afterwards. Any failure while
//! loading artifacts or building the explainer background aborts startup.

use std::sync::Arc;

use adr_artifacts::{ArtifactBundle, ConfigurationError};
use adr_explain::{Background, KernelConfig, KernelExplainer, ProbabilityModel, summarize};
use adr_ingest::read_cases;
use adr_transform::FeatureOptions;
use tracing::info;

use crate::config::AssessmentConfig;
use crate::error::{AssessmentError, Result};
use crate::pipeline::encode_cases;

/// The artifact classifier seen as a probability model over encoded rows.
#[derive(Debug, Clone)]
pub struct ClassifierModel(Arc<ArtifactBundle>);

impl ProbabilityModel for ClassifierModel {
    fn n_outputs(&self) -> usize {
        self.0.classifier.n_classes()
    }

    fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        self.0.classifier.predict_proba(row)
    }
}

#[derive(Debug, Clone)]
pub struct AssessmentContext {
    pub(crate) artifacts: Arc<ArtifactBundle>,
    pub(crate) explainer: Arc<KernelExplainer<ClassifierModel>>,
    pub(crate) options: FeatureOptions,
}

impl AssessmentContext {
    /// Loads artifacts, summarizes the background data and builds the
    /// explainer.
    pub fn initialize(config: &AssessmentConfig) -> Result<Self> {
        let artifacts = Arc::new(ArtifactBundle::load(&config.artifacts_dir)?);
        let options = config.feature_options();

        let cases = read_cases(&config.background_path)?;
        if cases.is_empty() {
            return Err(AssessmentError::EmptyBackground {
                path: config.background_path.clone(),
            });
        }
        let encoded = encode_cases(&artifacts, &cases, &options)?;
        let background = summarize(
            &encoded.rows,
            config.explainer.background_clusters,
            config.explainer.seed,
        )?;
        info!(
            cases = cases.len(),
            clusters = background.len(),
            "summarized explainer background"
        );

        Self::from_parts(artifacts, background, options, config.kernel_config())
    }

    /// Builds a context from an already loaded bundle and background.
    pub fn from_parts(
        artifacts: Arc<ArtifactBundle>,
        background: Background,
        options: FeatureOptions,
        kernel: KernelConfig,
    ) -> Result<Self> {
        let width = artifacts.metadata.width();
        if background.width() != width {
            return Err(ConfigurationError::SchemaMismatch {
                message: format!(
                    "background rows have {} features but the model takes {width}",
                    background.width()
                ),
            }
            .into());
        }
        let model = ClassifierModel(Arc::clone(&artifacts));
        let explainer = KernelExplainer::new(model, background, kernel)?;
        info!(
            model_id = artifacts.model_id(),
            features = width,
            classes = artifacts.ordinal.len(),
            "assessment context ready"
        );
        Ok(Self {
            artifacts,
            explainer: Arc::new(explainer),
            options,
        })
    }

    pub fn artifacts(&self) -> &ArtifactBundle {
        &self.artifacts
    }

    pub fn model_id(&self) -> &str {
        self.artifacts.model_id()
    }

    /// Expected class probabilities over the background.
    pub fn base_values(&self) -> &[f64] {
        self.explainer.expected_value()
    }

    pub fn feature_options(&self) -> &FeatureOptions {
        &self.options
    }
}
