//! Per-case assessment.

use adr_artifacts::ArtifactBundle;
use adr_model::{CaseRecord, CausalityAssessment, ExplanationBundle};
use adr_transform::{
    FeatureCodec, FeatureError, FeatureMatrix, FeatureOptions, prepare_features,
    reconstruct_values,
};
use tracing::{debug, info_span};

use crate::context::AssessmentContext;
use crate::error::Result;
use crate::gate::check_eligibility;
use crate::predictor::predict;

/// Encodes cases as one batch into the classifier's input layout.
///
/// Batch statistics such as the median age fill-in are taken over `cases`.
pub fn encode_cases(
    bundle: &ArtifactBundle,
    cases: &[CaseRecord],
    options: &FeatureOptions,
) -> Result<FeatureMatrix> {
    let frame = prepare_features(cases, &bundle.metadata, options)?;
    Ok(FeatureCodec::from_bundle(bundle).encode(&frame)?)
}

impl AssessmentContext {
    pub fn encode(&self, cases: &[CaseRecord]) -> Result<FeatureMatrix> {
        encode_cases(&self.artifacts, cases, &self.options)
    }

    /// Assesses one case.
    ///
    /// Cases that fail the eligibility gate come back unclassified without
    /// an explanation. Otherwise the case is encoded on its own, classified
    /// and explained.
    pub fn assess(&self, case: &CaseRecord) -> Result<CausalityAssessment> {
        if let Err(reason) = check_eligibility(case) {
            debug!(%reason, "case not eligible for prediction");
            return Ok(CausalityAssessment::unclassified(self.model_id()));
        }

        let matrix = self.encode(std::slice::from_ref(case))?;
        let row = matrix.row(0).ok_or_else(|| FeatureError::DataFrame {
            message: "encoding produced no rows".to_string(),
        })?;

        let prediction = predict(&self.artifacts, row)?;
        let attribution = self.explainer.explain(row)?;
        let values = reconstruct_values(&matrix.columns, row, &self.artifacts.scaler);
        let explanation = ExplanationBundle::new(
            attribution.base_values,
            attribution.values,
            matrix.columns.clone(),
            values,
        )?;
        debug!(
            level = %prediction.level,
            class_index = prediction.class_index,
            "case classified"
        );
        Ok(CausalityAssessment::predicted(
            prediction.level,
            self.model_id(),
            explanation,
        ))
    }

    /// Assesses each case independently; one failure does not stop the rest.
    pub fn assess_batch(&self, cases: &[CaseRecord]) -> Vec<Result<CausalityAssessment>> {
        cases
            .iter()
            .enumerate()
            .map(|(idx, case)| {
                let _span = info_span!("assess", case = idx).entered();
                self.assess(case)
            })
            .collect()
    }
}
