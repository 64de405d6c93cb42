//! Class prediction on an encoded row.

use adr_artifacts::ArtifactBundle;
use adr_model::CausalityLevel;

use crate::error::{AssessmentError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub class_index: usize,
    pub level: CausalityLevel,
    pub probabilities: Vec<f64>,
}

/// Runs the classifier and decodes the winning class through the ordinal
/// encoder. Ties resolve to the lowest class index.
pub fn predict(bundle: &ArtifactBundle, row: &[f64]) -> Result<Prediction> {
    let class_index = bundle.classifier.predict(row);
    let probabilities = bundle.classifier.predict_proba(row);
    let level = bundle
        .ordinal
        .decode(class_index)
        .ok_or(AssessmentError::ClassOutOfRange {
            index: class_index,
            classes: bundle.ordinal.len(),
        })?;
    Ok(Prediction {
        class_index,
        level,
        probabilities,
    })
}
