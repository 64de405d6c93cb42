//! Causality assessment results and their explanations.

use serde::{Deserialize, Serialize};

use crate::enums::CausalityLevel;
use crate::error::{ModelError, Result};

/// Model identifier recorded when the artifacts carry no manifest.
pub const DEFAULT_MODEL_ID: &str = "final_ml_model@champion";

/// A feature value restored to a clinically readable form.
///
/// Serializes to plain JSON scalars: `false`, `37`, `0.5`, or `null` for a
/// value that was missing on the report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReconstructedValue {
    Flag(bool),
    Integer(i64),
    Number(f64),
    Missing,
}

/// Additive decomposition of one prediction.
///
/// `shap_values_matrix` holds one row per feature and one column per class.
/// For every class `c`,
/// `shap_values_sum_per_class[c] + base_values[c]` equals
/// `shap_values_and_base_values_sum_per_class[c]` exactly, because the total is
/// computed from the stored sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationBundle {
    base_values: Vec<f64>,
    shap_values_matrix: Vec<Vec<f64>>,
    shap_values_sum_per_class: Vec<f64>,
    shap_values_and_base_values_sum_per_class: Vec<f64>,
    feature_names: Vec<String>,
    feature_values: Vec<ReconstructedValue>,
}

impl ExplanationBundle {
    /// Builds a bundle from per-class base values and a feature × class matrix.
    pub fn new(
        base_values: Vec<f64>,
        shap_values_matrix: Vec<Vec<f64>>,
        feature_names: Vec<String>,
        feature_values: Vec<ReconstructedValue>,
    ) -> Result<Self> {
        let n_classes = base_values.len();
        if shap_values_matrix.len() != feature_names.len() {
            return Err(ModelError::BundleShape {
                message: format!(
                    "{} contribution rows for {} features",
                    shap_values_matrix.len(),
                    feature_names.len()
                ),
            });
        }
        if feature_values.len() != feature_names.len() {
            return Err(ModelError::BundleShape {
                message: format!(
                    "{} feature values for {} features",
                    feature_values.len(),
                    feature_names.len()
                ),
            });
        }
        if let Some((idx, row)) = shap_values_matrix
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != n_classes)
        {
            return Err(ModelError::BundleShape {
                message: format!(
                    "row {idx} has {} values, expected {n_classes} classes",
                    row.len()
                ),
            });
        }

        let shap_values_sum_per_class: Vec<f64> = (0..n_classes)
            .map(|class| shap_values_matrix.iter().map(|row| row[class]).sum())
            .collect();
        let shap_values_and_base_values_sum_per_class = shap_values_sum_per_class
            .iter()
            .zip(&base_values)
            .map(|(sum, base)| sum + base)
            .collect();

        Ok(Self {
            base_values,
            shap_values_matrix,
            shap_values_sum_per_class,
            shap_values_and_base_values_sum_per_class,
            feature_names,
            feature_values,
        })
    }

    pub fn base_values(&self) -> &[f64] {
        &self.base_values
    }

    pub fn shap_values_matrix(&self) -> &[Vec<f64>] {
        &self.shap_values_matrix
    }

    pub fn shap_values_sum_per_class(&self) -> &[f64] {
        &self.shap_values_sum_per_class
    }

    pub fn shap_values_and_base_values_sum_per_class(&self) -> &[f64] {
        &self.shap_values_and_base_values_sum_per_class
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn feature_values(&self) -> &[ReconstructedValue] {
        &self.feature_values
    }

    pub fn n_classes(&self) -> usize {
        self.base_values.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Ranks classes by their reconstructed decision score, highest first.
    ///
    /// `labels` gives the level for each class position; classes without a
    /// label are reported with `label: None`.
    pub fn class_rankings(&self, labels: &[CausalityLevel]) -> Vec<ClassRanking> {
        let mut rankings: Vec<ClassRanking> = (0..self.n_classes())
            .map(|class| ClassRanking {
                label: labels.get(class).copied(),
                base_value: self.base_values[class],
                shap_value: self.shap_values_sum_per_class[class],
                base_shap_value: self.shap_values_and_base_values_sum_per_class[class],
            })
            .collect();
        rankings.sort_by(|a, b| b.base_shap_value.total_cmp(&a.base_shap_value));
        rankings
    }

    /// Returns the `n` features with the largest absolute contribution to `class`.
    pub fn top_contributions(&self, class: usize, n: usize) -> Vec<FeatureContribution> {
        if class >= self.n_classes() {
            return Vec::new();
        }
        let mut contributions: Vec<FeatureContribution> = self
            .feature_names
            .iter()
            .zip(&self.feature_values)
            .zip(&self.shap_values_matrix)
            .map(|((name, value), row)| FeatureContribution {
                feature: name.clone(),
                value: *value,
                contribution: row[class],
            })
            .collect();
        contributions.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
        contributions.truncate(n);
        contributions
    }
}

/// Per-class summary used to order classes in explanation views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRanking {
    pub label: Option<CausalityLevel>,
    pub base_value: f64,
    pub shap_value: f64,
    pub base_shap_value: f64,
}

/// One feature's share of a class score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub value: ReconstructedValue,
    pub contribution: f64,
}

/// Verdict for one case, with its explanation when the model produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalityAssessment {
    pub level: CausalityLevel,
    pub model_id: String,
    pub explanation: Option<ExplanationBundle>,
}

impl CausalityAssessment {
    /// Assessment for a case that did not meet the prediction preconditions.
    pub fn unclassified(model_id: impl Into<String>) -> Self {
        Self {
            level: CausalityLevel::Unclassified,
            model_id: model_id.into(),
            explanation: None,
        }
    }

    pub fn predicted(
        level: CausalityLevel,
        model_id: impl Into<String>,
        explanation: ExplanationBundle,
    ) -> Self {
        Self {
            level,
            model_id: model_id.into(),
            explanation: Some(explanation),
        }
    }

    /// Replaces the verdict with an operator-chosen level.
    ///
    /// Overriding to a sentinel level discards the explanation, since it no
    /// longer describes the recorded verdict.
    #[must_use]
    pub fn override_level(mut self, level: CausalityLevel) -> Self {
        self.level = level;
        if level.is_sentinel() {
            self.explanation = None;
        }
        self
    }

    pub fn is_classified(&self) -> bool {
        !self.level.is_sentinel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> ExplanationBundle {
        ExplanationBundle::new(
            vec![0.25, 0.5, 0.25],
            vec![vec![0.1, -0.2, 0.1], vec![0.3, -0.1, -0.2]],
            vec!["rechallenge_yes".into(), "patient_age".into()],
            vec![ReconstructedValue::Flag(true), ReconstructedValue::Integer(42)],
        )
        .unwrap()
    }

    #[test]
    fn sums_are_additive() {
        let bundle = bundle();
        for class in 0..bundle.n_classes() {
            assert_eq!(
                bundle.shap_values_sum_per_class()[class] + bundle.base_values()[class],
                bundle.shap_values_and_base_values_sum_per_class()[class]
            );
        }
    }

    #[test]
    fn rejects_ragged_matrix() {
        let err = ExplanationBundle::new(
            vec![0.5, 0.5],
            vec![vec![0.1]],
            vec!["a".into()],
            vec![ReconstructedValue::Missing],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::BundleShape { .. }));
    }

    #[test]
    fn rankings_sort_by_total() {
        let labels = [
            CausalityLevel::Certain,
            CausalityLevel::Likely,
            CausalityLevel::Possible,
        ];
        let rankings = bundle().class_rankings(&labels);
        assert_eq!(rankings[0].label, Some(CausalityLevel::Certain));
        assert_eq!(rankings.len(), 3);
    }

    #[test]
    fn top_contributions_by_magnitude() {
        let top = bundle().top_contributions(2, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].feature, "patient_age");
    }

    #[test]
    fn override_to_sentinel_drops_explanation() {
        let assessment =
            CausalityAssessment::predicted(CausalityLevel::Likely, DEFAULT_MODEL_ID, bundle());
        let overridden = assessment.override_level(CausalityLevel::Unclassifiable);
        assert_eq!(overridden.level, CausalityLevel::Unclassifiable);
        assert!(overridden.explanation.is_none());
        assert!(!overridden.is_classified());
    }
}
