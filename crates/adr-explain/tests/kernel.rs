//! Attribution properties on models with known Shapley values.

use adr_explain::{Background, KernelConfig, KernelExplainer, ProbabilityModel, summarize};
use proptest::prelude::*;

/// Two linear outputs over three features.
struct Linear {
    weights: [[f64; 3]; 2],
}

impl ProbabilityModel for Linear {
    fn n_outputs(&self) -> usize {
        2
    }

    fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .map(|w| w.iter().zip(row).map(|(a, b)| a * b).sum())
            .collect()
    }
}

/// Softmax over two interacting scores.
struct Interacting;

impl ProbabilityModel for Interacting {
    fn n_outputs(&self) -> usize {
        3
    }

    fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let scores = [row[0] * row[1], row[2] - row[3], 0.5 * row[4]];
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        exps.iter().map(|e| e / total).collect()
    }
}

#[test]
fn linear_model_recovers_weighted_deviations() {
    let model = Linear {
        weights: [[1.0, -2.0, 0.5], [0.0, 3.0, 1.0]],
    };
    let background = Background::new(
        vec![vec![0.0, 1.0, 2.0], vec![2.0, 0.0, 4.0]],
        vec![1.0, 3.0],
    )
    .unwrap();
    let means = [1.5, 0.25, 3.5];
    let explainer = KernelExplainer::new(model, background, KernelConfig::default()).unwrap();

    let x = [4.0, 2.0, 1.0];
    let attribution = explainer.explain(&x).unwrap();
    let weights = [[1.0, -2.0, 0.5], [0.0, 3.0, 1.0]];
    for (j, row) in attribution.values.iter().enumerate() {
        for d in 0..2 {
            let expected = weights[d][j] * (x[j] - means[j]);
            assert!(
                (row[d] - expected).abs() < 1e-9,
                "feature {j} output {d}: {} vs {expected}",
                row[d]
            );
        }
    }
}

#[test]
fn features_matching_the_background_get_nothing() {
    let model = Linear {
        weights: [[1.0, 1.0, 1.0], [1.0, 0.0, 0.0]],
    };
    let background = Background::uniform(vec![vec![0.0, 5.0, 1.0], vec![2.0, 5.0, 3.0]]).unwrap();
    let explainer = KernelExplainer::new(model, background, KernelConfig::default()).unwrap();

    let attribution = explainer.explain(&[1.0, 5.0, 2.0]).unwrap();
    assert_eq!(attribution.values[1], vec![0.0, 0.0]);
}

#[test]
fn single_varying_feature_takes_the_whole_difference() {
    let model = Linear {
        weights: [[1.0, 2.0, 3.0], [0.0, 0.0, 1.0]],
    };
    let background = Background::uniform(vec![vec![1.0, 1.0, 0.0]]).unwrap();
    let explainer = KernelExplainer::new(model, background, KernelConfig::default()).unwrap();

    let attribution = explainer.explain(&[1.0, 1.0, 2.0]).unwrap();
    assert_eq!(attribution.values[2], vec![6.0, 2.0]);
    assert_eq!(attribution.values[0], vec![0.0, 0.0]);
}

#[test]
fn rejects_wrong_width() {
    let background = Background::uniform(vec![vec![0.0, 0.0, 0.0]]).unwrap();
    let explainer = KernelExplainer::new(
        Linear {
            weights: [[0.0; 3]; 2],
        },
        background,
        KernelConfig::default(),
    )
    .unwrap();
    assert!(explainer.explain(&[1.0]).is_err());
}

fn data_row() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(-2.0..2.0f64, 5)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn contributions_sum_to_prediction_minus_base(
        data in proptest::collection::vec(data_row(), 12..30),
        x in data_row(),
        budget in 8usize..40,
    ) {
        let background = summarize(&data, 4, 0).unwrap();
        let config = KernelConfig { max_coalitions: Some(budget), seed: 11 };
        let explainer = KernelExplainer::new(Interacting, background, config).unwrap();
        let attribution = explainer.explain(&x).unwrap();

        for (d, sum) in attribution.sums().iter().enumerate() {
            let total = attribution.prediction[d] - attribution.base_values[d];
            prop_assert!((sum - total).abs() < 1e-9);
        }
        let base_total: f64 = attribution.base_values.iter().sum();
        prop_assert!((base_total - 1.0).abs() < 1e-9);
    }
}
