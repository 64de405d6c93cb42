//! Trained classifier exported to JSON.
//!
//! Two model families are supported: multinomial (or binary) logistic
//! regression, and random forests of axis-aligned split trees in the layout
//! produced by scikit-learn's tree exporter. Both expose class probabilities
//! for a single encoded row.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Classifier {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
}

/// Linear model with one coefficient row per class.
///
/// A single coefficient row denotes a binary model whose row scores the
/// second class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

/// Flattened tree; node 0 is the root and children follow their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Rows with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class counts (or fractions) of the training rows reaching this leaf.
    Leaf { value: Vec<f64> },
}

impl Classifier {
    pub fn from_json(path: &Path, bytes: &[u8]) -> Result<Self> {
        let classifier: Self =
            serde_json::from_slice(bytes).map_err(|e| ConfigurationError::Json {
                path: path.to_path_buf(),
                source: e,
            })?;
        classifier
            .validate()
            .map_err(|message| ConfigurationError::invalid(path, message))?;
        Ok(classifier)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Classifier::LogisticRegression(_) => "logistic_regression",
            Classifier::RandomForest(_) => "random_forest",
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            Classifier::LogisticRegression(model) => {
                model.coef.first().map_or(0, |row| row.len())
            }
            Classifier::RandomForest(model) => model.n_features,
        }
    }

    pub fn n_classes(&self) -> usize {
        match self {
            Classifier::LogisticRegression(model) if model.coef.len() == 1 => 2,
            Classifier::LogisticRegression(model) => model.coef.len(),
            Classifier::RandomForest(model) => model.n_classes,
        }
    }

    /// Class probabilities for one encoded row of `n_features()` values.
    pub fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        match self {
            Classifier::LogisticRegression(model) => model.predict_proba(row),
            Classifier::RandomForest(model) => model.predict_proba(row),
        }
    }

    /// Index of the most probable class; ties resolve to the lowest index.
    pub fn predict(&self, row: &[f64]) -> usize {
        argmax(&self.predict_proba(row))
    }

    fn validate(&self) -> std::result::Result<(), String> {
        match self {
            Classifier::LogisticRegression(model) => model.validate(),
            Classifier::RandomForest(model) => model.validate(),
        }
    }
}

fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (idx, value) in values.iter().enumerate() {
        if *value > values[best] {
            best = idx;
        }
    }
    best
}

impl LogisticRegression {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.coef.is_empty() {
            return Err("logistic regression has no coefficient rows".to_string());
        }
        if self.intercept.len() != self.coef.len() {
            return Err(format!(
                "{} coefficient rows but {} intercepts",
                self.coef.len(),
                self.intercept.len()
            ));
        }
        let width = self.coef[0].len();
        if self.coef.iter().any(|row| row.len() != width) {
            return Err("coefficient rows have different lengths".to_string());
        }
        Ok(())
    }

    fn decision(&self, row: &[f64]) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(weights, bias)| {
                weights.iter().zip(row).map(|(w, x)| w * x).sum::<f64>() + bias
            })
            .collect()
    }

    pub fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let scores = self.decision(row);
        if scores.len() == 1 {
            let positive = 1.0 / (1.0 + (-scores[0]).exp());
            return vec![1.0 - positive, positive];
        }
        softmax(&scores)
    }
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

impl RandomForest {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.trees.is_empty() {
            return Err("random forest has no trees".to_string());
        }
        if self.n_classes == 0 {
            return Err("random forest has no classes".to_string());
        }
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(format!("tree {t} has no nodes"));
            }
            for (idx, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        left,
                        right,
                        ..
                    } => {
                        if *feature >= self.n_features {
                            return Err(format!("tree {t} node {idx} splits on feature {feature}"));
                        }
                        let in_order = |child: usize| child > idx && child < tree.nodes.len();
                        if !in_order(*left) || !in_order(*right) {
                            return Err(format!("tree {t} node {idx} has invalid children"));
                        }
                    }
                    TreeNode::Leaf { value } => {
                        if value.len() != self.n_classes {
                            return Err(format!(
                                "tree {t} leaf {idx} has {} class values, expected {}",
                                value.len(),
                                self.n_classes
                            ));
                        }
                        if value.iter().any(|v| *v < 0.0) || value.iter().sum::<f64>() <= 0.0 {
                            return Err(format!("tree {t} leaf {idx} has no positive mass"));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let leaf = tree.leaf(row);
            let total: f64 = leaf.iter().sum();
            for (acc, v) in proba.iter_mut().zip(leaf) {
                *acc += v / total;
            }
        }
        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        proba
    }
}

impl DecisionTree {
    /// Leaf values reached by `row`. Children always follow their parent,
    /// so the walk terminates.
    fn leaf(&self, row: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = row.get(*feature).copied().unwrap_or(f64::NAN);
                    idx = if x <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest() -> Classifier {
        let json = r#"{
            "type": "random_forest",
            "n_features": 2,
            "n_classes": 3,
            "trees": [
                {"nodes": [
                    {"feature": 0, "threshold": 0.5, "left": 1, "right": 2},
                    {"value": [8.0, 2.0, 0.0]},
                    {"value": [0.0, 1.0, 3.0]}
                ]},
                {"nodes": [{"value": [1.0, 1.0, 2.0]}]}
            ]
        }"#;
        Classifier::from_json(Path::new("classifier.json"), json.as_bytes()).unwrap()
    }

    #[test]
    fn forest_averages_leaf_distributions() {
        let model = forest();
        assert_eq!(model.n_classes(), 3);
        let proba = model.predict_proba(&[0.0, 0.0]);
        assert!((proba[0] - 0.525).abs() < 1e-12);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(model.predict(&[1.0, 0.0]), 2);
    }

    #[test]
    fn forest_rejects_backward_children() {
        let json = r#"{"type":"random_forest","n_features":1,"n_classes":2,
            "trees":[{"nodes":[{"feature":0,"threshold":0.0,"left":0,"right":0}]}]}"#;
        assert!(Classifier::from_json(Path::new("c.json"), json.as_bytes()).is_err());
    }

    #[test]
    fn logistic_regression_softmax() {
        let model = Classifier::LogisticRegression(LogisticRegression {
            coef: vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 0.0]],
            intercept: vec![0.0, 0.0, 0.0],
        });
        assert_eq!(model.n_features(), 2);
        let proba = model.predict_proba(&[2.0, 0.0]);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(model.predict(&[2.0, 0.0]), 0);
        assert_eq!(model.predict(&[0.0, 2.0]), 1);
    }

    #[test]
    fn binary_logistic_regression_has_two_classes() {
        let model = Classifier::LogisticRegression(LogisticRegression {
            coef: vec![vec![1.0]],
            intercept: vec![0.0],
        });
        assert_eq!(model.n_classes(), 2);
        assert_eq!(model.predict_proba(&[0.0]), vec![0.5, 0.5]);
    }
}
