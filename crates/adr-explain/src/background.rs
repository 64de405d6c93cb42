//! Weighted background sample used to marginalize absent features.

use crate::error::{ExplainError, Result};

/// Background rows with weights normalized to sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    rows: Vec<Vec<f64>>,
    weights: Vec<f64>,
}

impl Background {
    pub fn new(rows: Vec<Vec<f64>>, weights: Vec<f64>) -> Result<Self> {
        if rows.is_empty() {
            return Err(ExplainError::EmptyBackground);
        }
        if weights.len() != rows.len() {
            return Err(ExplainError::InvalidWeights {
                message: format!("{} weights for {} rows", weights.len(), rows.len()),
            });
        }
        let width = rows[0].len();
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != width)
        {
            return Err(ExplainError::BackgroundWidth {
                row,
                expected: width,
                found,
            });
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ExplainError::InvalidWeights {
                message: "weights must be finite and non-negative".to_string(),
            });
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(ExplainError::InvalidWeights {
                message: "weights sum to zero".to_string(),
            });
        }
        let weights = weights.into_iter().map(|w| w / total).collect();
        Ok(Self { rows, weights })
    }

    /// Background where every row counts equally.
    pub fn uniform(rows: Vec<Vec<f64>>) -> Result<Self> {
        let weights = vec![1.0; rows.len()];
        Self::new(rows, weights)
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_weights() {
        let background = Background::new(vec![vec![0.0], vec![1.0]], vec![3.0, 1.0]).unwrap();
        assert_eq!(background.weights(), &[0.75, 0.25]);
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Background::uniform(vec![vec![0.0, 1.0], vec![1.0]]).unwrap_err();
        assert_eq!(
            err,
            ExplainError::BackgroundWidth {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }
}
