//! Kernel additive feature attribution.
//!
//! For one instance `x` the explainer evaluates the model on coalitions of
//! features: features in the coalition take their value from `x`, the rest
//! are marginalized over the weighted background. A weighted linear regression
//! of those evaluations on the coalition masks, using the Shapley kernel
//! `(M - 1) / (s (M - s))`, yields one contribution per feature and output.
//! The regression is constrained so that contributions sum exactly to
//! `f(x) - E[f]`.
//!
//! Coalition sizes are enumerated completely, smallest and largest first,
//! while the sample budget allows; the remaining budget is spent on random
//! coalitions drawn from an explicitly seeded generator.

use std::collections::HashMap;

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::background::Background;
use crate::error::{ExplainError, Result};
use crate::linalg::solve_normal_equations;

/// A model whose outputs are explained, typically class probabilities.
pub trait ProbabilityModel: Send + Sync {
    /// Number of outputs per row.
    fn n_outputs(&self) -> usize;

    /// Outputs for one row.
    fn predict_proba(&self, row: &[f64]) -> Vec<f64>;
}

impl<M: ProbabilityModel + ?Sized> ProbabilityModel for std::sync::Arc<M> {
    fn n_outputs(&self) -> usize {
        (**self).n_outputs()
    }

    fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        (**self).predict_proba(row)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelConfig {
    /// Coalition budget; `None` uses `2 * M + 2048`.
    pub max_coalitions: Option<usize>,
    pub seed: u64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            max_coalitions: None,
            seed: 0,
        }
    }
}

/// Contributions for one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution {
    /// Expected model output over the background, per output.
    pub base_values: Vec<f64>,
    /// One row per feature, one column per output.
    pub values: Vec<Vec<f64>>,
    /// Model output for the instance.
    pub prediction: Vec<f64>,
}

impl Attribution {
    /// Sum of contributions for each output.
    pub fn sums(&self) -> Vec<f64> {
        (0..self.base_values.len())
            .map(|d| self.values.iter().map(|row| row[d]).sum())
            .collect()
    }
}

pub struct KernelExplainer<M> {
    model: M,
    background: Background,
    expected_value: Vec<f64>,
    config: KernelConfig,
}

impl<M: ProbabilityModel> std::fmt::Debug for KernelExplainer<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelExplainer")
            .field("background_rows", &self.background.len())
            .field("features", &self.background.width())
            .field("expected_value", &self.expected_value)
            .field("config", &self.config)
            .finish()
    }
}

impl<M: ProbabilityModel> KernelExplainer<M> {
    /// Builds the explainer and evaluates the model over the background.
    pub fn new(model: M, background: Background, config: KernelConfig) -> Result<Self> {
        let n_outputs = model.n_outputs();
        let mut expected_value = vec![0.0; n_outputs];
        for (row, weight) in background.rows().iter().zip(background.weights()) {
            let output = checked_predict(&model, row)?;
            for (acc, value) in expected_value.iter_mut().zip(output) {
                *acc += weight * value;
            }
        }
        debug!(
            background_rows = background.len(),
            features = background.width(),
            outputs = n_outputs,
            "kernel explainer ready"
        );
        Ok(Self {
            model,
            background,
            expected_value,
            config,
        })
    }

    pub fn expected_value(&self) -> &[f64] {
        &self.expected_value
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Explains one instance.
    pub fn explain(&self, x: &[f64]) -> Result<Attribution> {
        let width = self.background.width();
        if x.len() != width {
            return Err(ExplainError::InputWidth {
                expected: width,
                found: x.len(),
            });
        }
        let n_outputs = self.expected_value.len();
        let fx = checked_predict(&self.model, x)?;
        let mut values = vec![vec![0.0; n_outputs]; width];

        let varying: Vec<usize> = (0..width)
            .filter(|&j| {
                self.background
                    .rows()
                    .iter()
                    .any(|row| !is_close(x[j], row[j]))
            })
            .collect();

        match varying.len() {
            0 => {}
            1 => {
                for d in 0..n_outputs {
                    values[varying[0]][d] = fx[d] - self.expected_value[d];
                }
            }
            m => {
                let plan = CoalitionPlan::build(m, self.budget(m), self.config.seed);
                let outputs = plan
                    .masks
                    .iter()
                    .map(|mask| self.coalition_value(x, &varying, mask))
                    .collect::<Result<Vec<_>>>()?;
                for d in 0..n_outputs {
                    let phi = self.regress(&plan, &outputs, d, fx[d])?;
                    for (feature, value) in varying.iter().zip(phi) {
                        values[*feature][d] = value;
                    }
                }
                debug!(
                    varying = m,
                    coalitions = plan.masks.len(),
                    "attributed instance"
                );
            }
        }

        Ok(Attribution {
            base_values: self.expected_value.clone(),
            values,
            prediction: fx,
        })
    }

    fn budget(&self, m: usize) -> usize {
        let requested = self.config.max_coalitions.unwrap_or(2 * m + 2048);
        let all = if m >= 63 {
            usize::MAX
        } else {
            (1usize << m).saturating_sub(2)
        };
        requested.min(all).max(1)
    }

    /// Expected output with coalition features fixed to `x`.
    fn coalition_value(&self, x: &[f64], varying: &[usize], mask: &[bool]) -> Result<Vec<f64>> {
        let mut expected = vec![0.0; self.expected_value.len()];
        let mut synthetic = vec![0.0; x.len()];
        for (row, weight) in self.background.rows().iter().zip(self.background.weights()) {
            synthetic.copy_from_slice(row);
            for (feature, on) in varying.iter().zip(mask) {
                if *on {
                    synthetic[*feature] = x[*feature];
                }
            }
            let output = checked_predict(&self.model, &synthetic)?;
            for (acc, value) in expected.iter_mut().zip(output) {
                *acc += weight * value;
            }
        }
        Ok(expected)
    }

    /// Constrained weighted least squares for output `d`, eliminating the
    /// last varying feature so contributions sum to `fx - E[f]`.
    fn regress(
        &self,
        plan: &CoalitionPlan,
        outputs: &[Vec<f64>],
        d: usize,
        fx: f64,
    ) -> Result<Vec<f64>> {
        let m = plan.m;
        let total = fx - self.expected_value[d];
        let k = m - 1;
        let mut ata = vec![vec![0.0; k]; k];
        let mut atb = vec![0.0; k];

        for ((mask, weight), output) in plan.masks.iter().zip(&plan.weights).zip(outputs) {
            let last = f64::from(u8::from(mask[k]));
            let target = (output[d] - self.expected_value[d]) - last * total;
            let row: Vec<f64> = mask[..k]
                .iter()
                .map(|on| f64::from(u8::from(*on)) - last)
                .collect();
            for i in 0..k {
                if row[i] == 0.0 {
                    continue;
                }
                let wi = weight * row[i];
                atb[i] += wi * target;
                for j in 0..k {
                    ata[i][j] += wi * row[j];
                }
            }
        }

        let mut phi = solve_normal_equations(ata, atb).ok_or(ExplainError::Singular)?;
        let assigned: f64 = phi.iter().sum();
        phi.push(total - assigned);
        Ok(phi)
    }
}

fn checked_predict<M: ProbabilityModel>(model: &M, row: &[f64]) -> Result<Vec<f64>> {
    let output = model.predict_proba(row);
    if output.len() != model.n_outputs() {
        return Err(ExplainError::ModelOutputs {
            expected: model.n_outputs(),
            found: output.len(),
        });
    }
    Ok(output)
}

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-8 + 1e-5 * b.abs() || (a.is_nan() && b.is_nan())
}

/// Coalition masks over the varying features and their kernel weights.
struct CoalitionPlan {
    m: usize,
    masks: Vec<Vec<bool>>,
    weights: Vec<f64>,
}

impl CoalitionPlan {
    fn build(m: usize, budget: usize, seed: u64) -> Self {
        let mut plan = Self {
            m,
            masks: Vec::new(),
            weights: Vec::new(),
        };

        let num_sizes = (m - 1).div_ceil(2);
        let num_paired = (m - 1) / 2;
        let mut weight_vector: Vec<f64> = (1..=num_sizes)
            .map(|s| (m as f64 - 1.0) / (s as f64 * (m - s) as f64))
            .collect();
        for w in weight_vector.iter_mut().take(num_paired) {
            *w *= 2.0;
        }
        let norm: f64 = weight_vector.iter().sum();
        weight_vector.iter_mut().for_each(|w| *w /= norm);

        let mut full_sizes = 0;
        let mut samples_left = budget;
        let mut remaining = weight_vector.clone();
        for size in 1..=num_sizes {
            let paired = size <= num_paired;
            let mut nsubsets = binomial(m, size);
            if paired {
                nsubsets *= 2.0;
            }
            if (samples_left as f64) * remaining[size - 1] / nsubsets < 1.0 - 1e-8 {
                break;
            }
            full_sizes += 1;
            samples_left = samples_left.saturating_sub(nsubsets as usize);
            if remaining[size - 1] < 1.0 {
                let scale = 1.0 - remaining[size - 1];
                remaining.iter_mut().for_each(|w| *w /= scale);
            }

            let mut w = weight_vector[size - 1] / binomial(m, size);
            if paired {
                w /= 2.0;
            }
            for subset in combinations(m, size) {
                let mut mask = vec![false; m];
                for idx in subset {
                    mask[idx] = true;
                }
                if paired {
                    plan.push(mask.iter().map(|on| !on).collect(), w);
                }
                plan.push(mask, w);
            }
        }

        if full_sizes < num_sizes && samples_left > 0 {
            plan.sample(&weight_vector, full_sizes, num_paired, samples_left, seed);
        }
        plan
    }

    fn push(&mut self, mask: Vec<bool>, weight: f64) {
        self.masks.push(mask);
        self.weights.push(weight);
    }

    /// Draws random coalitions for the sizes that were not enumerated.
    /// Repeated draws add weight to the existing coalition.
    fn sample(
        &mut self,
        weight_vector: &[f64],
        full_sizes: usize,
        num_paired: usize,
        mut samples_left: usize,
        seed: u64,
    ) {
        let m = self.m;
        let fixed = self.masks.len();
        let size_weights: Vec<f64> = weight_vector
            .iter()
            .enumerate()
            .skip(full_sizes)
            .map(|(idx, w)| if idx < num_paired { w / 2.0 } else { *w })
            .collect();
        let Ok(sizes) = WeightedIndex::new(&size_weights) else {
            return;
        };
        let mut rng = StdRng::seed_from_u64(seed);
        let mut seen: HashMap<Vec<bool>, usize> = HashMap::new();

        for _ in 0..4 * samples_left {
            if samples_left == 0 {
                break;
            }
            let size = sizes.sample(&mut rng) + full_sizes + 1;
            let mut mask = vec![false; m];
            for idx in rand::seq::index::sample(&mut rng, m, size).into_iter() {
                mask[idx] = true;
            }
            let paired = size <= num_paired;
            let complement: Vec<bool> = mask.iter().map(|on| !on).collect();

            match seen.get(&mask) {
                Some(&idx) => self.weights[idx] += 1.0,
                None => {
                    seen.insert(mask.clone(), self.masks.len());
                    self.push(mask, 1.0);
                    samples_left -= 1;
                }
            }
            if paired && samples_left > 0 {
                match seen.get(&complement) {
                    Some(&idx) => self.weights[idx] += 1.0,
                    None => {
                        seen.insert(complement.clone(), self.masks.len());
                        self.push(complement, 1.0);
                        samples_left -= 1;
                    }
                }
            }
        }

        let weight_left: f64 = weight_vector[full_sizes..].iter().sum();
        let drawn: f64 = self.weights[fixed..].iter().sum();
        if drawn > 0.0 {
            for w in &mut self.weights[fixed..] {
                *w *= weight_left / drawn;
            }
        }
    }
}

fn binomial(n: usize, k: usize) -> f64 {
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// All `k`-subsets of `0..n` in lexicographic order.
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut current: Vec<usize> = (0..k).collect();
    if k > n {
        return out;
    }
    loop {
        out.push(current.clone());
        let Some(pos) = (0..k).rev().find(|&i| current[i] != i + n - k) else {
            break;
        };
        current[pos] += 1;
        for i in pos + 1..k {
            current[i] = current[i - 1] + 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combinations_enumerate_subsets() {
        assert_eq!(
            combinations(4, 2),
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(combinations(3, 0), vec![Vec::<usize>::new()]);
        assert_eq!(binomial(23, 2), 253.0);
    }

    #[test]
    fn small_problems_enumerate_every_coalition() {
        let plan = CoalitionPlan::build(4, 14, 0);
        assert_eq!(plan.masks.len(), 14);
        let total: f64 = plan.weights.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn large_problems_sample_within_budget() {
        let plan = CoalitionPlan::build(23, 2 * 23 + 2048, 3);
        assert!(plan.masks.len() <= 2 * 23 + 2048);
        assert!(plan.masks.iter().all(|mask| {
            let on = mask.iter().filter(|on| **on).count();
            on > 0 && on < 23
        }));
        let again = CoalitionPlan::build(23, 2 * 23 + 2048, 3);
        assert_eq!(plan.masks, again.masks);
    }
}
