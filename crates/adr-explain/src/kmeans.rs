//! Seeded k-means summary of a background data set.
//!
//! Centroids are found with k-means++ initialization and Lloyd iterations,
//! keeping the best of several restarts. Each centroid coordinate is then
//! snapped to the nearest value observed in that column, so the summary only
//! contains values the model has seen, and each centroid is weighted by the
//! size of its cluster.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::background::Background;
use crate::error::{ExplainError, Result};

const N_INIT: usize = 10;
const MAX_ITER: usize = 300;
const TOLERANCE: f64 = 1e-4;

/// Summarizes `data` by `k` weighted, value-snapped centroids.
///
/// When `data` has no more than `k` rows it is used as is with equal weights.
pub fn summarize(data: &[Vec<f64>], k: usize, seed: u64) -> Result<Background> {
    if data.is_empty() || k == 0 {
        return Err(ExplainError::EmptyBackground);
    }
    let width = data[0].len();
    if let Some((row, found)) = data
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
    if data.len() <= k {
        return Background::uniform(data.to_vec());
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let tol = TOLERANCE * mean_variance(data);
    let mut best: Option<Clustering> = None;
    for _ in 0..N_INIT {
        let run = lloyd(data, k, tol, &mut rng);
        if best.as_ref().is_none_or(|b| run.inertia < b.inertia) {
            best = Some(run);
        }
    }
    let Some(best) = best else {
        return Err(ExplainError::EmptyBackground);
    };

    let mut counts = vec![0.0; k];
    for label in &best.labels {
        counts[*label] += 1.0;
    }
    let mut rows = Vec::with_capacity(k);
    let mut weights = Vec::with_capacity(k);
    for (centroid, count) in best.centroids.iter().zip(counts) {
        if count == 0.0 {
            continue;
        }
        rows.push(snap_to_observed(data, centroid));
        weights.push(count);
    }
    debug!(
        rows = data.len(),
        clusters = rows.len(),
        inertia = best.inertia,
        "summarized background"
    );
    Background::new(rows, weights)
}

struct Clustering {
    centroids: Vec<Vec<f64>>,
    labels: Vec<usize>,
    inertia: f64,
}

fn lloyd(data: &[Vec<f64>], k: usize, tol: f64, rng: &mut StdRng) -> Clustering {
    let mut centroids = kmeans_plus_plus(data, k, rng);
    let mut labels = vec![0; data.len()];

    for _ in 0..MAX_ITER {
        for (label, row) in labels.iter_mut().zip(data) {
            *label = nearest(row, &centroids).0;
        }
        let updated = recompute(data, &labels, &centroids);
        let shift: f64 = centroids
            .iter()
            .zip(&updated)
            .map(|(old, new)| squared_distance(old, new))
            .sum();
        centroids = updated;
        if shift <= tol {
            break;
        }
    }

    let mut inertia = 0.0;
    for (label, row) in labels.iter_mut().zip(data) {
        let (idx, dist) = nearest(row, &centroids);
        *label = idx;
        inertia += dist;
    }
    Clustering {
        centroids,
        labels,
        inertia,
    }
}

fn kmeans_plus_plus(data: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = vec![data[rng.gen_range(0..data.len())].clone()];
    let mut distances: Vec<f64> = data
        .iter()
        .map(|row| squared_distance(row, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = distances.iter().sum();
        let chosen = if total > 0.0 {
            let mut target = rng.gen_range(0.0..total);
            let mut chosen = data.len() - 1;
            for (idx, d) in distances.iter().enumerate() {
                if target < *d {
                    chosen = idx;
                    break;
                }
                target -= d;
            }
            chosen
        } else {
            rng.gen_range(0..data.len())
        };
        let centroid = data[chosen].clone();
        for (d, row) in distances.iter_mut().zip(data) {
            *d = d.min(squared_distance(row, &centroid));
        }
        centroids.push(centroid);
    }
    centroids
}

/// Cluster means; a cluster that lost all its members keeps its centroid.
fn recompute(data: &[Vec<f64>], labels: &[usize], previous: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let width = previous[0].len();
    let mut sums = vec![vec![0.0; width]; previous.len()];
    let mut counts = vec![0usize; previous.len()];
    for (row, label) in data.iter().zip(labels) {
        counts[*label] += 1;
        for (acc, v) in sums[*label].iter_mut().zip(row) {
            *acc += v;
        }
    }
    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((sum, count), old)| {
            if count == 0 {
                old.clone()
            } else {
                sum.into_iter().map(|s| s / count as f64).collect()
            }
        })
        .collect()
}

fn nearest(row: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (idx, centroid) in centroids.iter().enumerate() {
        let d = squared_distance(row, centroid);
        if d < best.1 {
            best = (idx, d);
        }
    }
    best
}

fn snap_to_observed(data: &[Vec<f64>], centroid: &[f64]) -> Vec<f64> {
    centroid
        .iter()
        .enumerate()
        .map(|(j, c)| {
            data.iter()
                .map(|row| row[j])
                .min_by(|a, b| (a - c).abs().total_cmp(&(b - c).abs()))
                .unwrap_or(*c)
        })
        .collect()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn mean_variance(data: &[Vec<f64>]) -> f64 {
    let n = data.len() as f64;
    let width = data[0].len();
    if width == 0 {
        return 0.0;
    }
    let total: f64 = (0..width)
        .map(|j| {
            let mean = data.iter().map(|row| row[j]).sum::<f64>() / n;
            data.iter().map(|row| (row[j] - mean).powi(2)).sum::<f64>() / n
        })
        .sum();
    total / width as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> Vec<Vec<f64>> {
        let mut data = Vec::new();
        for i in 0..20 {
            let jitter = f64::from(i % 5) * 0.01;
            data.push(vec![0.0 + jitter, 1.0]);
            data.push(vec![10.0 + jitter, 0.0]);
        }
        data
    }

    #[test]
    fn small_data_is_used_as_is() {
        let data = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let background = summarize(&data, 10, 0).unwrap();
        assert_eq!(background.rows(), data.as_slice());
        assert_eq!(background.weights(), &[0.5, 0.5]);
    }

    #[test]
    fn centroids_snap_to_observed_values() {
        let data = two_blobs();
        let background = summarize(&data, 2, 7).unwrap();
        assert_eq!(background.len(), 2);
        for row in background.rows() {
            for (j, value) in row.iter().enumerate() {
                assert!(data.iter().any(|observed| observed[j] == *value));
            }
        }
        let total: f64 = background.weights().iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!(background.weights().iter().all(|w| (*w - 0.5).abs() < 1e-12));
    }

    #[test]
    fn same_seed_same_summary() {
        let data = two_blobs();
        assert_eq!(summarize(&data, 3, 42).unwrap(), summarize(&data, 3, 42).unwrap());
    }
}
