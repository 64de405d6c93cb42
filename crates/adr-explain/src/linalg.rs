//! Small dense solvers for the attribution regression.

/// Solves `a · x = b` by Gaussian elimination with partial pivoting.
///
/// Returns `None` when a pivot vanishes relative to the matrix scale.
pub fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if n == 0 {
        return Some(Vec::new());
    }
    if scale == 0.0 {
        return None;
    }
    let eps = scale * 1e-12;

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() <= eps {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}

/// Solves the normal equations, retrying with a small ridge on the diagonal
/// when the system is rank deficient.
pub fn solve_normal_equations(ata: Vec<Vec<f64>>, atb: Vec<f64>) -> Option<Vec<f64>> {
    if let Some(x) = solve(ata.clone(), atb.clone()) {
        return Some(x);
    }
    let n = atb.len();
    let trace: f64 = (0..n).map(|i| ata[i][i]).sum();
    let ridge = 1e-8 * (trace / n.max(1) as f64).max(1e-12);
    let mut regularized = ata;
    for (i, row) in regularized.iter_mut().enumerate() {
        row[i] += ridge;
    }
    solve(regularized, atb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_small_system() {
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let x = solve(a, vec![3.0, 5.0]).unwrap();
        assert!((x[0] - 0.8).abs() < 1e-12);
        assert!((x[1] - 1.4).abs() < 1e-12);
    }

    #[test]
    fn singular_needs_ridge() {
        let a = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        assert!(solve(a.clone(), vec![2.0, 2.0]).is_none());
        let x = solve_normal_equations(a, vec![2.0, 2.0]).unwrap();
        assert!((x[0] + x[1] - 2.0).abs() < 1e-6);
    }
}
