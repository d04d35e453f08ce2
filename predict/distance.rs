//! # Statistical Distance
//!
//! Computes the pairwise Mahalanobis distance matrix over the feature matrix.
//! The metric tensor is the inverse of the ridge-regularized empirical
//! covariance, so correlated features are discounted instead of double
//! counted. Rows are processed in parallel; the result is symmetric with a
//! zero diagonal by construction.

use crate::pipeline::PredictionError;
use ndarray::{Array2, ArrayView2, Axis};
use ndarray_linalg::Inverse;
use rayon::prelude::*;

/// Unbiased (`n-1`) column covariance with `ridge_epsilon` added to the
/// diagonal so the matrix stays invertible even with correlated or
/// near-constant columns.
pub fn regularized_covariance(x: ArrayView2<'_, f64>, ridge_epsilon: f64) -> Array2<f64> {
    let n = x.nrows() as f64;
    let mean = x.sum_axis(Axis(0)) / n;
    let centered = &x - &mean;
    let mut cov = centered.t().dot(&centered) / (n - 1.0);
    cov.diag_mut().mapv_inplace(|d| d + ridge_epsilon);
    cov
}

/// Pairwise `d(i,j) = sqrt((x_i - x_j)^T Cov^-1 (x_i - x_j))` over the rows of
/// `x`. Fails with [`PredictionError::SingularMatrix`] if the covariance is
/// not invertible even after regularization, which indicates a misconfigured
/// epsilon rather than a recoverable runtime condition.
pub fn mahalanobis_distances(
    x: ArrayView2<'_, f64>,
    ridge_epsilon: f64,
) -> Result<Array2<f64>, PredictionError> {
    let cov = regularized_covariance(x, ridge_epsilon);
    let inv_cov = cov.inv()?;
    let inv = &inv_cov;

    let n = x.nrows();
    let upper: Vec<(usize, usize, f64)> = (0..n)
        .into_par_iter()
        .flat_map_iter(|i| {
            let xi = x.row(i);
            (i + 1..n).map(move |j| {
                let mut diff = xi.to_owned();
                diff -= &x.row(j);
                let quad = diff.dot(&inv.dot(&diff));
                // Tiny negative values can arise from rounding in the
                // quadratic form; clamp before the square root.
                (i, j, quad.max(0.0).sqrt())
            })
        })
        .collect();

    let mut distances = Array2::zeros((n, n));
    for (i, j, d) in upper {
        distances[[i, j]] = d;
        distances[[j, i]] = d;
    }
    Ok(distances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, arr2};
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const EPS: f64 = 1e-6;

    fn random_matrix(n: usize, k: usize, seed: u64) -> Array2<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Array2::from_shape_fn((n, k), |_| rng.gen_range(-3.0..3.0))
    }

    #[test]
    fn covariance_of_single_column_matches_hand_value() {
        let x = arr2(&[[0.0], [1.0]]);
        let cov = regularized_covariance(x.view(), EPS);
        // var([0, 1]) with ddof=1 is 0.5
        assert_abs_diff_eq!(cov[[0, 0]], 0.5 + EPS, epsilon = 1e-12);
    }

    #[test]
    fn two_point_distance_matches_hand_value() {
        let x = arr2(&[[0.0], [1.0]]);
        let d = mahalanobis_distances(x.view(), EPS).unwrap();
        let expected = (1.0 / (0.5 + EPS)).sqrt();
        assert_abs_diff_eq!(d[[0, 1]], expected, epsilon = 1e-9);
        assert_abs_diff_eq!(d[[1, 0]], expected, epsilon = 1e-9);
    }

    #[test]
    fn distances_are_symmetric_with_zero_diagonal() {
        let x = random_matrix(12, 4, 99);
        let d = mahalanobis_distances(x.view(), EPS).unwrap();
        for i in 0..12 {
            assert_abs_diff_eq!(d[[i, i]], 0.0);
            for j in 0..12 {
                assert_abs_diff_eq!(d[[i, j]], d[[j, i]], epsilon = 1e-12);
                assert!(d[[i, j]] >= 0.0);
            }
        }
    }

    #[test]
    fn identical_rows_have_zero_distance() {
        let x = arr2(&[[1.0, 2.0], [1.0, 2.0], [3.0, 5.0]]);
        let d = mahalanobis_distances(x.view(), EPS).unwrap();
        assert_abs_diff_eq!(d[[0, 1]], 0.0, epsilon = 1e-9);
        assert!(d[[0, 2]] > 0.0);
    }

    #[test]
    fn unregularized_collinear_columns_are_singular() {
        // Two perfectly correlated columns; only the ridge keeps this
        // invertible, so epsilon = 0 must surface SingularMatrix.
        let x = arr2(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]);
        match mahalanobis_distances(x.view(), 0.0) {
            Err(PredictionError::SingularMatrix(_)) => {}
            other => panic!("expected SingularMatrix, got {other:?}"),
        }
        assert!(mahalanobis_distances(x.view(), EPS).is_ok());
    }
}
