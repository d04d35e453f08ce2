//! Distance-to-relevance conversion: bounded similarity, no self-relevance,
//! rows normalized into probability distributions over the other members.

use crate::pipeline::PredictionError;
use ndarray::{Array2, ArrayView2, Axis};

/// Converts a distance matrix into a row-stochastic relevance matrix.
///
/// `similarity(i,j) = 1 / (1 + d(i,j))`, which is 1 only at distance zero and
/// stays positive for every finite distance. The diagonal is forced to exactly
/// zero before normalization, so a member never contributes to its own
/// prediction, and each row is divided by its sum. A zero row sum cannot occur
/// for finite input; if observed it is an invariant violation and the run
/// aborts instead of emitting NaN.
pub fn relevance_from_distances(
    distances: ArrayView2<'_, f64>,
) -> Result<Array2<f64>, PredictionError> {
    let mut relevance = distances.mapv(|d| 1.0 / (1.0 + d));
    relevance.diag_mut().fill(0.0);

    for (row_index, mut row) in relevance.axis_iter_mut(Axis(0)).enumerate() {
        let sum = row.sum();
        if !(sum > 0.0) {
            return Err(PredictionError::DegenerateRelevance { row: row_index });
        }
        row /= sum;
    }
    Ok(relevance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr2;

    #[test]
    fn rows_are_stochastic_and_diagonal_zero() {
        let d = arr2(&[
            [0.0, 1.0, 2.0],
            [1.0, 0.0, 0.5],
            [2.0, 0.5, 0.0],
        ]);
        let rel = relevance_from_distances(d.view()).unwrap();
        for i in 0..3 {
            assert_eq!(rel[[i, i]], 0.0);
            assert_abs_diff_eq!(rel.row(i).sum(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn closer_members_get_more_weight() {
        let d = arr2(&[
            [0.0, 1.0, 3.0],
            [1.0, 0.0, 3.0],
            [3.0, 3.0, 0.0],
        ]);
        let rel = relevance_from_distances(d.view()).unwrap();
        // Member 0 is closer to 1 than to 2.
        assert!(rel[[0, 1]] > rel[[0, 2]]);
        // Unnormalized similarities: 1/2 and 1/4.
        assert_abs_diff_eq!(rel[[0, 1]], 0.5 / 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(rel[[0, 2]], 0.25 / 0.75, epsilon = 1e-12);
    }

    #[test]
    fn zero_distance_pairs_are_still_normalized() {
        // Duplicate members: similarity 1 off-diagonal.
        let d = arr2(&[[0.0, 0.0], [0.0, 0.0]]);
        let rel = relevance_from_distances(d.view()).unwrap();
        assert_abs_diff_eq!(rel[[0, 1]], 1.0);
        assert_abs_diff_eq!(rel[[1, 0]], 1.0);
        assert_eq!(rel[[0, 0]], 0.0);
    }

    #[test]
    fn non_finite_row_is_an_invariant_violation() {
        let d = arr2(&[[0.0, f64::INFINITY], [f64::INFINITY, 0.0]]);
        match relevance_from_distances(d.view()) {
            Err(PredictionError::DegenerateRelevance { row: 0 }) => {}
            other => panic!("expected DegenerateRelevance, got {other:?}"),
        }
    }
}
