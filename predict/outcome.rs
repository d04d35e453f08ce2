//! # Outcome Estimation and Fit Scoring
//!
//! The prediction itself is a single matrix-vector product: each member's
//! estimate is the relevance-weighted average of every other member's known
//! outcome. Members with unknown outcome enter the vector as `0.0` so they
//! participate in their neighbors' predictions without counting as positive
//! examples; their own displayed estimate must not be compared to "truth"
//! without excluding them from the evaluation.
//!
//! The fit score measures how strongly a member's relevance pattern aligns
//! with the outcome distribution: z-score each relevance row and the outcome
//! vector, square the dot product, divide by `n²`. The `n²` scaling is part
//! of the contract and is not replaced by a degrees-of-freedom correction.

use crate::pipeline::PredictionError;
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

/// Numeric outcome vector in member order: known-positive is 1.0, everything
/// else (known-negative or placeholder for unknown) is 0.0.
pub fn outcome_vector(outcomes: impl Iterator<Item = Option<bool>>) -> Array1<f64> {
    Array1::from_iter(outcomes.map(|o| if o == Some(true) { 1.0 } else { 0.0 }))
}

/// Relevance-weighted outcome estimate per member. Each value is a convex
/// combination of 0/1 outcomes and therefore lies in `[0, 1]`.
pub fn predict_outcomes(
    relevance: ArrayView2<'_, f64>,
    outcomes: ArrayView1<'_, f64>,
) -> Array1<f64> {
    relevance.dot(&outcomes)
}

/// Population (ddof = 0) mean and standard deviation.
fn population_stats(values: ArrayView1<'_, f64>) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.sum() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Per-member confidence scores. Fails with
/// [`PredictionError::DegenerateOutcome`] when the outcome vector is constant,
/// since the correlation is undefined there.
pub fn fit_scores(
    relevance: ArrayView2<'_, f64>,
    outcomes: ArrayView1<'_, f64>,
) -> Result<Array1<f64>, PredictionError> {
    let n = outcomes.len();
    let (out_mean, out_std) = population_stats(outcomes);
    if out_std == 0.0 {
        return Err(PredictionError::DegenerateOutcome);
    }
    let z_out = outcomes.mapv(|v| (v - out_mean) / out_std);

    let n_sq = (n * n) as f64;
    let mut scores = Array1::zeros(n);
    for (i, row) in relevance.axis_iter(Axis(0)).enumerate() {
        let (row_mean, row_std) = population_stats(row);
        // A relevance row always mixes a zero diagonal with positive weights,
        // so its spread is never zero.
        debug_assert!(row_std > 0.0);
        let aligned: f64 = row
            .iter()
            .zip(z_out.iter())
            .map(|(w, z)| (w - row_mean) / row_std * z)
            .sum();
        scores[i] = aligned.powi(2) / n_sq;
    }
    Ok(scores)
}
