//! # Prediction Pipeline
//!
//! Orchestrates the full run: feature extraction, matrix cleaning, statistical
//! distance, relevance weighting, outcome estimation, fit scoring. The
//! pipeline is a pure function of the member sequence, the feature table, the
//! configuration, and (for the jittered path) the injected RNG stream; no
//! stage feeds back into an earlier one and no partial result survives a
//! fatal error.

use crate::config::PredictorConfig;
use crate::distance::mahalanobis_distances;
use crate::features::{FeatureDef, STANDARD_FEATURES};
use crate::matrix::{FeatureMatrix, build_feature_matrix, build_feature_matrix_jittered};
use crate::outcome::{fit_scores, outcome_vector, predict_outcomes};
use crate::record::MemberRecord;
use crate::relevance::relevance_from_distances;
use rand::Rng;
use thiserror::Error;

/// A comprehensive error type for the prediction run. Every variant is fatal
/// to the run; constant-feature drops are reported through
/// [`PredictionReport::dropped_features`] instead.
#[derive(Error, Debug)]
pub enum PredictionError {
    #[error(
        "not enough data to perform prediction: {rows} member(s) and {cols} usable feature(s); need at least 2 members and 1 non-constant feature"
    )]
    InsufficientData { rows: usize, cols: usize },

    #[error(
        "covariance matrix is not invertible even after ridge regularization (is ridge_epsilon misconfigured?): {0}"
    )]
    SingularMatrix(#[from] ndarray_linalg::error::LinalgError),

    #[error("outcome vector has zero variance; fit scores are undefined")]
    DegenerateOutcome,

    #[error("relevance row {row} has no positive weights to normalize")]
    DegenerateRelevance { row: usize },

    #[error("invalid numerical configuration: {0}")]
    InvalidConfig(String),
}

/// One output row, in input-member order.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRow {
    pub member_id: String,
    /// Relevance-weighted outcome estimate, always within `[0, 1]`.
    pub risk: f64,
    /// Confidence score; `None` when fit scoring was disabled, flagging the
    /// row as unscored.
    pub fit: Option<f64>,
}

/// The result table plus the non-fatal notices gathered along the way.
#[derive(Debug, Clone)]
pub struct PredictionReport {
    pub rows: Vec<PredictionRow>,
    /// Features dropped because every member shared the same value.
    pub dropped_features: Vec<&'static str>,
}

/// The configured pipeline. Construct once, run against any member sequence.
pub struct Predictor {
    features: &'static [FeatureDef],
    config: PredictorConfig,
}

impl Predictor {
    pub fn new(config: PredictorConfig) -> Self {
        Self::with_features(STANDARD_FEATURES, config)
    }

    /// Runs against a caller-supplied feature table instead of
    /// [`STANDARD_FEATURES`].
    pub fn with_features(features: &'static [FeatureDef], config: PredictorConfig) -> Self {
        Self { features, config }
    }

    /// Deterministic run: no perturbation, bit-identical output for identical
    /// input.
    ///
    /// Members with `outcome: None` enter the computation with a placeholder
    /// of 0 so they weight their neighbors without counting as positives.
    /// Their own `risk` is an estimate against an unknown truth; exclude them
    /// from any accuracy evaluation.
    pub fn predict(&self, members: &[MemberRecord]) -> Result<PredictionReport, PredictionError> {
        self.validate_config()?;
        let matrix = build_feature_matrix(members, self.features)?;
        self.run(members, matrix)
    }

    /// Like [`Predictor::predict`], but adds `N(0, jitter_sigma)` noise to the
    /// cleaned matrix to break exact ties between members. Reproducible for a
    /// fixed RNG seed.
    pub fn predict_jittered<R: Rng + ?Sized>(
        &self,
        members: &[MemberRecord],
        rng: &mut R,
    ) -> Result<PredictionReport, PredictionError> {
        self.validate_config()?;
        let matrix =
            build_feature_matrix_jittered(members, self.features, self.config.jitter_sigma, rng)?;
        self.run(members, matrix)
    }

    fn validate_config(&self) -> Result<(), PredictionError> {
        let eps = self.config.ridge_epsilon;
        if !eps.is_finite() || eps < 0.0 {
            return Err(PredictionError::InvalidConfig(format!(
                "ridge_epsilon must be finite and non-negative, got {eps}"
            )));
        }
        Ok(())
    }

    fn run(
        &self,
        members: &[MemberRecord],
        matrix: FeatureMatrix,
    ) -> Result<PredictionReport, PredictionError> {
        log::info!(
            "Feature matrix: {} members x {} features ({} constant feature(s) dropped)",
            matrix.values.nrows(),
            matrix.values.ncols(),
            matrix.dropped.len()
        );

        // 1. Pairwise statistical distance under the regularized covariance.
        let distances = mahalanobis_distances(matrix.values.view(), self.config.ridge_epsilon)?;

        // 2. Row-stochastic relevance weights, self-relevance zeroed.
        let relevance = relevance_from_distances(distances.view())?;

        // 3. Weighted outcome estimate per member.
        let outcomes = outcome_vector(members.iter().map(|m| m.outcome));
        let predicted = predict_outcomes(relevance.view(), outcomes.view());

        // 4. Optional confidence scores.
        let fits = if self.config.score_fit {
            Some(fit_scores(relevance.view(), outcomes.view())?)
        } else {
            log::info!("Fit scoring disabled; returning unscored predictions");
            None
        };

        let rows = members
            .iter()
            .enumerate()
            .map(|(i, member)| PredictionRow {
                member_id: member.member_id.clone(),
                risk: predicted[i],
                fit: fits.as_ref().map(|f| f[i]),
            })
            .collect();

        Ok(PredictionReport {
            rows,
            dropped_features: matrix.dropped,
        })
    }
}
