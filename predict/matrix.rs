//! # Feature-Matrix Assembly
//!
//! Turns an ordered member sequence into the `n × k` matrix the distance
//! engine consumes. Columns that take a single value across the whole cohort
//! are dropped before anything else happens: they carry no discriminative
//! information and would make the covariance singular in that dimension. The
//! drops are non-fatal and reported both through the returned struct and the
//! log. An optional Gaussian jitter breaks exact ties between members without
//! disturbing conclusions at downstream tolerances.

use crate::features::FeatureDef;
use crate::pipeline::PredictionError;
use crate::record::MemberRecord;
use ahash::AHashSet;
use ndarray::Array2;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// The cleaned feature matrix. Rows follow the input member order; columns
/// follow the feature-table order with dropped columns removed.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    pub values: Array2<f64>,
    pub feature_names: Vec<&'static str>,
    pub dropped: Vec<&'static str>,
}

/// Builds the feature matrix without perturbation. Deterministic: identical
/// input produces a bit-identical matrix.
pub fn build_feature_matrix(
    members: &[MemberRecord],
    features: &[FeatureDef],
) -> Result<FeatureMatrix, PredictionError> {
    assemble(members, features)
}

/// Builds the feature matrix and adds independent `N(0, sigma)` noise to every
/// retained cell. Constant-column detection runs on the raw values, so jitter
/// never rescues a degenerate feature.
pub fn build_feature_matrix_jittered<R: Rng + ?Sized>(
    members: &[MemberRecord],
    features: &[FeatureDef],
    sigma: f64,
    rng: &mut R,
) -> Result<FeatureMatrix, PredictionError> {
    let normal = Normal::new(0.0, sigma)
        .map_err(|e| PredictionError::InvalidConfig(format!("jitter sigma {sigma}: {e}")))?;
    let mut matrix = assemble(members, features)?;
    matrix.values.mapv_inplace(|v| v + normal.sample(rng));
    Ok(matrix)
}

fn assemble(
    members: &[MemberRecord],
    features: &[FeatureDef],
) -> Result<FeatureMatrix, PredictionError> {
    let n = members.len();
    if n < 2 {
        return Err(PredictionError::InsufficientData {
            rows: n,
            cols: features.len(),
        });
    }

    // Column-major extraction so each feature can be inspected in one pass.
    let columns: Vec<Vec<f64>> = features
        .iter()
        .map(|def| members.iter().map(|m| (def.extract)(m)).collect())
        .collect();

    let mut feature_names = Vec::new();
    let mut dropped = Vec::new();
    let mut kept_columns = Vec::new();
    for (def, column) in features.iter().zip(&columns) {
        let distinct: AHashSet<u64> = column.iter().map(|v| v.to_bits()).collect();
        if distinct.len() <= 1 {
            log::warn!("Dropped constant feature: {}", def.name);
            dropped.push(def.name);
        } else {
            feature_names.push(def.name);
            kept_columns.push(column);
        }
    }

    let k = kept_columns.len();
    if k == 0 {
        return Err(PredictionError::InsufficientData { rows: n, cols: 0 });
    }

    let mut values = Array2::zeros((n, k));
    for (j, column) in kept_columns.iter().enumerate() {
        for (i, &v) in column.iter().enumerate() {
            values[[i, j]] = v;
        }
    }

    Ok(FeatureMatrix {
        values,
        feature_names,
        dropped,
    })
}
