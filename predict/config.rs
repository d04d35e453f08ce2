//! Run configuration. The numerical stability knobs live here as named,
//! documented values instead of inline constants, and can be loaded from a
//! TOML file so callers tune them without touching algorithmic code.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Ridge added to the covariance diagonal before inversion.
pub const DEFAULT_RIDGE_EPSILON: f64 = 1e-6;
/// Standard deviation of the optional tie-breaking jitter.
pub const DEFAULT_JITTER_SIGMA: f64 = 1e-4;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Covariance regularization constant. Must be positive and finite.
    pub ridge_epsilon: f64,
    /// Jitter magnitude used by the perturbed matrix build. Must be positive
    /// and finite; small enough not to alter conclusions at downstream
    /// tolerances.
    pub jitter_sigma: f64,
    /// Whether to compute fit scores. When disabled, predictions are returned
    /// unscored.
    pub score_fit: bool,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            ridge_epsilon: DEFAULT_RIDGE_EPSILON,
            jitter_sigma: DEFAULT_JITTER_SIGMA,
            score_fit: true,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

impl PredictorConfig {
    /// Loads a configuration from a TOML file; absent keys keep their
    /// defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_documented_values() {
        let config = PredictorConfig::default();
        assert_eq!(config.ridge_epsilon, 1e-6);
        assert_eq!(config.jitter_sigma, 1e-4);
        assert!(config.score_fit);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ridge_epsilon = 1e-5\n").unwrap();
        let config = PredictorConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.ridge_epsilon, 1e-5);
        assert_eq!(config.jitter_sigma, DEFAULT_JITTER_SIGMA);
    }

    #[test]
    fn malformed_toml_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ridge_epsilon = [not a number").unwrap();
        assert!(matches!(
            PredictorConfig::from_toml_file(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
