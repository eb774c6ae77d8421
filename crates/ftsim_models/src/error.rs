//! Error types for the reference code, noise and decoder models.

use ftsim_core::Quadrature;
use thiserror::Error;

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised by the reference collaborators.
///
/// Every variant is fatal to a simulation run: the trial engine returns it
/// to the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A run or construction parameter is outside its valid range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// An index does not address a qubit of the lattice.
    #[error("index {index} out of bounds for {len} qubits")]
    IndexOutOfBounds { index: usize, len: usize },

    /// The layer cannot measure the requested quadrature.
    #[error("unsupported homodyne quadrature '{0}'")]
    UnsupportedQuadrature(Quadrature),

    /// Measurement was attempted on a state without sampled noise.
    #[error("noise must be applied before measurement")]
    NoiseNotApplied,

    /// The decoder needed an outcome for a qubit that was never measured.
    #[error("qubit {0} was never measured")]
    MissingOutcome(usize),

    /// A syndrome record does not fit the lattice it is decoded on.
    #[error("syndrome record covers {actual} qubits, lattice has {expected}")]
    RecordMismatch { expected: usize, actual: usize },

    /// Precomputed bits and probabilities were requested but absent.
    #[error("decoder configuration expects precomputed probabilities")]
    MissingPrecomputed,

    /// The passive bundle components do not describe the same lattice.
    #[error("inconsistent passive bundle: {0}")]
    BundleMismatch(String),

    /// The defects of a sector cannot be perfectly matched.
    #[error("no perfect matching for {defects} defects in sector {sector}")]
    NoMatching { sector: usize, defects: usize },

    /// Beamsplitter network construction failed.
    #[error("invalid beamsplitter network: {0}")]
    InvalidNetwork(String),
}

impl ModelError {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Checks that `p` is a probability.
pub(crate) fn check_probability(name: &'static str, p: f64) -> Result<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(ModelError::invalid_parameter(
            name,
            format!("{p} is not in [0, 1]"),
        ))
    }
}

/// Checks that `delta` is a usable noise width.
pub(crate) fn check_delta(delta: f64) -> Result<()> {
    if delta.is_finite() && delta > 0.0 {
        Ok(())
    } else {
        Err(ModelError::invalid_parameter(
            "delta",
            format!("{delta} must be finite and positive"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::invalid_parameter("p_swap", "1.5 is not in [0, 1]");
        assert!(err.to_string().contains("p_swap"));

        let err = ModelError::IndexOutOfBounds { index: 12, len: 5 };
        assert!(err.to_string().contains("12"));
        assert!(err.to_string().contains('5'));

        let err = ModelError::UnsupportedQuadrature(Quadrature::Q);
        assert!(err.to_string().contains("'q'"));
    }

    #[test]
    fn probability_and_delta_checks() {
        assert!(check_probability("p", 0.0).is_ok());
        assert!(check_probability("p", 1.0).is_ok());
        assert!(check_probability("p", -0.1).is_err());
        assert!(check_probability("p", f64::NAN).is_err());
        assert!(check_delta(0.01).is_ok());
        assert!(check_delta(0.0).is_err());
        assert!(check_delta(f64::INFINITY).is_err());
    }
}
