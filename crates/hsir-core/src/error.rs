//! Error types for resampling, tiling and loss evaluation.
//!
//! Every failure in the numeric core is a configuration problem surfaced
//! before any computation starts, or a violated invariant that signals a
//! logic defect. Nothing here is retried.

use thiserror::Error;

/// Main error type for the numeric core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HsirError {
    /// Invalid configuration (patch factor, padding, tile size, ...).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Resize scale that cannot produce a valid output.
    #[error("Invalid scale: {0}")]
    InvalidScale(String),

    /// Shape mismatch between two tensors that must agree.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Spectrum weight matrix left the unit interval.
    #[error(
        "The values of spectrum weight matrix should be in the range [0, 1], \
         but got Min: {min:.10} Max: {max:.10}"
    )]
    InvalidWeightMatrix { min: f64, max: f64 },

    /// Tensor data could not be converted to or from a host buffer.
    #[error("Tensor data error: {0}")]
    TensorData(String),

    /// Unknown generator or discriminator tag.
    #[error("Unknown network type '{tag}', expected one of: {known}")]
    UnknownNetwork { tag: String, known: String },
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, HsirError>;

impl HsirError {
    /// Create an invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create an invalid scale error.
    pub fn invalid_scale(msg: impl Into<String>) -> Self {
        Self::InvalidScale(msg.into())
    }

    /// Create a tensor data error.
    pub fn tensor_data(msg: impl Into<String>) -> Self {
        Self::TensorData(msg.into())
    }

    /// Create a shape mismatch error from any pair of dimension slices.
    pub fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}

/// Fail with [`HsirError::ShapeMismatch`] unless both shapes agree.
pub fn ensure_same_shape(expected: &[usize], actual: &[usize]) -> Result<()> {
    if expected != actual {
        return Err(HsirError::shape_mismatch(expected, actual));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HsirError::invalid_configuration("patch factor 2 does not divide 7");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: patch factor 2 does not divide 7"
        );
    }

    #[test]
    fn test_weight_matrix_message_reports_bounds() {
        let err = HsirError::InvalidWeightMatrix { min: 0.0, max: 1.5 };
        let msg = err.to_string();
        assert!(msg.contains("Min: 0.0000000000"));
        assert!(msg.contains("Max: 1.5000000000"));
    }

    #[test]
    fn test_ensure_same_shape() {
        assert!(ensure_same_shape(&[1, 3, 4, 4], &[1, 3, 4, 4]).is_ok());
        let err = ensure_same_shape(&[1, 3, 4, 4], &[1, 3, 4, 5]).unwrap_err();
        assert!(matches!(err, HsirError::ShapeMismatch { .. }));
    }
}
