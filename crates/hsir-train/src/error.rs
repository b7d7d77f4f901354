//! Error types for training runs.

use hsir_core::HsirError;
use thiserror::Error;

/// Main error type for training operations.
#[derive(Error, Debug)]
pub enum TrainingError {
    /// Failure inside a loss, resize or tiling operation.
    #[error(transparent)]
    Core(#[from] HsirError),

    /// Invalid training configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The batch source yielded no batches.
    #[error("Batch source is empty")]
    EmptyBatchSource,

    /// Loss became NaN or infinite.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// Checkpoint could not be written or read.
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Filesystem failure (save directory, loss log).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for training operations.
pub type Result<T> = std::result::Result<T, TrainingError>;

impl TrainingError {
    /// Create an invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create a numerical instability error.
    pub fn numerical_instability(msg: impl Into<String>) -> Self {
        Self::NumericalInstability(msg.into())
    }

    /// Create a checkpoint error.
    pub fn checkpoint(msg: impl Into<String>) -> Self {
        Self::Checkpoint(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_convert() {
        fn fails() -> Result<()> {
            Err(HsirError::invalid_configuration("patch factor"))?;
            Ok(())
        }
        let err = fails().unwrap_err();
        assert!(matches!(err, TrainingError::Core(HsirError::InvalidConfiguration(_))));
        assert_eq!(err.to_string(), "Invalid configuration: patch factor");
    }

    #[test]
    fn test_error_display() {
        let err = TrainingError::numerical_instability("loss is NaN");
        assert_eq!(err.to_string(), "Numerical instability: loss is NaN");
        assert_eq!(TrainingError::EmptyBatchSource.to_string(), "Batch source is empty");
    }
}
