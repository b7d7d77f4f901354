//! Validation helpers for training parameters and loss values.

use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Tensor};

use crate::error::{Result, TrainingError};

/// Validate learning rate.
pub fn validate_learning_rate(lr: f64) -> Result<()> {
    if !lr.is_finite() || lr <= 0.0 {
        return Err(TrainingError::invalid_configuration(format!(
            "Learning rate must be positive, got {}",
            lr
        )));
    }

    if lr > 10.0 {
        return Err(TrainingError::invalid_configuration(format!(
            "Learning rate too large: {}",
            lr
        )));
    }

    if lr < 1e-10 {
        return Err(TrainingError::invalid_configuration(format!(
            "Learning rate too small: {}",
            lr
        )));
    }

    Ok(())
}

/// Validate epoch count.
pub fn validate_epochs(epochs: usize) -> Result<()> {
    if epochs == 0 {
        return Err(TrainingError::invalid_configuration("Epochs must be positive"));
    }
    Ok(())
}

/// Validate a cadence such as `save_by_epoch`; zero would divide by zero.
pub fn validate_period(name: &str, period: usize) -> Result<()> {
    if period == 0 {
        return Err(TrainingError::invalid_configuration(format!(
            "{} must be at least 1",
            name
        )));
    }
    Ok(())
}

/// Validate a value in `[0, 1]`, e.g. Adam betas.
pub fn validate_unit_interval(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(TrainingError::invalid_configuration(format!(
            "{} must lie in [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

/// Read a single-element loss tensor and fail on NaN or infinity.
pub fn loss_value<B: Backend>(loss: &Tensor<B, 1>, name: &str) -> Result<f64> {
    let value = loss.clone().into_scalar().elem::<f64>();
    if !value.is_finite() {
        return Err(TrainingError::numerical_instability(format!(
            "{} loss is {}",
            name, value
        )));
    }
    Ok(value)
}
