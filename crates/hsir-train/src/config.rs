//! Training configuration.

use std::path::PathBuf;

use burn::config::Config;
use hsir_model::FocalFrequencyLossConfig;
use serde::{Deserialize, Serialize};

use crate::validation::{validate_epochs, validate_learning_rate, validate_period, validate_unit_interval};

/// When the learning rate is decayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LrDecayMode {
    /// Decay by `lr_decrease_factor` every `lr_decrease_epoch` epochs.
    Epoch,
    /// Decay by `lr_decrease_factor` every `lr_decrease_iter` iterations.
    Iteration,
    /// Keep the initial learning rate.
    Constant,
}

/// When the generator is written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveMode {
    /// At the end of every `save_by_epoch`-th epoch.
    Epoch,
    /// Every `save_by_iter` iterations.
    Iteration,
    /// Never.
    Disabled,
}

/// Hyper-parameters of a generator or GAN training run.
///
/// Serializes to JSON through burn's [`Config`], so a run can be reproduced
/// with `TrainingConfig::load("run.json")`.
#[derive(Config, Debug, PartialEq)]
pub struct TrainingConfig {
    /// Number of passes over the batch source.
    #[config(default = "100")]
    pub epochs: usize,

    /// Images per batch; recorded in checkpoint names.
    #[config(default = "1")]
    pub batch_size: usize,

    /// Initial Adam learning rate.
    #[config(default = "1e-4")]
    pub lr: f64,

    #[config(default = "0.5")]
    pub beta_1: f64,

    #[config(default = "0.999")]
    pub beta_2: f64,

    /// L2 penalty for the generator optimizer.
    #[config(default = "0.0")]
    pub weight_decay: f64,

    #[config(default = "LrDecayMode::Epoch")]
    pub lr_decrease_mode: LrDecayMode,

    #[config(default = "0.5")]
    pub lr_decrease_factor: f64,

    #[config(default = "10")]
    pub lr_decrease_epoch: usize,

    #[config(default = "100000")]
    pub lr_decrease_iter: usize,

    #[config(default = "SaveMode::Epoch")]
    pub save_mode: SaveMode,

    #[config(default = "1")]
    pub save_by_epoch: usize,

    #[config(default = "100000")]
    pub save_by_iter: usize,

    /// Directory receiving checkpoints and loss logs.
    #[config(default = "PathBuf::from(\"models\")")]
    pub save_path: PathBuf,

    /// Weight of the adversarial term in GAN training.
    #[config(default = "0.01")]
    pub lambda_gan: f64,

    #[config(default = "1.0")]
    pub l1_weight: f64,

    #[config(default = "0.1")]
    pub sad_weight: f64,

    #[config(default = "0.001")]
    pub ffl_weight: f64,

    #[config(default = "FocalFrequencyLossConfig::new()")]
    pub focal_frequency: FocalFrequencyLossConfig,

    /// Iterations between console log lines.
    #[config(default = "50")]
    pub log_interval: usize,

    #[config(default = "true")]
    pub show_progress_bar: bool,
}

impl TrainingConfig {
    /// Check every field before any tensor is touched.
    pub fn validate(&self) -> crate::error::Result<()> {
        validate_epochs(self.epochs)?;
        validate_period("batch_size", self.batch_size)?;
        validate_learning_rate(self.lr)?;
        validate_unit_interval("beta_1", self.beta_1)?;
        validate_unit_interval("beta_2", self.beta_2)?;
        validate_unit_interval("lr_decrease_factor", self.lr_decrease_factor)?;
        validate_period("log_interval", self.log_interval)?;

        match self.lr_decrease_mode {
            LrDecayMode::Epoch => validate_period("lr_decrease_epoch", self.lr_decrease_epoch)?,
            LrDecayMode::Iteration => validate_period("lr_decrease_iter", self.lr_decrease_iter)?,
            LrDecayMode::Constant => {}
        }
        match self.save_mode {
            SaveMode::Epoch => validate_period("save_by_epoch", self.save_by_epoch)?,
            SaveMode::Iteration => validate_period("save_by_iter", self.save_by_iter)?,
            SaveMode::Disabled => {}
        }

        for (name, value) in [
            ("weight_decay", self.weight_decay),
            ("lambda_gan", self.lambda_gan),
            ("l1_weight", self.l1_weight),
            ("sad_weight", self.sad_weight),
            ("ffl_weight", self.ffl_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(crate::error::TrainingError::invalid_configuration(format!(
                    "{} must be a non-negative finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
