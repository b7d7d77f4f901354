//! Scalar training objectives.
//!
//! The reconstruction objective is `l1 + 0.1 * sad + 0.001 * ffl` by default.
//! The adversarial terms follow the Wasserstein critic formulation.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use hsir_model::losses::{FocalFrequencyLoss, L1Loss, ReconstructionLoss, SpectralAngleLoss};

use crate::config::TrainingConfig;
use crate::error::Result;
use crate::validation::loss_value;

/// Weighted sum of L1, spectral angle and focal frequency losses.
#[derive(Debug, Clone)]
pub struct ReconstructionObjective {
    l1: L1Loss,
    sad: SpectralAngleLoss,
    ffl: FocalFrequencyLoss,
    l1_weight: f64,
    sad_weight: f64,
    ffl_weight: f64,
}

/// Objective value and its unweighted components.
#[derive(Debug, Clone)]
pub struct ObjectiveOutput<B: Backend> {
    pub total: Tensor<B, 1>,
    pub l1: Tensor<B, 1>,
    pub sad: Tensor<B, 1>,
    pub ffl: Tensor<B, 1>,
}

impl<B: Backend> ObjectiveOutput<B> {
    /// Host values of the components, for logging.
    pub fn terms(&self) -> Result<Vec<(&'static str, f64)>> {
        Ok(vec![
            ("l1", loss_value(&self.l1, "l1")?),
            ("sad", loss_value(&self.sad, "sad")?),
            ("ffl", loss_value(&self.ffl, "ffl")?),
        ])
    }
}

impl ReconstructionObjective {
    pub fn new(ffl: FocalFrequencyLoss) -> Self {
        Self {
            l1: L1Loss::new(),
            sad: SpectralAngleLoss::new(),
            ffl,
            l1_weight: 1.0,
            sad_weight: 0.1,
            ffl_weight: 0.001,
        }
    }

    pub fn from_config(config: &TrainingConfig) -> Result<Self> {
        let ffl = config.focal_frequency.init()?;
        Ok(Self::new(ffl).with_weights(config.l1_weight, config.sad_weight, config.ffl_weight))
    }

    pub fn with_weights(mut self, l1: f64, sad: f64, ffl: f64) -> Self {
        self.l1_weight = l1;
        self.sad_weight = sad;
        self.ffl_weight = ffl;
        self
    }

    /// `(l1, sad, ffl)` weights.
    pub fn weights(&self) -> (f64, f64, f64) {
        (self.l1_weight, self.sad_weight, self.ffl_weight)
    }

    pub fn compute<B: Backend>(&self, pred: Tensor<B, 4>, target: Tensor<B, 4>) -> Result<ObjectiveOutput<B>> {
        let l1 = self.l1.forward(pred.clone(), target.clone())?;
        let sad = self.sad.forward(pred.clone(), target.clone())?;
        let ffl = self.ffl.forward(pred, target)?;

        let total = l1.clone().mul_scalar(self.l1_weight)
            + sad.clone().mul_scalar(self.sad_weight)
            + ffl.clone().mul_scalar(self.ffl_weight);

        Ok(ObjectiveOutput { total, l1, sad, ffl })
    }
}

/// Critic loss `-mean(D(real)) + mean(D(fake))`.
///
/// `fake_scores` must come from a detached reconstruction so the generator
/// receives no gradient from this term.
pub fn wgan_discriminator_loss<B: Backend>(real_scores: Tensor<B, 4>, fake_scores: Tensor<B, 4>) -> Tensor<B, 1> {
    fake_scores.mean() - real_scores.mean()
}

/// Generator adversarial term `-mean(D(fake))`.
pub fn wgan_generator_loss<B: Backend>(fake_scores: Tensor<B, 4>) -> Tensor<B, 1> {
    fake_scores.mean().neg()
}
