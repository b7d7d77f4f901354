//! Focal frequency loss.
//!
//! Compares prediction and target in the frequency domain, weighting every
//! frequency bin by how badly it is currently reconstructed so that hard
//! frequencies dominate the gradient. The weight matrix is computed from the
//! detached spectra, normalized to `[0, 1]`, and never receives gradients.

use burn::config::Config;
use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Tensor};

use hsir_core::error::{ensure_same_shape, HsirError, Result as HsirResult};

use super::trait_::ReconstructionLoss;
use crate::frequency::{fft2_ortho, split_patches, Spectrum};

/// Configuration for [`FocalFrequencyLoss`].
#[derive(Config, Debug, PartialEq)]
pub struct FocalFrequencyLossConfig {
    /// Multiplier applied to the final loss.
    #[config(default = "1.0")]
    pub loss_weight: f64,

    /// Exponent of the spectrum distance in the weight matrix.
    #[config(default = "1.0")]
    pub alpha: f64,

    /// Images are cut into `patch_factor^2` tiles before the transform.
    #[config(default = "1")]
    pub patch_factor: usize,

    /// Use the minibatch-average spectrum.
    #[config(default = "false")]
    pub average_spectrum: bool,

    /// Compress the weight matrix with `log(1 + x)`.
    #[config(default = "false")]
    pub log_matrix: bool,

    /// Normalize the weight matrix by the batch-wide maximum instead of per
    /// sample, patch and channel.
    #[config(default = "false")]
    pub batch_matrix: bool,
}

impl FocalFrequencyLossConfig {
    pub fn init(&self) -> HsirResult<FocalFrequencyLoss> {
        FocalFrequencyLoss::new(self.clone())
    }
}

/// Focal frequency loss with a fixed configuration.
///
/// With the online weight matrix the loss is symmetric in its two arguments.
///
/// # Examples
/// ```rust
/// use burn::tensor::Tensor;
/// use burn_ndarray::NdArray;
/// use hsir_model::losses::{FocalFrequencyLossConfig, ReconstructionLoss};
///
/// type Backend = NdArray<f32>;
///
/// let device = Default::default();
/// let loss = FocalFrequencyLossConfig::new().init().unwrap();
/// let x = Tensor::<Backend, 4>::ones([2, 3, 8, 8], &device);
/// let value = loss.forward(x.clone(), x).unwrap().into_scalar();
/// assert_eq!(value, 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct FocalFrequencyLoss {
    config: FocalFrequencyLossConfig,
}

impl FocalFrequencyLoss {
    /// # Errors
    /// Fails on a zero patch factor or a non-finite weight or exponent.
    pub fn new(config: FocalFrequencyLossConfig) -> HsirResult<Self> {
        if config.patch_factor == 0 {
            return Err(HsirError::invalid_configuration("patch factor must be at least 1"));
        }
        if !config.alpha.is_finite() || config.alpha < 0.0 {
            return Err(HsirError::invalid_configuration(format!(
                "alpha must be a non-negative finite number, got {}",
                config.alpha
            )));
        }
        if !config.loss_weight.is_finite() {
            return Err(HsirError::invalid_configuration(format!(
                "loss weight must be finite, got {}",
                config.loss_weight
            )));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &FocalFrequencyLossConfig {
        &self.config
    }

    /// Patch-wise orthonormal spectrum of an `[N, C, H, W]` batch.
    pub fn to_spectrum<B: Backend>(&self, x: Tensor<B, 4>) -> HsirResult<Spectrum<B>> {
        let patches = split_patches(x, self.config.patch_factor)?;
        Ok(fft2_ortho(patches))
    }

    /// Online spectrum weight matrix, detached and in `[0, 1]`.
    pub fn weight_matrix<B: Backend>(&self, pred: &Spectrum<B>, target: &Spectrum<B>) -> Tensor<B, 5> {
        let distance = pred
            .clone()
            .detach()
            .squared_distance(&target.clone().detach())
            .sqrt();
        let mut matrix = distance.powf_scalar(self.config.alpha);

        if self.config.log_matrix {
            matrix = matrix.log1p();
        }

        matrix = if self.config.batch_matrix {
            let max = matrix.clone().max().reshape([1, 1, 1, 1, 1]);
            matrix / max
        } else {
            let max = matrix.clone().max_dim(4).max_dim(3);
            matrix / max
        };

        let nan = matrix.clone().is_nan();
        matrix.mask_fill(nan, 0.0).clamp(0.0, 1.0).detach()
    }

    /// Weighted spectrum distance between two spectra.
    ///
    /// An external `matrix` is used as given (detached) and must broadcast
    /// against the spectrum shape.
    ///
    /// # Errors
    /// [`HsirError::InvalidWeightMatrix`] when any weight lies outside
    /// `[0, 1]`, or a shape mismatch.
    pub fn loss_formulation<B: Backend>(
        &self,
        pred: &Spectrum<B>,
        target: &Spectrum<B>,
        matrix: Option<Tensor<B, 5>>,
    ) -> HsirResult<Tensor<B, 1>> {
        ensure_same_shape(&target.dims(), &pred.dims())?;

        let weight = match matrix {
            Some(matrix) => {
                check_broadcast(&matrix.dims(), &pred.dims())?;
                matrix.detach()
            }
            None => self.weight_matrix(pred, target),
        };

        let min = weight.clone().min().into_scalar().elem::<f64>();
        let max = weight.clone().max().into_scalar().elem::<f64>();
        let in_range = min >= 0.0 && max <= 1.0;
        if !in_range {
            return Err(HsirError::InvalidWeightMatrix { min, max });
        }

        let distance = pred.squared_distance(target);
        Ok((weight * distance).mean())
    }

    /// Loss with an optional externally supplied weight matrix.
    pub fn forward_with_matrix<B: Backend>(
        &self,
        pred: Tensor<B, 4>,
        target: Tensor<B, 4>,
        matrix: Option<Tensor<B, 5>>,
    ) -> HsirResult<Tensor<B, 1>> {
        ensure_same_shape(&target.dims(), &pred.dims())?;

        let mut pred_freq = self.to_spectrum(pred)?;
        let mut target_freq = self.to_spectrum(target)?;

        if self.config.average_spectrum {
            pred_freq = pred_freq.mean_over_batch();
            target_freq = target_freq.mean_over_batch();
        }

        let loss = self.loss_formulation(&pred_freq, &target_freq, matrix)?;
        Ok(loss.mul_scalar(self.config.loss_weight))
    }
}

impl<B: Backend> ReconstructionLoss<B> for FocalFrequencyLoss {
    fn forward(&self, pred: Tensor<B, 4>, target: Tensor<B, 4>) -> HsirResult<Tensor<B, 1>> {
        self.forward_with_matrix(pred, target, None)
    }

    fn name(&self) -> &'static str {
        "ffl"
    }
}

fn check_broadcast(matrix: &[usize], spectrum: &[usize]) -> HsirResult<()> {
    let compatible = matrix
        .iter()
        .zip(spectrum.iter())
        .all(|(&m, &s)| m == s || m == 1);
    if !compatible {
        return Err(HsirError::shape_mismatch(spectrum, matrix));
    }
    Ok(())
}
