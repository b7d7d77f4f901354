//! Spectral angle distance (SAD).
//!
//! For every pixel the channel vectors of prediction and target are compared
//! by the angle between them, `arccos(cos_sim)`, and the angles are averaged
//! over batch and space. The cosine is clamped to `[-1, 1]` before `arccos`
//! because rounding can push it slightly outside the domain.

use std::f32::consts::PI;

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use hsir_core::error::{ensure_same_shape, HsirError, Result};

use super::trait_::ReconstructionLoss;

/// Lower bound on `|p| |t|` in the cosine similarity.
pub const COSINE_EPSILON: f32 = 1e-8;

// Keeps `sqrt` off zero when the cosine rounds to exactly 1.
const SQRT_FLOOR: f32 = 1e-12;

// Abramowitz & Stegun 4.4.46, |error| <= 2e-8 on [0, 1].
const ACOS_COEFFS: [f32; 8] = [
    1.570_796_3,
    -0.214_598_8,
    0.088_978_99,
    -0.050_174_3,
    0.030_891_88,
    -0.017_088_126,
    0.006_670_09,
    -0.001_262_491_1,
];

/// Spectral angle loss over the channel axis (axis 1).
#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralAngleLoss;

impl SpectralAngleLoss {
    pub fn new() -> Self {
        Self
    }

    /// Per-location angle in radians, `[N, 1, ...]`.
    ///
    /// # Errors
    /// Fails when the shapes differ or the tensor has no channel axis.
    pub fn angle_map<B: Backend, const D: usize>(&self, pred: Tensor<B, D>, target: Tensor<B, D>) -> Result<Tensor<B, D>> {
        ensure_same_shape(&target.dims(), &pred.dims())?;
        if D < 2 {
            return Err(HsirError::invalid_configuration(
                "spectral angle needs a batch and a channel axis",
            ));
        }

        let cosine = cosine_similarity(pred, target, 1).clamp(-1.0, 1.0);
        Ok(arccos(cosine))
    }

    /// Mean spectral angle of any `[N, C, ...]` pair.
    pub fn mean_angle<B: Backend, const D: usize>(&self, pred: Tensor<B, D>, target: Tensor<B, D>) -> Result<Tensor<B, 1>> {
        Ok(self.angle_map(pred, target)?.mean())
    }
}

impl<B: Backend> ReconstructionLoss<B> for SpectralAngleLoss {
    fn forward(&self, pred: Tensor<B, 4>, target: Tensor<B, 4>) -> Result<Tensor<B, 1>> {
        self.mean_angle(pred, target)
    }

    fn name(&self) -> &'static str {
        "sad"
    }
}

/// `dot(a, b) / max(|a| |b|, eps)` along `dim`, keeping the reduced axis.
pub fn cosine_similarity<B: Backend, const D: usize>(a: Tensor<B, D>, b: Tensor<B, D>, dim: usize) -> Tensor<B, D> {
    let dot = (a.clone() * b.clone()).sum_dim(dim);
    let norm_a = a.powf_scalar(2.0).sum_dim(dim);
    let norm_b = b.powf_scalar(2.0).sum_dim(dim);
    // sqrt(max(x, eps^2)) == max(sqrt(x), eps) and keeps the gradient finite.
    let denom = (norm_a * norm_b)
        .clamp_min(COSINE_EPSILON * COSINE_EPSILON)
        .sqrt();
    dot / denom
}

/// Differentiable `arccos` for inputs in `[-1, 1]`.
pub fn arccos<B: Backend, const D: usize>(x: Tensor<B, D>) -> Tensor<B, D> {
    let negative = x.clone().lower_elem(0.0);
    let a = x.abs();

    let mut poly = a.clone().mul_scalar(ACOS_COEFFS[7]).add_scalar(ACOS_COEFFS[6]);
    for &coeff in ACOS_COEFFS[..6].iter().rev() {
        poly = (poly * a.clone()).add_scalar(coeff);
    }

    let root = a.neg().add_scalar(1.0).clamp_min(SQRT_FLOOR).sqrt();
    let angle = root * poly;
    let reflected = angle.clone().neg().add_scalar(PI);
    angle.mask_where(negative, reflected)
}
