//! Loss trait shared by every reconstruction criterion.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use hsir_core::error::Result;

/// Criterion comparing a reconstruction with its ground truth.
///
/// Both inputs are `[N, C, H, W]` batches. The returned tensor has a single
/// element and stays attached to the autodiff graph of `pred`. Lower is
/// better.
pub trait ReconstructionLoss<B: Backend> {
    fn forward(&self, pred: Tensor<B, 4>, target: Tensor<B, 4>) -> Result<Tensor<B, 1>>;

    /// Short identifier used in logs and loss histories.
    fn name(&self) -> &'static str;
}
