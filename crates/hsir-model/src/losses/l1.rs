use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use hsir_core::error::{ensure_same_shape, Result};

use super::trait_::ReconstructionLoss;

/// Mean absolute error.
#[derive(Debug, Clone, Copy, Default)]
pub struct L1Loss;

impl L1Loss {
    pub fn new() -> Self {
        Self
    }
}

impl<B: Backend> ReconstructionLoss<B> for L1Loss {
    fn forward(&self, pred: Tensor<B, 4>, target: Tensor<B, 4>) -> Result<Tensor<B, 1>> {
        ensure_same_shape(&target.dims(), &pred.dims())?;
        Ok((pred - target).abs().mean())
    }

    fn name(&self) -> &'static str {
        "l1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::TensorData;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_l1_value() {
        let device = Default::default();
        let pred = Tensor::<TestBackend, 4>::from_data(TensorData::new(vec![0.0f32, 1.0, 2.0, 3.0], [1, 1, 2, 2]), &device);
        let target = Tensor::<TestBackend, 4>::from_data(TensorData::new(vec![1.0f32, 1.0, 0.0, 3.0], [1, 1, 2, 2]), &device);

        let loss = L1Loss::new().forward(pred, target).unwrap();
        assert!((loss.into_scalar() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_l1_shape_mismatch() {
        let device = Default::default();
        let pred = Tensor::<TestBackend, 4>::zeros([1, 1, 2, 2], &device);
        let target = Tensor::<TestBackend, 4>::zeros([1, 2, 2, 2], &device);
        assert!(L1Loss::new().forward(pred, target).is_err());
    }
}
