//! Paired training batches.
//!
//! Dataset parsing lives outside this crate: trainers only see a
//! [`BatchSource`] that hands out `(input, target)` batches by index.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use hsir_core::filter::CubicResizeFilter;

use crate::error::{Result, TrainingError};

/// Degraded input and its ground truth, both `[N, C, H, W]`.
#[derive(Debug, Clone)]
pub struct ImagePair<B: Backend> {
    pub input: Tensor<B, 4>,
    pub target: Tensor<B, 4>,
}

impl<B: Backend> ImagePair<B> {
    pub fn new(input: Tensor<B, 4>, target: Tensor<B, 4>) -> Result<Self> {
        let [ni, ..] = input.dims();
        let [nt, ..] = target.dims();
        if ni != nt {
            return Err(TrainingError::invalid_configuration(format!(
                "input batch has {} images but target batch has {}",
                ni, nt
            )));
        }
        Ok(Self { input, target })
    }

    /// Pair `target` with its bicubic downscale by `scale` as the input.
    pub fn downscaled(target: Tensor<B, 4>, scale: f64) -> Result<Self> {
        let input = CubicResizeFilter::new(scale).apply_batch(&target)?;
        Ok(Self { input, target })
    }

    pub fn batch_size(&self) -> usize {
        self.input.dims()[0]
    }

    /// Concatenate pairs along the batch axis.
    pub fn collate(pairs: Vec<Self>) -> Result<Self> {
        if pairs.is_empty() {
            return Err(TrainingError::EmptyBatchSource);
        }
        let (inputs, targets): (Vec<_>, Vec<_>) = pairs.into_iter().map(|p| (p.input, p.target)).unzip();
        Self::new(Tensor::cat(inputs, 0), Tensor::cat(targets, 0))
    }

    /// Move both tensors to `device`.
    pub fn to_device(self, device: &B::Device) -> Self {
        Self {
            input: self.input.to_device(device),
            target: self.target.to_device(device),
        }
    }
}

/// Source of training batches for one run.
pub trait BatchSource<B: Backend> {
    /// Batches per epoch.
    fn num_batches(&self) -> usize;

    /// Batch `index` of `epoch` (both 0-based). Sources may reshuffle per
    /// epoch.
    fn batch(&mut self, epoch: usize, index: usize) -> Result<ImagePair<B>>;
}

impl<B: Backend> BatchSource<B> for Vec<ImagePair<B>> {
    fn num_batches(&self) -> usize {
        self.len()
    }

    fn batch(&mut self, _epoch: usize, index: usize) -> Result<ImagePair<B>> {
        self.get(index)
            .cloned()
            .ok_or_else(|| TrainingError::invalid_configuration(format!("batch index {} out of range", index)))
    }
}
