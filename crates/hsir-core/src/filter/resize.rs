//! MATLAB-compatible bicubic resize.
//!
//! The resize is separable: the height axis is resampled first into a fresh
//! intermediate buffer, then the width axis. Each pass reads from a
//! symmetrically padded copy of its input, so neither the caller's data nor
//! the intermediate buffer is ever written through an aliasing view.

use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use ndarray::{Array3, ArrayView3, Axis};

use super::kernel::{scaled_length, ResampleKernel};
use crate::error::{HsirError, Result};

/// Bicubic resize filter with optional antialiasing.
///
/// Output spatial size is `ceil(H * scale) x ceil(W * scale)`; channels are
/// preserved and values are neither clamped nor rounded.
///
/// # Examples
/// ```rust
/// use burn::tensor::Tensor;
/// use burn_ndarray::NdArray;
/// use hsir_core::CubicResizeFilter;
///
/// type Backend = NdArray<f32>;
///
/// let device = Default::default();
/// let image = Tensor::<Backend, 3>::ones([3, 8, 8], &device);
/// let half = CubicResizeFilter::new(0.5).apply(&image).unwrap();
/// assert_eq!(half.dims(), [3, 4, 4]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicResizeFilter {
    scale: f64,
    antialiasing: bool,
}

impl CubicResizeFilter {
    /// Create a resize filter for the given scale factor (antialiasing on).
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            antialiasing: true,
        }
    }

    /// Enable or disable the widened antialiasing kernel used when shrinking.
    pub fn with_antialiasing(mut self, antialiasing: bool) -> Self {
        self.antialiasing = antialiasing;
        self
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn antialiasing(&self) -> bool {
        self.antialiasing
    }

    /// Output `(height, width)` for an input of `(height, width)`.
    pub fn output_size(&self, height: usize, width: usize) -> Result<(usize, usize)> {
        Ok((
            scaled_length(height, self.scale)?,
            scaled_length(width, self.scale)?,
        ))
    }

    /// Weights and indices for both spatial axes.
    pub fn kernels(&self, height: usize, width: usize) -> Result<(ResampleKernel, ResampleKernel)> {
        Ok((
            ResampleKernel::for_scale(height, self.scale, self.antialiasing)?,
            ResampleKernel::for_scale(width, self.scale, self.antialiasing)?,
        ))
    }

    /// Resize a `[C, H, W]` tensor.
    pub fn apply<B: Backend>(&self, image: &Tensor<B, 3>) -> Result<Tensor<B, 3>> {
        let [c, h, w] = image.dims();
        let device = image.device();

        let values = image
            .clone()
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| HsirError::tensor_data(format!("{:?}", e)))?;
        let array = Array3::from_shape_vec((c, h, w), values)
            .map_err(|e| HsirError::tensor_data(e.to_string()))?;

        let resized = self.resize_axes(array.view(), Axis(1), Axis(2))?;
        let (_, out_h, out_w) = resized.dim();
        let data: Vec<f32> = resized.iter().copied().collect();

        Ok(Tensor::from_data(TensorData::new(data, [c, out_h, out_w]), &device))
    }

    /// Resize every image of a `[N, C, H, W]` batch.
    pub fn apply_batch<B: Backend>(&self, batch: &Tensor<B, 4>) -> Result<Tensor<B, 4>> {
        let [n, c, h, w] = batch.dims();
        let flat = batch.clone().reshape([n * c, h, w]);
        let resized = self.apply(&flat)?;
        let [_, out_h, out_w] = resized.dims();
        Ok(resized.reshape([n, c, out_h, out_w]))
    }

    /// Resize an `[H, W, C]` array, the layout produced by image decoders.
    pub fn apply_hwc(&self, image: ArrayView3<'_, f32>) -> Result<Array3<f32>> {
        self.resize_axes(image, Axis(0), Axis(1))
    }

    fn resize_axes(&self, image: ArrayView3<'_, f32>, h_axis: Axis, w_axis: Axis) -> Result<Array3<f32>> {
        let in_h = image.len_of(h_axis);
        let in_w = image.len_of(w_axis);
        let (kernel_h, kernel_w) = self.kernels(in_h, in_w)?;

        tracing::debug!(
            "cubic resize {}x{} -> {}x{} (scale {}, support {}x{})",
            in_h,
            in_w,
            kernel_h.out_length(),
            kernel_w.out_length(),
            self.scale,
            kernel_h.support(),
            kernel_w.support()
        );

        let resized_h = resample_axis(image, h_axis, &kernel_h);
        Ok(resample_axis(resized_h.view(), w_axis, &kernel_w))
    }
}

/// Resize a `[C, H, W]` tensor by `scale`.
pub fn imresize<B: Backend>(image: &Tensor<B, 3>, scale: f64, antialiasing: bool) -> Result<Tensor<B, 3>> {
    CubicResizeFilter::new(scale)
        .with_antialiasing(antialiasing)
        .apply(image)
}

/// Resize an `[H, W, C]` array by `scale`.
pub fn imresize_hwc(image: ArrayView3<'_, f32>, scale: f64, antialiasing: bool) -> Result<Array3<f32>> {
    CubicResizeFilter::new(scale)
        .with_antialiasing(antialiasing)
        .apply_hwc(image)
}

/// Copy `input` with `axis` extended by mirrored samples on both ends.
fn pad_symmetric(input: ArrayView3<'_, f32>, axis: Axis, kernel: &ResampleKernel) -> Array3<f32> {
    input.select(axis, &kernel.padded_sources())
}

/// Resample one axis of `input` with the given kernel into a new buffer.
fn resample_axis(input: ArrayView3<'_, f32>, axis: Axis, kernel: &ResampleKernel) -> Array3<f32> {
    let padded = pad_symmetric(input, axis, kernel);

    let mut shape = input.raw_dim();
    shape[axis.index()] = kernel.out_length();
    let mut output = Array3::<f32>::zeros(shape);

    for (i, mut lane) in output.axis_iter_mut(axis).enumerate() {
        for (tap, &weight) in kernel.row(i).iter().enumerate() {
            lane.scaled_add(weight, &padded.index_axis(axis, kernel.index(i, tap)));
        }
    }
    output
}
