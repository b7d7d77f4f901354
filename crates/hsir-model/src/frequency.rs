//! Orthonormal 2-D discrete Fourier transform built from burn primitives.
//!
//! The transform is expressed as two real matrix products per axis so it is
//! differentiable on every autodiff backend without complex tensor support.
//! For an `h x w` tile `X` with cosine/sine DFT matrices `C` and `S`:
//!
//! ```text
//! Re = (C_h X C_w - S_h X S_w) / sqrt(h w)
//! Im = -(S_h X C_w + C_h X S_w) / sqrt(h w)
//! ```

use std::f64::consts::PI;

use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};

use hsir_core::error::{HsirError, Result};

/// Complex spectrum stored as a pair of real tensors `[N, P, C, h, w]`.
#[derive(Debug, Clone)]
pub struct Spectrum<B: Backend> {
    pub re: Tensor<B, 5>,
    pub im: Tensor<B, 5>,
}

impl<B: Backend> Spectrum<B> {
    pub fn new(re: Tensor<B, 5>, im: Tensor<B, 5>) -> Result<Self> {
        if re.dims() != im.dims() {
            return Err(HsirError::shape_mismatch(&re.dims(), &im.dims()));
        }
        Ok(Self { re, im })
    }

    pub fn dims(&self) -> [usize; 5] {
        self.re.dims()
    }

    /// `[N, P, C, h, w, 2]` with real and imaginary parts on the last axis.
    pub fn to_stacked(&self) -> Tensor<B, 6> {
        Tensor::stack(vec![self.re.clone(), self.im.clone()], 5)
    }

    /// Inverse of [`Spectrum::to_stacked`].
    pub fn from_stacked(stacked: Tensor<B, 6>) -> Result<Self> {
        let [n, p, c, h, w, parts] = stacked.dims();
        if parts != 2 {
            return Err(HsirError::shape_mismatch(&[n, p, c, h, w, 2], &stacked.dims()));
        }
        let re = stacked.clone().slice([0..n, 0..p, 0..c, 0..h, 0..w, 0..1]).reshape([n, p, c, h, w]);
        let im = stacked.slice([0..n, 0..p, 0..c, 0..h, 0..w, 1..2]).reshape([n, p, c, h, w]);
        Ok(Self { re, im })
    }

    /// Minibatch average, keeping a singleton batch axis.
    pub fn mean_over_batch(self) -> Self {
        Self {
            re: self.re.mean_dim(0),
            im: self.im.mean_dim(0),
        }
    }

    /// `|self - other|^2` per frequency bin.
    pub fn squared_distance(&self, other: &Self) -> Tensor<B, 5> {
        let dre = self.re.clone() - other.re.clone();
        let dim = self.im.clone() - other.im.clone();
        dre.powf_scalar(2.0) + dim.powf_scalar(2.0)
    }

    pub fn detach(self) -> Self {
        Self {
            re: self.re.detach(),
            im: self.im.detach(),
        }
    }
}

/// Split `[N, C, H, W]` into `factor^2` equal tiles stacked on a new patch axis.
///
/// Tiles are taken row-major, giving `[N, factor^2, C, H / factor, W / factor]`.
pub fn split_patches<B: Backend>(x: Tensor<B, 4>, factor: usize) -> Result<Tensor<B, 5>> {
    let [n, c, h, w] = x.dims();
    if factor == 0 || h % factor != 0 || w % factor != 0 {
        return Err(HsirError::invalid_configuration(format!(
            "patch factor {} must divide image height {} and width {}",
            factor, h, w
        )));
    }

    let ph = h / factor;
    let pw = w / factor;
    let mut patches = Vec::with_capacity(factor * factor);
    for i in 0..factor {
        for j in 0..factor {
            patches.push(x.clone().slice([0..n, 0..c, i * ph..(i + 1) * ph, j * pw..(j + 1) * pw]));
        }
    }
    Ok(Tensor::stack(patches, 1))
}

/// Cosine and sine DFT matrices of size `n x n`.
///
/// Both are symmetric, so they serve for left and right multiplication alike.
pub fn dft_matrices<B: Backend>(n: usize, device: &B::Device) -> (Tensor<B, 2>, Tensor<B, 2>) {
    let mut cos = Vec::with_capacity(n * n);
    let mut sin = Vec::with_capacity(n * n);
    for k in 0..n {
        for m in 0..n {
            // Reduce the phase first so large sizes keep full precision.
            let phase = 2.0 * PI * ((k * m) % n) as f64 / n as f64;
            cos.push(phase.cos() as f32);
            sin.push(phase.sin() as f32);
        }
    }
    (
        Tensor::from_data(TensorData::new(cos, [n, n]), device),
        Tensor::from_data(TensorData::new(sin, [n, n]), device),
    )
}

/// Orthonormal 2-D DFT over the last two axes of `[N, P, C, h, w]`.
pub fn fft2_ortho<B: Backend>(x: Tensor<B, 5>) -> Spectrum<B> {
    let [n, p, c, h, w] = x.dims();
    let device = x.device();
    let (cos_h, sin_h) = dft_matrices::<B>(h, &device);
    let (cos_w, sin_w) = dft_matrices::<B>(w, &device);

    let tiles = x.reshape([n * p * c, h, w]);
    let a = right_multiply(tiles.clone(), cos_w);
    let b = right_multiply(tiles, sin_w);

    let re = left_multiply(cos_h.clone(), a.clone()) - left_multiply(sin_h.clone(), b.clone());
    let im = (left_multiply(sin_h, a) + left_multiply(cos_h, b)).neg();

    let norm = 1.0 / ((h * w) as f64).sqrt();
    Spectrum {
        re: re.mul_scalar(norm).reshape([n, p, c, h, w]),
        im: im.mul_scalar(norm).reshape([n, p, c, h, w]),
    }
}

/// `x @ m` for every matrix of a `[M, r, k]` stack.
fn right_multiply<B: Backend>(x: Tensor<B, 3>, m: Tensor<B, 2>) -> Tensor<B, 3> {
    let [batch, rows, inner] = x.dims();
    let [_, cols] = m.dims();
    x.reshape([batch * rows, inner]).matmul(m).reshape([batch, rows, cols])
}

/// `m @ x` for every matrix of a `[M, r, k]` stack; `m` must be symmetric.
fn left_multiply<B: Backend>(m: Tensor<B, 2>, x: Tensor<B, 3>) -> Tensor<B, 3> {
    right_multiply(x.swap_dims(1, 2), m).swap_dims(1, 2)
}
