//! Cubic convolution weights for MATLAB-style `imresize`.
//!
//! A [`ResampleKernel`] describes how one image axis of length `in_length` is
//! resampled to `out_length`: for every output sample it holds a normalized
//! row of cubic weights and the start of the input window those weights apply
//! to. Window starts address a symmetrically padded copy of the axis, so the
//! kernel also records how much padding is needed on each side.

use crate::error::{HsirError, Result};

/// Support of the cubic kernel in input pixels (before antialiasing).
pub const CUBIC_KERNEL_WIDTH: f64 = 4.0;

/// Keys cubic convolution kernel with `a = -0.5`.
///
/// ```text
/// 1.5|x|^3 - 2.5|x|^2 + 1          |x| <= 1
/// -0.5|x|^3 + 2.5|x|^2 - 4|x| + 2  1 < |x| <= 2
/// 0                                otherwise
/// ```
pub fn cubic(x: f32) -> f32 {
    let absx = x.abs();
    let absx2 = absx * absx;
    let absx3 = absx2 * absx;
    if absx <= 1.0 {
        1.5 * absx3 - 2.5 * absx2 + 1.0
    } else if absx <= 2.0 {
        -0.5 * absx3 + 2.5 * absx2 - 4.0 * absx + 2.0
    } else {
        0.0
    }
}

/// Output length of an axis resized by `scale`, i.e. `ceil(in_length * scale)`.
pub fn scaled_length(in_length: usize, scale: f64) -> Result<usize> {
    validate_scale(scale)?;
    let out = (in_length as f64 * scale).ceil();
    if out < 1.0 {
        return Err(HsirError::invalid_scale(format!(
            "scale {} maps an axis of length {} to an empty output",
            scale, in_length
        )));
    }
    Ok(out as usize)
}

fn validate_scale(scale: f64) -> Result<()> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(HsirError::invalid_scale(format!(
            "scale must be positive and finite, got {}",
            scale
        )));
    }
    Ok(())
}

/// Per-axis resampling weights and window offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct ResampleKernel {
    in_length: usize,
    out_length: usize,
    support: usize,
    /// Row-major `[out_length, support]`.
    weights: Vec<f32>,
    /// Window start of each output row inside the padded axis.
    indices: Vec<usize>,
    pad_start: usize,
    pad_end: usize,
}

impl ResampleKernel {
    /// Compute weights and indices for resampling `in_length` samples to
    /// `out_length` samples at the given `scale`.
    ///
    /// When `scale < 1` and `antialiasing` is set, the kernel is stretched to
    /// `4 / scale` input pixels and its values are scaled by `scale`, so each
    /// output sample integrates over its whole input footprint.
    ///
    /// # Errors
    /// Fails when `scale` is not a positive finite number or when either
    /// length is zero.
    pub fn new(in_length: usize, out_length: usize, scale: f64, antialiasing: bool) -> Result<Self> {
        validate_scale(scale)?;
        if in_length == 0 {
            return Err(HsirError::invalid_configuration("cannot resample an empty axis"));
        }
        if out_length == 0 {
            return Err(HsirError::invalid_scale(format!(
                "scale {} produces an empty output axis from length {}",
                scale, in_length
            )));
        }

        let antialias = scale < 1.0 && antialiasing;
        let kernel_width = if antialias {
            CUBIC_KERNEL_WIDTH / scale
        } else {
            CUBIC_KERNEL_WIDTH
        };
        let taps = kernel_width.ceil() as usize + 2;

        let scale_f = scale as f32;
        // 0.5 in output space maps to 0.5 in input space.
        let shift = (0.5 * (1.0 - 1.0 / scale)) as f32;
        let half_width = (kernel_width / 2.0) as f32;

        let mut lefts = Vec::with_capacity(out_length);
        let mut weights = vec![0.0f32; out_length * taps];

        for (row, row_weights) in weights.chunks_exact_mut(taps).enumerate() {
            let x = (row + 1) as f32;
            let u = x / scale_f + shift;
            let left = (u - half_width).floor();

            for (k, w) in row_weights.iter_mut().enumerate() {
                let distance = u - (left + k as f32);
                *w = if antialias {
                    scale_f * cubic(distance * scale_f)
                } else {
                    cubic(distance)
                };
            }

            let sum: f32 = row_weights.iter().sum();
            for w in row_weights.iter_mut() {
                *w /= sum;
            }
            lefts.push(left as i64);
        }

        // Drop boundary columns that carry no weight for any row.
        let column_is_zero = |col: usize| weights.chunks_exact(taps).all(|r| r[col] == 0.0);
        let drop_first = column_is_zero(0);
        let drop_last = taps > 1 && column_is_zero(taps - 1);
        let first = usize::from(drop_first);
        let support = taps - first - usize::from(drop_last);

        let weights: Vec<f32> = weights
            .chunks_exact(taps)
            .flat_map(|r| r[first..first + support].iter().copied())
            .collect();

        // 1-based input index of the first tap of every row.
        let starts: Vec<i64> = lefts.iter().map(|&l| l + first as i64).collect();
        let min_index = starts.iter().copied().min().unwrap_or(1);
        let max_index = starts.iter().copied().max().unwrap_or(1) + support as i64 - 1;

        let pad_start = (1 - min_index).max(0) as usize;
        let pad_end = (max_index - in_length as i64).max(0) as usize;

        let indices = starts
            .iter()
            .map(|&s| (s - 1 + pad_start as i64) as usize)
            .collect();

        Ok(Self {
            in_length,
            out_length,
            support,
            weights,
            indices,
            pad_start,
            pad_end,
        })
    }

    /// Kernel for resizing an axis of `in_length` by `scale`.
    pub fn for_scale(in_length: usize, scale: f64, antialiasing: bool) -> Result<Self> {
        let out_length = scaled_length(in_length, scale)?;
        Self::new(in_length, out_length, scale, antialiasing)
    }

    pub fn in_length(&self) -> usize {
        self.in_length
    }

    pub fn out_length(&self) -> usize {
        self.out_length
    }

    /// Number of taps per output sample after pruning.
    pub fn support(&self) -> usize {
        self.support
    }

    /// Row-major weights matrix of shape `[out_length, support]`.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Weights of one output sample.
    pub fn row(&self, out_index: usize) -> &[f32] {
        let start = out_index * self.support;
        &self.weights[start..start + self.support]
    }

    /// Window start of every output sample inside the padded axis.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Padded-axis position of tap `tap` of output sample `out_index`.
    pub fn index(&self, out_index: usize, tap: usize) -> usize {
        self.indices[out_index] + tap
    }

    /// Mirrored samples prepended to the axis.
    pub fn pad_start(&self) -> usize {
        self.pad_start
    }

    /// Mirrored samples appended to the axis.
    pub fn pad_end(&self) -> usize {
        self.pad_end
    }

    pub fn padded_length(&self) -> usize {
        self.in_length + self.pad_start + self.pad_end
    }

    /// Input sample that backs padded position `padded`.
    ///
    /// Reflection is half-sample symmetric (the edge sample repeats at the
    /// seam) and periodic with period `2 * in_length`, so axes shorter than the
    /// padding still resolve to a valid sample.
    pub fn source_index(&self, padded: usize) -> usize {
        let n = self.in_length as i64;
        let period = 2 * n;
        let m = (padded as i64 - self.pad_start as i64).rem_euclid(period);
        if m < n {
            m as usize
        } else {
            (period - 1 - m) as usize
        }
    }

    /// Source sample for every padded position, in order.
    pub fn padded_sources(&self) -> Vec<usize> {
        (0..self.padded_length()).map(|p| self.source_index(p)).collect()
    }
}
