//! Tiled inference over a [`PatchGrid`].
//!
//! Large images are pushed through a network tile by tile. Each tile's output
//! has its overlap padding cropped away and the remaining interior is written
//! into a freshly allocated output image.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::grid::PatchGrid;
use crate::error::{HsirError, Result};

/// Run `forward` on every tile of `image` (`[N, C, H, W]`) and stitch the
/// results.
///
/// `upscale` is the spatial factor between a tile and its output (1 for
/// same-resolution reconstruction). The output channel count is taken from the
/// first tile.
pub fn tiled_forward<B, F>(
    image: Tensor<B, 4>,
    grid: &PatchGrid,
    upscale: usize,
    mut forward: F,
) -> Result<Tensor<B, 4>>
where
    B: Backend,
    F: FnMut(Tensor<B, 4>) -> Tensor<B, 4>,
{
    let [n, c, h, w] = image.dims();
    if (h, w) != (grid.height(), grid.width()) {
        return Err(HsirError::shape_mismatch(&[grid.height(), grid.width()], &[h, w]));
    }
    if upscale == 0 {
        return Err(HsirError::invalid_configuration("upscale factor must be at least 1"));
    }

    let size = grid.patch_size();
    let out_size = size * upscale;
    let device = image.device();
    let mut output: Option<Tensor<B, 4>> = None;

    for tile in grid.tiles() {
        let input = image
            .clone()
            .slice([0..n, 0..c, tile.h..tile.h + size, tile.w..tile.w + size]);
        let result = forward(input);

        let [rn, oc, rh, rw] = result.dims();
        if rn != n || rh != out_size || rw != out_size {
            return Err(HsirError::shape_mismatch(&[n, oc, out_size, out_size], &[rn, oc, rh, rw]));
        }

        let rows = tile.top * upscale..out_size - tile.bottom * upscale;
        let cols = tile.left * upscale..out_size - tile.right * upscale;
        let dst_rows = tile.h * upscale + rows.start..tile.h * upscale + rows.end;
        let dst_cols = tile.w * upscale + cols.start..tile.w * upscale + cols.end;

        let interior = result.slice([0..n, 0..oc, rows, cols]);
        let canvas = match output.take() {
            Some(canvas) => canvas,
            None => Tensor::zeros([n, oc, h * upscale, w * upscale], &device),
        };
        if canvas.dims()[1] != oc {
            return Err(HsirError::shape_mismatch(&canvas.dims(), &[n, oc, out_size, out_size]));
        }
        output = Some(canvas.slice_assign([0..n, 0..oc, dst_rows, dst_cols], interior));
    }

    tracing::debug!("stitched {} tiles into {}x{} output", grid.len(), h * upscale, w * upscale);

    output.ok_or_else(|| HsirError::invalid_configuration("patch grid produced no tiles"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::TensorData;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn numbered(n: usize, c: usize, h: usize, w: usize) -> Tensor<TestBackend, 4> {
        let values: Vec<f32> = (0..n * c * h * w).map(|i| i as f32).collect();
        Tensor::from_data(TensorData::new(values, [n, c, h, w]), &Default::default())
    }

    #[test]
    fn test_identity_network_reproduces_image() {
        let image = numbered(1, 2, 64, 64);
        let grid = PatchGrid::new(64, 64, Some(48), 16).unwrap();

        let mut calls = 0;
        let result = tiled_forward(image.clone(), &grid, 1, |tile| {
            calls += 1;
            tile
        })
        .unwrap();

        assert_eq!(calls, 4);
        assert_eq!(
            result.into_data().to_vec::<f32>().unwrap(),
            image.into_data().to_vec::<f32>().unwrap()
        );
    }

    #[test]
    fn test_channel_changing_network() {
        let image = Tensor::<TestBackend, 4>::ones([1, 3, 40, 40], &Default::default());
        let grid = PatchGrid::new(40, 40, Some(24), 4).unwrap();

        let result = tiled_forward(image, &grid, 1, |tile| {
            let [n, _, h, w] = tile.dims();
            Tensor::ones([n, 5, h, w], &tile.device()).mul_scalar(2.0)
        })
        .unwrap();

        assert_eq!(result.dims(), [1, 5, 40, 40]);
        let values = result.into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|&v| v == 2.0));
    }

    #[test]
    fn test_upscaling_network() {
        let image = Tensor::<TestBackend, 4>::ones([2, 1, 32, 32], &Default::default());
        let grid = PatchGrid::new(32, 32, None, 4).unwrap();

        let result = tiled_forward(image, &grid, 2, |tile| {
            let [n, c, h, w] = tile.dims();
            Tensor::ones([n, c, 2 * h, 2 * w], &tile.device())
        })
        .unwrap();

        assert_eq!(result.dims(), [2, 1, 64, 64]);
        let values = result.into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_grid_mismatch() {
        let image = Tensor::<TestBackend, 4>::zeros([1, 1, 32, 32], &Default::default());
        let grid = PatchGrid::new(64, 64, Some(48), 16).unwrap();
        let err = tiled_forward(image, &grid, 1, |t| t).unwrap_err();
        assert!(matches!(err, HsirError::ShapeMismatch { .. }));
    }
}
