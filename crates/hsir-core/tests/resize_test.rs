use burn::tensor::{Tensor, TensorData};
use burn_ndarray::NdArray;
use hsir_core::filter::{imresize, CubicResizeFilter, ResampleKernel};
use proptest::prelude::*;

type Backend = NdArray<f32>;

fn reference_image() -> Tensor<Backend, 3> {
    let mut values = Vec::with_capacity(16);
    for r in 0..4 {
        for c in 0..4 {
            values.push((((r * 4 + c) * (r + 1)) % 7) as f32 / 7.0);
        }
    }
    Tensor::from_data(TensorData::new(values, [1, 4, 4]), &Default::default())
}

fn assert_close(actual: &[f32], expected: &[f32], tol: f32) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!((a - e).abs() < tol, "element {}: got {}, expected {}", i, a, e);
    }
}

#[test]
fn test_upscale_matches_matlab_bicubic() {
    // imresize(img, 2, 'bicubic') on the 4x4 reference image.
    let expected = [
        -0.02553, 0.00987, 0.080671, 0.14624, 0.206578, 0.299979, 0.426444, 0.489676,
        0.006522, 0.052054, 0.143119, 0.243051, 0.35185, 0.384521, 0.341064, 0.319336,
        0.070626, 0.136422, 0.268014, 0.436672, 0.642395, 0.553606, 0.170306, -0.021345,
        0.168562, 0.268171, 0.46739, 0.606829, 0.686489, 0.561523, 0.231934, 0.067139,
        0.300328, 0.447301, 0.741246, 0.753523, 0.484131, 0.408273, 0.525949, 0.584787,
        0.510917, 0.603568, 0.788871, 0.683794, 0.288339, 0.264439, 0.612095, 0.785924,
        0.800328, 0.736973, 0.610264, 0.397644, 0.099112, 0.130022, 0.490374, 0.67055,
        0.945033, 0.803676, 0.520961, 0.254569, 0.004499, 0.062814, 0.429513, 0.612863,
    ];
    let out = imresize(&reference_image(), 2.0, true).unwrap();
    assert_eq!(out.dims(), [1, 8, 8]);
    assert_close(&out.into_data().to_vec::<f32>().unwrap(), &expected, 1e-5);
}

#[test]
fn test_downscale_matches_matlab_bicubic() {
    let expected = [0.193394, 0.369664, 0.59232, 0.416051];
    let out = imresize(&reference_image(), 0.5, true).unwrap();
    assert_eq!(out.dims(), [1, 2, 2]);
    assert_close(&out.into_data().to_vec::<f32>().unwrap(), &expected, 1e-5);
}

#[test]
fn test_upscale_values_are_not_clamped() {
    let out = imresize(&reference_image(), 2.0, true).unwrap();
    let values = out.into_data().to_vec::<f32>().unwrap();
    assert!(values.iter().any(|&v| v < 0.0));
}

proptest! {
    #[test]
    fn test_output_shape(c in 1usize..4, h in 1usize..24, w in 1usize..24, scale in 0.2f64..3.5) {
        let device = Default::default();
        let image = Tensor::<Backend, 3>::zeros([c, h, w], &device);
        let filter = CubicResizeFilter::new(scale);
        let (out_h, out_w) = filter.output_size(h, w).unwrap();
        let out = filter.apply(&image).unwrap();

        prop_assert_eq!(out.dims(), [c, out_h, out_w]);
        prop_assert_eq!(out_h, (h as f64 * scale).ceil() as usize);
        prop_assert_eq!(out_w, (w as f64 * scale).ceil() as usize);
    }

    #[test]
    fn test_weight_rows_sum_to_one(len in 1usize..64, scale in 0.1f64..4.0, aa in any::<bool>()) {
        let kernel = ResampleKernel::for_scale(len, scale, aa).unwrap();
        for i in 0..kernel.out_length() {
            let sum: f32 = kernel.row(i).iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-5, "row {} sums to {}", i, sum);
            let last = kernel.index(i, kernel.support() - 1);
            prop_assert!(last < kernel.padded_length());
        }
    }

    #[test]
    fn test_unit_scale_identity(h in 1usize..12, w in 1usize..12, seed in 0u32..1000) {
        let values: Vec<f32> = (0..h * w).map(|i| ((i as u32 * 31 + seed) % 97) as f32 / 97.0).collect();
        let image = Tensor::<Backend, 3>::from_data(TensorData::new(values.clone(), [1, h, w]), &Default::default());
        let out = imresize(&image, 1.0, true).unwrap().into_data().to_vec::<f32>().unwrap();
        for (a, b) in values.iter().zip(out.iter()) {
            prop_assert!((a - b).abs() < 1e-6);
        }
    }
}
