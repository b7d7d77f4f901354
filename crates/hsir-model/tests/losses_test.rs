use burn::backend::Autodiff;
use burn::tensor::{Tensor, TensorData};
use burn_ndarray::NdArray;
use hsir_core::HsirError;
use hsir_model::losses::{
    FocalFrequencyLossConfig, L1Loss, ReconstructionLoss, SpectralAngleLoss,
};
use proptest::prelude::*;

type Backend = NdArray<f32>;
type AutodiffBackend = Autodiff<Backend>;

fn tensor<B: burn::tensor::backend::Backend>(values: Vec<f32>, shape: [usize; 4]) -> Tensor<B, 4> {
    Tensor::from_data(TensorData::new(values, shape), &Default::default())
}

fn positive_values(len: usize, seed: usize) -> Vec<f32> {
    (0..len).map(|i| 0.05 + ((i * 37 + seed * 11) % 23) as f32 / 23.0).collect()
}

#[test]
fn test_focal_frequency_separates_distinct_images() {
    let loss = FocalFrequencyLossConfig::new().init().unwrap();
    let a = tensor::<Backend>(positive_values(2 * 3 * 6 * 6, 1), [2, 3, 6, 6]);
    let b = tensor::<Backend>(positive_values(2 * 3 * 6 * 6, 4).iter().map(|v| v * v).collect(), [2, 3, 6, 6]);

    let ab = loss.forward(a.clone(), b.clone()).unwrap().into_scalar();
    let ba = loss.forward(b, a.clone()).unwrap().into_scalar();
    let aa = loss.forward(a.clone(), a).unwrap().into_scalar();
    assert!(ab > 0.0);
    assert!((ab - ba).abs() < 1e-5 * ab.max(1.0));
    assert_eq!(aa, 0.0);
}

#[test]
fn test_focal_frequency_patch_factor_two_on_odd_image() {
    let loss = FocalFrequencyLossConfig::new().with_patch_factor(2).init().unwrap();
    let x = tensor::<Backend>(positive_values(49, 0), [1, 1, 7, 7]);
    let err = loss.forward(x.clone(), x).unwrap_err();
    assert!(matches!(err, HsirError::InvalidConfiguration(_)));
}

#[test]
fn test_weight_matrix_error_message() {
    let loss = FocalFrequencyLossConfig::new().init().unwrap();
    let x = tensor::<Backend>(positive_values(16, 0), [1, 1, 4, 4]);
    let matrix = Tensor::<Backend, 5>::from_data(
        TensorData::new(
            (0..16).map(|i| if i == 5 { 1.5 } else { 0.25 }).collect::<Vec<f32>>(),
            [1, 1, 1, 4, 4],
        ),
        &Default::default(),
    );

    let err = loss.forward_with_matrix(x.clone(), x, Some(matrix)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "The values of spectrum weight matrix should be in the range [0, 1], \
         but got Min: 0.2500000000 Max: 1.5000000000"
    );
}

#[test]
fn test_losses_backpropagate_to_prediction() {
    let target = tensor::<AutodiffBackend>(positive_values(2 * 4 * 4 * 4, 2), [2, 4, 4, 4]);
    let pred = tensor::<AutodiffBackend>(positive_values(2 * 4 * 4 * 4, 9), [2, 4, 4, 4]).require_grad();

    let ffl = FocalFrequencyLossConfig::new().init().unwrap();
    let losses: Vec<Box<dyn ReconstructionLoss<AutodiffBackend>>> =
        vec![Box::new(L1Loss::new()), Box::new(SpectralAngleLoss::new()), Box::new(ffl)];

    for loss in losses {
        let value = loss.forward(pred.clone(), target.clone()).unwrap();
        let grads = value.backward();
        let grad = pred.grad(&grads).expect("prediction has a gradient");
        let values = grad.into_data().to_vec::<f32>().unwrap();

        assert!(values.iter().all(|v| v.is_finite()), "{} produced non-finite gradients", loss.name());
        assert!(values.iter().any(|v| *v != 0.0), "{} produced a zero gradient", loss.name());
    }
}

#[test]
fn test_losses_have_finite_gradients_at_perfect_reconstruction() {
    let x = tensor::<AutodiffBackend>(positive_values(2 * 4 * 3 * 3, 6), [2, 4, 3, 3]);
    let pred = x.clone().require_grad();

    let ffl = FocalFrequencyLossConfig::new().init().unwrap();
    let losses: Vec<Box<dyn ReconstructionLoss<AutodiffBackend>>> =
        vec![Box::new(L1Loss::new()), Box::new(SpectralAngleLoss::new()), Box::new(ffl)];

    for loss in losses {
        let value = loss.forward(pred.clone(), x.clone()).unwrap();
        let grads = value.backward();
        let grad = pred.grad(&grads).expect("prediction has a gradient");
        let values = grad.into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|v| v.is_finite()), "{} produced non-finite gradients", loss.name());
    }
}

#[test]
fn test_weight_matrix_receives_no_gradient() {
    let target = tensor::<AutodiffBackend>(positive_values(16, 3), [1, 1, 4, 4]);
    let pred = tensor::<AutodiffBackend>(positive_values(16, 5), [1, 1, 4, 4]).require_grad();
    let loss = FocalFrequencyLossConfig::new().init().unwrap();

    let pred_freq = loss.to_spectrum(pred.clone()).unwrap();
    let target_freq = loss.to_spectrum(target).unwrap();
    let weight = loss.weight_matrix(&pred_freq, &target_freq);
    assert!(!weight.is_require_grad());
}

proptest! {
    #[test]
    fn test_spectral_angle_of_identical_inputs_is_zero(
        c in 1usize..6,
        h in 1usize..6,
        w in 1usize..6,
        seed in 0usize..100,
    ) {
        let x = tensor::<Backend>(positive_values(2 * c * h * w, seed), [2, c, h, w]);
        let value = SpectralAngleLoss::new().forward(x.clone(), x).unwrap().into_scalar();
        // f32 rounding of the cosine near 1 maps to a small positive angle.
        prop_assert!(value.abs() < 5e-4, "angle {}", value);
    }

    #[test]
    fn test_spectral_angle_is_bounded(seed_a in 0usize..50, seed_b in 50usize..100) {
        let a = tensor::<Backend>(positive_values(3 * 4 * 4, seed_a), [1, 3, 4, 4]).sub_scalar(0.5);
        let b = tensor::<Backend>(positive_values(3 * 4 * 4, seed_b), [1, 3, 4, 4]).sub_scalar(0.5);
        let value = SpectralAngleLoss::new().forward(a, b).unwrap().into_scalar();
        prop_assert!((0.0..=std::f32::consts::PI + 1e-5).contains(&value));
    }
}
