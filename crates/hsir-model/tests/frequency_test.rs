use burn::tensor::{Tensor, TensorData};
use burn_ndarray::NdArray;
use hsir_model::frequency::{fft2_ortho, split_patches};
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

type Backend = NdArray<f32>;

/// Reference orthonormal 2-D FFT of a row-major `h x w` tile.
fn reference_fft2(tile: &[f32], h: usize, w: usize) -> Vec<Complex<f64>> {
    let mut planner = FftPlanner::<f64>::new();
    let row_fft = planner.plan_fft_forward(w);
    let col_fft = planner.plan_fft_forward(h);

    let mut data: Vec<Complex<f64>> = tile.iter().map(|&v| Complex::new(v as f64, 0.0)).collect();
    for row in data.chunks_exact_mut(w) {
        row_fft.process(row);
    }

    let mut column = vec![Complex::new(0.0, 0.0); h];
    for x in 0..w {
        for y in 0..h {
            column[y] = data[y * w + x];
        }
        col_fft.process(&mut column);
        for y in 0..h {
            data[y * w + x] = column[y];
        }
    }

    let norm = 1.0 / ((h * w) as f64).sqrt();
    data.into_iter().map(|c| c * norm).collect()
}

fn pseudo_random(len: usize, seed: u64) -> Vec<f32> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) % 1000) as f32 / 1000.0
        })
        .collect()
}

#[test]
fn test_matches_rustfft_on_rectangular_tiles() {
    let device = Default::default();
    for &(h, w) in &[(4, 4), (5, 3), (8, 6), (7, 7), (1, 5)] {
        let (n, p, c) = (2, 1, 3);
        let data = pseudo_random(n * p * c * h * w, (h * 31 + w) as u64);
        let x = Tensor::<Backend, 5>::from_data(TensorData::new(data.clone(), [n, p, c, h, w]), &device);

        let spectrum = fft2_ortho(x);
        assert_eq!(spectrum.dims(), [n, p, c, h, w]);
        let re = spectrum.re.into_data().to_vec::<f32>().unwrap();
        let im = spectrum.im.into_data().to_vec::<f32>().unwrap();

        for (t, tile) in data.chunks_exact(h * w).enumerate() {
            let expected = reference_fft2(tile, h, w);
            for (k, e) in expected.iter().enumerate() {
                let i = t * h * w + k;
                assert!((re[i] as f64 - e.re).abs() < 1e-4, "re mismatch at {} for {}x{}", i, h, w);
                assert!((im[i] as f64 - e.im).abs() < 1e-4, "im mismatch at {} for {}x{}", i, h, w);
            }
        }
    }
}

#[test]
fn test_patched_spectrum_matches_per_patch_fft() {
    let device = Default::default();
    let (h, w) = (8, 8);
    let data = pseudo_random(h * w, 7);
    let x = Tensor::<Backend, 4>::from_data(TensorData::new(data.clone(), [1, 1, h, w]), &device);

    let spectrum = fft2_ortho(split_patches(x, 2).unwrap());
    assert_eq!(spectrum.dims(), [1, 4, 1, 4, 4]);
    let re = spectrum.re.into_data().to_vec::<f32>().unwrap();

    // Bottom-left patch is the third in row-major order.
    let patch: Vec<f32> = (4..8)
        .flat_map(|y| (0..4).map(move |x| (y, x)))
        .map(|(y, x)| data[y * w + x])
        .collect();
    let expected = reference_fft2(&patch, 4, 4);
    for (k, e) in expected.iter().enumerate() {
        assert!((re[2 * 16 + k] as f64 - e.re).abs() < 1e-4);
    }
}
