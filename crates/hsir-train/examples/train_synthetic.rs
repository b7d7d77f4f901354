//! Train a small generator on synthetic data, then run tiled inference.
//!
//! ```text
//! RUST_LOG=info cargo run -p hsir-train --example train_synthetic
//! ```

use burn::backend::Autodiff;
use burn::config::Config;
use burn::module::{AutodiffModule, Module};
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::PaddingConfig2d;
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;
use burn::tensor::{Distribution, Tensor};
use burn_ndarray::NdArray;
use hsir_core::filter::CubicResizeFilter;
use hsir_core::patch::{tiled_forward, PatchGrid};
use hsir_model::{Generator, GeneratorRegistry};
use hsir_train::{ImagePair, LrDecayMode, SaveMode, Trainer, TrainingConfig};
use tracing_subscriber::EnvFilter;

type TrainBackend = Autodiff<NdArray<f32>>;

const BANDS: usize = 8;

#[derive(Module, Debug)]
struct SpectralNet<B: Backend> {
    head: Conv2d<B>,
    tail: Conv2d<B>,
}

impl<B: Backend> SpectralNet<B> {
    fn new(hidden: usize, device: &B::Device) -> Self {
        Self {
            head: Conv2dConfig::new([3, hidden], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device),
            tail: Conv2dConfig::new([hidden, BANDS], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device),
        }
    }
}

impl<B: Backend> Generator<B> for SpectralNet<B> {
    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        self.tail.forward(relu(self.head.forward(input)))
    }
}

/// Smooth RGB scenes and a matching spectral cube, resized to 32x32.
fn synthetic_pairs(count: usize, device: &<TrainBackend as Backend>::Device) -> anyhow::Result<Vec<ImagePair<TrainBackend>>> {
    let mut pairs = Vec::with_capacity(count);
    for _ in 0..count {
        let coarse = Tensor::<TrainBackend, 4>::random([1, BANDS, 8, 8], Distribution::Uniform(0.0, 1.0), device);
        let cube = CubicResizeFilter::new(4.0).apply_batch(&coarse)?;
        // Each RGB channel averages a third of the bands.
        let third = BANDS / 3;
        let rgb = Tensor::cat(
            (0..3)
                .map(|c| cube.clone().slice([0..1, c * third..(c + 1) * third, 0..32, 0..32]).mean_dim(1))
                .collect(),
            1,
        );
        pairs.push(ImagePair::new(rgb, cube)?);
    }
    Ok(pairs)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let device = Default::default();
    let save_dir = std::env::temp_dir().join("hsir-synthetic");

    let mut registry = GeneratorRegistry::<TrainBackend, SpectralNet<TrainBackend>>::new();
    registry
        .register("spectral_small", |device| SpectralNet::new(16, device))
        .register("spectral_wide", |device| SpectralNet::new(48, device));
    let generator = registry.create("spectral_small", &device)?;

    let config = TrainingConfig::new()
        .with_epochs(20)
        .with_lr(2e-3)
        .with_lr_decrease_mode(LrDecayMode::Epoch)
        .with_lr_decrease_epoch(5)
        .with_save_mode(SaveMode::Epoch)
        .with_save_by_epoch(10)
        .with_save_path(save_dir.clone());
    tracing::info!("config: {}", serde_json::to_string(&config)?);
    std::fs::create_dir_all(&save_dir)?;
    config.save(save_dir.join("config.json"))?;

    let mut source = synthetic_pairs(4, &device)?;
    let trainer = Trainer::<TrainBackend>::new(config, device)?;
    let outcome = trainer.fit(generator, &mut source)?;
    outcome.losses.overwrite_txt(save_dir.join("loss.txt"))?;
    tracing::info!(
        "Finished with loss {:.5}; {} checkpoints in {}",
        outcome.losses.last().unwrap_or(f64::NAN),
        outcome.checkpoints.len(),
        save_dir.display()
    );

    // Inference on a larger scene, 24x24 tiles with 4 pixels of overlap.
    let model = outcome.generator.valid();
    let scene = Tensor::<NdArray<f32>, 4>::random([1, 3, 64, 80], Distribution::Uniform(0.0, 1.0), &Default::default());
    let grid = PatchGrid::new(64, 80, Some(24), 4)?;
    let cube = tiled_forward(scene, &grid, 1, |tile| Generator::forward(&model, tile))?;
    tracing::info!("Reconstructed {:?} from {} tiles", cube.dims(), grid.len());

    Ok(())
}
