//! Losses, frequency transform and network seams for hyperspectral
//! reconstruction.

pub mod frequency;
pub mod generator;
pub mod losses;
pub mod registry;

pub use frequency::{fft2_ortho, Spectrum};
pub use generator::{Discriminator, Generator};
pub use losses::{FocalFrequencyLoss, FocalFrequencyLossConfig, L1Loss, ReconstructionLoss, SpectralAngleLoss};
pub use registry::{GeneratorFactory, GeneratorRegistry};
