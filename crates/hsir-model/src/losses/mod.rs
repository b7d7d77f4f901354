//! Reconstruction criteria.
//!
//! All losses compare `[N, C, H, W]` batches and implement
//! [`ReconstructionLoss`], so trainers can combine them without knowing the
//! concrete type.

pub mod trait_;
pub mod l1;
pub mod spectral_angle;
pub mod focal_frequency;

pub use trait_::ReconstructionLoss;
pub use l1::L1Loss;
pub use spectral_angle::{arccos, cosine_similarity, SpectralAngleLoss};
pub use focal_frequency::{FocalFrequencyLoss, FocalFrequencyLossConfig};
