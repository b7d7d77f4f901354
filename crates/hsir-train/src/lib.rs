//! Training loops for hyperspectral reconstruction generators.
//!
//! [`Trainer`] runs plain reconstruction training or WGAN training against a
//! critic. Everything a run needs is described by a [`TrainingConfig`]; data
//! comes in through a [`BatchSource`].

pub mod checkpoint;
pub mod config;
pub mod data;
pub mod error;
pub mod loss_log;
pub mod objective;
pub mod progress;
pub mod schedule;
pub mod trainer;
pub mod validation;

pub use checkpoint::{load_checkpoint, CheckpointPolicy};
pub use config::{LrDecayMode, SaveMode, TrainingConfig};
pub use data::{BatchSource, ImagePair};
pub use error::{Result, TrainingError};
pub use loss_log::LossLog;
pub use objective::{wgan_discriminator_loss, wgan_generator_loss, ObjectiveOutput, ReconstructionObjective};
pub use progress::{
    ConsoleProgressCallback, HistoryCallback, ProgressBarCallback, ProgressCallback, ProgressInfo, ProgressTracker,
};
pub use schedule::LearningRateSchedule;
pub use trainer::{AdversarialOutcome, Trainer, TrainingOutcome};
