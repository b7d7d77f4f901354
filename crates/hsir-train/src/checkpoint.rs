//! Generator checkpoint cadence and storage.

use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use burn::tensor::backend::Backend;

use crate::config::{SaveMode, TrainingConfig};
use crate::error::{Result, TrainingError};

/// File extension written by the checkpoint recorder.
pub const CHECKPOINT_EXTENSION: &str = "mpk";

type Recorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// Decides when the generator is saved and under which name.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointPolicy {
    mode: SaveMode,
    every: usize,
    batch_size: usize,
    directory: PathBuf,
    prefix: &'static str,
}

impl CheckpointPolicy {
    pub fn new(mode: SaveMode, every: usize, batch_size: usize, directory: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            every: every.max(1),
            batch_size,
            directory: directory.into(),
            prefix: "G",
        }
    }

    /// Policy for plain generator training.
    pub fn from_config(config: &TrainingConfig) -> Self {
        let every = match config.save_mode {
            SaveMode::Iteration => config.save_by_iter,
            _ => config.save_by_epoch,
        };
        Self::new(config.save_mode, every, config.batch_size, config.save_path.clone())
    }

    /// Name checkpoints `G_GAN_*` instead of `G_*`.
    pub fn adversarial(mut self) -> Self {
        self.prefix = "G_GAN";
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Whether the step that completed `iteration` (1-based, global) inside
    /// `epoch` (1-based) triggers a save.
    pub fn should_save(&self, epoch: usize, iteration: usize, batches_per_epoch: usize) -> bool {
        match self.mode {
            SaveMode::Epoch => epoch % self.every == 0 && iteration % batches_per_epoch.max(1) == 0,
            SaveMode::Iteration => iteration % self.every == 0,
            SaveMode::Disabled => false,
        }
    }

    /// Checkpoint name without extension, e.g. `G_epoch10_bs8`.
    pub fn file_stem(&self, epoch: usize, iteration: usize) -> String {
        match self.mode {
            SaveMode::Iteration => format!("{}_iter{}_bs{}", self.prefix, iteration, self.batch_size),
            _ => format!("{}_epoch{}_bs{}", self.prefix, epoch, self.batch_size),
        }
    }

    /// Save `module` when the cadence says so, returning the written path.
    pub fn save_if_due<B, M>(
        &self,
        module: &M,
        epoch: usize,
        iteration: usize,
        batches_per_epoch: usize,
    ) -> Result<Option<PathBuf>>
    where
        B: Backend,
        M: Module<B>,
    {
        if !self.should_save(epoch, iteration, batches_per_epoch) {
            return Ok(None);
        }

        std::fs::create_dir_all(&self.directory)?;
        let stem = self.directory.join(self.file_stem(epoch, iteration));
        module
            .clone()
            .save_file(stem.clone(), &Recorder::new())
            .map_err(|e| TrainingError::checkpoint(format!("{}: {:?}", stem.display(), e)))?;

        let path = stem.with_extension(CHECKPOINT_EXTENSION);
        tracing::info!("The trained model is successfully saved at {}", path.display());
        Ok(Some(path))
    }
}

/// Restore weights saved by [`CheckpointPolicy::save_if_due`] into `module`.
pub fn load_checkpoint<B, M>(module: M, path: impl AsRef<Path>, device: &B::Device) -> Result<M>
where
    B: Backend,
    M: Module<B>,
{
    let path = path.as_ref();
    let module = module
        .load_file(path.to_path_buf(), &Recorder::new(), device)
        .map_err(|e| TrainingError::checkpoint(format!("{}: {:?}", path.display(), e)))?;
    tracing::info!("Generator is loaded from {}", path.display());
    Ok(module)
}
