//! Generator and adversarial training loops.
//!
//! Both loops run `epochs * num_batches` Adam steps. After every generator
//! step the loop records the loss, reports progress, saves a checkpoint when
//! the cadence says so and then asks the schedule for the next learning rate
//! using the 1-based epoch and iteration just completed. Only the generator
//! learning rate decays; the discriminator keeps the initial rate.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use burn::module::{AutodiffModule, Module};
use burn::optim::decay::WeightDecayConfig;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::{AutodiffBackend, Backend};

use hsir_model::{Discriminator, Generator};

use crate::checkpoint::CheckpointPolicy;
use crate::config::TrainingConfig;
use crate::data::BatchSource;
use crate::error::{Result, TrainingError};
use crate::loss_log::LossLog;
use crate::objective::{wgan_discriminator_loss, wgan_generator_loss, ReconstructionObjective};
use crate::progress::{ConsoleProgressCallback, ProgressBarCallback, ProgressCallback, ProgressInfo, ProgressTracker};
use crate::schedule::LearningRateSchedule;
use crate::validation::loss_value;

/// Result of [`Trainer::fit`].
#[derive(Debug)]
pub struct TrainingOutcome<G> {
    pub generator: G,
    /// Generator objective after every step.
    pub losses: LossLog,
    /// Checkpoints written during the run.
    pub checkpoints: Vec<PathBuf>,
    /// Learning rate the next step would have used.
    pub final_lr: f64,
}

/// Result of [`Trainer::fit_adversarial`].
#[derive(Debug)]
pub struct AdversarialOutcome<G, D> {
    pub generator: G,
    pub discriminator: D,
    /// Total generator loss (image loss plus weighted adversarial term).
    pub losses: LossLog,
    pub discriminator_losses: LossLog,
    pub checkpoints: Vec<PathBuf>,
    pub final_lr: f64,
}

/// Drives Adam updates of a generator, optionally against a critic.
pub struct Trainer<B: AutodiffBackend> {
    config: TrainingConfig,
    objective: ReconstructionObjective,
    schedule: LearningRateSchedule,
    checkpoints: CheckpointPolicy,
    tracker: ProgressTracker,
    device: B::Device,
}

impl<B: AutodiffBackend> Trainer<B> {
    /// # Errors
    /// Fails when the configuration does not validate.
    pub fn new(config: TrainingConfig, device: B::Device) -> Result<Self> {
        config.validate()?;

        let objective = ReconstructionObjective::from_config(&config)?;
        let schedule = LearningRateSchedule::from_config(&config);
        let checkpoints = CheckpointPolicy::from_config(&config);
        let mut tracker = ProgressTracker::new();
        tracker.add_callback(Arc::new(ConsoleProgressCallback::new(config.log_interval)));

        Ok(Self {
            config,
            objective,
            schedule,
            checkpoints,
            tracker,
            device,
        })
    }

    /// Register an additional progress callback.
    pub fn with_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.tracker.add_callback(callback);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn objective(&self) -> &ReconstructionObjective {
        &self.objective
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    fn adam(&self) -> AdamConfig {
        AdamConfig::new()
            .with_beta_1(self.config.beta_1 as f32)
            .with_beta_2(self.config.beta_2 as f32)
    }

    fn generator_optimizer(&self) -> AdamConfig {
        let adam = self.adam();
        if self.config.weight_decay > 0.0 {
            adam.with_weight_decay(Some(WeightDecayConfig::new(self.config.weight_decay as f32)))
        } else {
            adam
        }
    }

    fn tracker_for(&self, total_iterations: usize) -> ProgressTracker {
        let mut tracker = self.tracker.clone();
        if self.config.show_progress_bar {
            tracker.add_callback(Arc::new(ProgressBarCallback::new(total_iterations)));
        }
        tracker
    }

    fn start<S: BatchSource<B>>(&self, source: &S) -> Result<(usize, RunState)> {
        let batches = source.num_batches();
        if batches == 0 {
            return Err(TrainingError::EmptyBatchSource);
        }
        tracing::info!(
            "Training for {} epochs of {} batches (batch size {})",
            self.config.epochs,
            batches,
            self.config.batch_size
        );
        Ok((batches, RunState::new(self.config.epochs, batches, self.schedule.initial_lr())))
    }

    /// Train `generator` on `source` with the reconstruction objective.
    pub fn fit<G, S>(&self, generator: G, source: &mut S) -> Result<TrainingOutcome<G>>
    where
        G: Generator<B> + AutodiffModule<B>,
        S: BatchSource<B>,
    {
        let (batches, mut state) = self.start(source)?;
        let tracker = self.tracker_for(state.total());
        tracker.start();

        match self.run_generator(generator, source, batches, &mut state, &tracker) {
            Ok(generator) => {
                tracker.complete(state.total(), state.losses.last().unwrap_or(0.0), state.lr);
                Ok(TrainingOutcome {
                    generator,
                    losses: state.losses,
                    checkpoints: state.saved,
                    final_lr: state.lr,
                })
            }
            Err(err) => {
                tracker.error(&err.to_string());
                Err(err)
            }
        }
    }

    fn run_generator<G, S>(
        &self,
        mut generator: G,
        source: &mut S,
        batches: usize,
        state: &mut RunState,
        tracker: &ProgressTracker,
    ) -> Result<G>
    where
        G: Generator<B> + AutodiffModule<B>,
        S: BatchSource<B>,
    {
        let mut optimizer = self.generator_optimizer().init::<B, G>();

        for epoch in 0..self.config.epochs {
            for index in 0..batches {
                let pair = source.batch(epoch, index)?.to_device(&self.device);

                let recon = Generator::forward(&generator, pair.input);
                let output = self.objective.compute(recon, pair.target)?;
                let loss = loss_value(&output.total, "generator")?;
                let terms = output.terms()?;

                let grads = GradientsParams::from_grads(output.total.backward(), &generator);
                generator = optimizer.step(state.lr, generator, grads);

                let metrics = terms.into_iter().map(|(name, value)| (name.to_string(), value)).collect();
                state.record::<B, G>(&generator, epoch, index, loss, metrics, tracker, &self.checkpoints, &self.schedule)?;
            }
        }
        Ok(generator)
    }

    /// Train `generator` against `discriminator` (WGAN critic).
    ///
    /// Each step first updates the critic on the real target and a detached
    /// reconstruction, then updates the generator on
    /// `image_loss + lambda_gan * -mean(D(fake))`.
    pub fn fit_adversarial<G, D, S>(
        &self,
        generator: G,
        discriminator: D,
        source: &mut S,
    ) -> Result<AdversarialOutcome<G, D>>
    where
        G: Generator<B> + AutodiffModule<B>,
        D: Discriminator<B> + AutodiffModule<B>,
        S: BatchSource<B>,
    {
        let (batches, mut state) = self.start(source)?;
        let tracker = self.tracker_for(state.total());
        let checkpoints = self.checkpoints.clone().adversarial();
        let mut discriminator_losses = LossLog::new();
        tracker.start();

        let result = self.run_adversarial(
            generator,
            discriminator,
            source,
            batches,
            &mut state,
            &mut discriminator_losses,
            &tracker,
            &checkpoints,
        );

        match result {
            Ok((generator, discriminator)) => {
                tracker.complete(state.total(), state.losses.last().unwrap_or(0.0), state.lr);
                Ok(AdversarialOutcome {
                    generator,
                    discriminator,
                    losses: state.losses,
                    discriminator_losses,
                    checkpoints: state.saved,
                    final_lr: state.lr,
                })
            }
            Err(err) => {
                tracker.error(&err.to_string());
                Err(err)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn run_adversarial<G, D, S>(
        &self,
        mut generator: G,
        mut discriminator: D,
        source: &mut S,
        batches: usize,
        state: &mut RunState,
        discriminator_losses: &mut LossLog,
        tracker: &ProgressTracker,
        checkpoints: &CheckpointPolicy,
    ) -> Result<(G, D)>
    where
        G: Generator<B> + AutodiffModule<B>,
        D: Discriminator<B> + AutodiffModule<B>,
        S: BatchSource<B>,
    {
        let mut optimizer_g = self.generator_optimizer().init::<B, G>();
        let mut optimizer_d = self.adam().init::<B, D>();

        for epoch in 0..self.config.epochs {
            for index in 0..batches {
                let pair = source.batch(epoch, index)?.to_device(&self.device);

                // Critic step.
                let recon = Generator::forward(&generator, pair.input.clone());
                let fake_scores = Discriminator::forward(&discriminator, recon.detach());
                let real_scores = Discriminator::forward(&discriminator, pair.target.clone());
                let loss_d = wgan_discriminator_loss(real_scores, fake_scores);
                let d_value = loss_value(&loss_d, "discriminator")?;

                let grads = GradientsParams::from_grads(loss_d.backward(), &discriminator);
                discriminator = optimizer_d.step(self.config.lr, discriminator, grads);

                // Generator step against the updated critic.
                let recon = Generator::forward(&generator, pair.input);
                let adversarial = wgan_generator_loss(Discriminator::forward(&discriminator, recon.clone()));
                let image = self.objective.compute(recon, pair.target)?;
                let image_value = loss_value(&image.total, "image")?;
                let adversarial_value = loss_value(&adversarial, "adversarial")?;

                let total = image.total + adversarial.mul_scalar(self.config.lambda_gan);
                let loss = loss_value(&total, "generator")?;

                let grads = GradientsParams::from_grads(total.backward(), &generator);
                generator = optimizer_g.step(state.lr, generator, grads);

                discriminator_losses.push(d_value);
                let metrics = vec![
                    ("image".to_string(), image_value),
                    ("loss_G".to_string(), adversarial_value),
                    ("loss_D".to_string(), d_value),
                ];
                state.record::<B, G>(&generator, epoch, index, loss, metrics, tracker, checkpoints, &self.schedule)?;
            }
        }
        Ok((generator, discriminator))
    }
}

/// Bookkeeping shared by both loops.
struct RunState {
    epochs: usize,
    batches: usize,
    lr: f64,
    losses: LossLog,
    saved: Vec<PathBuf>,
}

impl RunState {
    fn new(epochs: usize, batches: usize, lr: f64) -> Self {
        Self {
            epochs,
            batches,
            lr,
            losses: LossLog::new(),
            saved: Vec::new(),
        }
    }

    fn total(&self) -> usize {
        self.epochs * self.batches
    }

    #[allow(clippy::too_many_arguments)]
    fn record<B, G>(
        &mut self,
        generator: &G,
        epoch: usize,
        index: usize,
        loss: f64,
        metrics: Vec<(String, f64)>,
        tracker: &ProgressTracker,
        checkpoints: &CheckpointPolicy,
        schedule: &LearningRateSchedule,
    ) -> Result<()>
    where
        B: Backend,
        G: Module<B>,
    {
        let epoch = epoch + 1;
        let iteration = (epoch - 1) * self.batches + index + 1;

        let mut info = ProgressInfo::new(iteration, Some(self.total()), loss, Duration::ZERO, self.lr)
            .with_epoch(epoch, self.epochs);
        for (name, value) in metrics {
            info.add_metric(name, value);
        }
        tracker.update(info);
        self.losses.push(loss);

        if let Some(path) = checkpoints.save_if_due::<B, G>(generator, epoch, iteration, self.batches)? {
            self.saved.push(path);
        }

        self.lr = schedule.learning_rate(epoch, iteration);
        Ok(())
    }
}
