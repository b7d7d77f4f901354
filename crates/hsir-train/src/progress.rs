//! Progress tracking and callbacks for training runs.
//!
//! The trainer reports every optimizer step to a [`ProgressTracker`], which
//! stamps elapsed time and an ETA onto the report and fans it out to the
//! registered callbacks.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// Snapshot reported after one optimizer step.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// 1-based; 0 when the report is not tied to an epoch.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Global step count, 1-based.
    pub iteration: usize,
    pub total_iterations: Option<usize>,
    /// Generator objective of this step.
    pub loss: f64,
    pub elapsed: Duration,
    /// ETA, filled in by [`ProgressTracker::update`].
    pub estimated_remaining: Option<Duration>,
    /// Learning rate the step ran with.
    pub learning_rate: f64,
    /// Named loss components (`l1`, `sad`, `loss_D`, ...).
    pub metrics: Vec<(String, f64)>,
}

impl ProgressInfo {
    pub fn new(
        iteration: usize,
        total_iterations: Option<usize>,
        loss: f64,
        elapsed: Duration,
        learning_rate: f64,
    ) -> Self {
        Self {
            epoch: 0,
            total_epochs: 0,
            iteration,
            total_iterations,
            loss,
            elapsed,
            estimated_remaining: None,
            learning_rate,
            metrics: Vec::new(),
        }
    }

    pub fn with_epoch(mut self, epoch: usize, total_epochs: usize) -> Self {
        self.epoch = epoch;
        self.total_epochs = total_epochs;
        self
    }

    /// Share of the run completed, in percent.
    pub fn progress_percent(&self) -> Option<f64> {
        self.total_iterations
            .map(|total| (self.iteration as f64 / total as f64) * 100.0)
    }

    /// Estimate remaining time from the mean time per iteration so far.
    pub fn calculate_remaining(&mut self) {
        let Some(total) = self.total_iterations else {
            return;
        };
        if self.iteration == 0 {
            return;
        }
        let per_step = self.elapsed.as_secs_f64() / self.iteration as f64;
        let left = total.saturating_sub(self.iteration) as f64;
        self.estimated_remaining = Some(Duration::from_secs_f64(per_step * left));
    }

    pub fn add_metric(&mut self, name: impl Into<String>, value: f64) {
        self.metrics.push((name.into(), value));
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }
}

/// Observer of a training run.
pub trait ProgressCallback: Send + Sync {
    /// Called after every optimizer step.
    fn on_progress(&self, info: &ProgressInfo);

    /// Called when training starts.
    fn on_start(&self) {}

    /// Called when training completes successfully.
    fn on_complete(&self, _info: &ProgressInfo) {}

    /// Called when training fails.
    fn on_error(&self, _error: &str) {}
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Console progress callback that logs to tracing.
#[derive(Debug, Clone)]
pub struct ConsoleProgressCallback {
    /// Log interval (iterations).
    pub log_interval: usize,
}

impl Default for ConsoleProgressCallback {
    fn default() -> Self {
        Self { log_interval: 50 }
    }
}

impl ConsoleProgressCallback {
    pub fn new(log_interval: usize) -> Self {
        Self {
            log_interval: log_interval.max(1),
        }
    }
}

impl ProgressCallback for ConsoleProgressCallback {
    fn on_progress(&self, info: &ProgressInfo) {
        if info.iteration % self.log_interval == 0 || info.total_iterations == Some(info.iteration) {
            let progress = info.progress_percent().unwrap_or(0.0);
            let remaining = info
                .estimated_remaining
                .map(|d| format!("{:.2}s", d.as_secs_f64()))
                .unwrap_or_else(|| "N/A".to_string());

            tracing::info!(
                "Epoch [{}/{}] Iter {}/{} ({:.1}%) | Loss: {:.6} | LR: {:.2e} | Elapsed: {:.2}s | ETA: {}",
                info.epoch,
                info.total_epochs,
                info.iteration,
                info.total_iterations
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "?".to_string()),
                progress,
                info.loss,
                info.learning_rate,
                info.elapsed.as_secs_f64(),
                remaining
            );

            for (name, value) in &info.metrics {
                tracing::debug!("  {}: {:.6}", name, value);
            }
        }
    }

    fn on_start(&self) {
        tracing::info!("Training started");
    }

    fn on_complete(&self, info: &ProgressInfo) {
        tracing::info!(
            "Training completed in {:.2}s after {} iterations with final loss: {:.6}",
            info.elapsed.as_secs_f64(),
            info.iteration,
            info.loss
        );
    }

    fn on_error(&self, error: &str) {
        tracing::error!("Training failed: {}", error);
    }
}

/// Terminal progress bar over all iterations of a run.
#[derive(Clone)]
pub struct ProgressBarCallback {
    bar: ProgressBar,
}

impl ProgressBarCallback {
    pub fn new(total_iterations: usize) -> Self {
        let bar = ProgressBar::new(total_iterations as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        Self { bar }
    }

    /// A bar that never draws, for tests and non-interactive runs.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl std::fmt::Debug for ProgressBarCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressBarCallback")
            .field("position", &self.bar.position())
            .field("length", &self.bar.length())
            .finish()
    }
}

impl ProgressCallback for ProgressBarCallback {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_position(info.iteration as u64);
        let mut message = format!("Epoch [{}/{}] loss={:.6}", info.epoch, info.total_epochs, info.loss);
        for (name, value) in &info.metrics {
            message.push_str(&format!(" {}={:.4}", name, value));
        }
        self.bar.set_message(message);
    }

    fn on_complete(&self, info: &ProgressInfo) {
        self.bar.finish_with_message(format!("loss={:.6}", info.loss));
    }

    fn on_error(&self, error: &str) {
        self.bar.abandon_with_message(error.to_string());
    }
}

/// History callback that records all progress information.
#[derive(Debug, Clone, Default)]
pub struct HistoryCallback {
    history: Arc<Mutex<Vec<ProgressInfo>>>,
}

impl HistoryCallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the recorded history.
    pub fn get_history(&self) -> Vec<ProgressInfo> {
        lock(&self.history).clone()
    }

    /// Recorded losses in iteration order.
    pub fn losses(&self) -> Vec<f64> {
        lock(&self.history).iter().map(|info| info.loss).collect()
    }

    pub fn clear(&self) {
        lock(&self.history).clear();
    }
}

impl ProgressCallback for HistoryCallback {
    fn on_progress(&self, info: &ProgressInfo) {
        lock(&self.history).push(info.clone());
    }
}

/// Progress tracker that manages multiple callbacks.
#[derive(Clone, Default)]
pub struct ProgressTracker {
    callbacks: Vec<Arc<dyn ProgressCallback>>,
    start_time: Arc<Mutex<Option<Instant>>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_callback(&mut self, callback: Arc<dyn ProgressCallback>) {
        self.callbacks.push(callback);
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Start tracking.
    pub fn start(&self) {
        *lock(&self.start_time) = Some(Instant::now());
        for callback in &self.callbacks {
            callback.on_start();
        }
    }

    fn elapsed(&self) -> Duration {
        lock(&self.start_time)
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// Stamp elapsed time and ETA onto `info` and dispatch it.
    pub fn update(&self, mut info: ProgressInfo) {
        info.elapsed = self.elapsed();
        info.calculate_remaining();

        for callback in &self.callbacks {
            callback.on_progress(&info);
        }
    }

    /// Complete tracking.
    pub fn complete(&self, iterations: usize, final_loss: f64, learning_rate: f64) {
        let info = ProgressInfo::new(iterations, Some(iterations), final_loss, self.elapsed(), learning_rate);
        for callback in &self.callbacks {
            callback.on_complete(&info);
        }
    }

    /// Report error.
    pub fn error(&self, error: &str) {
        for callback in &self.callbacks {
            callback.on_error(error);
        }
    }
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}
