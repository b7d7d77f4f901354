//! Step learning-rate decay.
//!
//! The schedule is queried after every optimizer step with the 1-based epoch
//! and iteration just completed; the returned rate is used for the next step.

use crate::config::{LrDecayMode, TrainingConfig};

/// Learning rate as a function of training progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LearningRateSchedule {
    /// Constant learning rate
    Constant(f64),
    /// `initial_lr * factor^(epoch / every)`
    EpochDecay {
        initial_lr: f64,
        factor: f64,
        every: usize,
    },
    /// `initial_lr * factor^(iteration / every)`
    IterationDecay {
        initial_lr: f64,
        factor: f64,
        every: usize,
    },
}

impl Default for LearningRateSchedule {
    fn default() -> Self {
        Self::Constant(1e-4)
    }
}

impl LearningRateSchedule {
    pub fn constant(lr: f64) -> Self {
        Self::Constant(lr)
    }

    pub fn epoch_decay(initial_lr: f64, factor: f64, every: usize) -> Self {
        Self::EpochDecay {
            initial_lr,
            factor,
            every,
        }
    }

    pub fn iteration_decay(initial_lr: f64, factor: f64, every: usize) -> Self {
        Self::IterationDecay {
            initial_lr,
            factor,
            every,
        }
    }

    /// Schedule described by a validated [`TrainingConfig`].
    pub fn from_config(config: &TrainingConfig) -> Self {
        match config.lr_decrease_mode {
            LrDecayMode::Epoch => Self::epoch_decay(config.lr, config.lr_decrease_factor, config.lr_decrease_epoch),
            LrDecayMode::Iteration => {
                Self::iteration_decay(config.lr, config.lr_decrease_factor, config.lr_decrease_iter)
            }
            LrDecayMode::Constant => Self::constant(config.lr),
        }
    }

    /// Learning rate after `epoch` epochs and `iteration` iterations.
    pub fn learning_rate(&self, epoch: usize, iteration: usize) -> f64 {
        match self {
            Self::Constant(lr) => *lr,
            Self::EpochDecay {
                initial_lr,
                factor,
                every,
            } => decay(*initial_lr, *factor, epoch, *every),
            Self::IterationDecay {
                initial_lr,
                factor,
                every,
            } => decay(*initial_lr, *factor, iteration, *every),
        }
    }

    pub fn initial_lr(&self) -> f64 {
        match self {
            Self::Constant(lr) => *lr,
            Self::EpochDecay { initial_lr, .. } => *initial_lr,
            Self::IterationDecay { initial_lr, .. } => *initial_lr,
        }
    }
}

fn decay(initial_lr: f64, factor: f64, step: usize, every: usize) -> f64 {
    let decays = step / every.max(1);
    initial_lr * factor.powi(decays as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_schedule() {
        let schedule = LearningRateSchedule::constant(0.01);
        assert_eq!(schedule.learning_rate(0, 0), 0.01);
        assert_eq!(schedule.learning_rate(100, 5000), 0.01);
    }

    #[test]
    fn test_epoch_decay() {
        let schedule = LearningRateSchedule::epoch_decay(0.1, 0.5, 10);
        assert_eq!(schedule.learning_rate(1, 1), 0.1);
        assert_eq!(schedule.learning_rate(9, 900), 0.1);
        assert_eq!(schedule.learning_rate(10, 1000), 0.05);
        assert_eq!(schedule.learning_rate(25, 1), 0.025);
    }

    #[test]
    fn test_iteration_decay_ignores_epoch() {
        let schedule = LearningRateSchedule::iteration_decay(1e-3, 0.1, 100);
        assert_eq!(schedule.learning_rate(50, 99), 1e-3);
        assert!((schedule.learning_rate(1, 200) - 1e-5).abs() < 1e-15);
    }

    #[test]
    fn test_from_config() {
        let config = TrainingConfig::new()
            .with_lr(2e-4)
            .with_lr_decrease_factor(0.5)
            .with_lr_decrease_epoch(2);
        let schedule = LearningRateSchedule::from_config(&config);
        assert_eq!(schedule.initial_lr(), 2e-4);
        assert_eq!(schedule.learning_rate(4, 0), 5e-5);

        let config = config.with_lr_decrease_mode(LrDecayMode::Constant);
        assert_eq!(LearningRateSchedule::from_config(&config).learning_rate(40, 0), 2e-4);
    }
}
