//! Gradient updaters for neural network parameter variables
//!
//! This module provides the [`GradientUpdater`] trait, the update rules that
//! implement it, and [`LayerUpdater`], which keeps one updater per parameter
//! variable of a layer.
//!
//! # Overview
//!
//! An updater turns the raw gradient of one parameter tensor into the step the
//! training loop applies to that parameter. Adaptive updaters keep memory shaped
//! like the gradient (moving averages of past gradients) and evolve it on every
//! call, so each parameter variable needs its own instance.
//!
//! # Available Updaters
//!
//! - [`Sgd`]: `step = η·g`
//! - [`RmsProp`]: `m ← ρ·m + (1−ρ)·g², step = η·g / (√m + ε)`
//! - [`Adam`]: bias-corrected first and second moment estimates
//!
//! # Example
//!
//! ```
//! use ndarray::{ArrayD, IxDyn};
//! use rust_layer_training::config::{LayerConfig, Updater};
//! use rust_layer_training::optimizers::LayerUpdater;
//!
//! let conf = LayerConfig::with_updater(Updater::RmsProp);
//! let mut updater = LayerUpdater::new();
//!
//! let gradient = ArrayD::from_elem(IxDyn(&[2, 3]), 0.5f32);
//! let step = updater.apply("W", &gradient, &conf).unwrap();
//! assert_eq!(step.shape(), &[2, 3]);
//! ```

pub mod adam;
pub mod normalization;
pub mod rmsprop;
pub mod sgd;
pub mod updater;

pub use adam::Adam;
pub use rmsprop::RmsProp;
pub use sgd::Sgd;
pub use updater::LayerUpdater;

use crate::config::{LayerConfig, Updater};
use crate::error::{Error, Result};
use ndarray::{ArrayD, ArrayViewD};
use std::fmt;

/// Core trait for per-variable gradient update rules.
///
/// An instance is bound to a single parameter variable. Hyperparameters are
/// fixed when the instance is built; only the numeric state evolves.
///
/// # State Management
///
/// Stateful rules allocate their memory with the gradient's shape, either
/// eagerly through [`init_state`](GradientUpdater::init_state) or lazily on the
/// first [`update`](GradientUpdater::update). A later gradient of any other shape
/// is rejected with [`Error::ShapeMismatch`] before the state is touched.
pub trait GradientUpdater: fmt::Debug + Send {
    /// Allocates zeroed state for a gradient of the given shape.
    ///
    /// Has no effect when state already exists.
    fn init_state(&mut self, shape: &[usize]);

    /// Consumes a raw gradient and returns the adjusted step.
    ///
    /// Mutates the internal state of adaptive rules.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`] if `gradient` does not match the state's shape.
    fn update(&mut self, gradient: &ArrayD<f32>) -> Result<ArrayD<f32>>;

    /// Read-only views of the rule's memory tensors, empty for stateless rules.
    fn state(&self) -> Vec<ArrayViewD<'_, f32>>;

    /// Drops all accumulated state. The next update starts from zero memory.
    fn reset(&mut self);

    /// The learning rate captured when the rule was built.
    fn learning_rate(&self) -> f32;
}

/// Builds the update rule selected by `conf.updater`, capturing the
/// configuration's current hyperparameters.
///
/// # Errors
///
/// [`Error::InvalidConfiguration`] if the configuration fails validation.
pub fn build_updater(conf: &LayerConfig) -> Result<Box<dyn GradientUpdater>> {
    conf.validate()?;
    let updater: Box<dyn GradientUpdater> = match conf.updater {
        Updater::Sgd => Box::new(Sgd::new(conf.learning_rate)),
        Updater::Adam => Box::new(Adam::new(
            conf.learning_rate,
            conf.adam_mean_decay,
            conf.adam_var_decay,
            conf.epsilon,
        )),
        Updater::RmsProp => Box::new(RmsProp::new(
            conf.learning_rate,
            conf.rms_decay,
            conf.epsilon,
        )),
    };
    Ok(updater)
}

pub(crate) fn check_shape(state: Option<&ArrayD<f32>>, gradient: &ArrayD<f32>) -> Result<()> {
    match state {
        Some(state) if state.shape() != gradient.shape() => {
            Err(Error::shape_mismatch(
                format!("{:?}", state.shape()),
                gradient.shape(),
            ))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_updater_selects_rule() {
        let sgd = build_updater(&LayerConfig::with_updater(Updater::Sgd)).unwrap();
        assert!(sgd.state().is_empty());

        let mut rmsprop = build_updater(&LayerConfig::with_updater(Updater::RmsProp)).unwrap();
        rmsprop.init_state(&[3]);
        assert_eq!(rmsprop.state().len(), 1);

        let mut adam = build_updater(&LayerConfig::with_updater(Updater::Adam)).unwrap();
        adam.init_state(&[3]);
        assert_eq!(adam.state().len(), 2);
    }

    #[test]
    fn test_build_updater_captures_learning_rate() {
        let conf = LayerConfig {
            learning_rate: 0.25,
            ..LayerConfig::with_updater(Updater::RmsProp)
        };
        let updater = build_updater(&conf).unwrap();
        assert_eq!(updater.learning_rate(), 0.25);
    }

    #[test]
    fn test_build_updater_rejects_invalid_config() {
        let conf = LayerConfig {
            epsilon: -1.0,
            ..LayerConfig::with_updater(Updater::RmsProp)
        };
        assert!(matches!(
            build_updater(&conf),
            Err(Error::InvalidConfiguration(_))
        ));
    }
}
