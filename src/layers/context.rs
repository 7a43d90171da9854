//! Per-layer training context
//!
//! This module provides [`LayerContext`], which owns everything a single layer
//! carries between training iterations apart from its parameters: the
//! configuration, the mini-batch size recorded on the last forward pass, and
//! the [`LayerUpdater`] holding each parameter variable's update rule.

use crate::config::LayerConfig;
use crate::error::Result;
use crate::layers::Layer;
use crate::optimizers::LayerUpdater;
use ndarray::ArrayD;

/// Training-time state of one layer.
///
/// # Example
///
/// ```
/// use ndarray::{ArrayD, IxDyn};
/// use rust_layer_training::config::{LayerConfig, Updater};
/// use rust_layer_training::layers::{Layer, LayerContext};
///
/// let mut layer = LayerContext::new(LayerConfig::with_updater(Updater::RmsProp));
/// layer.set_input_mini_batch_size(4);
///
/// let gradient = ArrayD::from_elem(IxDyn(&[3, 3]), 0.1f32);
/// let step = layer.update_gradient("W", &gradient).unwrap();
/// assert_eq!(step.shape(), &[3, 3]);
/// assert_eq!(layer.input_mini_batch_size(), Some(4));
/// ```
#[derive(Debug, Default)]
pub struct LayerContext {
    conf: LayerConfig,
    input_mini_batch_size: Option<usize>,
    updater: LayerUpdater,
}

impl LayerContext {
    pub fn new(conf: LayerConfig) -> Self {
        Self {
            conf,
            input_mini_batch_size: None,
            updater: LayerUpdater::new(),
        }
    }

    /// Replaces the configuration.
    ///
    /// Update rules that already exist keep the hyperparameters they were
    /// created with; only variables updated for the first time afterwards, or
    /// all variables after [`reinitialize`](LayerContext::reinitialize), see the
    /// new values.
    pub fn set_conf(&mut self, conf: LayerConfig) {
        self.conf = conf;
    }

    /// Records the mini-batch size of the input seen on the forward pass.
    pub fn set_input_mini_batch_size(&mut self, size: usize) {
        self.input_mini_batch_size = Some(size);
    }

    /// Turns the raw gradient of `variable` into the step to apply, using this
    /// layer's own update rules.
    pub fn update_gradient(&mut self, variable: &str, gradient: &ArrayD<f32>) -> Result<ArrayD<f32>> {
        self.updater.apply(variable, gradient, &self.conf)
    }

    pub fn updater(&self) -> &LayerUpdater {
        &self.updater
    }

    /// Drops all update-rule state and the recorded mini-batch size.
    pub fn reinitialize(&mut self) {
        self.updater.clear();
        self.input_mini_batch_size = None;
    }
}

impl Clone for LayerContext {
    /// A clone shares the configuration but starts with no update-rule state.
    fn clone(&self) -> Self {
        Self {
            conf: self.conf.clone(),
            input_mini_batch_size: self.input_mini_batch_size,
            updater: LayerUpdater::new(),
        }
    }
}

impl Layer for LayerContext {
    fn conf(&self) -> &LayerConfig {
        &self.conf
    }

    fn input_mini_batch_size(&self) -> Option<usize> {
        self.input_mini_batch_size
    }
}
