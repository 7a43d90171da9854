//! Stochastic Gradient Descent (SGD) updater implementation
//!
//! This module provides a vanilla SGD rule whose step is the gradient scaled by
//! the learning rate: `step = learning_rate * gradient`

use crate::error::Result;
use crate::optimizers::GradientUpdater;
use ndarray::{ArrayD, ArrayViewD};

/// Stochastic Gradient Descent updater.
///
/// Implements the basic gradient descent rule without momentum or adaptive
/// learning rates:
///
/// `step = η * ∇L/∂w`
///
/// SGD keeps no memory, so one instance could serve any parameter. It still
/// lives behind the same per-variable interface as the adaptive rules.
///
/// # Example
///
/// ```
/// use ndarray::arr1;
/// use rust_layer_training::optimizers::{GradientUpdater, Sgd};
///
/// let mut sgd = Sgd::new(0.1);
/// let step = sgd.update(&arr1(&[1.0f32, -2.0]).into_dyn()).unwrap();
/// assert!((step[[0]] - 0.1).abs() < 1e-6);
/// assert!((step[[1]] + 0.2).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct Sgd {
    learning_rate: f32,
}

impl Sgd {
    /// Creates a new SGD updater with the specified learning rate.
    ///
    /// # Typical Values
    ///
    /// Common learning rates range from 0.001 to 0.1, depending on the problem.
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl GradientUpdater for Sgd {
    fn init_state(&mut self, _shape: &[usize]) {}

    fn update(&mut self, gradient: &ArrayD<f32>) -> Result<ArrayD<f32>> {
        let lr = self.learning_rate;
        Ok(gradient.mapv(|g| lr * g))
    }

    fn state(&self) -> Vec<ArrayViewD<'_, f32>> {
        Vec::new()
    }

    fn reset(&mut self) {
        // Vanilla SGD has no state to reset
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}
