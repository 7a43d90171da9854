//! RMSProp updater implementation
//!
//! This module provides the RMSProp rule, which scales each gradient element by
//! the root of a decayed moving average of its past squared values.

use crate::error::Result;
use crate::optimizers::{check_shape, GradientUpdater};
use ndarray::{ArrayD, ArrayViewD, IxDyn, Zip};

/// RMSProp (root mean square propagation) updater.
///
/// Keeps a memory tensor `m` shaped like the gradient and produces the step:
///
/// ```text
/// m    ← ρ·m + (1 − ρ)·(g ⊙ g)
/// step ← η · g / (√m + ε)
/// ```
///
/// where:
/// - η is the learning rate
/// - ρ is the decay rate of the squared-gradient average
/// - ε is an additive floor protecting the division
///
/// The memory starts at zero with the shape of the first gradient.
///
/// # Example
///
/// ```
/// use ndarray::{ArrayD, IxDyn};
/// use rust_layer_training::optimizers::{GradientUpdater, RmsProp};
///
/// let mut rmsprop = RmsProp::new(0.1, 0.9, 1e-8);
/// let gradient = ArrayD::from_elem(IxDyn(&[2]), 1.0f32);
///
/// let step = rmsprop.update(&gradient).unwrap();
/// // m = 0.1, step = 0.1 / sqrt(0.1)
/// assert!((step[[0]] - 0.1 / 0.1f32.sqrt()).abs() < 1e-5);
/// ```
#[derive(Debug, Clone)]
pub struct RmsProp {
    learning_rate: f32,
    decay: f32,
    epsilon: f32,
    /// Decayed average of squared gradients
    cache: Option<ArrayD<f32>>,
}

impl RmsProp {
    /// Creates an RMSProp updater with empty memory.
    ///
    /// # Arguments
    ///
    /// * `learning_rate` - Step size (η)
    /// * `decay` - Decay rate of the squared-gradient average (ρ, in `[0, 1)`)
    /// * `epsilon` - Additive floor for the denominator (ε, positive)
    pub fn new(learning_rate: f32, decay: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            decay,
            epsilon,
            cache: None,
        }
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// The squared-gradient average, if any gradient has been seen.
    pub fn cache(&self) -> Option<&ArrayD<f32>> {
        self.cache.as_ref()
    }
}

impl GradientUpdater for RmsProp {
    fn init_state(&mut self, shape: &[usize]) {
        if self.cache.is_none() {
            self.cache = Some(ArrayD::zeros(IxDyn(shape)));
        }
    }

    fn update(&mut self, gradient: &ArrayD<f32>) -> Result<ArrayD<f32>> {
        check_shape(self.cache.as_ref(), gradient)?;

        let (lr, rho, eps) = (self.learning_rate, self.decay, self.epsilon);
        let cache = self
            .cache
            .get_or_insert_with(|| ArrayD::zeros(gradient.raw_dim()));

        Zip::from(&mut *cache)
            .and(gradient)
            .for_each(|m, &g| *m = rho * *m + (1.0 - rho) * g * g);

        Ok(Zip::from(gradient)
            .and(&*cache)
            .map_collect(|&g, &m| lr * g / (m.sqrt() + eps)))
    }

    fn state(&self) -> Vec<ArrayViewD<'_, f32>> {
        self.cache.iter().map(|c| c.view()).collect()
    }

    fn reset(&mut self) {
        self.cache = None;
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use approx::assert_relative_eq;
    use ndarray::arr1;

    fn constant(shape: &[usize], value: f32) -> ArrayD<f32> {
        ArrayD::from_elem(IxDyn(shape), value)
    }

    #[test]
    fn test_rmsprop_new() {
        let rmsprop = RmsProp::new(0.1, 0.9, 1e-8);
        assert_eq!(rmsprop.learning_rate(), 0.1);
        assert_eq!(rmsprop.decay(), 0.9);
        assert_eq!(rmsprop.epsilon(), 1e-8);
        assert!(rmsprop.cache().is_none());
    }

    #[test]
    fn test_rmsprop_constant_gradient_sequence() {
        let mut rmsprop = RmsProp::new(0.1, 0.9, 1e-8);
        let gradient = constant(&[1], 1.0);

        for expected in [0.1f32, 0.19, 0.271] {
            let step = rmsprop.update(&gradient).unwrap();
            let m = rmsprop.cache().unwrap()[[0]];
            assert_relative_eq!(m, expected, epsilon = 1e-6);
            assert_relative_eq!(step[[0]], 0.1 / (expected.sqrt() + 1e-8), epsilon = 1e-5);
        }
    }

    #[test]
    fn test_rmsprop_elementwise() {
        let mut rmsprop = RmsProp::new(0.01, 0.5, 1e-8);
        let gradient = arr1(&[2.0f32, -4.0, 0.0]).into_dyn();

        let step = rmsprop.update(&gradient).unwrap();
        let cache = rmsprop.cache().unwrap();

        assert_relative_eq!(cache[[0]], 2.0, epsilon = 1e-6);
        assert_relative_eq!(cache[[1]], 8.0, epsilon = 1e-6);
        assert_eq!(cache[[2]], 0.0);

        // Sign follows the gradient; a zero gradient yields a zero step
        assert!(step[[0]] > 0.0);
        assert!(step[[1]] < 0.0);
        assert_eq!(step[[2]], 0.0);
    }

    #[test]
    fn test_rmsprop_init_state_is_zero() {
        let mut rmsprop = RmsProp::new(0.1, 0.9, 1e-8);
        rmsprop.init_state(&[2, 2]);

        let cache = rmsprop.cache().unwrap();
        assert_eq!(cache.shape(), &[2, 2]);
        assert!(cache.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_rmsprop_shape_mismatch_leaves_state_untouched() {
        let mut rmsprop = RmsProp::new(0.1, 0.9, 1e-8);
        rmsprop.update(&constant(&[2, 3], 1.0)).unwrap();
        let before = rmsprop.cache().unwrap().clone();

        let result = rmsprop.update(&constant(&[3, 2], 1.0));
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
        assert_eq!(rmsprop.cache().unwrap(), &before);
    }

    #[test]
    fn test_rmsprop_reset() {
        let mut rmsprop = RmsProp::new(0.1, 0.9, 1e-8);
        let gradient = constant(&[4], 0.5);
        let first = rmsprop.update(&gradient).unwrap();
        rmsprop.update(&gradient).unwrap();

        rmsprop.reset();
        assert!(rmsprop.cache().is_none());
        assert!(rmsprop.state().is_empty());

        // After a reset the rule behaves like a fresh instance
        let again = rmsprop.update(&gradient).unwrap();
        assert_eq!(again, first);
    }

    #[test]
    fn test_rmsprop_reset_accepts_new_shape() {
        let mut rmsprop = RmsProp::new(0.1, 0.9, 1e-8);
        rmsprop.update(&constant(&[4], 0.5)).unwrap();
        rmsprop.reset();
        assert!(rmsprop.update(&constant(&[2, 2], 0.5)).is_ok());
    }

    #[test]
    fn test_rmsprop_nan_propagates() {
        let mut rmsprop = RmsProp::new(0.1, 0.9, 1e-8);
        let step = rmsprop.update(&constant(&[1], f32::NAN)).unwrap();
        assert!(step[[0]].is_nan());
    }
}
