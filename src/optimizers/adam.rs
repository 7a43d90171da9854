//! Adam (Adaptive Moment Estimation) updater implementation
//!
//! This module provides the Adam rule, which combines momentum and adaptive
//! learning rates with bias correction.

use crate::error::Result;
use crate::optimizers::{check_shape, GradientUpdater};
use ndarray::{ArrayD, ArrayViewD, IxDyn, Zip};

/// Adam (Adaptive Moment Estimation) updater.
///
/// Maintains two moving averages shaped like the gradient:
///
/// ```text
/// m_t  = β1 * m_{t-1} + (1 - β1) * gradient
/// v_t  = β2 * v_{t-1} + (1 - β2) * gradient²
/// step = α * (m_t / (1 - β1^t)) / (√(v_t / (1 - β2^t)) + ε)
/// ```
///
/// # Reference
///
/// Kingma, D. P., & Ba, J. (2014). Adam: A method for stochastic optimization.
/// arXiv preprint arXiv:1412.6980.
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    /// First moment estimates (momentum)
    m: Option<ArrayD<f32>>,
    /// Second moment estimates (adaptive learning rate)
    v: Option<ArrayD<f32>>,
    /// Time step counter for bias correction
    t: i32,
}

impl Adam {
    /// Creates a new Adam updater with the specified hyperparameters.
    ///
    /// # Typical Values
    ///
    /// The original Adam paper recommends `0.001, 0.9, 0.999, 1e-8`.
    pub fn new(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            m: None,
            v: None,
            t: 0,
        }
    }

    /// Number of updates applied since creation or the last reset.
    pub fn iteration(&self) -> i32 {
        self.t
    }
}

impl GradientUpdater for Adam {
    fn init_state(&mut self, shape: &[usize]) {
        if self.m.is_none() {
            self.m = Some(ArrayD::zeros(IxDyn(shape)));
            self.v = Some(ArrayD::zeros(IxDyn(shape)));
        }
    }

    fn update(&mut self, gradient: &ArrayD<f32>) -> Result<ArrayD<f32>> {
        check_shape(self.m.as_ref(), gradient)?;

        let (beta1, beta2, eps, lr) = (self.beta1, self.beta2, self.epsilon, self.learning_rate);
        let m = self.m.get_or_insert_with(|| ArrayD::zeros(gradient.raw_dim()));
        let v = self.v.get_or_insert_with(|| ArrayD::zeros(gradient.raw_dim()));

        self.t += 1;
        let bias_correction1 = 1.0 - beta1.powi(self.t);
        let bias_correction2 = 1.0 - beta2.powi(self.t);

        Zip::from(&mut *m)
            .and(&mut *v)
            .and(gradient)
            .for_each(|m, v, &g| {
                *m = beta1 * *m + (1.0 - beta1) * g;
                *v = beta2 * *v + (1.0 - beta2) * g * g;
            });

        Ok(Zip::from(&*m).and(&*v).map_collect(|&m, &v| {
            let m_hat = m / bias_correction1;
            let v_hat = v / bias_correction2;
            lr * m_hat / (v_hat.sqrt() + eps)
        }))
    }

    fn state(&self) -> Vec<ArrayViewD<'_, f32>> {
        self.m.iter().chain(self.v.iter()).map(|s| s.view()).collect()
    }

    fn reset(&mut self) {
        self.m = None;
        self.v = None;
        self.t = 0;
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}
