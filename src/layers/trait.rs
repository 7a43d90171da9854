//! Layer trait definition
//!
//! This module defines the narrow view of a layer that updaters and input
//! preprocessors need: its configuration and the mini-batch size it last saw.

use crate::config::LayerConfig;

/// Core trait for network layers, as seen by updaters and preprocessors.
///
/// A layer's forward and backward mathematics live elsewhere. Preprocessors
/// only need the size of the mini-batch recorded on the layer's last forward
/// pass, and updaters only need the hyperparameters in its configuration.
///
/// # Example
///
/// ```ignore
/// // Inverse reshape of an error signal at a layer boundary
/// let epsilons = pre_processor.backprop(&cnn_epsilons, &layer)?;
/// ```
pub trait Layer {
    /// The layer's configuration.
    fn conf(&self) -> &LayerConfig;

    /// Number of examples in the mini-batch the layer last received as input.
    ///
    /// Returns `None` before any input has been recorded.
    fn input_mini_batch_size(&self) -> Option<usize>;
}
