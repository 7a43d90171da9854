//! Input preprocessors between layers of different dimensionality
//!
//! Recurrent layers exchange 3d tensors `[miniBatchSize, features,
//! timeSeriesLength]`, convolutional layers exchange 4d tensors `[examples,
//! channels, height, width]`. A preprocessor sits on the boundary between two
//! such layers: [`pre_process`](InputPreProcessor::pre_process) reshapes
//! activations on the forward pass and [`backprop`](InputPreProcessor::backprop)
//! reshapes the error signal flowing back the other way.
//!
//! Both directions preserve the element count and undo each other exactly,
//! shapes and values alike.

pub mod cnn_to_rnn;
pub mod rnn_to_cnn;

pub use cnn_to_rnn::CnnToRnnPreProcessor;
pub use rnn_to_cnn::RnnToCnnPreProcessor;

use crate::error::{Error, Result};
use crate::layers::Layer;
use ndarray::ArrayD;
use std::fmt;

/// Reshapes tensors at the input of a layer.
pub trait InputPreProcessor: fmt::Debug + Send + Sync {
    /// Transforms activations arriving at `layer` into the layout it expects.
    fn pre_process(&self, input: &ArrayD<f32>, layer: &dyn Layer) -> Result<ArrayD<f32>>;

    /// Transforms the error signal leaving `layer` back into the layout of the
    /// layer below.
    fn backprop(&self, output: &ArrayD<f32>, layer: &dyn Layer) -> Result<ArrayD<f32>>;
}

/// Spatial dimensions of a convolutional layer's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialDims {
    height: usize,
    width: usize,
    channels: usize,
}

impl SpatialDims {
    /// Validates and stores the spatial dimensions.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] if any dimension is zero or their product
    /// overflows.
    pub fn new(height: usize, width: usize, channels: usize) -> Result<Self> {
        for (name, value) in [("height", height), ("width", width), ("channels", channels)] {
            if value == 0 {
                return Err(Error::invalid(format!("{} must be positive", name)));
            }
        }
        height
            .checked_mul(width)
            .and_then(|hw| hw.checked_mul(channels))
            .ok_or_else(|| Error::invalid("height * width * channels overflows"))?;

        Ok(Self {
            height,
            width,
            channels,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Flattened feature count `channels * height * width`.
    pub fn product(&self) -> usize {
        self.channels * self.height * self.width
    }
}

/// Mini-batch size recorded on `layer`, required for reshaping 4d tensors back
/// into 3d ones.
pub(crate) fn recorded_mini_batch_size(layer: &dyn Layer) -> Result<usize> {
    match layer.input_mini_batch_size() {
        Some(0) => Err(Error::invalid("recorded input mini-batch size is zero")),
        Some(size) => Ok(size),
        None => Err(Error::invalid(
            "layer has no recorded input mini-batch size",
        )),
    }
}
