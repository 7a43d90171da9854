//! Convolutional-to-recurrent preprocessor

use crate::error::Result;
use crate::layers::Layer;
use crate::preprocessors::rnn_to_cnn::{sequence_to_spatial, spatial_to_sequence};
use crate::preprocessors::{recorded_mini_batch_size, InputPreProcessor, SpatialDims};
use ndarray::ArrayD;

/// Preprocessor placed in front of a recurrent layer that follows a
/// convolutional layer. Mirror image of
/// [`RnnToCnnPreProcessor`](crate::preprocessors::RnnToCnnPreProcessor):
///
/// - Forward: `[miniBatchSize*timeSeriesLength, numChannels, inputHeight,
///   inputWidth]` → `[miniBatchSize, numChannels*inputHeight*inputWidth,
///   timeSeriesLength]`, using the mini-batch size recorded on the layer.
/// - Backward: the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CnnToRnnPreProcessor {
    dims: SpatialDims,
}

impl CnnToRnnPreProcessor {
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`](crate::error::Error::InvalidConfiguration)
    /// if any dimension is zero.
    pub fn new(input_height: usize, input_width: usize, num_channels: usize) -> Result<Self> {
        Ok(Self {
            dims: SpatialDims::new(input_height, input_width, num_channels)?,
        })
    }

    pub fn dims(&self) -> SpatialDims {
        self.dims
    }
}

impl InputPreProcessor for CnnToRnnPreProcessor {
    fn pre_process(&self, input: &ArrayD<f32>, layer: &dyn Layer) -> Result<ArrayD<f32>> {
        spatial_to_sequence(input, self.dims, recorded_mini_batch_size(layer)?)
    }

    fn backprop(&self, output: &ArrayD<f32>, _layer: &dyn Layer) -> Result<ArrayD<f32>> {
        sequence_to_spatial(output, self.dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayerConfig;
    use crate::error::Error;
    use crate::layers::LayerContext;
    use ndarray::IxDyn;

    #[test]
    fn test_forward_and_backward_shapes() {
        let pp = CnnToRnnPreProcessor::new(4, 4, 3).unwrap();
        let mut layer = LayerContext::new(LayerConfig::default());
        layer.set_input_mini_batch_size(2);

        let activations = ArrayD::<f32>::ones(IxDyn(&[10, 3, 4, 4]));
        let rnn_input = pp.pre_process(&activations, &layer).unwrap();
        assert_eq!(rnn_input.shape(), &[2, 48, 5]);

        let epsilons = pp.backprop(&rnn_input, &layer).unwrap();
        assert_eq!(epsilons.shape(), &[10, 3, 4, 4]);
    }

    #[test]
    fn test_forward_requires_recorded_mini_batch() {
        let pp = CnnToRnnPreProcessor::new(4, 4, 3).unwrap();
        let layer = LayerContext::new(LayerConfig::default());
        let activations = ArrayD::<f32>::ones(IxDyn(&[10, 3, 4, 4]));

        assert!(matches!(
            pp.pre_process(&activations, &layer),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_new_rejects_zero_channels() {
        assert!(CnnToRnnPreProcessor::new(4, 4, 0).is_err());
    }
}
