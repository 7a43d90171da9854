//! Recurrent-to-convolutional preprocessor
//!
//! Lets a convolutional layer consume the output of a recurrent layer (or a
//! time series input such as video frames) by treating every time step of every
//! example as one image.

use crate::error::{Error, Result};
use crate::layers::Layer;
use crate::preprocessors::{recorded_mini_batch_size, InputPreProcessor, SpatialDims};
use crate::utils::to_c_order;
use ndarray::{ArrayD, Axis, CowArray, IxDyn, Order};

/// Reshapes 3d sequence activations `[miniBatchSize, channels*height*width,
/// timeSeriesLength]` into 4d activations `[miniBatchSize*timeSeriesLength,
/// channels, height, width]`.
///
/// Row `b * timeSeriesLength + t` of the result holds example `b` at time step `t`.
pub fn sequence_to_spatial(input: &ArrayD<f32>, dims: SpatialDims) -> Result<ArrayD<f32>> {
    let product = dims.product();
    let (mini_batch, features, time_steps) = match *input.shape() {
        [mini_batch, features, time_steps] if features == product => {
            (mini_batch, features, time_steps)
        }
        _ => {
            return Err(Error::shape_mismatch(
                format!("[miniBatchSize, {}, timeSeriesLength]", product),
                input.shape(),
            ))
        }
    };
    let rows = mini_batch * time_steps;

    let in2d: CowArray<'_, f32, IxDyn> = if mini_batch == 1 {
        // Single example: transpose the [features, timeSeriesLength] slice so each
        // time step becomes a row. The reshape below copies it into row-major order.
        input.index_axis(Axis(0), 0).reversed_axes().into()
    } else if time_steps == 1 {
        // Single time step: the [miniBatchSize, features] slice is already one row
        // per example; the reshape below borrows it when the input is row-major.
        input.index_axis(Axis(2), 0).into()
    } else {
        // Permute so rows are ordered by example, then time step
        let permuted = input.view().permuted_axes(vec![0, 2, 1]);
        permuted
            .to_shape((vec![rows, features], Order::RowMajor))?
            .into_owned()
            .into()
    };

    let shape = vec![rows, dims.channels(), dims.height(), dims.width()];
    Ok(in2d.to_shape((shape, Order::RowMajor))?.into_owned())
}

/// Reshapes 4d epsilons `[miniBatchSize*timeSeriesLength, channels, height,
/// width]` back into 3d epsilons `[miniBatchSize, channels*height*width,
/// timeSeriesLength]`. Inverse of [`sequence_to_spatial`].
///
/// Input in column-major or other non-standard memory order is first copied
/// into row-major order; the caller's tensor is never modified. The result is
/// a permuted layout and is not necessarily row-major itself.
pub fn spatial_to_sequence(
    epsilons: &ArrayD<f32>,
    dims: SpatialDims,
    mini_batch: usize,
) -> Result<ArrayD<f32>> {
    let product = dims.product();
    let epsilons = to_c_order(epsilons);

    let rows = match *epsilons.shape() {
        [rows, c, h, w] if c * h * w == product && mini_batch > 0 && rows % mini_batch == 0 => {
            rows
        }
        _ => {
            return Err(Error::shape_mismatch(
                format!(
                    "[k * {}, {}, {}, {}]",
                    mini_batch,
                    dims.channels(),
                    dims.height(),
                    dims.width()
                ),
                epsilons.shape(),
            ))
        }
    };

    let reshaped = epsilons.to_shape((
        vec![mini_batch, rows / mini_batch, product],
        Order::RowMajor,
    ))?;
    Ok(reshaped.permuted_axes(vec![0, 2, 1]).into_owned())
}

/// Preprocessor placed in front of a convolutional layer that follows a
/// recurrent layer.
///
/// - Forward: `[miniBatchSize, numChannels*inputHeight*inputWidth,
///   timeSeriesLength]` → `[miniBatchSize*timeSeriesLength, numChannels,
///   inputHeight, inputWidth]`
/// - Backward: the reverse, using the mini-batch size recorded on the layer.
///
/// # Example
///
/// ```
/// use ndarray::{ArrayD, IxDyn};
/// use rust_layer_training::config::LayerConfig;
/// use rust_layer_training::layers::LayerContext;
/// use rust_layer_training::preprocessors::{InputPreProcessor, RnnToCnnPreProcessor};
///
/// let pre_processor = RnnToCnnPreProcessor::new(3, 3, 2).unwrap();
/// let mut layer = LayerContext::new(LayerConfig::default());
/// layer.set_input_mini_batch_size(4);
///
/// let activations = ArrayD::<f32>::zeros(IxDyn(&[4, 18, 5]));
/// let cnn_input = pre_processor.pre_process(&activations, &layer).unwrap();
/// assert_eq!(cnn_input.shape(), &[20, 2, 3, 3]);
///
/// let epsilons = pre_processor.backprop(&cnn_input, &layer).unwrap();
/// assert_eq!(epsilons.shape(), &[4, 18, 5]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RnnToCnnPreProcessor {
    dims: SpatialDims,
}

impl RnnToCnnPreProcessor {
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] if any dimension is zero.
    pub fn new(input_height: usize, input_width: usize, num_channels: usize) -> Result<Self> {
        Ok(Self {
            dims: SpatialDims::new(input_height, input_width, num_channels)?,
        })
    }

    pub fn dims(&self) -> SpatialDims {
        self.dims
    }
}

impl InputPreProcessor for RnnToCnnPreProcessor {
    fn pre_process(&self, input: &ArrayD<f32>, _layer: &dyn Layer) -> Result<ArrayD<f32>> {
        sequence_to_spatial(input, self.dims)
    }

    fn backprop(&self, output: &ArrayD<f32>, layer: &dyn Layer) -> Result<ArrayD<f32>> {
        spatial_to_sequence(output, self.dims, recorded_mini_batch_size(layer)?)
    }
}
