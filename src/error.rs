//! Error types shared by the updaters, preprocessors and configuration loaders.

use thiserror::Error;

/// Errors raised while configuring layers, updating gradients or reshaping
/// activations between layers.
///
/// Every variant describes a local failure of the single operation that was
/// attempted. Nothing is retried internally; the training loop decides whether
/// to abort the run or skip the step.
#[derive(Debug, Error)]
pub enum Error {
    /// A tensor does not have the shape an operation requires, e.g. a gradient
    /// handed to an updater whose state was sized for another parameter.
    #[error("shape mismatch: expected {expected}, got {actual:?}")]
    ShapeMismatch { expected: String, actual: Vec<usize> },

    /// A configuration value is missing or outside its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The array library rejected a reshape.
    #[error("reshape failed: {0}")]
    Reshape(#[from] ndarray::ShapeError),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn shape_mismatch(expected: impl Into<String>, actual: &[usize]) -> Self {
        Error::ShapeMismatch {
            expected: expected.into(),
            actual: actual.to_vec(),
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration(message.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
