//! Layer configuration
//!
//! This module provides the flat configuration record shared by every layer kind:
//! learning rate, updater selection and its hyperparameters, regularization and
//! gradient normalization settings.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::debug;

/// Activation names accepted in a layer configuration.
pub const VALID_ACTIVATIONS: [&str; 8] = [
    "identity",
    "relu",
    "leaky_relu",
    "elu",
    "gelu",
    "sigmoid",
    "softmax",
    "tanh",
];

/// Gradient update rule used for every parameter variable of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Updater {
    /// Plain gradient descent: `step = learning_rate * gradient`
    #[default]
    Sgd,
    /// Adaptive moment estimation with bias correction
    Adam,
    /// Decayed moving average of squared gradients
    #[serde(alias = "rmsprop")]
    RmsProp,
}

/// Normalization or clipping applied to each raw gradient before the updater sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientNormalization {
    #[default]
    None,
    /// Divide the gradient by its L2 norm
    RenormalizeL2PerParamType,
    /// Clamp each element to `[-threshold, threshold]`
    ClipElementWiseAbsoluteValue,
    /// Rescale the gradient so its L2 norm is at most `threshold`
    ClipL2PerParamType,
}

/// Configuration of a single layer.
///
/// Every field has a default, so a JSON document only needs to list the values
/// it overrides:
///
/// ```json
/// {
///   "name": "conv1",
///   "learning_rate": 0.01,
///   "updater": "rms_prop",
///   "rms_decay": 0.9
/// }
/// ```
///
/// Updater hyperparameters are read when a parameter variable is first updated.
/// Changing them afterwards does not affect updaters that already exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Optional layer name, used in log output
    pub name: Option<String>,

    /// Activation function name, one of [`VALID_ACTIVATIONS`]
    pub activation_function: Option<String>,

    /// Base step size (η)
    pub learning_rate: f32,

    /// L1 regularization coefficient
    pub l1: f32,

    /// L2 regularization coefficient
    pub l2: f32,

    /// Probability of dropping a unit during training
    pub drop_out: f32,

    pub updater: Updater,

    /// Decay rate (ρ) of the squared-gradient average used by RMSProp
    pub rms_decay: f32,

    /// Decay rate of Adam's first moment estimate
    pub adam_mean_decay: f32,

    /// Decay rate of Adam's second moment estimate
    pub adam_var_decay: f32,

    /// Additive floor (ε) protecting the adaptive updaters' division
    pub epsilon: f32,

    pub gradient_normalization: GradientNormalization,

    /// Threshold used by the clipping normalizations
    pub gradient_normalization_threshold: f32,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            name: None,
            activation_function: None,
            learning_rate: 1e-1,
            l1: 0.0,
            l2: 0.0,
            drop_out: 0.0,
            updater: Updater::Sgd,
            rms_decay: 0.95,
            adam_mean_decay: 0.9,
            adam_var_decay: 0.999,
            epsilon: 1e-8,
            gradient_normalization: GradientNormalization::None,
            gradient_normalization_threshold: 1.0,
        }
    }
}

fn check_decay(name: &str, value: f32) -> Result<()> {
    if !(0.0..1.0).contains(&value) {
        return Err(Error::invalid(format!(
            "{} must be in [0, 1), got {}",
            name, value
        )));
    }
    Ok(())
}

impl LayerConfig {
    /// Creates a configuration with default values and the given updater.
    pub fn with_updater(updater: Updater) -> Self {
        Self {
            updater,
            ..Self::default()
        }
    }

    /// Checks every hyperparameter against its valid range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(Error::invalid(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }

        check_decay("rms_decay", self.rms_decay)?;
        check_decay("adam_mean_decay", self.adam_mean_decay)?;
        check_decay("adam_var_decay", self.adam_var_decay)?;
        check_decay("drop_out", self.drop_out)?;

        if !(self.epsilon > 0.0) {
            return Err(Error::invalid(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }

        if self.l1 < 0.0 || self.l2 < 0.0 {
            return Err(Error::invalid("l1 and l2 must be non-negative"));
        }

        if self.gradient_normalization != GradientNormalization::None
            && !(self.gradient_normalization_threshold > 0.0)
        {
            return Err(Error::invalid(format!(
                "gradient_normalization_threshold must be positive, got {}",
                self.gradient_normalization_threshold
            )));
        }

        if let Some(ref activation) = self.activation_function {
            if !VALID_ACTIVATIONS.contains(&activation.as_str()) {
                return Err(Error::invalid(format!(
                    "Invalid activation function '{}'. Must be one of: {}",
                    activation,
                    VALID_ACTIVATIONS.join(", ")
                )));
            }
        }

        Ok(())
    }
}

/// Loads a layer configuration from a JSON file.
///
/// Reads the file at `path`, deserializes it into a [`LayerConfig`] and validates it.
///
/// # Examples
///
/// ```no_run
/// use rust_layer_training::config::{load_layer_config, Updater};
///
/// let cfg = load_layer_config("config/rnn_conv_layer.json").unwrap();
/// assert_eq!(cfg.updater, Updater::RmsProp);
/// ```
pub fn load_layer_config(path: &str) -> Result<LayerConfig> {
    let contents = fs::read_to_string(path)?;
    let config: LayerConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    debug!(path, updater = ?config.updater, "loaded layer configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = LayerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.updater, Updater::Sgd);
        assert_eq!(config.rms_decay, 0.95);
        assert_eq!(config.epsilon, 1e-8);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LayerConfig =
            serde_json::from_str(r#"{ "updater": "rms_prop", "rms_decay": 0.9 }"#).unwrap();
        assert_eq!(config.updater, Updater::RmsProp);
        assert_eq!(config.rms_decay, 0.9);
        assert_eq!(config.learning_rate, 0.1);
        assert_eq!(config.gradient_normalization, GradientNormalization::None);
    }

    #[test]
    fn test_rmsprop_alias() {
        let config: LayerConfig = serde_json::from_str(r#"{ "updater": "rmsprop" }"#).unwrap();
        assert_eq!(config.updater, Updater::RmsProp);
    }

    #[test]
    fn test_rejects_non_positive_learning_rate() {
        let config = LayerConfig {
            learning_rate: 0.0,
            ..LayerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_rejects_decay_of_one() {
        let config = LayerConfig {
            rms_decay: 1.0,
            ..LayerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_epsilon() {
        let config = LayerConfig {
            epsilon: 0.0,
            ..LayerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_activation() {
        let config = LayerConfig {
            activation_function: Some("swishy".to_string()),
            ..LayerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("swishy"));
    }

    #[test]
    fn test_threshold_only_checked_when_clipping() {
        let mut config = LayerConfig {
            gradient_normalization_threshold: 0.0,
            ..LayerConfig::default()
        };
        assert!(config.validate().is_ok());

        config.gradient_normalization = GradientNormalization::ClipL2PerParamType;
        assert!(config.validate().is_err());
    }
}
