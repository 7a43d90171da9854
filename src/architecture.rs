//! Network configuration structures
//!
//! This module provides the network-level configuration: an ordered list of layer
//! configurations plus the input preprocessors placed in front of individual
//! layers, loaded from JSON files.

use crate::config::LayerConfig;
use crate::error::{Error, Result};
use crate::preprocessors::{CnnToRnnPreProcessor, InputPreProcessor, RnnToCnnPreProcessor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use tracing::debug;

/// Configuration of an input preprocessor.
///
/// # Example
///
/// ```json
/// {
///   "type": "rnn_to_cnn",
///   "input_height": 28,
///   "input_width": 28,
///   "num_channels": 1
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PreProcessorConfig {
    RnnToCnn {
        input_height: usize,
        input_width: usize,
        num_channels: usize,
    },
    CnnToRnn {
        input_height: usize,
        input_width: usize,
        num_channels: usize,
    },
}

impl PreProcessorConfig {
    /// Builds the preprocessor described by this configuration.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] if any dimension is zero.
    pub fn build(&self) -> Result<Box<dyn InputPreProcessor>> {
        Ok(match *self {
            PreProcessorConfig::RnnToCnn {
                input_height,
                input_width,
                num_channels,
            } => Box::new(RnnToCnnPreProcessor::new(
                input_height,
                input_width,
                num_channels,
            )?),
            PreProcessorConfig::CnnToRnn {
                input_height,
                input_width,
                num_channels,
            } => Box::new(CnnToRnnPreProcessor::new(
                input_height,
                input_width,
                num_channels,
            )?),
        })
    }
}

/// Configuration for an entire network.
///
/// Layers are applied in order. `input_pre_processors` maps a layer index to
/// the preprocessor that reshapes that layer's input.
///
/// # Example
///
/// ```json
/// {
///   "layers": [
///     { "name": "lstm", "updater": "rms_prop", "learning_rate": 0.01 },
///     { "name": "conv", "updater": "rms_prop", "learning_rate": 0.01 }
///   ],
///   "input_pre_processors": {
///     "1": { "type": "rnn_to_cnn", "input_height": 3, "input_width": 3, "num_channels": 2 }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Sequence of layer configurations defining the network structure
    pub layers: Vec<LayerConfig>,

    #[serde(default)]
    pub input_pre_processors: BTreeMap<usize, PreProcessorConfig>,
}

impl NetworkConfig {
    /// Builds the preprocessor configured for layer `index`, if any.
    pub fn pre_processor(&self, index: usize) -> Result<Option<Box<dyn InputPreProcessor>>> {
        self.input_pre_processors
            .get(&index)
            .map(PreProcessorConfig::build)
            .transpose()
    }

    /// Checks that:
    /// - the network has at least one layer
    /// - every layer configuration is valid
    /// - every preprocessor addresses an existing layer and can be built
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] naming the offending layer.
    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(Error::invalid("Network must have at least one layer"));
        }

        for (i, layer) in self.layers.iter().enumerate() {
            layer
                .validate()
                .map_err(|e| Error::invalid(format!("Layer {}: {}", i, e)))?;
        }

        for (&index, pre_processor) in &self.input_pre_processors {
            if index >= self.layers.len() {
                return Err(Error::invalid(format!(
                    "Preprocessor for layer {} but network has {} layers",
                    index,
                    self.layers.len()
                )));
            }
            pre_processor
                .build()
                .map_err(|e| Error::invalid(format!("Preprocessor for layer {}: {}", index, e)))?;
        }

        Ok(())
    }
}

/// Loads a network configuration from a JSON file.
///
/// Reads the file at `path`, deserializes its JSON contents into a
/// [`NetworkConfig`] and validates it.
///
/// # Examples
///
/// ```no_run
/// use rust_layer_training::architecture::load_network_config;
///
/// let net = load_network_config("config/rnn_cnn_network.json").unwrap();
/// assert!(!net.layers.is_empty());
/// ```
pub fn load_network_config(path: &str) -> Result<NetworkConfig> {
    let contents = fs::read_to_string(path)?;
    let config: NetworkConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    debug!(
        path,
        layers = config.layers.len(),
        pre_processors = config.input_pre_processors.len(),
        "loaded network configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Updater;

    fn two_layer_network() -> NetworkConfig {
        let mut input_pre_processors = BTreeMap::new();
        input_pre_processors.insert(
            1,
            PreProcessorConfig::RnnToCnn {
                input_height: 3,
                input_width: 3,
                num_channels: 2,
            },
        );
        NetworkConfig {
            layers: vec![
                LayerConfig::with_updater(Updater::RmsProp),
                LayerConfig::with_updater(Updater::RmsProp),
            ],
            input_pre_processors,
        }
    }

    #[test]
    fn test_validate_accepts_valid_network() {
        assert!(two_layer_network().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_network() {
        let config = NetworkConfig {
            layers: Vec::new(),
            input_pre_processors: BTreeMap::new(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_pre_processor() {
        let mut config = two_layer_network();
        config.input_pre_processors.insert(
            5,
            PreProcessorConfig::CnnToRnn {
                input_height: 1,
                input_width: 1,
                num_channels: 1,
            },
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("layer 5"));
    }

    #[test]
    fn test_validate_rejects_zero_dimension() {
        let mut config = two_layer_network();
        config.input_pre_processors.insert(
            1,
            PreProcessorConfig::RnnToCnn {
                input_height: 0,
                input_width: 3,
                num_channels: 2,
            },
        );
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_validate_reports_layer_index() {
        let mut config = two_layer_network();
        config.layers[1].learning_rate = -0.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Layer 1"));
    }

    #[test]
    fn test_pre_processor_lookup() {
        let config = two_layer_network();
        assert!(config.pre_processor(0).unwrap().is_none());
        assert!(config.pre_processor(1).unwrap().is_some());
    }

    #[test]
    fn test_parse_json_with_string_keys() {
        let json = r#"{
  "layers": [ {}, { "updater": "adam" } ],
  "input_pre_processors": {
    "1": { "type": "cnn_to_rnn", "input_height": 2, "input_width": 2, "num_channels": 4 }
  }
}"#;
        let config: NetworkConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.layers[1].updater, Updater::Adam);
        assert_eq!(
            config.input_pre_processors[&1],
            PreProcessorConfig::CnnToRnn {
                input_height: 2,
                input_width: 2,
                num_channels: 4
            }
        );
    }
}
