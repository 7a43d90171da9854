//! Rust Layer Training Library
//!
//! This library provides the stateful pieces a layered network needs between
//! its forward/backward passes: per-variable gradient updaters and the input
//! preprocessors that reshape tensors between recurrent and convolutional layers.
//!
//! # Modules
//!
//! - `optimizers`: GradientUpdater trait, update rules (RMSProp, Adam, SGD) and the per-layer LayerUpdater
//! - `preprocessors`: InputPreProcessor trait and the RNN/CNN layout preprocessors
//! - `layers`: Layer trait and LayerContext
//! - `config`: Layer configuration structures
//! - `architecture`: Network configuration and preprocessor placement
//! - `utils`: Tensor memory-ordering helpers
//! - `error`: Crate error type

pub mod architecture;
pub mod config;
pub mod error;
pub mod layers;
pub mod optimizers;
pub mod preprocessors;
pub mod utils;

pub use error::{Error, Result};
