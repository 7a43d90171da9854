//! Layer abstractions
//!
//! This module provides the [`Layer`] trait consumed by updaters and
//! preprocessors, and [`LayerContext`], a concrete holder of one layer's
//! configuration, recorded mini-batch size and updater state.

mod r#trait;
pub mod context;

// Re-export the Layer trait for convenience
pub use context::LayerContext;
pub use r#trait::Layer;
