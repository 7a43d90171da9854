//! Shared utilities
//!
//! This module provides tensor helpers used by the updaters and preprocessors.

pub mod layout;

pub use layout::{ordering, to_c_order, Ordering};
