//! Per-layer table of gradient updaters
//!
//! A [`LayerUpdater`] belongs to exactly one layer. It creates an updater for a
//! parameter variable the first time that variable's gradient arrives and keeps
//! using the same instance, and therefore the same accumulated memory, for the
//! lifetime of the layer.

use crate::config::{GradientNormalization, LayerConfig};
use crate::error::Result;
use crate::optimizers::normalization::normalize;
use crate::optimizers::{build_updater, GradientUpdater};
use ndarray::ArrayD;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

/// An update rule together with the gradient normalization captured alongside it.
#[derive(Debug)]
struct VariableUpdater {
    rule: Box<dyn GradientUpdater>,
    normalization: GradientNormalization,
    threshold: f32,
}

/// Maps parameter variable names ("W", "b", ...) to their update rules.
///
/// Holds at most one rule per variable. A rule's hyperparameters, including
/// the gradient normalization mode and threshold, come from the layer
/// configuration passed on the call that created it; later calls with a
/// modified configuration keep using the captured values until [`clear`] is
/// called.
///
/// Not shared across threads: each replica of a layer owns its own instance.
///
/// [`clear`]: LayerUpdater::clear
#[derive(Debug, Default)]
pub struct LayerUpdater {
    updater_for_variable: HashMap<String, VariableUpdater>,
}

impl LayerUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rule cached for `variable`, creating it from `conf` and the
    /// gradient's shape if none exists yet.
    ///
    /// Repeated calls for the same variable return the same rule; its memory is
    /// never reset here.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`](crate::error::Error::InvalidConfiguration)
    /// if a rule has to be created and `conf` is invalid. Nothing is cached in
    /// that case.
    pub fn get_or_create(
        &mut self,
        variable: &str,
        gradient: &ArrayD<f32>,
        conf: &LayerConfig,
    ) -> Result<&mut dyn GradientUpdater> {
        let entry = self.entry(variable, gradient, conf)?;
        Ok(entry.rule.as_mut())
    }

    fn entry(
        &mut self,
        variable: &str,
        gradient: &ArrayD<f32>,
        conf: &LayerConfig,
    ) -> Result<&mut VariableUpdater> {
        Ok(match self.updater_for_variable.entry(variable.to_owned()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let mut rule = build_updater(conf)?;
                rule.init_state(gradient.shape());
                debug!(
                    layer = conf.name.as_deref().unwrap_or("<unnamed>"),
                    variable,
                    updater = ?conf.updater,
                    learning_rate = conf.learning_rate,
                    normalization = ?conf.gradient_normalization,
                    shape = ?gradient.shape(),
                    "created gradient updater"
                );
                entry.insert(VariableUpdater {
                    rule,
                    normalization: conf.gradient_normalization,
                    threshold: conf.gradient_normalization_threshold,
                })
            }
        })
    }

    /// Turns a raw gradient into the step to apply for `variable`.
    ///
    /// The gradient is first normalized with the mode and threshold captured
    /// when the variable's rule was created, then passed to that rule, whose
    /// memory is updated as a side effect.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfiguration`](crate::error::Error::InvalidConfiguration)
    ///   if a rule has to be created and `conf` is invalid.
    /// - [`Error::ShapeMismatch`](crate::error::Error::ShapeMismatch) if the
    ///   gradient's shape differs from the one the rule was created with. The
    ///   rule's memory is left unchanged.
    pub fn apply(
        &mut self,
        variable: &str,
        gradient: &ArrayD<f32>,
        conf: &LayerConfig,
    ) -> Result<ArrayD<f32>> {
        let entry = self.entry(variable, gradient, conf)?;
        let normalized = normalize(gradient, entry.normalization, entry.threshold)?;
        entry.rule.update(normalized.as_ref().unwrap_or(gradient))
    }

    /// Drops every cached rule. The next [`apply`](LayerUpdater::apply) for any
    /// variable starts from fresh memory.
    pub fn clear(&mut self) {
        if !self.updater_for_variable.is_empty() {
            debug!(
                count = self.updater_for_variable.len(),
                "clearing gradient updaters"
            );
        }
        self.updater_for_variable.clear();
    }

    /// The rule cached for `variable`, if any.
    pub fn get(&self, variable: &str) -> Option<&dyn GradientUpdater> {
        self.updater_for_variable
            .get(variable)
            .map(|entry| entry.rule.as_ref())
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.updater_for_variable.contains_key(variable)
    }

    /// Number of variables with a cached rule.
    pub fn len(&self) -> usize {
        self.updater_for_variable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updater_for_variable.is_empty()
    }
}
