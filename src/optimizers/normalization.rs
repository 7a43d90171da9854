//! Gradient normalization and clipping
//!
//! Applied to each parameter variable's raw gradient before it reaches the
//! update rule.

use crate::config::GradientNormalization;
use crate::error::{Error, Result};
use ndarray::ArrayD;

fn l2_norm(gradient: &ArrayD<f32>) -> f32 {
    gradient.iter().map(|g| g * g).sum::<f32>().sqrt()
}

/// Applies `mode` to `gradient`.
///
/// Returns `Ok(None)` when the gradient passes through unchanged: for
/// [`GradientNormalization::None`], for an all-zero gradient under L2
/// renormalization, and when the L2 norm is already within `threshold`.
///
/// # Errors
///
/// [`Error::InvalidConfiguration`] if a clipping mode is given a threshold that
/// is not positive (including NaN).
pub fn normalize(
    gradient: &ArrayD<f32>,
    mode: GradientNormalization,
    threshold: f32,
) -> Result<Option<ArrayD<f32>>> {
    let clips = matches!(
        mode,
        GradientNormalization::ClipElementWiseAbsoluteValue
            | GradientNormalization::ClipL2PerParamType
    );
    if clips && !(threshold > 0.0) {
        return Err(Error::invalid(format!(
            "gradient_normalization_threshold must be positive, got {}",
            threshold
        )));
    }

    Ok(match mode {
        GradientNormalization::None => None,
        GradientNormalization::RenormalizeL2PerParamType => {
            let norm = l2_norm(gradient);
            (norm > 0.0).then(|| gradient.mapv(|g| g / norm))
        }
        GradientNormalization::ClipElementWiseAbsoluteValue => {
            Some(gradient.mapv(|g| g.clamp(-threshold, threshold)))
        }
        GradientNormalization::ClipL2PerParamType => {
            let norm = l2_norm(gradient);
            (norm > threshold).then(|| gradient.mapv(|g| g * threshold / norm))
        }
    })
}
