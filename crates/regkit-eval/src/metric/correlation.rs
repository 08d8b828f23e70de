//! Pearson intensity correlation.

use ndarray::{ArrayView, ArrayView3, Dimension, Zip};

use super::trait_::VolumeMetric;
use crate::error::{MetricError, Result};

/// Pearson correlation coefficient over the flattened volumes.
///
/// r = sum((a - mean(a)) * (b - mean(b))) / sqrt(sum((a - mean(a))^2) * sum((b - mean(b))^2))
///
/// An input with zero variance is `ConstantInput`; NaN or infinite voxels
/// are `NonFinite`.
pub fn pearson_correlation<D: Dimension>(a: &ArrayView<'_, f32, D>, b: &ArrayView<'_, f32, D>) -> Result<f64> {
    if a.shape() != b.shape() {
        return Err(MetricError::shape_mismatch(a.shape(), b.shape()));
    }
    let n = a.len();
    if n == 0 {
        return Err(MetricError::ConstantInput("first"));
    }

    if !a.iter().all(|v| v.is_finite()) {
        return Err(MetricError::NonFinite("first input"));
    }
    if !b.iter().all(|v| v.is_finite()) {
        return Err(MetricError::NonFinite("second input"));
    }

    let mean_a = a.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
    let mean_b = b.iter().map(|&v| v as f64).sum::<f64>() / n as f64;

    let (mut cov, mut var_a, mut var_b) = (0.0f64, 0.0f64, 0.0f64);
    Zip::from(a).and(b).for_each(|&x, &y| {
        let dx = x as f64 - mean_a;
        let dy = y as f64 - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    });

    if var_a == 0.0 {
        return Err(MetricError::ConstantInput("first"));
    }
    if var_b == 0.0 {
        return Err(MetricError::ConstantInput("second"));
    }
    let r = cov / (var_a * var_b).sqrt();
    if !r.is_finite() {
        return Err(MetricError::NonFinite("correlation"));
    }
    Ok(r.clamp(-1.0, 1.0))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IntensityCorrelation;

impl VolumeMetric for IntensityCorrelation {
    fn compute(&self, fixed: &ArrayView3<'_, f32>, warped: &ArrayView3<'_, f32>) -> Result<f64> {
        pearson_correlation(fixed, warped)
    }

    fn name(&self) -> &'static str {
        "IntensityCorrelation"
    }
}
