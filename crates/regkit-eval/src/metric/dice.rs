//! Dice similarity coefficient of two binarized volumes.

use ndarray::{ArrayView, ArrayView3, Dimension, Zip};

use super::trait_::VolumeMetric;
use crate::error::{MetricError, Result};

/// Overlap of the `> 0` masks: `2|A ∩ B| / (|A| + |B|)`.
///
/// Two empty masks give `0.0`.
pub fn dice<D: Dimension>(a: &ArrayView<'_, f32, D>, b: &ArrayView<'_, f32, D>) -> Result<f64> {
    if a.shape() != b.shape() {
        return Err(MetricError::shape_mismatch(a.shape(), b.shape()));
    }

    let mut intersection = 0usize;
    let mut total = 0usize;
    Zip::from(a).and(b).for_each(|&x, &y| {
        let (x, y) = (x > 0.0, y > 0.0);
        intersection += usize::from(x && y);
        total += usize::from(x) + usize::from(y);
    });

    if total == 0 {
        return Ok(0.0);
    }
    Ok(2.0 * intersection as f64 / total as f64)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DiceCoefficient;

impl VolumeMetric for DiceCoefficient {
    fn compute(&self, fixed: &ArrayView3<'_, f32>, warped: &ArrayView3<'_, f32>) -> Result<f64> {
        dice(fixed, warped)
    }

    fn name(&self) -> &'static str {
        "DSC"
    }
}
