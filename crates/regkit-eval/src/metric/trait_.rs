//! Metric trait for volume agreement measures.

use ndarray::ArrayView3;

use crate::error::Result;

/// A scalar agreement measure between a fixed volume and a warped volume
/// resampled onto the fixed grid.
///
/// Implementations are pure: the same inputs always give the same value.
pub trait VolumeMetric {
    /// Compute the metric.
    ///
    /// # Arguments
    /// * `fixed` - The fixed (reference) volume, `[Z, Y, X]`
    /// * `warped` - The warped volume on the fixed grid
    ///
    /// # Returns
    /// The metric value, or an error if it is undefined for these inputs
    fn compute(&self, fixed: &ArrayView3<'_, f32>, warped: &ArrayView3<'_, f32>) -> Result<f64>;

    /// Key the value is reported under.
    fn name(&self) -> &'static str;
}
