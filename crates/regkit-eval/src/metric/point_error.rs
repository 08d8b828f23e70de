//! Target registration error between corresponding point sets.

use regkit_core::PointSet;

use crate::error::{MetricError, Result};

/// Mean Euclidean distance between corresponding points, in world units.
pub fn mean_point_distance(fixed: &PointSet, moved: &PointSet) -> Result<f64> {
    if fixed.len() != moved.len() {
        return Err(MetricError::PointCountMismatch {
            expected: fixed.len(),
            actual: moved.len(),
        });
    }
    if fixed.is_empty() {
        return Err(MetricError::EmptyPointSet);
    }

    let total: f64 = fixed.iter().zip(moved.iter()).map(|(f, m)| f.distance(m)).sum();
    let mean = total / fixed.len() as f64;
    if !mean.is_finite() {
        return Err(MetricError::NonFinite("mean point distance"));
    }
    Ok(mean)
}
