//! 95th percentile symmetric Hausdorff distance between binarized volumes.

use ndarray::{Array, ArrayView, ArrayView3, Dimension, Zip};

use super::distance_transform::distance_to_foreground;
use super::trait_::VolumeMetric;
use crate::error::{MetricError, Result};
use crate::stats::percentile;

pub const HD_PERCENTILE: f64 = 95.0;

/// HD95 in voxel units.
///
/// For each foreground voxel of one mask, take its distance to the nearest
/// foreground voxel of the other; report the larger of the two directed
/// 95th percentiles. Two empty masks give `0.0`; one empty mask is an error.
pub fn hausdorff_95<D: Dimension>(a: &ArrayView<'_, f32, D>, b: &ArrayView<'_, f32, D>) -> Result<f64> {
    if a.shape() != b.shape() {
        return Err(MetricError::shape_mismatch(a.shape(), b.shape()));
    }

    let mask_a = a.mapv(|v| v > 0.0);
    let mask_b = b.mapv(|v| v > 0.0);
    let count_a = mask_a.iter().filter(|&&v| v).count();
    let count_b = mask_b.iter().filter(|&&v| v).count();

    match (count_a, count_b) {
        (0, 0) => return Ok(0.0),
        (0, _) => return Err(MetricError::EmptyMask("first")),
        (_, 0) => return Err(MetricError::EmptyMask("second")),
        _ => {}
    }

    let forward = sample_at(&distance_to_foreground(&mask_a), &mask_b);
    let backward = sample_at(&distance_to_foreground(&mask_b), &mask_a);

    Ok(percentile(&forward, HD_PERCENTILE).max(percentile(&backward, HD_PERCENTILE)))
}

fn sample_at<D: Dimension>(distances: &Array<f64, D>, mask: &Array<bool, D>) -> Vec<f64> {
    let mut samples = Vec::new();
    Zip::from(distances).and(mask).for_each(|&d, &inside| {
        if inside {
            samples.push(d);
        }
    });
    samples
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Hausdorff95;

impl VolumeMetric for Hausdorff95 {
    fn compute(&self, fixed: &ArrayView3<'_, f32>, warped: &ArrayView3<'_, f32>) -> Result<f64> {
        hausdorff_95(fixed, warped)
    }

    fn name(&self) -> &'static str {
        "HD95"
    }
}
