//! Linear interpolation (bilinear in 2D, trilinear in 3D).

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};

use super::trait_::Interpolator;
use crate::error::{CoreError, Result};

/// Highest tensor rank supported by [`LinearInterpolator`].
pub const MAX_RANK: usize = 3;

/// Multilinear interpolator.
///
/// Indices outside the grid are clamped to the border voxels; callers that
/// need a fill value for out-of-field samples (such as the resampler) mask
/// the result themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterpolator;

impl LinearInterpolator {
    pub fn new() -> Self {
        Self
    }
}

/// Per-column sampling state: clamped lower/upper indices and the fractional
/// weight toward the upper neighbour.
struct AxisSamples<B: Backend> {
    lower: Tensor<B, 1, Int>,
    upper: Tensor<B, 1, Int>,
    weight: Tensor<B, 1>,
    stride: i32,
}

impl<B: Backend> Interpolator<B> for LinearInterpolator {
    fn interpolate<const D: usize>(&self, data: &Tensor<B, D>, indices: Tensor<B, 2>) -> Result<Tensor<B, 1>> {
        if D == 0 || D > MAX_RANK {
            return Err(CoreError::UnsupportedDimension(D));
        }
        let [batch, rank] = indices.dims();
        if rank != D {
            return Err(CoreError::ShapeMismatch {
                expected: vec![batch, D],
                actual: vec![batch, rank],
            });
        }

        let device = indices.device();
        let shape = data.dims();
        let total: usize = shape.iter().product();
        if total == 0 || batch == 0 {
            return Ok(Tensor::zeros([batch], &device));
        }
        let flat = data.clone().reshape([total]);

        // Column c of `indices` addresses tensor axis D - 1 - c.
        let axes: Vec<AxisSamples<B>> = (0..D)
            .map(|c| {
                let axis = D - 1 - c;
                let max = (shape[axis] - 1) as f64;
                let stride: usize = shape[axis + 1..].iter().product();

                let coord = indices.clone().narrow(1, c, 1).squeeze::<1>(1);
                let floor = coord.clone().floor();
                AxisSamples {
                    lower: floor.clone().clamp(0.0, max).int(),
                    upper: (floor.clone() + 1.0).clamp(0.0, max).int(),
                    weight: coord - floor,
                    stride: stride as i32,
                }
            })
            .collect();

        let one = Tensor::<B, 1>::ones([batch], &device);
        let mut result = Tensor::<B, 1>::zeros([batch], &device);

        // Accumulate the 2^D corner contributions.
        for corner in 0..(1usize << D) {
            let mut offset = Tensor::<B, 1, Int>::zeros([batch], &device);
            let mut weight = one.clone();
            for (c, samples) in axes.iter().enumerate() {
                if (corner >> c) & 1 == 1 {
                    offset = offset + samples.upper.clone() * samples.stride;
                    weight = weight * samples.weight.clone();
                } else {
                    offset = offset + samples.lower.clone() * samples.stride;
                    weight = weight * (one.clone() - samples.weight.clone());
                }
            }
            result = result + flat.clone().gather(0, offset) * weight;
        }

        Ok(result)
    }
}
