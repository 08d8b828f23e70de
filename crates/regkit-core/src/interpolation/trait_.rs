//! Interpolator trait for sampling values at continuous coordinates.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::Result;

/// Samples a tensor at continuous voxel indices.
pub trait Interpolator<B: Backend> {
    /// Interpolate `data` (axis order, e.g. `[Z, Y, X]`) at `indices`.
    ///
    /// `indices` is `[Batch, D]` with columns in reversed axis order
    /// (`(x, y, z)` for volumes). Returns `[Batch]` samples.
    fn interpolate<const D: usize>(&self, data: &Tensor<B, D>, indices: Tensor<B, 2>) -> Result<Tensor<B, 1>>;
}
