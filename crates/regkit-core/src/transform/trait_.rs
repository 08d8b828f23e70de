//! Tensor-side transform trait used by the resampler.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use nalgebra::{SMatrix, SVector};

/// Maps a batch of physical points to another physical space.
///
/// For resampling the mapping runs from the output (reference) grid into the
/// input image, as in ITK's resample filter.
pub trait Transform<B: Backend, const D: usize> {
    /// Apply the transform to `[Batch, D]` points, returning `[Batch, D]`.
    fn transform_points(&self, points: Tensor<B, 2>) -> Tensor<B, 2>;

    /// `(M, v)` with `T(p) = M p + v`, for transforms that are affine.
    fn affine_parts(&self) -> Option<(SMatrix<f64, D, D>, SVector<f64, D>)> {
        None
    }
}
