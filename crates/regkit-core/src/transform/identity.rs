use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use nalgebra::{SMatrix, SVector};

use super::trait_::Transform;

/// Leaves points unchanged. Default transform of the resampler.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl<B: Backend, const D: usize> Transform<B, D> for IdentityTransform {
    fn transform_points(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        points
    }

    fn affine_parts(&self) -> Option<(SMatrix<f64, D, D>, SVector<f64, D>)> {
        Some((SMatrix::identity(), SVector::zeros()))
    }
}
