//! Affine transform decoded from a flat parameter vector.

use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};
use nalgebra::{Matrix3, Vector3};

use super::trait_::Transform;
use crate::error::{CoreError, Result};
use crate::spatial::{Point, PointSet};

/// Parameter count of an affine with an explicit center.
pub const CENTERED_PARAMETER_COUNT: usize = 15;
/// Parameter count of an affine about the origin.
pub const PLAIN_PARAMETER_COUNT: usize = 12;

/// Affine Transform: `T(p) = A(p - c) + c + t`.
///
/// * `A` is the 3×3 linear part (rotation, scale, shear)
/// * `t` is the translation
/// * `c` is the fixed center; absent means the origin, i.e. `T(p) = Ap + t`
#[derive(Debug, Clone, PartialEq)]
pub struct AffineTransform {
    matrix: Matrix3<f64>,
    translation: Vector3<f64>,
    center: Option<Vector3<f64>>,
}

impl AffineTransform {
    pub fn new(matrix: Matrix3<f64>, translation: Vector3<f64>, center: Option<Vector3<f64>>) -> Self {
        Self {
            matrix,
            translation,
            center,
        }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros(), None)
    }

    /// Decode `[9 matrix (row-major), 3 translation]` or
    /// `[9 matrix, 3 translation, 3 center]`.
    pub fn from_parameters(params: &[f64]) -> Result<Self> {
        match params.len() {
            CENTERED_PARAMETER_COUNT | PLAIN_PARAMETER_COUNT => {
                let matrix = Matrix3::from_row_slice(&params[0..9]);
                let translation = Vector3::from_column_slice(&params[9..12]);
                let center = (params.len() == CENTERED_PARAMETER_COUNT)
                    .then(|| Vector3::from_column_slice(&params[12..15]));
                Ok(Self::new(matrix, translation, center))
            }
            actual => Err(CoreError::invalid_parameter_length(
                "affine transform",
                format!("{PLAIN_PARAMETER_COUNT} or {CENTERED_PARAMETER_COUNT}"),
                actual,
            )),
        }
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    pub fn center(&self) -> Option<&Vector3<f64>> {
        self.center.as_ref()
    }

    fn center_or_origin(&self) -> Vector3<f64> {
        self.center.unwrap_or_else(Vector3::zeros)
    }

    pub fn transform_point(&self, point: &Point<3>) -> Point<3> {
        let c = self.center_or_origin();
        let p = point.0.coords;
        let mapped = self.matrix * (p - c) + c + self.translation;
        Point::new([mapped.x, mapped.y, mapped.z])
    }

    pub fn apply(&self, points: &PointSet) -> PointSet {
        points.iter().map(|p| self.transform_point(p)).collect()
    }
}

impl<B: Backend> Transform<B, 3> for AffineTransform {
    fn transform_points(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        // Row-vector form: y = (x - c) @ A^T + c + t
        let device = points.device();
        let row = |v: Vector3<f64>| {
            let values: Vec<f32> = v.iter().map(|x| *x as f32).collect();
            Tensor::<B, 2>::from_data(TensorData::new(values, Shape::new([1, 3])), &device)
        };

        // Column-major storage of A is the row-major layout of A^T.
        let a_t: Vec<f32> = self.matrix.as_slice().iter().map(|x| *x as f32).collect();
        let a_t = Tensor::<B, 2>::from_data(TensorData::new(a_t, Shape::new([3, 3])), &device);

        let c = row(self.center_or_origin());
        let t = row(self.translation);
        (points - c.clone()).matmul(a_t) + c + t
    }

    fn affine_parts(&self) -> Option<(Matrix3<f64>, Vector3<f64>)> {
        let c = self.center_or_origin();
        Some((self.matrix, c - self.matrix * c + self.translation))
    }
}
