//! Direction matrix describing image axis orientation.

use nalgebra::{SMatrix, SVector};

use super::Vector;

/// D×D direction cosine matrix. Column `i` is the physical direction of
/// image axis `i`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction<const D: usize>(pub SMatrix<f64, D, D>);

impl<const D: usize> Direction<D> {
    /// No rotation.
    pub fn identity() -> Self {
        Self(SMatrix::identity())
    }

    /// Build from axis direction columns.
    pub fn from_columns(columns: [Vector<D>; D]) -> Self {
        let cols: Vec<SVector<f64, D>> = columns.iter().map(|c| c.0).collect();
        Self(SMatrix::from_columns(&cols))
    }

    pub fn try_inverse(&self) -> Option<Self> {
        self.0.try_inverse().map(Self)
    }

    /// Whether `M * M^T` is the identity within `1e-6`.
    pub fn is_orthogonal(&self) -> bool {
        let product = self.0 * self.0.transpose();
        (0..D).all(|i| {
            (0..D).all(|j| {
                let expected = if i == j { 1.0 } else { 0.0 };
                (product[(i, j)] - expected).abs() < 1e-6
            })
        })
    }

    pub fn inner(&self) -> &SMatrix<f64, D, D> {
        &self.0
    }
}

impl<const D: usize> std::ops::Index<(usize, usize)> for Direction<D> {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.0[index]
    }
}

impl<const D: usize> std::ops::Mul<Vector<D>> for Direction<D> {
    type Output = Vector<D>;

    fn mul(self, vector: Vector<D>) -> Self::Output {
        Vector(self.0 * vector.0)
    }
}
