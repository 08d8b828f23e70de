//! Point type for physical and continuous-index coordinates.

use nalgebra::Point as NaPoint;

use super::Vector;

/// A point in D-dimensional space.
///
/// Used both for physical coordinates (mm) and for continuous voxel indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<const D: usize>(pub NaPoint<f64, D>);

impl<const D: usize> Point<D> {
    /// Create a point from coordinates.
    pub fn new(coords: [f64; D]) -> Self {
        Self(NaPoint::from(coords))
    }

    /// The origin (all coordinates zero).
    pub fn origin() -> Self {
        Self(NaPoint::origin())
    }

    /// Build a point from a slice, or `None` when the length differs from `D`.
    pub fn from_slice(coords: &[f64]) -> Option<Self> {
        Vector::<D>::from_slice(coords).map(|v| Self(NaPoint::from(v.0)))
    }

    pub fn to_array(&self) -> [f64; D] {
        self.0.coords.into()
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Self) -> f64 {
        nalgebra::distance(&self.0, &other.0)
    }
}

impl<const D: usize> std::ops::Index<usize> for Point<D> {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0.coords[index]
    }
}

impl<const D: usize> std::ops::IndexMut<usize> for Point<D> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0.coords[index]
    }
}

impl<const D: usize> std::ops::Sub for Point<D> {
    type Output = Vector<D>;

    fn sub(self, other: Self) -> Self::Output {
        Vector(self.0 - other.0)
    }
}

impl<const D: usize> std::ops::Add<Vector<D>> for Point<D> {
    type Output = Self;

    fn add(self, vector: Vector<D>) -> Self::Output {
        Self(self.0 + vector.0)
    }
}
