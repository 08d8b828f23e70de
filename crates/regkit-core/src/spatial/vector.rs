//! Vector type for displacements, translations and spacing.

use nalgebra::SVector;

/// A vector in D-dimensional physical space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector<const D: usize>(pub SVector<f64, D>);

impl<const D: usize> Vector<D> {
    /// Create a vector from its components.
    pub fn new(components: [f64; D]) -> Self {
        Self(SVector::from(components))
    }

    /// The zero vector.
    pub fn zeros() -> Self {
        Self(SVector::zeros())
    }

    /// Build a vector from a slice, or `None` when the length differs from `D`.
    pub fn from_slice(components: &[f64]) -> Option<Self> {
        (components.len() == D).then(|| Self(SVector::from_column_slice(components)))
    }

    /// Euclidean length.
    pub fn norm(&self) -> f64 {
        self.0.norm()
    }

    pub fn to_array(&self) -> [f64; D] {
        self.0.into()
    }
}

impl<const D: usize> std::ops::Index<usize> for Vector<D> {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<const D: usize> std::ops::IndexMut<usize> for Vector<D> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl<const D: usize> std::ops::Add for Vector<D> {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self(self.0 + other.0)
    }
}

impl<const D: usize> std::ops::Sub for Vector<D> {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self(self.0 - other.0)
    }
}

impl<const D: usize> std::ops::Mul<f64> for Vector<D> {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self::Output {
        Self(self.0 * scalar)
    }
}

impl<const D: usize> std::ops::Neg for Vector<D> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}
