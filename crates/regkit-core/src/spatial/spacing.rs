//! Physical distance between adjacent voxels along each axis.

use super::Vector;

/// Voxel spacing, one component per axis in `(x, y, z)` order.
pub type Spacing<const D: usize> = Vector<D>;

impl<const D: usize> Spacing<D> {
    /// Same spacing on every axis.
    pub fn uniform(value: f64) -> Self {
        Self::new([value; D])
    }

    /// Whether every component is strictly positive and finite.
    pub fn is_valid(&self) -> bool {
        (0..D).all(|i| self[i].is_finite() && self[i] > 0.0)
    }
}
