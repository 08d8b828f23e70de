//! Ordered composition of transforms.
//!
//! `T(x) = Tn(...T2(T1(x)))`: components run in storage order.

use super::SpatialTransform;
use crate::error::Result;
use crate::spatial::{Point, PointSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeTransform {
    transforms: Vec<SpatialTransform>,
}

impl CompositeTransform {
    pub fn new(transforms: Vec<SpatialTransform>) -> Self {
        Self { transforms }
    }

    pub fn push(&mut self, transform: SpatialTransform) {
        self.transforms.push(transform);
    }

    pub fn transforms(&self) -> &[SpatialTransform] {
        &self.transforms
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn transform_point(&self, point: &Point<3>) -> Result<Point<3>> {
        self.transforms
            .iter()
            .try_fold(*point, |p, transform| transform.transform_point(&p))
    }

    pub fn apply(&self, points: &PointSet) -> Result<PointSet> {
        points.try_map(|p| self.transform_point(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{AffineTransform, DisplacementField};
    use nalgebra::{Matrix3, Vector3};

    fn translation(t: [f64; 3]) -> SpatialTransform {
        SpatialTransform::Affine(AffineTransform::new(Matrix3::identity(), Vector3::from(t), None))
    }

    #[test]
    fn test_components_run_in_order() {
        // Scale by 2 then translate, versus translate then scale.
        let scale = SpatialTransform::Affine(AffineTransform::new(Matrix3::identity() * 2.0, Vector3::zeros(), None));
        let shift = translation([1.0, 0.0, 0.0]);

        let scale_then_shift = CompositeTransform::new(vec![scale.clone(), shift.clone()]);
        let shift_then_scale = CompositeTransform::new(vec![shift, scale]);

        let p = Point::new([1.0, 1.0, 1.0]);
        assert_eq!(scale_then_shift.transform_point(&p).unwrap(), Point::new([3.0, 2.0, 2.0]));
        assert_eq!(shift_then_scale.transform_point(&p).unwrap(), Point::new([4.0, 2.0, 2.0]));
    }

    #[test]
    fn test_empty_composite_is_identity() {
        let composite = CompositeTransform::default();
        let points = PointSet::from_rows(&[[1.0, 2.0, 3.0]]);
        assert_eq!(composite.apply(&points).unwrap(), points);
    }

    #[test]
    fn test_component_errors_propagate() {
        let composite = CompositeTransform::new(vec![
            translation([10.0, 0.0, 0.0]),
            SpatialTransform::DisplacementField(DisplacementField::zeros([2, 2, 2])),
        ]);
        assert!(composite.transform_point(&Point::new([0.0, 0.0, 0.0])).is_err());
    }
}
