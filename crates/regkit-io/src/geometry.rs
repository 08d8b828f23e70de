//! Conversion of header affine columns into image metadata.

use nalgebra::Vector3;
use regkit_core::spatial::{Direction, Point, Spacing, Vector};
use regkit_core::ImageMetadata;

/// Build metadata from per-axis step vectors (spacing times direction) and
/// an origin. Each column's norm is the spacing and its unit vector the
/// direction; degenerate columns fall back to the matching unit axis.
pub fn metadata_from_axis_vectors(columns: [[f64; 3]; 3], origin: [f64; 3]) -> ImageMetadata<3> {
    let mut spacing = [1.0; 3];
    let mut directions = [Vector::<3>::zeros(); 3];

    for (axis, column) in columns.iter().enumerate() {
        let v = Vector3::from(*column);
        let norm = v.norm();
        if norm > 1e-9 && norm.is_finite() {
            spacing[axis] = norm;
            directions[axis] = Vector(v / norm);
        } else {
            let mut unit = Vector3::zeros();
            unit[axis] = 1.0;
            directions[axis] = Vector(unit);
        }
    }

    ImageMetadata::new(Point::new(origin), Spacing::new(spacing), Direction::from_columns(directions))
}
