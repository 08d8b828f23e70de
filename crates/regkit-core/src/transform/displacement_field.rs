//! Dense displacement field transform.
//!
//! The field is a `(n0, n1, n2, 3)` array. A point is displaced by the vector
//! stored at its coordinates truncated toward zero: point `(p0, p1, p2)`
//! reads `field[[trunc(p0), trunc(p1), trunc(p2)]]`. There is no
//! interpolation and no clamping; samples off the grid are errors.

use ndarray::{Array4, ArrayView4};

use crate::error::{CoreError, Result};
use crate::spatial::{Point, PointSet, Vector};

#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementField {
    field: Array4<f64>,
}

impl DisplacementField {
    /// Wrap an `(n0, n1, n2, 3)` array.
    pub fn from_array(field: Array4<f64>) -> Result<Self> {
        let shape = field.shape();
        if shape[3] != 3 {
            return Err(CoreError::ShapeMismatch {
                expected: vec![shape[0], shape[1], shape[2], 3],
                actual: shape.to_vec(),
            });
        }
        Ok(Self { field })
    }

    /// Reshape a flat parameter vector into a cubic `(n, n, n, 3)` field.
    ///
    /// `n` is the integer cube root of `len / 3` and `len` must equal
    /// `3 n^3` with `n >= 1`.
    pub fn from_flat(params: &[f64]) -> Result<Self> {
        let len = params.len();
        let n = cubic_edge(len).ok_or(CoreError::NonCubicDisplacementField { len })?;
        let field = Array4::from_shape_vec((n, n, n, 3), params.to_vec())
            .map_err(|_| CoreError::NonCubicDisplacementField { len })?;
        Ok(Self { field })
    }

    pub fn zeros(extent: [usize; 3]) -> Self {
        Self {
            field: Array4::zeros((extent[0], extent[1], extent[2], 3)),
        }
    }

    pub fn extent(&self) -> [usize; 3] {
        let shape = self.field.shape();
        [shape[0], shape[1], shape[2]]
    }

    pub fn view(&self) -> ArrayView4<'_, f64> {
        self.field.view()
    }

    /// Displacement stored at the truncated coordinates of `point`.
    pub fn displacement_at(&self, point: &Point<3>) -> Result<Vector<3>> {
        let extent = self.extent();
        let truncated = [point[0].trunc(), point[1].trunc(), point[2].trunc()];
        let in_bounds = (0..3).all(|axis| {
            let t = truncated[axis];
            t.is_finite() && t >= 0.0 && t < extent[axis] as f64
        });
        if !in_bounds {
            return Err(CoreError::OutOfBoundsSample {
                point: point.to_array(),
                // `as` saturates for out-of-range floats and maps NaN to 0.
                index: truncated.map(|t| t as i64),
                extent,
            });
        }

        let [i, j, k] = truncated.map(|t| t as usize);
        Ok(Vector::new([
            self.field[[i, j, k, 0]],
            self.field[[i, j, k, 1]],
            self.field[[i, j, k, 2]],
        ]))
    }

    pub fn transform_point(&self, point: &Point<3>) -> Result<Point<3>> {
        Ok(*point + self.displacement_at(point)?)
    }

    pub fn apply(&self, points: &PointSet) -> Result<PointSet> {
        points.try_map(|p| self.transform_point(p))
    }
}

/// Integer `n >= 1` with `3 n^3 == len`, if any.
fn cubic_edge(len: usize) -> Option<usize> {
    if len == 0 || len % 3 != 0 {
        return None;
    }
    let voxels = len / 3;
    let estimate = (voxels as f64).cbrt().round() as usize;
    // Guard against floating point error in the cube root.
    (estimate.saturating_sub(1)..=estimate + 1).find(|n| *n > 0 && n.checked_pow(3) == Some(voxels))
}
