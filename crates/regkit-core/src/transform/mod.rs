//! Spatial transforms.
//!
//! Two views of a transform live here. [`SpatialTransform`] is the host-side
//! enum decoded from transform archives and applied to point sets. The
//! tensor-side [`Transform`] trait maps batches of points for the resampler.

pub mod trait_;
pub mod identity;
pub mod affine;
pub mod displacement_field;
pub mod composite;
pub mod kind;

pub use trait_::Transform;
pub use identity::IdentityTransform;
pub use affine::AffineTransform;
pub use displacement_field::DisplacementField;
pub use composite::CompositeTransform;
pub use kind::TransformKind;

use ndarray::Array4;

use crate::error::Result;
use crate::spatial::{Point, PointSet};

/// A decoded transform. Exactly one variant per stored transform.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialTransform {
    Affine(AffineTransform),
    DisplacementField(DisplacementField),
    Composite(CompositeTransform),
}

impl SpatialTransform {
    /// Build a transform of `kind` from its flat parameter vector.
    ///
    /// A composite carries no parameters of its own; its components are
    /// decoded separately and this returns an empty composite.
    pub fn from_parameters(kind: TransformKind, params: &[f64]) -> Result<Self> {
        match kind {
            TransformKind::Affine => AffineTransform::from_parameters(params).map(Self::Affine),
            TransformKind::DisplacementField => DisplacementField::from_flat(params).map(Self::DisplacementField),
            TransformKind::Composite => Ok(Self::Composite(CompositeTransform::default())),
        }
    }

    pub fn kind(&self) -> TransformKind {
        match self {
            Self::Affine(_) => TransformKind::Affine,
            Self::DisplacementField(_) => TransformKind::DisplacementField,
            Self::Composite(_) => TransformKind::Composite,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().tag()
    }

    pub fn transform_point(&self, point: &Point<3>) -> Result<Point<3>> {
        match self {
            Self::Affine(affine) => Ok(affine.transform_point(point)),
            Self::DisplacementField(field) => field.transform_point(point),
            Self::Composite(composite) => composite.transform_point(point),
        }
    }

    /// Map every point, producing a new set of the same length and order.
    pub fn apply(&self, points: &PointSet) -> Result<PointSet> {
        match self {
            Self::Affine(affine) => Ok(affine.apply(points)),
            Self::DisplacementField(field) => field.apply(points),
            Self::Composite(composite) => composite.apply(points),
        }
    }

    /// Sample the transform over the `(n, n, n)` index grid and return the
    /// displacement `T(p) - p` at each grid point `p = (i, j, k)`.
    pub fn to_displacement_field(&self, n: usize) -> Result<DisplacementField> {
        let mut field = Array4::<f64>::zeros((n, n, n, 3));
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    let p = Point::new([i as f64, j as f64, k as f64]);
                    let d = self.transform_point(&p)? - p;
                    for c in 0..3 {
                        field[[i, j, k, c]] = d[c];
                    }
                }
            }
        }
        DisplacementField::from_array(field)
    }
}

/// Thread a point set through every transform in order.
pub fn apply_all(transforms: &[SpatialTransform], points: &PointSet) -> Result<PointSet> {
    tracing::debug!("Applying {} transform(s) to {} point(s)", transforms.len(), points.len());
    transforms
        .iter()
        .try_fold(points.clone(), |current, transform| transform.apply(&current))
}
