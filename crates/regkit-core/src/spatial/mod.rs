//! Spatial types: points, vectors, spacing, direction matrices and point sets.
//!
//! All coordinate types wrap nalgebra storage and are ordered `(x, y, z)`,
//! i.e. the reverse of the tensor axis order `[Z, Y, X]` used by `Image`.

pub mod point;
pub mod vector;
pub mod spacing;
pub mod direction;
pub mod point_set;

pub use point::Point;
pub use vector::Vector;
pub use spacing::Spacing;
pub use direction::Direction;
pub use point_set::PointSet;

pub type Point3 = Point<3>;
pub type Vector3 = Vector<3>;
pub type Spacing3 = Spacing<3>;
pub type Direction3 = Direction<3>;
