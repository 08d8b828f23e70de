//! Interpolation of tensor data at continuous indices.

pub mod trait_;
pub mod linear;

pub use trait_::Interpolator;
pub use linear::LinearInterpolator;
