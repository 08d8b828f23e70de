//! Core types for registration-quality evaluation.
//!
//! Volumes carry a burn tensor plus physical metadata, point sets are plain
//! nalgebra-backed coordinates, and transforms map point sets (host side) or
//! point batches (tensor side, for resampling).

pub mod error;
pub mod image;
pub mod spatial;
pub mod transform;
pub mod interpolation;
pub mod filter;

pub use error::{CoreError, Result};
pub use image::{Image, ImageMetadata};
pub use spatial::{Direction, Point, PointSet, Spacing, Vector};
pub use transform::{apply_all, SpatialTransform};
pub use filter::resample_to_reference;
