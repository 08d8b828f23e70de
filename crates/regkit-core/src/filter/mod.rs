pub mod resample;

pub use resample::{resample_to_reference, ResampleImageFilter};
