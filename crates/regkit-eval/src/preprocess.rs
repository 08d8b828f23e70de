//! Intensity normalization applied to both volumes before the metrics.

use burn::tensor::backend::Backend;
use regkit_core::image::tensor_values;
use regkit_core::{CoreError, Image};

use crate::stats::percentile;

/// CT window clamped before scaling, in Hounsfield units.
pub const CT_WINDOW: (f32, f32) = (-1000.0, 1000.0);
/// Upper MRI clip, as a percentile of the volume's intensities.
pub const MRI_UPPER_PERCENTILE: f64 = 99.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Preprocessing {
    /// Leave intensities unchanged.
    #[default]
    None,
    /// Clamp to the CT window, then scale to `[0, 1]`.
    Ct,
    /// Clip to `[min, 99th percentile]`, then scale to `[0, 1]`.
    Mri,
}

impl std::fmt::Display for Preprocessing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Ct => "ct",
            Self::Mri => "mri",
        };
        f.write_str(name)
    }
}

/// Normalize intensities. Geometry is carried over unchanged.
pub fn preprocess<B: Backend>(image: &Image<B, 3>, mode: Preprocessing) -> Result<Image<B, 3>, CoreError> {
    match mode {
        Preprocessing::None => Ok(image.clone()),
        Preprocessing::Ct => {
            let (lo, hi) = CT_WINDOW;
            let data = image.data().clone().clamp(lo, hi).sub_scalar(lo).div_scalar(hi - lo);
            image.with_data(data)
        }
        Preprocessing::Mri => {
            let values: Vec<f64> = tensor_values(image.data().clone())?
                .into_iter()
                .map(f64::from)
                .collect();
            let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = percentile(&values, MRI_UPPER_PERCENTILE);

            let data = if values.is_empty() || hi <= lo {
                tracing::warn!("MRI normalization of a constant volume; output is all zeros");
                image.data().zeros_like()
            } else {
                image
                    .data()
                    .clone()
                    .clamp(lo as f32, hi as f32)
                    .sub_scalar(lo as f32)
                    .div_scalar((hi - lo) as f32)
            };
            image.with_data(data)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::{Tensor, TensorData};
    use burn_ndarray::NdArray;
    use regkit_core::spatial::{Direction, Point, Spacing};

    type TestBackend = NdArray<f32>;

    fn image(values: Vec<f32>) -> Image<TestBackend, 3> {
        let n = values.len();
        let data = Tensor::<TestBackend, 3>::from_data(TensorData::new(values, [1, 1, n]), &Default::default());
        Image::new(
            data,
            Point::new([1.0, 2.0, 3.0]),
            Spacing::new([0.5, 0.5, 2.0]),
            Direction::identity(),
        )
    }

    fn values(image: &Image<TestBackend, 3>) -> Vec<f32> {
        tensor_values(image.data().clone()).unwrap()
    }

    #[test]
    fn test_ct_window() {
        let input = image(vec![-3000.0, -1000.0, 0.0, 500.0, 2500.0]);
        let output = preprocess(&input, Preprocessing::Ct).unwrap();
        assert_eq!(values(&output), vec![0.0, 0.0, 0.5, 0.75, 1.0]);
        assert_eq!(output.metadata(), input.metadata());
    }

    #[test]
    fn test_mri_range() {
        let input = image((0..=100).map(|v| v as f32).collect());
        let output = preprocess(&input, Preprocessing::Mri).unwrap();
        let out = values(&output);
        // 99th percentile of 0..=100 is 99.
        assert_eq!(out[0], 0.0);
        assert!((out[50] - 50.0 / 99.0).abs() < 1e-6);
        assert_eq!(out[99], 1.0);
        assert_eq!(out[100], 1.0);
        assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_mri_constant_volume() {
        let output = preprocess(&image(vec![7.0; 4]), Preprocessing::Mri).unwrap();
        assert_eq!(values(&output), vec![0.0; 4]);
    }

    #[test]
    fn test_none_is_identity() {
        let input = image(vec![-5.0, 3.0]);
        assert_eq!(values(&preprocess(&input, Preprocessing::None).unwrap()), vec![-5.0, 3.0]);
    }
}
