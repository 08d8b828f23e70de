//! Resample image filter.
//!
//! Resamples an input image onto an output grid by mapping each output voxel
//! to physical space, through a transform into the input's physical space,
//! and interpolating the input there.

use std::marker::PhantomData;

use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};

use crate::error::Result;
use crate::image::{generate_grid, Image, ImageMetadata};
use crate::interpolation::{Interpolator, LinearInterpolator};
use crate::transform::{IdentityTransform, Transform};

/// Resample image filter.
///
/// The transform maps Output Physical Space -> Input Physical Space. Output
/// voxels whose input continuous index lies outside `[-0.5, size - 0.5]` on
/// any axis receive the default pixel value.
pub struct ResampleImageFilter<B, T, I, const D: usize>
where
    B: Backend,
    T: Transform<B, D>,
    I: Interpolator<B>,
{
    size: [usize; D],
    metadata: ImageMetadata<D>,
    transform: T,
    interpolator: I,
    default_pixel_value: f64,
    _phantom: PhantomData<B>,
}

impl<B, T, I, const D: usize> ResampleImageFilter<B, T, I, D>
where
    B: Backend,
    T: Transform<B, D>,
    I: Interpolator<B>,
{
    /// Output grid `size` (axis order) with geometry `metadata`.
    pub fn new(size: [usize; D], metadata: ImageMetadata<D>, transform: T, interpolator: I) -> Self {
        Self {
            size,
            metadata,
            transform,
            interpolator,
            default_pixel_value: 0.0,
            _phantom: PhantomData,
        }
    }

    /// Output grid taken from `reference` (size, origin, spacing, direction).
    pub fn new_from_reference(reference: &Image<B, D>, transform: T, interpolator: I) -> Self {
        Self::new(reference.shape(), reference.metadata(), transform, interpolator)
    }

    pub fn with_default_pixel_value(mut self, value: f64) -> Self {
        self.default_pixel_value = value;
        self
    }

    /// Resample `input` onto the output grid. `input` is not modified.
    pub fn apply(&self, input: &Image<B, D>) -> Result<Image<B, D>> {
        let device = input.data().device();
        tracing::debug!("Resampling {:?} onto {:?}", input.shape(), self.size);

        let output_indices = generate_grid::<B, D>(self.size, &device);
        let input_indices = self.input_indices(input, output_indices)?;

        let values = self.interpolator.interpolate(input.data(), input_indices.clone())?;
        let values = self.mask_outside(values, input_indices, input.shape());

        let data = values.reshape(Shape::new(self.size));
        Ok(Image::from_metadata(data, self.metadata.clone()))
    }

    /// Continuous input indices for each output index.
    ///
    /// Affine transforms fold into a single index -> index map built in f64,
    /// so integer output indices on a matching grid stay integers.
    fn input_indices(&self, input: &Image<B, D>, output_indices: Tensor<B, 2>) -> Result<Tensor<B, 2>> {
        let Some((matrix, offset)) = self.transform.affine_parts() else {
            let output_points = self.metadata.index_to_world_tensor(output_indices);
            let input_points = self.transform.transform_points(output_points);
            return input.world_to_index_tensor(input_points);
        };

        let (linear, shift) = self.metadata.index_mapping_to(&input.metadata(), &matrix, &offset)?;
        let device = output_indices.device();
        // Column-major storage of A is the row-major layout of A^T.
        let a_t: Vec<f32> = linear.as_slice().iter().map(|v| *v as f32).collect();
        let a_t = Tensor::<B, 2>::from_data(TensorData::new(a_t, Shape::new([D, D])), &device);
        let b: Vec<f32> = shift.iter().map(|v| *v as f32).collect();
        let b = Tensor::<B, 1>::from_data(TensorData::new(b, Shape::new([D])), &device).reshape([1, D]);
        Ok(output_indices.matmul(a_t) + b)
    }

    fn mask_outside(&self, values: Tensor<B, 1>, indices: Tensor<B, 2>, input_shape: [usize; D]) -> Tensor<B, 1> {
        let fill = self.default_pixel_value as f32;
        (0..D).fold(values, |values, c| {
            let upper = input_shape[D - 1 - c] as f64 - 0.5;
            let column = indices.clone().narrow(1, c, 1).squeeze::<1>(1);
            values
                .mask_fill(column.clone().lower_elem(-0.5), fill)
                .mask_fill(column.greater_elem(upper), fill)
        })
    }
}

/// Resample `image` onto the grid of `reference` with trilinear
/// interpolation, identity transform and default value 0.
pub fn resample_to_reference<B: Backend, const D: usize>(
    image: &Image<B, D>,
    reference: &Image<B, D>,
) -> Result<Image<B, D>> {
    ResampleImageFilter::new_from_reference(reference, IdentityTransform, LinearInterpolator::new()).apply(image)
}
