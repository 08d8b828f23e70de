//! Volume type with physical metadata and coordinate transformations.

use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};
use ndarray::Array3;

use super::ImageMetadata;
use crate::error::{CoreError, Result};
use crate::spatial::{Direction, Point, Spacing, Vector};

/// Volume with physical metadata.
///
/// The tensor is stored in axis order `[Z, Y, X]` (x fastest in memory);
/// origin, spacing and direction are in `(x, y, z)` order.
///
/// # Coordinate Systems
/// * **Index Space**: continuous voxel indices `(x, y, z)`
/// * **Physical Space**: `point = origin + Direction * (index * spacing)`
///
/// # Examples
/// ```rust
/// use regkit_core::{Image, ImageMetadata};
/// use burn::tensor::Tensor;
/// use burn_ndarray::NdArray;
///
/// type Backend = NdArray<f32>;
///
/// let device = Default::default();
/// let data = Tensor::<Backend, 3>::zeros([4, 5, 6], &device);
/// let image = Image::from_metadata(data, ImageMetadata::default());
/// assert_eq!(image.shape(), [4, 5, 6]);
/// ```
#[derive(Debug, Clone)]
pub struct Image<B: Backend, const D: usize> {
    data: Tensor<B, D>,
    origin: Point<D>,
    spacing: Spacing<D>,
    direction: Direction<D>,
}

impl<B: Backend, const D: usize> Image<B, D> {
    pub fn new(data: Tensor<B, D>, origin: Point<D>, spacing: Spacing<D>, direction: Direction<D>) -> Self {
        Self {
            data,
            origin,
            spacing,
            direction,
        }
    }

    pub fn from_metadata(data: Tensor<B, D>, metadata: ImageMetadata<D>) -> Self {
        Self::new(data, *metadata.origin(), *metadata.spacing(), *metadata.direction())
    }

    pub fn metadata(&self) -> ImageMetadata<D> {
        ImageMetadata::new(self.origin, self.spacing, self.direction)
    }

    pub fn data(&self) -> &Tensor<B, D> {
        &self.data
    }

    pub fn into_data(self) -> Tensor<B, D> {
        self.data
    }

    pub fn origin(&self) -> &Point<D> {
        &self.origin
    }

    pub fn spacing(&self) -> &Spacing<D> {
        &self.spacing
    }

    pub fn direction(&self) -> &Direction<D> {
        &self.direction
    }

    /// Tensor shape in axis order.
    pub fn shape(&self) -> [usize; D] {
        self.data.dims()
    }

    pub fn num_voxels(&self) -> usize {
        self.shape().iter().product()
    }

    /// Replace the voxel data, keeping the geometry. The new tensor must have
    /// the same shape.
    pub fn with_data(&self, data: Tensor<B, D>) -> Result<Self> {
        let expected = self.shape();
        let actual = data.dims();
        if expected != actual {
            return Err(CoreError::ShapeMismatch {
                expected: expected.to_vec(),
                actual: actual.to_vec(),
            });
        }
        Ok(Self::new(data, self.origin, self.spacing, self.direction))
    }

    /// `index = (Direction^-1 * (point - origin)) / spacing`
    pub fn transform_physical_point_to_continuous_index(&self, point: &Point<D>) -> Result<Point<D>> {
        let inv_dir = self.direction.try_inverse().ok_or(CoreError::SingularDirection)?;
        let rotated = inv_dir * (*point - self.origin);

        let mut index = Point::<D>::origin();
        for i in 0..D {
            index[i] = rotated[i] / self.spacing[i];
        }
        Ok(index)
    }

    /// `point = origin + Direction * (index * spacing)`
    pub fn transform_continuous_index_to_physical_point(&self, index: &Point<D>) -> Point<D> {
        let mut scaled = Vector::<D>::zeros();
        for i in 0..D {
            scaled[i] = index[i] * self.spacing[i];
        }
        self.origin + self.direction * scaled
    }

    /// Batch physical -> index conversion for a `[N, D]` tensor of points.
    pub fn world_to_index_tensor(&self, points: Tensor<B, 2>) -> Result<Tensor<B, 2>> {
        self.metadata().world_to_index_tensor(points)
    }

    /// Batch index -> physical conversion for a `[N, D]` tensor of indices.
    pub fn index_to_world_tensor(&self, indices: Tensor<B, 2>) -> Tensor<B, 2> {
        self.metadata().index_to_world_tensor(indices)
    }
}

impl<B: Backend> Image<B, 3> {
    /// Build a volume from a host array in `[Z, Y, X]` order.
    pub fn from_array(array: &Array3<f32>, metadata: &ImageMetadata<3>, device: &B::Device) -> Self {
        let (z, y, x) = array.dim();
        let values: Vec<f32> = array.iter().copied().collect();
        let data = Tensor::<B, 3>::from_data(TensorData::new(values, Shape::new([z, y, x])), device);
        Self::from_metadata(data, metadata.clone())
    }

    /// Copy the voxel data back to a host array in `[Z, Y, X]` order.
    pub fn to_array(&self) -> Result<Array3<f32>> {
        let [z, y, x] = self.shape();
        let values = tensor_values(self.data.clone())?;
        let actual = values.len();
        Array3::from_shape_vec((z, y, x), values).map_err(|_| CoreError::ShapeMismatch {
            expected: vec![z, y, x],
            actual: vec![actual],
        })
    }
}

/// Read a tensor back to the host as a flat `f32` vector in row-major order.
pub fn tensor_values<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| CoreError::tensor_data(format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;
    use nalgebra::SMatrix;

    type Backend = NdArray<f32>;
    type Point3 = Point<3>;
    type Spacing3 = Spacing<3>;
    type Direction3 = Direction<3>;

    fn volume(origin: Point3, spacing: Spacing3, direction: Direction3) -> Image<Backend, 3> {
        let device = Default::default();
        let data = Tensor::<Backend, 3>::zeros([10, 10, 10], &device);
        Image::new(data, origin, spacing, direction)
    }

    #[test]
    fn test_image_creation() {
        let image = volume(Point3::origin(), Spacing3::uniform(1.0), Direction3::identity());
        assert_eq!(image.shape(), [10, 10, 10]);
        assert_eq!(image.num_voxels(), 1000);
        assert_eq!(image.metadata(), ImageMetadata::default());
    }

    #[test]
    fn test_physical_to_index_with_spacing_and_origin() {
        let image = volume(Point3::new([10.0, 20.0, 30.0]), Spacing3::new([2.0, 2.0, 0.5]), Direction3::identity());
        let index = image
            .transform_physical_point_to_continuous_index(&Point3::new([20.0, 30.0, 32.5]))
            .unwrap();
        assert!((index[0] - 5.0).abs() < 1e-9);
        assert!((index[1] - 5.0).abs() < 1e-9);
        assert!((index[2] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_transform_roundtrip_rotated() {
        let direction = Direction3::from_columns([
            Vector::new([0.0, 1.0, 0.0]),
            Vector::new([-1.0, 0.0, 0.0]),
            Vector::new([0.0, 0.0, 1.0]),
        ]);
        let image = volume(Point3::new([1.0, -2.0, 3.0]), Spacing3::new([0.7, 1.3, 2.0]), direction);

        let original = Point3::new([3.5, 4.5, 5.5]);
        let index = image.transform_physical_point_to_continuous_index(&original).unwrap();
        let back = image.transform_continuous_index_to_physical_point(&index);
        for i in 0..3 {
            assert!((original[i] - back[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_singular_direction_is_an_error() {
        let image = volume(Point3::origin(), Spacing3::uniform(1.0), Direction(SMatrix::zeros()));
        let result = image.transform_physical_point_to_continuous_index(&Point3::origin());
        assert!(matches!(result, Err(CoreError::SingularDirection)));
    }

    #[test]
    fn test_tensor_conversions_match_host() {
        let device = Default::default();
        let image = volume(Point3::new([5.0, 0.0, -5.0]), Spacing3::new([2.0, 1.0, 0.5]), Direction3::identity());

        let points = Tensor::<Backend, 2>::from_data(
            TensorData::new(vec![7.0f32, 3.0, -4.0], Shape::new([1, 3])),
            &device,
        );
        let indices = image.world_to_index_tensor(points).unwrap();
        let values = tensor_values(indices.clone()).unwrap();
        assert_eq!(values, vec![1.0, 3.0, 2.0]);

        let world = tensor_values(image.index_to_world_tensor(indices)).unwrap();
        assert_eq!(world, vec![7.0, 3.0, -4.0]);
    }

    #[test]
    fn test_with_data_rejects_other_shape() {
        let device = Default::default();
        let image = volume(Point3::origin(), Spacing3::uniform(1.0), Direction3::identity());
        let other = Tensor::<Backend, 3>::zeros([2, 2, 2], &device);
        assert!(matches!(image.with_data(other), Err(CoreError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_array_roundtrip_keeps_axis_order() {
        let device = Default::default();
        let array = Array3::from_shape_fn((2, 3, 4), |(z, y, x)| (z * 100 + y * 10 + x) as f32);
        let image = Image::<Backend, 3>::from_array(&array, &ImageMetadata::default(), &device);
        assert_eq!(image.shape(), [2, 3, 4]);
        assert_eq!(image.to_array().unwrap(), array);
    }
}
