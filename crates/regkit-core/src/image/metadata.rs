//! Image metadata types.

use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};
use nalgebra::{SMatrix, SVector};

use crate::error::{CoreError, Result};
use crate::spatial::{Direction, Point, Spacing};

/// Physical-space description of an image grid.
///
/// Shared by loaders (which decode it from file headers) and by derived
/// volumes, which carry it forward unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMetadata<const D: usize> {
    origin: Point<D>,
    spacing: Spacing<D>,
    direction: Direction<D>,
}

impl<const D: usize> ImageMetadata<D> {
    pub fn new(origin: Point<D>, spacing: Spacing<D>, direction: Direction<D>) -> Self {
        Self {
            origin,
            spacing,
            direction,
        }
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

    pub fn with_origin(mut self, origin: Point<D>) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_spacing(mut self, spacing: Spacing<D>) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_direction(mut self, direction: Direction<D>) -> Self {
        self.direction = direction;
        self
    }

    /// Linear part `Dir * diag(S)` of the index -> physical map, in f64.
    pub fn index_to_world_matrix(&self) -> SMatrix<f64, D, D> {
        self.direction.0 * SMatrix::from_diagonal(&self.spacing.0)
    }

    /// Affine `(A, b)` taking continuous indices of this grid to continuous
    /// indices of `target` through the physical map `p -> M p + v`.
    ///
    /// Composed on the host in f64, so two identical grids under the identity
    /// map give `A = I` and `b = 0` exactly.
    pub fn index_mapping_to(
        &self,
        target: &Self,
        matrix: &SMatrix<f64, D, D>,
        offset: &SVector<f64, D>,
    ) -> Result<(SMatrix<f64, D, D>, SVector<f64, D>)> {
        let to_target = target
            .index_to_world_matrix()
            .try_inverse()
            .ok_or(CoreError::SingularDirection)?;
        let linear = to_target * matrix * self.index_to_world_matrix();
        let shift = to_target * (matrix * self.origin.0.coords + offset - target.origin.0.coords);
        Ok((linear, shift))
    }

    /// Batch physical -> index conversion for `[N, D]` points.
    ///
    /// Computes `(P - O) @ T` with `T[r, c] = (Dir^-1)[c, r] / S[c]`.
    pub fn world_to_index_tensor<B: Backend>(&self, points: Tensor<B, 2>) -> Result<Tensor<B, 2>> {
        let device = points.device();
        let inv_dir = self.direction.try_inverse().ok_or(CoreError::SingularDirection)?;

        let mut t_data = Vec::with_capacity(D * D);
        for r in 0..D {
            for c in 0..D {
                t_data.push((inv_dir[(c, r)] / self.spacing[c]) as f32);
            }
        }
        let t = Tensor::<B, 2>::from_data(TensorData::new(t_data, Shape::new([D, D])), &device);

        Ok((points - self.origin_row(&device)).matmul(t))
    }

    /// Batch index -> physical conversion for `[N, D]` continuous indices.
    ///
    /// Computes `I @ M + O` with `M[r, c] = S[r] * Dir[c, r]`.
    pub fn index_to_world_tensor<B: Backend>(&self, indices: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = indices.device();

        let mut m_data = Vec::with_capacity(D * D);
        for r in 0..D {
            for c in 0..D {
                m_data.push((self.spacing[r] * self.direction[(c, r)]) as f32);
            }
        }
        let m = Tensor::<B, 2>::from_data(TensorData::new(m_data, Shape::new([D, D])), &device);

        indices.matmul(m) + self.origin_row(&device)
    }

    fn origin_row<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        let origin: Vec<f32> = (0..D).map(|i| self.origin[i] as f32).collect();
        Tensor::<B, 1>::from_data(TensorData::new(origin, Shape::new([D])), device).reshape([1, D])
    }
}

/// Unit spacing, zero origin, identity direction.
impl<const D: usize> Default for ImageMetadata<D> {
    fn default() -> Self {
        Self {
            origin: Point::origin(),
            spacing: Spacing::uniform(1.0),
            direction: Direction::identity(),
        }
    }
}
