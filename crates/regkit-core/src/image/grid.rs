use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};

/// Generate continuous indices for every voxel of a grid.
///
/// `shape` is in tensor axis order (`[Z, Y, X]` for volumes). The result is a
/// `[N, D]` tensor in row-major voxel order whose columns are reversed
/// relative to `shape`, i.e. `(x, y, z)`, matching the coordinate order of
/// `Point` and the image's index/world conversions.
pub fn generate_grid<B: Backend, const D: usize>(shape: [usize; D], device: &B::Device) -> Tensor<B, 2> {
    let total: usize = shape.iter().product();
    let mut grid = Vec::with_capacity(total * D);
    let mut index = [0usize; D];

    for _ in 0..total {
        for axis in (0..D).rev() {
            grid.push(index[axis] as f32);
        }
        // Odometer increment, last axis fastest.
        for axis in (0..D).rev() {
            index[axis] += 1;
            if index[axis] < shape[axis] {
                break;
            }
            index[axis] = 0;
        }
    }

    Tensor::<B, 1>::from_data(TensorData::new(grid, Shape::new([total * D])), device).reshape([total, D])
}
