//! NIfTI-1 volume reader.
//!
//! Geometry comes from the sform when present, else the qform, else pixdim
//! scaling alone. The file's `[X, Y, Z]` array is returned as a `[Z, Y, X]`
//! volume.

use std::path::Path;

use burn::tensor::backend::Backend;
use ndarray::{Array3, Axis, Ix3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use regkit_core::{Image, ImageMetadata};

use crate::error::{IoError, Result};
use crate::geometry::metadata_from_axis_vectors;

pub fn read_nifti<B: Backend>(path: &Path, device: &B::Device) -> Result<Image<B, 3>> {
    let obj = ReaderOptions::new()
        .read_file(path)
        .map_err(|e| IoError::nifti(path, e))?;
    let metadata = nifti_metadata(obj.header());

    let mut volume = obj
        .into_volume()
        .into_ndarray::<f32>()
        .map_err(|e| IoError::nifti(path, e))?;

    // Drop trailing singleton axes (e.g. a 4D file with one time point).
    while volume.ndim() > 3 && volume.shape()[volume.ndim() - 1] == 1 {
        let last = volume.ndim() - 1;
        volume = volume.index_axis_move(Axis(last), 0);
    }
    let xyz: Array3<f32> = volume
        .into_dimensionality::<Ix3>()
        .map_err(|_| IoError::corrupt(path, "expected a 3-D NIfTI volume"))?;

    let zyx = xyz.permuted_axes([2, 1, 0]);
    tracing::debug!("NIfTI volume {} has shape {:?} (z, y, x)", path.display(), zyx.shape());
    Ok(Image::from_array(&zyx, &metadata, device))
}

/// Decode origin, spacing and direction from the header.
pub fn nifti_metadata(header: &NiftiHeader) -> ImageMetadata<3> {
    let (columns, origin) = if header.sform_code > 0 {
        let rows = [header.srow_x, header.srow_y, header.srow_z];
        let column = |c: usize| [rows[0][c] as f64, rows[1][c] as f64, rows[2][c] as f64];
        (
            [column(0), column(1), column(2)],
            [rows[0][3] as f64, rows[1][3] as f64, rows[2][3] as f64],
        )
    } else if header.qform_code > 0 {
        qform_columns(header)
    } else {
        let p = header.pixdim;
        (
            [
                [p[1] as f64, 0.0, 0.0],
                [0.0, p[2] as f64, 0.0],
                [0.0, 0.0, p[3] as f64],
            ],
            [0.0; 3],
        )
    };
    metadata_from_axis_vectors(columns, origin)
}

/// Quaternion rotation scaled by pixdim, per the NIfTI-1 qform definition.
fn qform_columns(header: &NiftiHeader) -> ([[f64; 3]; 3], [f64; 3]) {
    let b = header.quatern_b as f64;
    let c = header.quatern_c as f64;
    let d = header.quatern_d as f64;
    let a = (1.0 - (b * b + c * c + d * d)).max(0.0).sqrt();
    let qfac = if header.pixdim[0] < 0.0 { -1.0 } else { 1.0 };

    let r = [
        [a * a + b * b - c * c - d * d, 2.0 * (b * c - a * d), 2.0 * (b * d + a * c)],
        [2.0 * (b * c + a * d), a * a + c * c - b * b - d * d, 2.0 * (c * d - a * b)],
        [2.0 * (b * d - a * c), 2.0 * (c * d + a * b), a * a + d * d - b * b - c * c],
    ];
    let step = [
        header.pixdim[1] as f64,
        header.pixdim[2] as f64,
        header.pixdim[3] as f64 * qfac,
    ];

    let column = |j: usize| [r[0][j] * step[j], r[1][j] * step[j], r[2][j] * step[j]];
    (
        [column(0), column(1), column(2)],
        [header.quatern_x as f64, header.quatern_y as f64, header.quatern_z as f64],
    )
}
