//! Suffix-based dispatch of volume readers.

use std::fmt;
use std::path::Path;

use burn::tensor::backend::Backend;
use regkit_core::Image;

use crate::error::{IoError, Result};
use crate::nifti_io::read_nifti;
use crate::nrrd_io::read_nrrd;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeFormat {
    Nifti,
    Nrrd,
    Hdf5,
}

/// Recognised suffixes, longest first so `.nii.gz` wins over `.gz`.
const SUFFIXES: &[(&str, VolumeFormat)] = &[
    (".nii.gz", VolumeFormat::Nifti),
    (".nii", VolumeFormat::Nifti),
    (".nrrd", VolumeFormat::Nrrd),
    (".nhdr", VolumeFormat::Nrrd),
    (".hdf5", VolumeFormat::Hdf5),
    (".h5", VolumeFormat::Hdf5),
];

impl VolumeFormat {
    /// Match the file name's suffix chain, ignoring case.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        SUFFIXES
            .iter()
            .find(|(suffix, _)| name.ends_with(suffix))
            .map(|(_, format)| *format)
            .ok_or_else(|| IoError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: path
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            })
    }
}

impl fmt::Display for VolumeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nifti => "NIfTI",
            Self::Nrrd => "NRRD",
            Self::Hdf5 => "HDF5",
        };
        f.write_str(name)
    }
}

/// Load a volume as a `[Z, Y, X]` image, choosing the reader by suffix.
pub fn read_volume<B: Backend>(path: &Path, device: &B::Device) -> Result<Image<B, 3>> {
    let format = VolumeFormat::from_path(path)?;
    tracing::info!("Loading {} volume from {}", format, path.display());

    match format {
        VolumeFormat::Nifti => read_nifti(path, device),
        VolumeFormat::Nrrd => read_nrrd(path, device),
        #[cfg(feature = "hdf5")]
        VolumeFormat::Hdf5 => crate::hdf5_io::read_hdf5_volume(path, device),
        #[cfg(not(feature = "hdf5"))]
        VolumeFormat::Hdf5 => Err(IoError::Hdf5Disabled {
            path: path.to_path_buf(),
        }),
    }
}
