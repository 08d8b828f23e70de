//! Error types for file readers.

use std::path::{Path, PathBuf};

use regkit_core::CoreError;
use thiserror::Error;

/// Errors raised while reading volumes, transform archives and point files.
///
/// Every variant names the file involved.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Unsupported file format '{extension}': {path}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("Missing key '{key}' in {path}")]
    MissingKey { path: PathBuf, key: String },

    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Invalid NIfTI file {path}: {source}")]
    Nifti {
        path: PathBuf,
        #[source]
        source: nifti::NiftiError,
    },

    #[cfg(feature = "hdf5")]
    #[error("HDF5 error in {path}: {source}")]
    Hdf5 {
        path: PathBuf,
        #[source]
        source: hdf5::Error,
    },

    #[error("Invalid transform in {path}: {source}")]
    Transform {
        path: PathBuf,
        #[source]
        source: CoreError,
    },

    #[error("Cannot parse point file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Reading {path} needs HDF5 support; build with the `hdf5` feature")]
    Hdf5Disabled { path: PathBuf },
}

/// Result type for IO operations.
pub type Result<T> = std::result::Result<T, IoError>;

impl IoError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn corrupt(path: &Path, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn missing_key(path: &Path, key: impl Into<String>) -> Self {
        Self::MissingKey {
            path: path.to_path_buf(),
            key: key.into(),
        }
    }

    pub fn transform(path: &Path, source: CoreError) -> Self {
        Self::Transform {
            path: path.to_path_buf(),
            source,
        }
    }

    #[cfg(feature = "hdf5")]
    pub fn hdf5(path: &Path, source: hdf5::Error) -> Self {
        Self::Hdf5 {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn nifti(path: &Path, source: nifti::NiftiError) -> Self {
        match source {
            nifti::NiftiError::Io(source) => Self::io(path, source),
            source => Self::Nifti {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// The file this error is about.
    pub fn path(&self) -> &Path {
        match self {
            Self::UnsupportedFormat { path, .. }
            | Self::MissingKey { path, .. }
            | Self::Io { path, .. }
            | Self::Corrupt { path, .. }
            | Self::Nifti { path, .. }
            | Self::Transform { path, .. }
            | Self::Csv { path, .. }
            | Self::Hdf5Disabled { path } => path,
            #[cfg(feature = "hdf5")]
            Self::Hdf5 { path, .. } => path,
        }
    }
}
