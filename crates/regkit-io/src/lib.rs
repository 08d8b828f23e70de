//! Readers for the files a registration run leaves behind: fixed and
//! warped volumes (NIfTI, NRRD, HDF5), transform archives and point sets.

pub mod error;
pub mod geometry;
pub mod nifti_io;
pub mod nrrd_io;
#[cfg(feature = "hdf5")]
pub mod hdf5_io;
pub mod transform_io;
pub mod points_io;
pub mod volume;
pub mod inspect;

pub use error::{IoError, Result};
pub use inspect::{inspect_archive, summarize_volume, ArchiveSummary, VolumeSummary};
pub use nifti_io::read_nifti;
pub use nrrd_io::read_nrrd;
pub use points_io::read_point_set;
pub use transform_io::read_transform_archive;
pub use volume::{read_volume, VolumeFormat};
