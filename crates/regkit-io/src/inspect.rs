//! Human-readable summaries of volumes and keyed archives.

use std::fmt;
use std::path::Path;

use burn::tensor::backend::Backend;

use crate::error::Result;
#[cfg(not(feature = "hdf5"))]
use crate::error::IoError;
use crate::volume::{read_volume, VolumeFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Group,
    Dataset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Slash-separated path from the archive root.
    pub path: String,
    pub kind: EntryKind,
    /// Dataset shape; `None` for groups.
    pub shape: Option<Vec<usize>>,
}

/// Top-level keys of an archive and the contents of its transform group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArchiveSummary {
    pub keys: Vec<String>,
    pub transform_group: Vec<ArchiveEntry>,
}

impl fmt::Display for ArchiveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Keys: {}", self.keys.join(", "))?;
        if self.transform_group.is_empty() {
            return writeln!(f, "No TransformGroup");
        }
        writeln!(f, "TransformGroup:")?;
        for entry in &self.transform_group {
            let depth = entry.path.matches('/').count();
            let indent = "  ".repeat(depth);
            let name = entry.path.rsplit('/').next().unwrap_or(&entry.path);
            match (&entry.kind, &entry.shape) {
                (EntryKind::Dataset, Some(shape)) => writeln!(f, "{indent}{name}: Dataset {shape:?}")?,
                (EntryKind::Dataset, None) => writeln!(f, "{indent}{name}: Dataset")?,
                (EntryKind::Group, _) => writeln!(f, "{indent}{name}: Group")?,
            }
        }
        Ok(())
    }
}

/// List an HDF5 archive's keys and its `TransformGroup` tree.
pub fn inspect_archive(path: &Path) -> Result<ArchiveSummary> {
    #[cfg(feature = "hdf5")]
    {
        crate::hdf5_io::inspect_hdf5(path)
    }
    #[cfg(not(feature = "hdf5"))]
    {
        Err(IoError::Hdf5Disabled {
            path: path.to_path_buf(),
        })
    }
}

/// Shape and geometry of a loaded volume.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeSummary {
    pub format: VolumeFormat,
    /// `[Z, Y, X]`
    pub shape: [usize; 3],
    /// `(x, y, z)`
    pub spacing: [f64; 3],
    pub origin: [f64; 3],
}

impl fmt::Display for VolumeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Format: {}", self.format)?;
        writeln!(f, "Shape (z, y, x): {:?}", self.shape)?;
        writeln!(f, "Spacing (x, y, z): {:?}", self.spacing)?;
        write!(f, "Origin (x, y, z): {:?}", self.origin)
    }
}

pub fn summarize_volume<B: Backend>(path: &Path, device: &B::Device) -> Result<VolumeSummary> {
    let format = VolumeFormat::from_path(path)?;
    let image = read_volume::<B>(path, device)?;
    Ok(VolumeSummary {
        format,
        shape: image.shape(),
        spacing: image.spacing().to_array(),
        origin: image.origin().to_array(),
    })
}
