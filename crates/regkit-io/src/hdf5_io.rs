//! Keyed HDF5 archives: warped volumes, transform groups and inspection.

use std::path::Path;

use burn::tensor::backend::Backend;
use hdf5::types::{FixedAscii, FixedUnicode, VarLenAscii, VarLenUnicode};
use hdf5::{Dataset, File, Group};
use ndarray::Array3;
use regkit_core::{Image, ImageMetadata};

use crate::error::{IoError, Result};
use crate::inspect::{ArchiveEntry, ArchiveSummary, EntryKind};

/// Dataset holding the warped volume in a registration output archive.
pub const WARPED_IMAGE_KEY: &str = "warped_image";
/// Group holding one sub-group per stored transform.
pub const TRANSFORM_GROUP_KEY: &str = "TransformGroup";

pub(crate) fn open(path: &Path) -> Result<File> {
    if !path.exists() {
        return Err(IoError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        ));
    }
    File::open(path).map_err(|e| IoError::hdf5(path, e))
}

pub(crate) fn dataset(group: &Group, key: &str, path: &Path) -> Result<Dataset> {
    if !group.link_exists(key) {
        return Err(IoError::missing_key(path, key));
    }
    group.dataset(key).map_err(|e| IoError::hdf5(path, e))
}

/// Read the `warped_image` dataset as a `[Z, Y, X]` volume with default
/// geometry. Singleton axes are squeezed.
pub fn read_hdf5_volume<B: Backend>(path: &Path, device: &B::Device) -> Result<Image<B, 3>> {
    let file = open(path)?;
    let ds = dataset(&file, WARPED_IMAGE_KEY, path)?;

    let shape: Vec<usize> = ds.shape().into_iter().filter(|&s| s != 1).collect();
    let zyx: [usize; 3] = match shape.len() {
        3 => [shape[0], shape[1], shape[2]],
        // A volume with singleton axes keeps its leading ones.
        n if n < 3 && !ds.shape().is_empty() => {
            let mut padded = [1usize; 3];
            padded[3 - n..].copy_from_slice(&shape);
            padded
        }
        _ => {
            return Err(IoError::corrupt(
                path,
                format!("'{WARPED_IMAGE_KEY}' has shape {:?}, expected 3 non-singleton axes", ds.shape()),
            ))
        }
    };

    let values = ds.read_raw::<f32>().map_err(|e| IoError::hdf5(path, e))?;
    let array = Array3::from_shape_vec((zyx[0], zyx[1], zyx[2]), values)
        .map_err(|e| IoError::corrupt(path, e.to_string()))?;
    tracing::debug!("HDF5 volume {} has shape {:?}", path.display(), zyx);
    Ok(Image::from_array(&array, &ImageMetadata::default(), device))
}

/// Read a string dataset stored as variable or fixed length, scalar or
/// one-element array.
pub(crate) fn read_string(ds: &Dataset) -> Option<String> {
    fn first<T: ToString>(values: hdf5::Result<Vec<T>>) -> Option<String> {
        values.ok()?.first().map(|v| v.to_string())
    }
    first(ds.read_raw::<VarLenUnicode>())
        .or_else(|| first(ds.read_raw::<VarLenAscii>()))
        .or_else(|| first(ds.read_raw::<FixedAscii<256>>()))
        .or_else(|| first(ds.read_raw::<FixedUnicode<256>>()))
        .map(|s| s.trim_end_matches('\0').trim().to_string())
}

/// Names of sub-groups of `group`, numeric names compared numerically.
pub(crate) fn sorted_members(group: &Group, path: &Path) -> Result<Vec<String>> {
    let mut names = group.member_names().map_err(|e| IoError::hdf5(path, e))?;
    names.sort_by(|a, b| match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    });
    Ok(names)
}

/// List top-level keys and the recursive contents of `TransformGroup`.
pub fn inspect_hdf5(path: &Path) -> Result<ArchiveSummary> {
    let file = open(path)?;
    let keys = sorted_members(&file, path)?;

    let mut transform_group = Vec::new();
    if file.link_exists(TRANSFORM_GROUP_KEY) {
        let group = file.group(TRANSFORM_GROUP_KEY).map_err(|e| IoError::hdf5(path, e))?;
        collect_entries(&group, TRANSFORM_GROUP_KEY, path, &mut transform_group)?;
    }
    Ok(ArchiveSummary { keys, transform_group })
}

fn collect_entries(group: &Group, prefix: &str, path: &Path, out: &mut Vec<ArchiveEntry>) -> Result<()> {
    for name in sorted_members(group, path)? {
        let full = format!("{prefix}/{name}");
        if let Ok(child) = group.group(&name) {
            out.push(ArchiveEntry {
                path: full.clone(),
                kind: EntryKind::Group,
                shape: None,
            });
            collect_entries(&child, &full, path, out)?;
        } else {
            let ds = group.dataset(&name).map_err(|e| IoError::hdf5(path, e))?;
            out.push(ArchiveEntry {
                path: full,
                kind: EntryKind::Dataset,
                shape: Some(ds.shape()),
            });
        }
    }
    Ok(())
}
