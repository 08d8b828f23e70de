//! Reader for transform archives in the ITK HDF5 layout.
//!
//! ```text
//! /TransformGroup/0/TransformType            "CompositeTransform_double_3_3"
//! /TransformGroup/1/TransformType            "AffineTransform_double_3_3"
//! /TransformGroup/1/TransformParameters      [12 or 15 values]
//! /TransformGroup/1/TransformFixedParameters [center]
//! /TransformGroup/2/...
//! ```

use std::path::Path;

use regkit_core::SpatialTransform;

use crate::error::Result;
#[cfg(not(feature = "hdf5"))]
use crate::error::IoError;

pub const TRANSFORM_TYPE_KEY: &str = "TransformType";
pub const TRANSFORM_PARAMETERS_KEY: &str = "TransformParameters";
pub const TRANSFORM_FIXED_PARAMETERS_KEY: &str = "TransformFixedParameters";

/// Read every transform under `TransformGroup`, in stored order.
///
/// Composite entries with nested groups become a `Composite` of their
/// members. A composite entry without nested groups is a header for the
/// sibling entries that follow and adds no transform of its own.
pub fn read_transform_archive(path: &Path) -> Result<Vec<SpatialTransform>> {
    #[cfg(feature = "hdf5")]
    {
        archive::read(path)
    }
    #[cfg(not(feature = "hdf5"))]
    {
        Err(IoError::Hdf5Disabled {
            path: path.to_path_buf(),
        })
    }
}

#[cfg(feature = "hdf5")]
mod archive {
    use std::path::Path;

    use hdf5::Group;
    use regkit_core::transform::affine::PLAIN_PARAMETER_COUNT;
    use regkit_core::transform::{CompositeTransform, TransformKind};
    use regkit_core::SpatialTransform;

    use super::{TRANSFORM_FIXED_PARAMETERS_KEY, TRANSFORM_PARAMETERS_KEY, TRANSFORM_TYPE_KEY};
    use crate::error::{IoError, Result};
    use crate::hdf5_io::{dataset, open, read_string, sorted_members, TRANSFORM_GROUP_KEY};

    pub(super) fn read(path: &Path) -> Result<Vec<SpatialTransform>> {
        let file = open(path)?;
        if !file.link_exists(TRANSFORM_GROUP_KEY) {
            return Err(IoError::missing_key(path, TRANSFORM_GROUP_KEY));
        }
        let group = file.group(TRANSFORM_GROUP_KEY).map_err(|e| IoError::hdf5(path, e))?;
        let transforms = read_members(&group, TRANSFORM_GROUP_KEY, path)?;
        tracing::info!("Read {} transform(s) from {}", transforms.len(), path.display());
        Ok(transforms)
    }

    fn read_members(group: &Group, prefix: &str, path: &Path) -> Result<Vec<SpatialTransform>> {
        let mut transforms = Vec::new();
        for name in sorted_members(group, path)? {
            // Datasets beside the entries (e.g. a composite's own type) are not entries.
            let Ok(entry) = group.group(&name) else {
                continue;
            };
            let entry_path = format!("{prefix}/{name}");
            if let Some(transform) = read_entry(&entry, &entry_path, path)? {
                transforms.push(transform);
            }
        }
        Ok(transforms)
    }

    fn read_entry(entry: &Group, entry_path: &str, path: &Path) -> Result<Option<SpatialTransform>> {
        let tag_ds = dataset(entry, TRANSFORM_TYPE_KEY, path)?;
        let tag = read_string(&tag_ds)
            .ok_or_else(|| IoError::corrupt(path, format!("'{entry_path}/{TRANSFORM_TYPE_KEY}' is not a string")))?;
        let kind = TransformKind::from_tag(&tag).map_err(|e| IoError::transform(path, e))?;
        tracing::debug!("{} is {}", entry_path, kind);

        if kind == TransformKind::Composite {
            let nested = read_members(entry, entry_path, path)?;
            if nested.is_empty() {
                tracing::debug!("{} is a composite header; components follow as siblings", entry_path);
                return Ok(None);
            }
            return Ok(Some(SpatialTransform::Composite(CompositeTransform::new(nested))));
        }

        let mut params = read_values(entry, TRANSFORM_PARAMETERS_KEY, path)?;
        if kind == TransformKind::Affine
            && params.len() == PLAIN_PARAMETER_COUNT
            && entry.link_exists(TRANSFORM_FIXED_PARAMETERS_KEY)
        {
            let center = read_values(entry, TRANSFORM_FIXED_PARAMETERS_KEY, path)?;
            if center.len() == 3 {
                params.extend_from_slice(&center);
            } else {
                tracing::warn!(
                    "{}/{} has {} values, expected 3; ignoring",
                    entry_path,
                    TRANSFORM_FIXED_PARAMETERS_KEY,
                    center.len()
                );
            }
        }

        SpatialTransform::from_parameters(kind, &params)
            .map(Some)
            .map_err(|e| IoError::transform(path, e))
    }

    fn read_values(entry: &Group, key: &str, path: &Path) -> Result<Vec<f64>> {
        dataset(entry, key, path)?
            .read_raw::<f64>()
            .map_err(|e| IoError::hdf5(path, e))
    }
}
