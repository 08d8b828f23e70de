//! Dispatch table from stored transform type tags to transform kinds.

use crate::error::{CoreError, Result};

/// The transform families a stored tag can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    Affine,
    DisplacementField,
    Composite,
}

/// Exact tags and the kind each selects.
const EXACT_TAGS: &[(&str, TransformKind)] = &[
    ("CenteredAffineTransform_double_3_3", TransformKind::Affine),
    ("AffineTransform_double_3_3", TransformKind::Affine),
    ("DisplacementFieldTransform_double_3_3", TransformKind::DisplacementField),
];

/// Any tag with this prefix is a composite.
const COMPOSITE_PREFIX: &str = "CompositeTransform";

impl TransformKind {
    /// Resolve a stored tag. Trailing NUL padding and whitespace are ignored;
    /// anything not in the table is `UnsupportedTransformType`.
    pub fn from_tag(tag: &str) -> Result<Self> {
        let tag = tag.trim_end_matches('\0').trim();
        if let Some((_, kind)) = EXACT_TAGS.iter().find(|(name, _)| *name == tag) {
            return Ok(*kind);
        }
        if tag.starts_with(COMPOSITE_PREFIX) {
            return Ok(Self::Composite);
        }
        Err(CoreError::UnsupportedTransformType(tag.to_string()))
    }

    /// Canonical tag written for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Affine => "CenteredAffineTransform_double_3_3",
            Self::DisplacementField => "DisplacementFieldTransform_double_3_3",
            Self::Composite => "CompositeTransform_double_3",
        }
    }
}

impl std::fmt::Display for TransformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
