//! Error types for volume and transform operations.

use thiserror::Error;

/// Errors raised by the core volume, transform and resampling code.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A transform parameter vector has a length its layout does not allow.
    #[error("Invalid parameter length for {transform}: expected {expected}, got {actual}")]
    InvalidParameterLength {
        transform: String,
        expected: String,
        actual: usize,
    },

    /// A flattened displacement field cannot be reshaped to `(n, n, n, 3)`.
    #[error("Displacement field with {len} parameters is not a cubic (n, n, n, 3) grid")]
    NonCubicDisplacementField { len: usize },

    /// A transform tag with no handler.
    #[error("Unsupported transform type: {0}")]
    UnsupportedTransformType(String),

    /// A point falls outside the displacement field grid after truncation.
    #[error("Point {point:?} samples index {index:?} outside displacement field extent {extent:?}")]
    OutOfBoundsSample {
        point: [f64; 3],
        index: [i64; 3],
        extent: [usize; 3],
    },

    /// Array or tensor shapes disagree.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// The image direction matrix has no inverse.
    #[error("Direction matrix is singular")]
    SingularDirection,

    /// Interpolation or grid generation requested for an unsupported rank.
    #[error("Unsupported dimensionality: {0}")]
    UnsupportedDimension(usize),

    /// Tensor data could not be read back to the host.
    #[error("Tensor data error: {0}")]
    TensorData(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create an invalid parameter length error.
    pub fn invalid_parameter_length(
        transform: impl Into<String>,
        expected: impl Into<String>,
        actual: usize,
    ) -> Self {
        Self::InvalidParameterLength {
            transform: transform.into(),
            expected: expected.into(),
            actual,
        }
    }

    /// Create a tensor data error.
    pub fn tensor_data(msg: impl Into<String>) -> Self {
        Self::TensorData(msg.into())
    }
}
