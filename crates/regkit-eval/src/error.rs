//! Error types for metrics and evaluation runs.

use std::fmt;
use std::path::{Path, PathBuf};

use regkit_core::CoreError;
use regkit_io::IoError;
use thiserror::Error;

/// Errors raised by metric computations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    /// Volume inputs differ in shape.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// One mask has foreground and the other has none.
    #[error("The {0} mask is empty while the other is not")]
    EmptyMask(&'static str),

    /// Correlation is undefined for an input with zero variance.
    #[error("The {0} input is constant; correlation is undefined")]
    ConstantInput(&'static str),

    /// An input holds NaN or infinite values, or the metric came out non-finite.
    #[error("The {0} is not finite")]
    NonFinite(&'static str),

    #[error("Point count mismatch: {expected} fixed points, {actual} moved points")]
    PointCountMismatch { expected: usize, actual: usize },

    #[error("Point sets are empty")]
    EmptyPointSet,
}

/// Result type for metric computations.
pub type Result<T> = std::result::Result<T, MetricError>;

impl MetricError {
    pub fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}

/// Pipeline stage an evaluation failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Configure,
    LoadFixed,
    LoadWarped,
    Resample,
    Preprocess,
    VolumeMetrics,
    LoadTransform,
    LoadPoints,
    TransformPoints,
    PointMetrics,
    Persist,
    Visualize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Configure => "configuration",
            Self::LoadFixed => "loading the fixed volume",
            Self::LoadWarped => "loading the warped volume",
            Self::Resample => "resampling",
            Self::Preprocess => "intensity preprocessing",
            Self::VolumeMetrics => "volume metrics",
            Self::LoadTransform => "loading the transform archive",
            Self::LoadPoints => "loading a point set",
            Self::TransformPoints => "transforming points",
            Self::PointMetrics => "point metrics",
            Self::Persist => "writing results",
            Self::Visualize => "rendering the comparison figure",
        };
        f.write_str(name)
    }
}

/// Underlying cause of a failed stage.
#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Metric(#[from] MetricError),
    #[error("{0}")]
    Output(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Figure(#[from] image::ImageError),
    #[error("{0}")]
    Config(String),
}

/// A failed evaluation run: the stage, the file involved if any, and the cause.
#[derive(Error, Debug)]
#[error("{stage} failed{}: {source}", .path.as_ref().map(|p| format!(" for {}", p.display())).unwrap_or_default())]
pub struct EvaluationError {
    pub stage: Stage,
    pub path: Option<PathBuf>,
    #[source]
    pub source: StageError,
}

impl EvaluationError {
    pub fn new(stage: Stage, source: impl Into<StageError>) -> Self {
        Self {
            stage,
            path: None,
            source: source.into(),
        }
    }

    pub fn at(stage: Stage, path: &Path, source: impl Into<StageError>) -> Self {
        Self {
            stage,
            path: Some(path.to_path_buf()),
            source: source.into(),
        }
    }
}
