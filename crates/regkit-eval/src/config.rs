//! Evaluation run configuration.

use std::path::{Path, PathBuf};

use crate::preprocess::Preprocessing;

/// Default directory for result records and figures.
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// Corresponding point files: points in fixed space and in moving space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointFiles {
    pub fixed: PathBuf,
    pub moving: PathBuf,
}

/// Inputs and options for one evaluation run.
#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    /// Fixed (reference) volume.
    pub fixed: PathBuf,
    /// Warped volume produced by the registration tool.
    pub warped: PathBuf,
    /// Transform archive mapping moving points into fixed space.
    pub transform_file: Option<PathBuf>,
    pub keypoints: Option<PointFiles>,
    pub landmarks: Option<PointFiles>,
    pub output_dir: PathBuf,
    pub preprocessing: Preprocessing,
    /// Render the comparison figure next to the record.
    pub plot: bool,
}

impl EvaluationConfig {
    pub fn new(fixed: impl Into<PathBuf>, warped: impl Into<PathBuf>) -> Self {
        Self {
            fixed: fixed.into(),
            warped: warped.into(),
            transform_file: None,
            keypoints: None,
            landmarks: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            preprocessing: Preprocessing::None,
            plot: false,
        }
    }

    pub fn with_transform_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.transform_file = Some(path.into());
        self
    }

    pub fn with_keypoints(mut self, fixed: impl Into<PathBuf>, moving: impl Into<PathBuf>) -> Self {
        self.keypoints = Some(PointFiles {
            fixed: fixed.into(),
            moving: moving.into(),
        });
        self
    }

    pub fn with_landmarks(mut self, fixed: impl Into<PathBuf>, moving: impl Into<PathBuf>) -> Self {
        self.landmarks = Some(PointFiles {
            fixed: fixed.into(),
            moving: moving.into(),
        });
        self
    }

    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_preprocessing(mut self, mode: Preprocessing) -> Self {
        self.preprocessing = mode;
        self
    }

    pub fn with_plot(mut self, plot: bool) -> Self {
        self.plot = plot;
        self
    }

    /// Point files are only meaningful with a transform archive.
    pub fn validate(&self) -> Result<(), String> {
        if self.transform_file.is_none() && (self.keypoints.is_some() || self.landmarks.is_some()) {
            return Err("a transform file is required when point files are given".to_string());
        }
        Ok(())
    }
}
