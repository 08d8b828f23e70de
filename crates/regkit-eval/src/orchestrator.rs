//! End-to-end evaluation of one fixed/warped pair.

use std::path::{Path, PathBuf};

use burn::tensor::backend::Backend;
use regkit_core::{apply_all, resample_to_reference, Image, PointSet, SpatialTransform};
use regkit_io::{read_point_set, read_transform_archive, read_volume};

use crate::config::{EvaluationConfig, PointFiles};
use crate::error::{EvaluationError, Stage, StageError};
use crate::metric::{mean_point_distance, volume_metrics};
use crate::preprocess::preprocess;
use crate::result::{MetricResult, TRE_KEYPOINTS, TRE_LANDMARKS};
use crate::visualize::save_comparison;

type Result<T> = std::result::Result<T, EvaluationError>;

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub result: MetricResult,
    /// The persisted JSON record.
    pub result_path: PathBuf,
    pub figure_path: Option<PathBuf>,
}

/// Runs the evaluation pipeline described by an [`EvaluationConfig`].
///
/// Stages run in order and the first failure aborts the run:
/// load fixed, load warped, resample warped onto the fixed grid, preprocess,
/// volume metrics, point metrics (when a transform archive and point files
/// are given), persist, and optionally render the comparison figure.
pub struct Evaluator<B: Backend> {
    config: EvaluationConfig,
    device: B::Device,
}

impl<B: Backend> Evaluator<B> {
    pub fn new(config: EvaluationConfig, device: B::Device) -> Self {
        Self { config, device }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn run(&self) -> Result<EvaluationReport> {
        let config = &self.config;
        config
            .validate()
            .map_err(|msg| EvaluationError::new(Stage::Configure, StageError::Config(msg)))?;

        let fixed = self.load(Stage::LoadFixed, &config.fixed)?;
        let warped = self.load(Stage::LoadWarped, &config.warped)?;

        tracing::info!("Resampling warped volume {:?} onto fixed grid {:?}", warped.shape(), fixed.shape());
        let warped = resample_to_reference(&warped, &fixed).map_err(|e| EvaluationError::new(Stage::Resample, e))?;

        tracing::info!("Preprocessing intensities ({})", config.preprocessing);
        let fixed = preprocess(&fixed, config.preprocessing).map_err(|e| EvaluationError::new(Stage::Preprocess, e))?;
        let warped =
            preprocess(&warped, config.preprocessing).map_err(|e| EvaluationError::new(Stage::Preprocess, e))?;

        let fixed = fixed.to_array().map_err(|e| EvaluationError::new(Stage::VolumeMetrics, e))?;
        let warped = warped.to_array().map_err(|e| EvaluationError::new(Stage::VolumeMetrics, e))?;

        let mut result = MetricResult::new();
        for metric in volume_metrics() {
            let value = metric
                .compute(&fixed.view(), &warped.view())
                .map_err(|e| EvaluationError::new(Stage::VolumeMetrics, e))?;
            tracing::info!("{} = {:.5}", metric.name(), value);
            result.set(metric.name(), value);
        }

        let wants_points = config.keypoints.is_some() || config.landmarks.is_some();
        if let Some(transform_file) = config.transform_file.as_ref().filter(|_| wants_points) {
            let transforms = read_transform_archive(transform_file)
                .map_err(|e| EvaluationError::at(Stage::LoadTransform, transform_file, e))?;

            for (key, files) in [(TRE_KEYPOINTS, &config.keypoints), (TRE_LANDMARKS, &config.landmarks)] {
                if let Some(files) = files {
                    let tre = self.target_registration_error(&transforms, files)?;
                    tracing::info!("{} = {:.5}", key, tre);
                    result.set(key, tre);
                }
            }
        }

        let result_path = result
            .save(&config.output_dir)
            .map_err(|e| EvaluationError::at(Stage::Persist, &config.output_dir, e))?;

        let figure_path = if config.plot {
            let path = config.output_dir.join(format!("{}_comparison.png", result.file_stem()));
            save_comparison(&fixed.view(), &warped.view(), &path)
                .map_err(|e| EvaluationError::at(Stage::Visualize, &path, e))?;
            Some(path)
        } else {
            None
        };

        Ok(EvaluationReport {
            result,
            result_path,
            figure_path,
        })
    }

    fn load(&self, stage: Stage, path: &Path) -> Result<Image<B, 3>> {
        read_volume::<B>(path, &self.device).map_err(|e| EvaluationError::at(stage, path, e))
    }

    /// Map the moving points through every transform and compare with the
    /// fixed points.
    fn target_registration_error(&self, transforms: &[SpatialTransform], files: &PointFiles) -> Result<f64> {
        let fixed = load_points(&files.fixed)?;
        let moving = load_points(&files.moving)?;
        let moved = apply_all(transforms, &moving)
            .map_err(|e| EvaluationError::at(Stage::TransformPoints, &files.moving, e))?;
        mean_point_distance(&fixed, &moved).map_err(|e| EvaluationError::new(Stage::PointMetrics, e))
    }
}

fn load_points(path: &Path) -> Result<PointSet> {
    read_point_set(path).map_err(|e| EvaluationError::at(Stage::LoadPoints, path, e))
}
