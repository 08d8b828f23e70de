use std::fs;
use std::path::{Path, PathBuf};

use burn_ndarray::NdArray;
use ndarray::Array3;
use nifti::writer::WriterOptions;
use regkit_eval::{EvaluationConfig, Evaluator, MetricValue, Stage};

type B = NdArray<f32>;

/// A bright blob on a graded background, stored `[X, Y, Z]`.
fn phantom_xyz() -> Array3<f32> {
    Array3::from_shape_fn((8, 7, 6), |(x, y, z)| {
        let inside = (2..6).contains(&x) && (2..5).contains(&y) && (1..4).contains(&z);
        if inside {
            100.0 + (x + y + z) as f32
        } else if x == 0 {
            0.0
        } else {
            (x * y) as f32 * 0.5
        }
    })
}

fn write_nifti(path: &Path, volume: &Array3<f32>) {
    WriterOptions::new(path).write_nifti(volume).unwrap();
}

fn run(config: EvaluationConfig) -> Result<regkit_eval::EvaluationReport, regkit_eval::EvaluationError> {
    Evaluator::<B>::new(config, Default::default()).run()
}

fn value(report: &regkit_eval::EvaluationReport, key: &str) -> f64 {
    match report.result.get(key) {
        Some(MetricValue::Value(v)) => v,
        other => panic!("{key}: {other:?}"),
    }
}

#[test]
fn test_identical_volumes() {
    let dir = tempfile::tempdir().unwrap();
    let fixed = dir.path().join("fixed.nii");
    let warped = dir.path().join("warped.nii.gz");
    write_nifti(&fixed, &phantom_xyz());
    write_nifti(&warped, &phantom_xyz());

    let out = dir.path().join("outputs");
    let report = run(EvaluationConfig::new(&fixed, &warped).with_output_dir(&out).with_plot(true)).unwrap();

    assert!((value(&report, "DSC") - 1.0).abs() < 1e-9);
    assert!(value(&report, "HD95").abs() < 1e-9);
    assert!((value(&report, "IntensityCorrelation") - 1.0).abs() < 1e-6);
    assert_eq!(report.result.get("TRE_keypoints"), Some(MetricValue::NotApplicable));
    assert_eq!(report.result.get("TRE_landmarks"), Some(MetricValue::NotApplicable));

    assert_eq!(report.result_path.parent(), Some(out.as_path()));
    let name = report.result_path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("results_") && name.ends_with(".json"), "{name}");

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report.result_path).unwrap()).unwrap();
    assert_eq!(json["TRE_landmarks"], serde_json::json!("N/A"));
    assert!(json["DSC"].is_number());

    let figure = report.figure_path.unwrap();
    assert!(figure.exists());
}

#[test]
fn test_each_run_writes_a_new_record() {
    let dir = tempfile::tempdir().unwrap();
    let fixed = dir.path().join("fixed.nii");
    write_nifti(&fixed, &phantom_xyz());
    let config = EvaluationConfig::new(&fixed, &fixed).with_output_dir(dir.path().join("out"));

    let first = run(config.clone()).unwrap();
    let second = run(config).unwrap();
    assert_ne!(first.result_path, second.result_path);
    assert!(first.result_path.exists() && second.result_path.exists());
}

#[test]
fn test_ct_preprocessing_keeps_overlap() {
    let dir = tempfile::tempdir().unwrap();
    let fixed = dir.path().join("fixed.nii");
    write_nifti(&fixed, &phantom_xyz());

    let config = EvaluationConfig::new(&fixed, &fixed)
        .with_output_dir(dir.path())
        .with_preprocessing(regkit_eval::Preprocessing::Ct);
    let report = run(config).unwrap();
    // Every voxel maps above zero after the CT window.
    assert!((value(&report, "DSC") - 1.0).abs() < 1e-9);
}

#[test]
fn test_nan_voxel_fails_volume_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let fixed = dir.path().join("fixed.nii");
    let warped = dir.path().join("warped.nii");
    let mut with_nan = phantom_xyz();
    with_nan[[7, 0, 0]] = f32::NAN;
    write_nifti(&fixed, &phantom_xyz());
    write_nifti(&warped, &with_nan);

    let out = dir.path().join("out");
    let err = run(EvaluationConfig::new(&fixed, &warped).with_output_dir(&out)).unwrap_err();
    assert_eq!(err.stage, Stage::VolumeMetrics);
    assert!(err.to_string().contains("not finite"), "{err}");
    assert!(!out.exists());
}

#[test]
fn test_unsupported_warped_format_names_stage_and_file() {
    let dir = tempfile::tempdir().unwrap();
    let fixed = dir.path().join("fixed.nii");
    write_nifti(&fixed, &phantom_xyz());
    let warped = dir.path().join("warped.xyz");
    fs::write(&warped, b"not a volume").unwrap();

    let err = run(EvaluationConfig::new(&fixed, &warped).with_output_dir(dir.path())).unwrap_err();
    assert_eq!(err.stage, Stage::LoadWarped);
    assert_eq!(err.path.as_deref(), Some(warped.as_path()));
    assert!(err.to_string().contains("xyz"));
}

#[test]
fn test_transform_file_is_not_read_without_points() {
    let dir = tempfile::tempdir().unwrap();
    let fixed = dir.path().join("fixed.nii");
    write_nifti(&fixed, &phantom_xyz());
    let broken = dir.path().join("broken.h5");
    fs::write(&broken, b"not an archive").unwrap();

    let config = EvaluationConfig::new(&fixed, &fixed)
        .with_output_dir(dir.path())
        .with_transform_file(&broken);
    let report = run(config).unwrap();
    assert_eq!(report.result.get("TRE_keypoints"), Some(MetricValue::NotApplicable));
}

#[test]
fn test_points_without_transform_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = EvaluationConfig::new("a.nii", "b.nii")
        .with_output_dir(dir.path())
        .with_keypoints("kf.csv", "km.csv");
    let err = run(config).unwrap_err();
    assert_eq!(err.stage, Stage::Configure);
}

#[cfg(feature = "hdf5")]
mod with_archives {
    use super::*;
    use hdf5::types::VarLenUnicode;
    use hdf5::File;

    fn write_points(path: &Path, rows: &[[f64; 3]]) {
        let text: String = rows.iter().map(|r| format!("{},{},{}\n", r[0], r[1], r[2])).collect();
        fs::write(path, text).unwrap();
    }

    fn write_archive(path: &Path, warped_zyx: Option<&Array3<f32>>) {
        let file = File::create(path).unwrap();
        let entry = file.create_group("TransformGroup").unwrap().create_group("0").unwrap();
        let tag: VarLenUnicode = "AffineTransform_double_3_3".parse().unwrap();
        entry
            .new_dataset::<VarLenUnicode>()
            .create("TransformType")
            .unwrap()
            .write_scalar(&tag)
            .unwrap();
        let params = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 2.0, 3.0];
        entry
            .new_dataset::<f64>()
            .shape([12])
            .create("TransformParameters")
            .unwrap()
            .write_raw(&params[..])
            .unwrap();

        if let Some(volume) = warped_zyx {
            let flat: Vec<f32> = volume.iter().copied().collect();
            file.new_dataset::<f32>()
                .shape(volume.shape())
                .create("warped_image")
                .unwrap()
                .write_raw(flat.as_slice())
                .unwrap();
        }
    }

    fn inputs(dir: &Path) -> (PathBuf, PathBuf) {
        let fixed = dir.join("fixed.nii");
        write_nifti(&fixed, &phantom_xyz());
        let zyx = phantom_xyz().permuted_axes([2, 1, 0]).as_standard_layout().to_owned();
        let archive = dir.join("registration.hdf5");
        write_archive(&archive, Some(&zyx));
        (fixed, archive)
    }

    #[test]
    fn test_warped_archive_and_point_errors() {
        let dir = tempfile::tempdir().unwrap();
        let (fixed, archive) = inputs(dir.path());

        let moving = [[0.0, 0.0, 0.0], [1.5, 2.0, 3.0]];
        write_points(&dir.path().join("kp_moving.csv"), &moving);
        write_points(&dir.path().join("kp_fixed.csv"), &[[1.0, 2.0, 3.0], [2.5, 4.0, 6.0]]);
        write_points(&dir.path().join("lm_moving.csv"), &moving);
        write_points(&dir.path().join("lm_fixed.csv"), &[[4.0, 6.0, 3.0], [5.5, 8.0, 6.0]]);

        let config = EvaluationConfig::new(&fixed, &archive)
            .with_output_dir(dir.path().join("out"))
            .with_transform_file(&archive)
            .with_keypoints(dir.path().join("kp_fixed.csv"), dir.path().join("kp_moving.csv"))
            .with_landmarks(dir.path().join("lm_fixed.csv"), dir.path().join("lm_moving.csv"));
        let report = run(config).unwrap();

        assert!((value(&report, "DSC") - 1.0).abs() < 1e-9);
        assert!(value(&report, "TRE_keypoints").abs() < 1e-12);
        assert!((value(&report, "TRE_landmarks") - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_point_count_mismatch_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let (fixed, archive) = inputs(dir.path());
        write_points(&dir.path().join("kf.csv"), &[[0.0; 3], [1.0; 3]]);
        write_points(&dir.path().join("km.csv"), &[[0.0; 3]]);

        let config = EvaluationConfig::new(&fixed, &archive)
            .with_output_dir(dir.path())
            .with_transform_file(&archive)
            .with_keypoints(dir.path().join("kf.csv"), dir.path().join("km.csv"));
        let err = run(config).unwrap_err();
        assert_eq!(err.stage, Stage::PointMetrics);
    }

    #[test]
    fn test_archive_without_warped_image() {
        let dir = tempfile::tempdir().unwrap();
        let fixed = dir.path().join("fixed.nii");
        write_nifti(&fixed, &phantom_xyz());
        let archive = dir.path().join("transform_only.h5");
        write_archive(&archive, None);

        let err = run(EvaluationConfig::new(&fixed, &archive).with_output_dir(dir.path())).unwrap_err();
        assert_eq!(err.stage, Stage::LoadWarped);
        assert!(err.to_string().contains("warped_image"));
    }
}
