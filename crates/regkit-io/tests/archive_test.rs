#![cfg(feature = "hdf5")]

use std::path::Path;

use burn_ndarray::NdArray;
use hdf5::types::VarLenUnicode;
use hdf5::{File, Group};
use regkit_core::spatial::{Point, PointSet};
use regkit_core::{apply_all, CoreError, SpatialTransform};
use regkit_io::inspect::EntryKind;
use regkit_io::{inspect_archive, read_transform_archive, read_volume, IoError};

type TestBackend = NdArray<f32>;

fn write_entry(parent: &Group, name: &str, tag: &str, params: Option<&[f64]>, fixed: Option<&[f64]>) -> Group {
    let group = parent.create_group(name).unwrap();
    let tag: VarLenUnicode = tag.parse().unwrap();
    group
        .new_dataset::<VarLenUnicode>()
        .create("TransformType")
        .unwrap()
        .write_scalar(&tag)
        .unwrap();
    for (key, values) in [("TransformParameters", params), ("TransformFixedParameters", fixed)] {
        if let Some(values) = values {
            group
                .new_dataset::<f64>()
                .shape([values.len()])
                .create(key)
                .unwrap()
                .write_raw(values)
                .unwrap();
        }
    }
    group
}

const SHIFT_12: [f64; 12] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 2.0, 3.0];

fn scale_about_center() -> Vec<f64> {
    let mut p = vec![2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0];
    p.extend_from_slice(&[1.0, 1.0, 1.0]);
    p
}

fn uniform_field(n: usize, d: [f64; 3]) -> Vec<f64> {
    (0..n * n * n).flat_map(|_| d).collect()
}

fn create(path: &Path) -> (File, Group) {
    let file = File::create(path).unwrap();
    let group = file.create_group("TransformGroup").unwrap();
    (file, group)
}

#[test]
fn test_itk_style_composite_header_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transform.hdf5");
    {
        let (_file, group) = create(&path);
        write_entry(&group, "0", "CompositeTransform_double_3_3", None, None);
        write_entry(&group, "1", "AffineTransform_double_3_3", Some(&SHIFT_12), None);
        write_entry(&group, "2", "DisplacementFieldTransform_double_3_3", Some(&uniform_field(8, [0.5, 0.0, 0.0])), None);
    }

    let transforms = read_transform_archive(&path).unwrap();
    assert_eq!(transforms.len(), 2);
    assert!(matches!(transforms[0], SpatialTransform::Affine(_)));
    assert!(matches!(transforms[1], SpatialTransform::DisplacementField(_)));

    let moved = apply_all(&transforms, &PointSet::from_rows(&[[0.0, 0.0, 0.0]])).unwrap();
    assert_eq!(moved.points()[0], Point::new([1.5, 2.0, 3.0]));
}

#[test]
fn test_nested_composite_is_expanded_in_numeric_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested.h5");
    {
        let (_file, group) = create(&path);
        let composite = write_entry(&group, "0", "CompositeTransform_double_3_3", None, None);
        // "10" must come after "2".
        write_entry(&composite, "10", "AffineTransform_double_3_3", Some(&SHIFT_12), None);
        write_entry(&composite, "2", "CenteredAffineTransform_double_3_3", Some(&scale_about_center()), None);
    }

    let transforms = read_transform_archive(&path).unwrap();
    assert_eq!(transforms.len(), 1);
    let SpatialTransform::Composite(composite) = &transforms[0] else {
        panic!("expected a composite");
    };
    assert_eq!(composite.len(), 2);

    // Scale about (1,1,1) first: 0 -> -1, then shift by (1,2,3).
    let p = transforms[0].transform_point(&Point::new([0.0, 0.0, 0.0])).unwrap();
    assert_eq!(p, Point::new([0.0, 1.0, 2.0]));
}

#[test]
fn test_fixed_parameters_supply_the_center() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("centered.hdf5");
    let params = [2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0];
    {
        let (_file, group) = create(&path);
        write_entry(&group, "0", "AffineTransform_double_3_3", Some(&params), Some(&[1.0, 1.0, 1.0]));
    }

    let transforms = read_transform_archive(&path).unwrap();
    let p = transforms[0].transform_point(&Point::new([3.0, 1.0, 0.0])).unwrap();
    assert_eq!(p, Point::new([5.0, 1.0, -1.0]));
}

#[test]
fn test_fixed_parameters_of_wrong_length_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("odd_center.hdf5");
    let params = [2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0, 1.0, 0.0, 0.0];
    {
        let (_file, group) = create(&path);
        write_entry(&group, "0", "AffineTransform_double_3_3", Some(&params), Some(&[1.0, 1.0]));
    }

    let transforms = read_transform_archive(&path).unwrap();
    let p = transforms[0].transform_point(&Point::new([3.0, 1.0, 0.0])).unwrap();
    assert_eq!(p, Point::new([7.0, 2.0, 0.0]));
}

#[test]
fn test_bad_affine_length() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.hdf5");
    {
        let (_file, group) = create(&path);
        write_entry(&group, "0", "AffineTransform_double_3_3", Some(&[1.0; 10]), None);
    }

    match read_transform_archive(&path) {
        Err(IoError::Transform {
            source: CoreError::InvalidParameterLength { actual, .. },
            ..
        }) => assert_eq!(actual, 10),
        other => panic!("unexpected result: {:?}", other.map(|t| t.len())),
    }
}

#[test]
fn test_unknown_tag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bspline.hdf5");
    {
        let (_file, group) = create(&path);
        write_entry(&group, "0", "BSplineTransform_double_3_3", Some(&[0.0; 3]), None);
    }

    match read_transform_archive(&path) {
        Err(IoError::Transform {
            source: CoreError::UnsupportedTransformType(tag),
            ..
        }) => assert_eq!(tag, "BSplineTransform_double_3_3"),
        other => panic!("unexpected result: {:?}", other.map(|t| t.len())),
    }
}

#[test]
fn test_missing_transform_group() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.hdf5");
    File::create(&path).unwrap();
    assert!(matches!(
        read_transform_archive(&path),
        Err(IoError::MissingKey { ref key, .. }) if key == "TransformGroup"
    ));
}

#[test]
fn test_inspect_lists_keys_and_transform_tree() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output.hdf5");
    {
        let (file, group) = create(&path);
        write_entry(&group, "0", "AffineTransform_double_3_3", Some(&SHIFT_12), None);
        file.new_dataset::<f32>()
            .shape([2, 2, 2])
            .create("warped_image")
            .unwrap()
            .write_raw(&[0.0f32; 8])
            .unwrap();
    }

    let summary = inspect_archive(&path).unwrap();
    assert_eq!(summary.keys, vec!["TransformGroup", "warped_image"]);
    let paths: Vec<&str> = summary.transform_group.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "TransformGroup/0",
            "TransformGroup/0/TransformParameters",
            "TransformGroup/0/TransformType",
        ]
    );
    assert_eq!(summary.transform_group[0].kind, EntryKind::Group);
    assert_eq!(summary.transform_group[1].shape, Some(vec![12]));

    let image = read_volume::<TestBackend>(&path, &Default::default()).unwrap();
    assert_eq!(image.shape(), [2, 2, 2]);
}
