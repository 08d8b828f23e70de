use ndarray::Array3;
use proptest::prelude::*;
use regkit_eval::metric::{dice, hausdorff_95, mean_point_distance};
use regkit_core::PointSet;

fn volume(values: Vec<f32>) -> Array3<f32> {
    Array3::from_shape_vec((3, 4, 5), values).unwrap()
}

fn voxels() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(prop_oneof![Just(0.0f32), -2.0f32..2.0], 60)
}

proptest! {
    #[test]
    fn test_dice_symmetric_and_bounded(a in voxels(), b in voxels()) {
        let (a, b) = (volume(a), volume(b));
        let ab = dice(&a.view(), &b.view()).unwrap();
        let ba = dice(&b.view(), &a.view()).unwrap();
        prop_assert_eq!(ab, ba);
        prop_assert!((0.0..=1.0).contains(&ab));
    }

    #[test]
    fn test_dice_identity(a in voxels()) {
        let a = volume(a);
        let d = dice(&a.view(), &a.view()).unwrap();
        if a.iter().any(|&v| v > 0.0) {
            prop_assert_eq!(d, 1.0);
        } else {
            prop_assert_eq!(d, 0.0);
        }
    }

    #[test]
    fn test_hd95_symmetric(a in voxels(), b in voxels()) {
        let (a, b) = (volume(a), volume(b));
        match (hausdorff_95(&a.view(), &b.view()), hausdorff_95(&b.view(), &a.view())) {
            (Ok(ab), Ok(ba)) => prop_assert_eq!(ab, ba),
            (Err(_), Err(_)) => {}
            (ab, ba) => prop_assert!(false, "asymmetric outcome: {:?} vs {:?}", ab, ba),
        }
    }

    #[test]
    fn test_tre_constant_offset(
        rows in prop::collection::vec(prop::array::uniform3(-100.0f64..100.0), 1..20),
        offset in prop::array::uniform3(-10.0f64..10.0),
    ) {
        let fixed = PointSet::from_rows(&rows);
        let shifted: Vec<[f64; 3]> = rows
            .iter()
            .map(|r| [r[0] + offset[0], r[1] + offset[1], r[2] + offset[2]])
            .collect();
        let moved = PointSet::from_rows(&shifted);

        let expected = (offset[0].powi(2) + offset[1].powi(2) + offset[2].powi(2)).sqrt();
        let tre = mean_point_distance(&fixed, &moved).unwrap();
        prop_assert!((tre - expected).abs() < 1e-9, "{} vs {}", tre, expected);
        prop_assert_eq!(mean_point_distance(&fixed, &fixed).unwrap(), 0.0);
    }
}
