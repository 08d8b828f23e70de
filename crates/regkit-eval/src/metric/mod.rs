//! Agreement metrics between a fixed volume and a warped volume, and between
//! corresponding point sets.

pub mod trait_;
pub mod dice;
pub mod distance_transform;
pub mod hausdorff;
pub mod correlation;
pub mod point_error;

pub use trait_::VolumeMetric;
pub use dice::{dice, DiceCoefficient};
pub use hausdorff::{hausdorff_95, Hausdorff95};
pub use correlation::{pearson_correlation, IntensityCorrelation};
pub use point_error::mean_point_distance;

/// The volume metrics every evaluation reports, in report order.
pub fn volume_metrics() -> Vec<Box<dyn VolumeMetric>> {
    vec![Box::new(DiceCoefficient), Box::new(Hausdorff95), Box::new(IntensityCorrelation)]
}
