//! Registration quality evaluation: agreement metrics between a fixed volume
//! and a warped volume, target registration error of transformed point
//! sets, and the pipeline that runs them and records the results.

pub mod error;
pub mod stats;
pub mod metric;
pub mod preprocess;
pub mod result;
pub mod config;
pub mod visualize;
pub mod orchestrator;

pub use config::{EvaluationConfig, PointFiles};
pub use error::{EvaluationError, MetricError, Stage};
pub use orchestrator::{EvaluationReport, Evaluator};
pub use preprocess::Preprocessing;
pub use result::{MetricResult, MetricValue};
