//! Aggregated metric values of one evaluation run and their JSON record.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

pub const DSC: &str = "DSC";
pub const HD95: &str = "HD95";
pub const INTENSITY_CORRELATION: &str = "IntensityCorrelation";
pub const TRE_KEYPOINTS: &str = "TRE_keypoints";
pub const TRE_LANDMARKS: &str = "TRE_landmarks";

/// Every key a result record carries, in report order.
pub const METRIC_KEYS: [&str; 5] = [DSC, HD95, INTENSITY_CORRELATION, TRE_KEYPOINTS, TRE_LANDMARKS];

const NOT_APPLICABLE: &str = "N/A";

/// A metric value, or a marker that its inputs were not supplied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Value(f64),
    NotApplicable,
}

impl MetricValue {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::NotApplicable => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v:.5}"),
            Self::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) if !v.is_finite() => Err(S::Error::custom(format!("non-finite metric value {v}"))),
            Self::Value(v) => serializer.serialize_f64(*v),
            Self::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}

impl<'de> Deserialize<'de> for MetricValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MetricValueVisitor;

        impl Visitor<'_> for MetricValueVisitor {
            type Value = MetricValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number or \"N/A\"")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<MetricValue, E> {
                Ok(MetricValue::Value(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<MetricValue, E> {
                Ok(MetricValue::Value(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<MetricValue, E> {
                Ok(MetricValue::Value(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<MetricValue, E> {
                if v == NOT_APPLICABLE {
                    Ok(MetricValue::NotApplicable)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }
        }

        deserializer.deserialize_any(MetricValueVisitor)
    }
}

/// Metric name to value, plus the run identity used to name the record.
#[derive(Debug, Clone)]
pub struct MetricResult {
    run_id: Uuid,
    timestamp: DateTime<Local>,
    values: BTreeMap<String, MetricValue>,
}

impl MetricResult {
    /// A fresh run with every known metric marked not applicable.
    pub fn new() -> Self {
        Self::with_identity(Uuid::new_v4(), Local::now())
    }

    pub fn with_identity(run_id: Uuid, timestamp: DateTime<Local>) -> Self {
        let values = METRIC_KEYS
            .iter()
            .map(|k| (k.to_string(), MetricValue::NotApplicable))
            .collect();
        Self {
            run_id,
            timestamp,
            values,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), MetricValue::Value(value));
    }

    pub fn get(&self, name: &str) -> Option<MetricValue> {
        self.values.get(name).copied()
    }

    pub fn values(&self) -> &BTreeMap<String, MetricValue> {
        &self.values
    }

    /// `results_<YYYYMMDD_HHMMSS>_<first 8 hex digits of the run id>`
    pub fn file_stem(&self) -> String {
        let id = self.run_id.simple().to_string();
        format!("results_{}_{}", self.timestamp.format("%Y%m%d_%H%M%S"), &id[..8])
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.file_stem())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.values)
    }

    /// Write the record into `dir`, creating it if needed. Returns the file path.
    pub fn save(&self, dir: &Path) -> std::io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        let json = self.to_json().map_err(std::io::Error::other)?;
        fs::write(&path, json)?;
        tracing::info!("Results saved to {}", path.display());
        Ok(path)
    }
}

impl Default for MetricResult {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for MetricResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

impl fmt::Display for MetricResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Aggregated Results:")?;
        for (name, value) in &self.values {
            writeln!(f, "{name:<22}: {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_identity() -> MetricResult {
        let id = Uuid::parse_str("0123abcd-0000-4000-8000-000000000000").unwrap();
        let ts = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        MetricResult::with_identity(id, ts)
    }

    #[test]
    fn test_unset_metrics_are_not_applicable() {
        let mut result = fixed_identity();
        result.set(DSC, 0.75);
        let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(json["DSC"], serde_json::json!(0.75));
        assert_eq!(json["TRE_landmarks"], serde_json::json!("N/A"));
        assert_eq!(json.as_object().unwrap().len(), METRIC_KEYS.len());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(fixed_identity().file_name(), "results_20240309_140507_0123abcd.json");
    }

    #[test]
    fn test_value_round_trip() {
        let values: BTreeMap<String, MetricValue> = serde_json::from_str(r#"{"a": 1, "b": 0.5, "c": "N/A"}"#).unwrap();
        assert_eq!(values["a"], MetricValue::Value(1.0));
        assert_eq!(values["b"], MetricValue::Value(0.5));
        assert_eq!(values["c"], MetricValue::NotApplicable);
        assert!(serde_json::from_str::<MetricValue>(r#""n/a""#).is_err());
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/outputs");
        let result = fixed_identity();
        let path = result.save(&out).unwrap();
        assert_eq!(path, out.join("results_20240309_140507_0123abcd.json"));
        assert!(std::fs::read_to_string(path).unwrap().contains("\"HD95\": \"N/A\""));
    }

    #[test]
    fn test_display() {
        let mut result = fixed_identity();
        result.set(HD95, 2.0);
        let text = result.to_string();
        assert!(text.contains("HD95                  : 2.00000"));
        assert!(text.contains("TRE_keypoints         : N/A"));
    }

    #[test]
    fn test_non_finite_value_is_not_written_as_null() {
        let mut result = fixed_identity();
        result.set(INTENSITY_CORRELATION, f64::NAN);
        let err = result.to_json().unwrap_err();
        assert!(err.to_string().contains("non-finite"), "{err}");
    }
}
