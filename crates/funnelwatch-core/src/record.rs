//! # Metric Records
//!
//! Raw records arrive as one flat shape with every field optional. Which
//! fields are populated decides what the record is:
//!
//! - `funnel_stage` present → a funnel observation
//! - `layer` and a non-empty `metric_name` present → a reliability observation
//! - neither → dropped without error
//!
//! Routing turns that convention into the [`MetricRecord`] sum type, so the
//! transformations downstream only ever see well-formed variants. A raw record
//! carrying both discriminators yields both variants, funnel first.

use crate::primitives::MAX_RECORDS;
use crate::types::{FunnelError, Layer, MetricStatus, Stage};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// =============================================================================
// RAW WIRE RECORD
// =============================================================================

/// A metric record exactly as the data source produces it.
///
/// Field names follow the data source (`snake_case`); the camelCase names
/// are accepted as aliases. A field whose value has the wrong type, or a tag
/// outside its enumeration, reads as absent instead of failing the record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawMetricRecord {
    #[serde(default, deserialize_with = "or_absent", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(
        default,
        alias = "stage",
        deserialize_with = "or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub funnel_stage: Option<Stage>,

    #[serde(
        default,
        alias = "conversionRate",
        deserialize_with = "or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub conversion_rate: Option<f64>,

    #[serde(
        default,
        alias = "dropOffRate",
        deserialize_with = "or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub drop_off_rate: Option<f64>,

    #[serde(
        default,
        alias = "comparisonDelta",
        deserialize_with = "or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub comparison_delta: Option<f64>,

    #[serde(default, deserialize_with = "or_absent", skip_serializing_if = "Option::is_none")]
    pub layer: Option<Layer>,

    #[serde(
        default,
        alias = "metricName",
        deserialize_with = "or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub metric_name: Option<String>,

    #[serde(
        default,
        alias = "targetValue",
        deserialize_with = "or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_value: Option<String>,

    #[serde(
        default,
        alias = "currentValue",
        deserialize_with = "or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_value: Option<f64>,

    #[serde(default, deserialize_with = "or_absent", skip_serializing_if = "Option::is_none")]
    pub status: Option<MetricStatus>,

    #[serde(default, deserialize_with = "or_absent", skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Read any JSON value; keep it only if it is a valid `T`.
///
/// Tags match exactly: `""`, `"Visitors"` and `" visitors "` are all absent.
fn or_absent<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

impl RawMetricRecord {
    /// Project the funnel-tagged part of this record, if it has one.
    #[must_use]
    pub fn funnel_observation(&self) -> Option<FunnelObservation> {
        let stage = self.funnel_stage?;
        Some(FunnelObservation {
            stage,
            count: count_from(self.current_value),
            conversion: self.conversion_rate.unwrap_or(0.0),
            drop_off: self.drop_off_rate.unwrap_or(0.0),
            delta: self.comparison_delta.unwrap_or(0.0),
            observed_at: self.timestamp,
        })
    }

    /// Project the reliability-tagged part of this record, if it has one.
    #[must_use]
    pub fn reliability_observation(&self) -> Option<ReliabilityObservation> {
        let layer = self.layer?;
        let metric_name = self.metric_name.as_deref().filter(|name| !name.is_empty())?;
        Some(ReliabilityObservation {
            layer,
            metric_name: metric_name.to_string(),
            target: self.target_value.clone().unwrap_or_default(),
            current: self.current_value.unwrap_or(0.0),
            unit: self.unit.clone().unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            observed_at: self.timestamp,
        })
    }
}

/// Counts are whole and non-negative. The cast saturates: NaN and negative
/// values become 0, fractions are truncated.
fn count_from(value: Option<f64>) -> u64 {
    value.map_or(0, |v| v as u64)
}

// =============================================================================
// ROUTED RECORDS
// =============================================================================

/// An observation of one funnel stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelObservation {
    pub stage: Stage,
    /// Users who reached this stage.
    pub count: u64,
    /// Percentage converted from the previous stage (0-100).
    pub conversion: f64,
    /// Percentage lost relative to the previous stage (0-100).
    pub drop_off: f64,
    /// Signed percentage change against the prior period.
    pub delta: f64,
    pub observed_at: Option<DateTime<Utc>>,
}

impl FunnelObservation {
    #[must_use]
    pub fn new(stage: Stage, count: u64, conversion: f64, drop_off: f64, delta: f64) -> Self {
        Self {
            stage,
            count,
            conversion,
            drop_off,
            delta,
            observed_at: None,
        }
    }
}

/// An observation of one reliability metric on one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityObservation {
    pub layer: Layer,
    pub metric_name: String,
    /// Human-readable threshold expression, e.g. `≥ 95%`.
    pub target: String,
    pub current: f64,
    pub unit: String,
    /// Health judgment made upstream; carried through untouched.
    pub status: MetricStatus,
    pub observed_at: Option<DateTime<Utc>>,
}

impl ReliabilityObservation {
    #[must_use]
    pub fn new(
        layer: Layer,
        metric_name: impl Into<String>,
        target: impl Into<String>,
        current: f64,
        unit: impl Into<String>,
        status: MetricStatus,
    ) -> Self {
        Self {
            layer,
            metric_name: metric_name.into(),
            target: target.into(),
            current,
            unit: unit.into(),
            status,
            observed_at: None,
        }
    }
}

/// A routed metric record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricRecord {
    Funnel(FunnelObservation),
    Reliability(ReliabilityObservation),
}

impl MetricRecord {
    #[must_use]
    pub fn as_funnel(&self) -> Option<&FunnelObservation> {
        match self {
            MetricRecord::Funnel(observation) => Some(observation),
            MetricRecord::Reliability(_) => None,
        }
    }

    #[must_use]
    pub fn as_reliability(&self) -> Option<&ReliabilityObservation> {
        match self {
            MetricRecord::Reliability(observation) => Some(observation),
            MetricRecord::Funnel(_) => None,
        }
    }
}

impl From<FunnelObservation> for MetricRecord {
    fn from(observation: FunnelObservation) -> Self {
        MetricRecord::Funnel(observation)
    }
}

impl From<ReliabilityObservation> for MetricRecord {
    fn from(observation: ReliabilityObservation) -> Self {
        MetricRecord::Reliability(observation)
    }
}

/// Route raw records into typed variants, preserving input order.
#[must_use]
pub fn route_records(raw: &[RawMetricRecord]) -> Vec<MetricRecord> {
    raw.iter()
        .flat_map(|record| {
            let funnel = record.funnel_observation().map(MetricRecord::Funnel);
            let reliability = record
                .reliability_observation()
                .map(MetricRecord::Reliability);
            funnel.into_iter().chain(reliability)
        })
        .collect()
}

/// Parse a JSON array of raw records.
///
/// Only a body that is not a JSON array, or a batch larger than
/// [`MAX_RECORDS`], is an error. An element that is not an object becomes an
/// empty record; routing drops it along with every other unroutable record.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<RawMetricRecord>, FunnelError> {
    let values: Vec<Value> =
        serde_json::from_slice(bytes).map_err(|e| FunnelError::InvalidRecord(e.to_string()))?;

    if values.len() > MAX_RECORDS {
        return Err(FunnelError::TooManyRecords(values.len(), MAX_RECORDS));
    }

    Ok(values
        .into_iter()
        .map(|value| serde_json::from_value(value).unwrap_or_default())
        .collect())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn funnel_record_routes_to_funnel_only() {
        let raw = RawMetricRecord {
            funnel_stage: Some(Stage::NextPage),
            conversion_rate: Some(82.0),
            current_value: Some(2471.0),
            ..Default::default()
        };

        let routed = route_records(&[raw]);
        assert_eq!(routed.len(), 1);
        let funnel = routed[0].as_funnel().expect("funnel");
        assert_eq!(funnel.stage, Stage::NextPage);
        assert_eq!(funnel.count, 2471);
        assert_eq!(funnel.drop_off, 0.0);
    }

    #[test]
    fn reliability_record_requires_layer_and_metric_name() {
        let missing_name = RawMetricRecord {
            layer: Some(Layer::Server),
            current_value: Some(96.5),
            ..Default::default()
        };
        let empty_name = RawMetricRecord {
            layer: Some(Layer::Server),
            metric_name: Some(String::new()),
            ..Default::default()
        };
        let missing_layer = RawMetricRecord {
            metric_name: Some("Latency".to_string()),
            ..Default::default()
        };

        assert!(route_records(&[missing_name, empty_name, missing_layer]).is_empty());
    }

    #[test]
    fn record_with_both_discriminators_routes_twice() {
        let raw = RawMetricRecord {
            funnel_stage: Some(Stage::Activation),
            layer: Some(Layer::Provider),
            metric_name: Some("Phone Validation Error Rate".to_string()),
            ..Default::default()
        };

        let routed = route_records(&[raw]);
        assert_eq!(routed.len(), 2);
        assert!(routed[0].as_funnel().is_some());
        assert!(routed[1].as_reliability().is_some());
    }

    #[test]
    fn missing_reliability_fields_default() {
        let raw = RawMetricRecord {
            layer: Some(Layer::Client),
            metric_name: Some("User Response Success".to_string()),
            ..Default::default()
        };

        let observation = raw.reliability_observation().expect("reliability");
        assert_eq!(observation.target, "");
        assert_eq!(observation.unit, "");
        assert_eq!(observation.current, 0.0);
        assert_eq!(observation.status, MetricStatus::Healthy);
    }

    #[test]
    fn negative_count_saturates_to_zero() {
        assert_eq!(count_from(Some(-12.0)), 0);
        assert_eq!(count_from(Some(f64::NAN)), 0);
        assert_eq!(count_from(Some(96.9)), 96);
        assert_eq!(count_from(None), 0);
    }

    #[test]
    fn parse_accepts_wire_and_camel_case_names() {
        let json = br#"[
            {"timestamp": "2026-01-05T10:00:00Z", "funnel_stage": "visitors", "current_value": 3014},
            {"stage": "activation", "conversionRate": 5.1, "dropOffRate": 94.9, "currentValue": 96},
            {"layer": "data_quality", "metricName": "Event Completeness & Accuracy", "status": "healthy"}
        ]"#;

        let records = parse_records(json).expect("parse");
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].funnel_stage, Some(Stage::Visitors));
        assert!(records[0].timestamp.is_some());
        assert_eq!(records[1].funnel_stage, Some(Stage::Activation));
        assert_eq!(records[1].conversion_rate, Some(5.1));
        assert_eq!(records[2].layer, Some(Layer::DataQuality));
    }

    #[test]
    fn blank_stage_is_absent() {
        let records = parse_records(br#"[{"funnel_stage": "", "current_value": 10}]"#)
            .expect("parse");
        assert_eq!(records[0].funnel_stage, None);
        assert!(route_records(&records).is_empty());
    }

    #[test]
    fn unknown_stage_drops_only_that_record() {
        let records = parse_records(
            br#"[{"funnel_stage": "visitors", "current_value": 3014},
                 {"funnel_stage": "checkout", "current_value": 12}]"#,
        )
        .expect("parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].funnel_stage, None);

        let routed = route_records(&records);
        assert_eq!(routed.len(), 1);
        assert_eq!(routed[0].as_funnel().expect("funnel").count, 3014);
    }

    #[test]
    fn tags_match_exactly() {
        let records = parse_records(
            br#"[{"funnel_stage": " visitors "}, {"funnel_stage": "Visitors"},
                 {"layer": "Server", "metric_name": "Latency"}]"#,
        )
        .expect("parse");
        assert!(route_records(&records).is_empty());
    }

    #[test]
    fn non_numeric_values_default_to_zero() {
        let records = parse_records(
            br#"[{"funnel_stage": "next_page", "conversion_rate": "n/a",
                  "drop_off_rate": null, "comparison_delta": true, "current_value": "2471"}]"#,
        )
        .expect("parse");
        let funnel = records[0].funnel_observation().expect("funnel");
        assert_eq!(funnel.stage, Stage::NextPage);
        assert_eq!(funnel.count, 0);
        assert_eq!(funnel.conversion, 0.0);
        assert_eq!(funnel.drop_off, 0.0);
        assert_eq!(funnel.delta, 0.0);
    }

    #[test]
    fn unknown_status_and_bad_timestamp_are_absent() {
        let records = parse_records(
            br#"[{"timestamp": "yesterday", "layer": "client", "metric_name": "User Response Success",
                  "status": "degraded", "unit": 5}]"#,
        )
        .expect("parse");
        assert_eq!(records[0].timestamp, None);
        let observation = records[0].reliability_observation().expect("reliability");
        assert_eq!(observation.status, MetricStatus::Healthy);
        assert_eq!(observation.unit, "");
    }

    #[test]
    fn non_object_elements_are_dropped() {
        let records = parse_records(br#"[1, "x", null, {"funnel_stage": "activation"}]"#)
            .expect("parse");
        assert_eq!(records.len(), 4);
        assert_eq!(route_records(&records).len(), 1);
    }

    #[test]
    fn non_array_body_is_an_error() {
        let result = parse_records(br#"{"funnel_stage": "visitors"}"#);
        assert!(matches!(result, Err(FunnelError::InvalidRecord(_))));
    }
}
