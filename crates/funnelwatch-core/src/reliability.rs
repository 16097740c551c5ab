//! # Reliability Transformation
//!
//! Turns routed records into the reliability-by-layer table. One row per
//! reliability observation, in input order, with no deduplication. The
//! status is the upstream judgment, carried through untouched.

use crate::record::{MetricRecord, ReliabilityObservation};
use crate::types::MetricStatus;
use serde::Serialize;
use std::borrow::Cow;

/// One row of the reliability table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReliabilityMetricView {
    /// Layer display name, e.g. `Data Quality`.
    pub layer: Cow<'static, str>,
    pub metric: Cow<'static, str>,
    pub target: Cow<'static, str>,
    pub current: f64,
    pub unit: Cow<'static, str>,
    pub status: MetricStatus,
}

impl ReliabilityMetricView {
    #[must_use]
    pub fn from_observation(observation: &ReliabilityObservation) -> Self {
        Self {
            layer: Cow::Owned(format_layer_name(observation.layer.tag())),
            metric: Cow::Owned(observation.metric_name.clone()),
            target: Cow::Owned(observation.target.clone()),
            current: observation.current,
            unit: Cow::Owned(observation.unit.clone()),
            status: observation.status,
        }
    }

    const fn fixed(
        layer: &'static str,
        metric: &'static str,
        target: &'static str,
        current: f64,
        status: MetricStatus,
    ) -> Self {
        Self {
            layer: Cow::Borrowed(layer),
            metric: Cow::Borrowed(metric),
            target: Cow::Borrowed(target),
            current,
            unit: Cow::Borrowed("%"),
            status,
        }
    }
}

/// Reliability table shown when no reliability observation is available.
pub const FALLBACK_RELIABILITY_METRICS: [ReliabilityMetricView; 4] = [
    ReliabilityMetricView::fixed(
        "Client",
        "User Response Success",
        "≥ 95%",
        92.5,
        MetricStatus::Warning,
    ),
    ReliabilityMetricView::fixed(
        "Server",
        "Validation Request Success Rate",
        "≥ 98%",
        96.5,
        MetricStatus::Warning,
    ),
    ReliabilityMetricView::fixed(
        "Provider",
        "Phone Validation Error Rate",
        "< 3%",
        15.0,
        MetricStatus::Critical,
    ),
    ReliabilityMetricView::fixed(
        "Data Quality",
        "Event Completeness & Accuracy",
        "≥ 99.5%",
        99.8,
        MetricStatus::Healthy,
    ),
];

/// Convert an underscore-separated tag to space-separated title case.
///
/// `data_quality` → `Data Quality`. Only the first character of each
/// segment changes; the rest is kept as written.
#[must_use]
pub fn format_layer_name(tag: &str) -> String {
    tag.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the reliability table from a list of routed records.
#[must_use]
pub fn transform_reliability_metrics(records: &[MetricRecord]) -> Vec<ReliabilityMetricView> {
    let rows: Vec<ReliabilityMetricView> = records
        .iter()
        .filter_map(MetricRecord::as_reliability)
        .map(ReliabilityMetricView::from_observation)
        .collect();

    if rows.is_empty() {
        return FALLBACK_RELIABILITY_METRICS.to_vec();
    }

    rows
}

// =============================================================================
// TESTS
// =============================================================================
