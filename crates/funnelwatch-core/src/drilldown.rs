//! # Root-Cause Drilldown
//!
//! Shapes the data behind the drilldown panel of an alert:
//! - Root-cause factors with their likelihood and impact share
//! - Segmentation of affected users (country, browser, traffic source)
//! - The latency series around the incident
//! - Related service logs
//!
//! and composes the plain-text incident report that gets filed as a ticket.

use crate::alert::Alert;
use crate::primitives::{REPORT_FACTOR_LIMIT, REPORT_LOG_LIMIT};
use crate::reliability::format_layer_name;
use crate::types::{Fraction, Layer, Likelihood, LogLevel, Severity, TimeRange};
use serde::{Deserialize, Serialize};

// =============================================================================
// ROOT CAUSES
// =============================================================================

/// One candidate explanation for an alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootCauseFactor {
    pub layer: Layer,
    pub cause: String,
    pub likelihood: Likelihood,
    pub evidence: String,
    /// Share of the impact attributed to this factor, 0-100.
    pub impact: u8,
}

impl RootCauseFactor {
    #[must_use]
    pub fn new(
        layer: Layer,
        cause: impl Into<String>,
        likelihood: Likelihood,
        evidence: impl Into<String>,
        impact: u8,
    ) -> Self {
        Self {
            layer,
            cause: cause.into(),
            likelihood,
            evidence: evidence.into(),
            impact: impact.min(100),
        }
    }
}

// =============================================================================
// SEGMENTATION
// =============================================================================

/// Affected users within one segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentBucket {
    pub name: String,
    pub affected: u64,
    pub total: u64,
}

impl SegmentBucket {
    #[must_use]
    pub fn new(name: impl Into<String>, affected: u64, total: u64) -> Self {
        Self {
            name: name.into(),
            affected,
            total,
        }
    }

    /// `affected / total` in tenths of a percent, rounded half up.
    ///
    /// `None` for an empty segment.
    #[must_use]
    pub const fn affected_rate_tenths(&self) -> Option<u64> {
        if self.total == 0 {
            return None;
        }
        Some(
            self.affected
                .saturating_mul(2_000)
                .saturating_add(self.total)
                / self.total.saturating_mul(2),
        )
    }

    /// Rate with one decimal, e.g. `12.1`.
    #[must_use]
    pub fn affected_rate_label(&self) -> Option<String> {
        self.affected_rate_tenths()
            .map(|tenths| format!("{}.{}", tenths / 10, tenths % 10))
    }
}

/// Affected users broken down three ways.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Segmentation {
    pub country: Vec<SegmentBucket>,
    pub browser: Vec<SegmentBucket>,
    #[serde(alias = "trafficSource")]
    pub traffic_source: Vec<SegmentBucket>,
}

/// A segment with its display rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatedSegment {
    pub name: String,
    pub affected: u64,
    pub total: u64,
    pub rate: Option<String>,
}

impl From<&SegmentBucket> for RatedSegment {
    fn from(bucket: &SegmentBucket) -> Self {
        Self {
            name: bucket.name.clone(),
            affected: bucket.affected,
            total: bucket.total,
            rate: bucket.affected_rate_label(),
        }
    }
}

/// [`Segmentation`] with rates attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatedSegmentation {
    pub country: Vec<RatedSegment>,
    pub browser: Vec<RatedSegment>,
    pub traffic_source: Vec<RatedSegment>,
}

impl Segmentation {
    #[must_use]
    pub fn rated(&self) -> RatedSegmentation {
        let rate = |buckets: &[SegmentBucket]| buckets.iter().map(RatedSegment::from).collect();
        RatedSegmentation {
            country: rate(&self.country),
            browser: rate(&self.browser),
            traffic_source: rate(&self.traffic_source),
        }
    }
}

// =============================================================================
// LATENCY AND LOGS
// =============================================================================

/// Baseline latency outside the spike.
pub const LATENCY_BASELINE_MS: u64 = 675;

/// Latency inside the spike.
pub const LATENCY_SPIKE_MS: u64 = 1_050;

/// SLA line drawn on the latency chart.
pub const LATENCY_THRESHOLD_MS: u64 = 800;

const SPIKE_START: Fraction = Fraction::new(30, 100);
const SPIKE_END: Fraction = Fraction::new(70, 100);

/// One sample of the latency chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyPoint {
    pub time: String,
    pub latency_ms: u64,
    pub threshold_ms: u64,
}

/// Latency around an incident: flat baseline with a spike over the
/// samples `[floor(0.3 n), floor(0.7 n))`.
#[must_use]
pub fn latency_series(range: TimeRange) -> Vec<LatencyPoint> {
    let count = range.sample_count();
    let spike = SPIKE_START.of(count)..SPIKE_END.of(count);

    (0..count)
        .map(|i| LatencyPoint {
            time: latency_label(range, i),
            latency_ms: if spike.contains(&i) {
                LATENCY_SPIKE_MS
            } else {
                LATENCY_BASELINE_MS
            },
            threshold_ms: LATENCY_THRESHOLD_MS,
        })
        .collect()
}

// The latency chart labels hourly samples `{i}h`, unlike the trend charts.
fn latency_label(range: TimeRange, index: usize) -> String {
    match range {
        TimeRange::Day => format!("{index}h"),
        TimeRange::Hour | TimeRange::Week | TimeRange::Month => range.sample_label(index),
    }
}

/// A service log line related to an incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Wall-clock time, `HH:MM:SS`.
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
    pub service: String,
}

// =============================================================================
// INCIDENT REPORT
// =============================================================================

/// Plain-text incident report for a ticket tracker.
pub struct IncidentReport;

impl IncidentReport {
    /// Compose the report for `alert`.
    ///
    /// Lists the first three factors and the first five log lines.
    #[must_use]
    pub fn compose(
        alert: &Alert,
        range: TimeRange,
        factors: &[RootCauseFactor],
        logs: &[LogEntry],
    ) -> String {
        let layer = alert
            .related_layer
            .map_or_else(|| "Unknown".to_string(), |layer| format_layer_name(layer.tag()));
        let detected = alert.timestamp.map_or_else(
            || "Unknown".to_string(),
            |at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );

        let mut lines = vec![
            "*Incident Details*".to_string(),
            format!("- *Name:* {}", alert.message),
            format!("- *Severity:* {}", alert.severity),
            format!("- *Affected Layer:* {layer}"),
            format!("- *Detected:* {detected}"),
            format!("- *Time Range:* {range}"),
            String::new(),
            "*Business Impact*".to_string(),
            Self::business_impact(alert.severity).to_string(),
            String::new(),
            "*Root Cause Analysis*".to_string(),
        ];

        lines.extend(
            factors
                .iter()
                .take(REPORT_FACTOR_LIMIT)
                .enumerate()
                .map(|(i, factor)| {
                    format!(
                        "{}. [{}] {}\n   Evidence: {}",
                        i.saturating_add(1),
                        factor.likelihood.tag().to_uppercase(),
                        factor.cause,
                        factor.evidence
                    )
                }),
        );

        lines.push(String::new());
        lines.push("*Related Logs*".to_string());
        lines.extend(logs.iter().take(REPORT_LOG_LIMIT).map(|log| {
            format!(
                "[{}] {}: {}",
                log.timestamp,
                log.level.tag().to_uppercase(),
                log.message
            )
        }));

        lines.push(String::new());
        lines.push("*Action Required*".to_string());
        lines.push(
            "Please investigate and resolve the root cause to restore normal service operation."
                .to_string(),
        );

        lines.join("\n")
    }

    #[must_use]
    pub const fn business_impact(severity: Severity) -> &'static str {
        match severity {
            Severity::Critical => "High - Service degradation affecting activations",
            Severity::Warning | Severity::Info => "Medium - Potential user experience impact",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
