//! # Core Type Definitions
//!
//! This module contains the closed enumerations shared by every view in the
//! dashboard, plus the error type:
//! - Funnel stages (`Stage`) and system layers (`Layer`)
//! - Health vocabularies (`MetricStatus`, `Severity`, `Likelihood`, `LogLevel`)
//! - Reporting windows (`TimeRange`)
//! - Error types (`FunnelError`)
//!
//! ## Exhaustive Tables
//!
//! Every lookup keyed by one of these enums (display name, color token,
//! tooltip, sample count) is a `match`. Adding a variant without a table
//! entry does not compile, so there is no runtime "unknown tag" fallback.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// FUNNEL STAGE
// =============================================================================

/// One step of the onboarding funnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Visitors,
    NextPage,
    PhoneCollected,
    Activation,
}

impl Stage {
    /// All stages in canonical funnel order.
    pub const CANONICAL: [Stage; 4] = [
        Stage::Visitors,
        Stage::NextPage,
        Stage::PhoneCollected,
        Stage::Activation,
    ];

    /// Wire tag for this stage.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Stage::Visitors => "visitors",
            Stage::NextPage => "next_page",
            Stage::PhoneCollected => "phone_collected",
            Stage::Activation => "activation",
        }
    }

    /// Human-readable stage name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Stage::Visitors => "Visitors",
            Stage::NextPage => "Next Page",
            Stage::PhoneCollected => "Phone Collected",
            Stage::Activation => "Activation",
        }
    }

    /// Color token used by the funnel bars.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Stage::Visitors => "bg-blue-500",
            Stage::NextPage => "bg-indigo-500",
            Stage::PhoneCollected => "bg-purple-500",
            Stage::Activation => "bg-violet-500",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Stage {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::CANONICAL
            .into_iter()
            .find(|stage| stage.tag() == s)
            .ok_or_else(|| FunnelError::UnknownTag {
                kind: "stage",
                tag: s.to_string(),
            })
    }
}

// =============================================================================
// SYSTEM LAYER
// =============================================================================

/// A system tier that a reliability metric is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Client,
    Server,
    Provider,
    DataQuality,
}

impl Layer {
    pub const ALL: [Layer; 4] = [
        Layer::Client,
        Layer::Server,
        Layer::Provider,
        Layer::DataQuality,
    ];

    /// Wire tag for this layer.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Layer::Client => "client",
            Layer::Server => "server",
            Layer::Provider => "provider",
            Layer::DataQuality => "data_quality",
        }
    }

    /// Explanation of what the layer's headline metric measures.
    #[must_use]
    pub const fn tooltip(&self) -> &'static str {
        match self {
            Layer::Client => "Percentage of users who received a system response within 2 seconds.",
            Layer::Server => {
                "Percentage of backend phone validation requests successfully processed, including retries."
            }
            Layer::Provider => {
                "In the last hour, ~15% of phone validation API requests failed due to provider instability."
            }
            Layer::DataQuality => {
                "Percentage of tracking events successfully recorded without delay or duplication."
            }
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Layer {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layer::ALL
            .into_iter()
            .find(|layer| layer.tag() == s)
            .ok_or_else(|| FunnelError::UnknownTag {
                kind: "layer",
                tag: s.to_string(),
            })
    }
}

// =============================================================================
// STATUS VOCABULARIES
// =============================================================================

/// Health judgment attached to a single metric.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum MetricStatus {
    #[default]
    Healthy,
    Warning,
    Critical,
}

impl MetricStatus {
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            MetricStatus::Healthy => "healthy",
            MetricStatus::Warning => "warning",
            MetricStatus::Critical => "critical",
        }
    }
}

impl fmt::Display for MetricStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Severity of an alert or a recurring error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// How likely a root-cause factor is to explain an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Likelihood {
    High,
    Medium,
    Low,
}

impl Likelihood {
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Likelihood::High => "high",
            Likelihood::Medium => "medium",
            Likelihood::Low => "low",
        }
    }
}

/// Level of a service log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    Warning,
    Info,
}

impl LogLevel {
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
        }
    }
}

// =============================================================================
// TIME RANGE
// =============================================================================

/// Reporting window selectable on the dashboard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum TimeRange {
    #[serde(rename = "1h")]
    Hour,
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::Hour,
        TimeRange::Day,
        TimeRange::Week,
        TimeRange::Month,
    ];

    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            TimeRange::Hour => "1h",
            TimeRange::Day => "24h",
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
        }
    }

    /// Number of chart samples drawn for this window.
    ///
    /// 1h is sampled every 5 minutes, 24h hourly, 7d and 30d daily.
    #[must_use]
    pub const fn sample_count(&self) -> usize {
        match self {
            TimeRange::Hour => 12,
            TimeRange::Day => 24,
            TimeRange::Week => 7,
            TimeRange::Month => 30,
        }
    }

    /// Axis label of the sample at `index`.
    #[must_use]
    pub fn sample_label(&self, index: usize) -> String {
        match self {
            TimeRange::Hour => format!("{}m", index.saturating_mul(5)),
            TimeRange::Day => format!("{}:00", index),
            TimeRange::Week | TimeRange::Month => format!("Day {}", index.saturating_add(1)),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for TimeRange {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|range| range.tag() == s)
            .ok_or_else(|| FunnelError::UnknownTimeRange(s.to_string()))
    }
}

// =============================================================================
// FRACTION OF A WINDOW
// =============================================================================

/// A rational position within a window of samples, e.g. 45/100.
///
/// Sample windows are placed at fractions of the sample count; keeping the
/// fraction rational keeps every boundary check in integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Fraction {
    num: usize,
    den: usize,
}

impl Fraction {
    pub(crate) const fn new(num: usize, den: usize) -> Self {
        Self { num, den }
    }

    /// `floor(count * self)`.
    pub(crate) const fn of(self, count: usize) -> usize {
        count.saturating_mul(self.num) / self.den
    }

    /// `index > count * self`, exact.
    pub(crate) const fn is_below(self, index: usize, count: usize) -> bool {
        index.saturating_mul(self.den) > count.saturating_mul(self.num)
    }

    /// `index < count * self`, exact.
    pub(crate) const fn is_above(self, index: usize, count: usize) -> bool {
        index.saturating_mul(self.den) < count.saturating_mul(self.num)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the funnelwatch system.
///
/// The transformations themselves never fail. Errors come from the layers
/// around them: parsing input, fetching, configuration, and I/O.
#[derive(Debug, Error)]
pub enum FunnelError {
    /// A metric record could not be parsed.
    #[error("Invalid metric record: {0}")]
    InvalidRecord(String),

    /// A closed-enumeration tag was not recognised.
    #[error("Unknown {kind} tag: {tag:?}")]
    UnknownTag { kind: &'static str, tag: String },

    /// The input batch is larger than the accepted maximum.
    #[error("Record count {0} exceeds maximum {1}")]
    TooManyRecords(usize, usize),

    /// An activation sample has no activations at all.
    #[error("Impact sample for {0} has zero total activations")]
    EmptyImpactSample(TimeRange),

    /// The requested reporting window does not exist.
    #[error("Unknown time range: {0:?}")]
    UnknownTimeRange(String),

    /// The requested alert does not exist.
    #[error("Alert not found: {0}")]
    AlertNotFound(u64),

    /// A data source call kept failing until the retry budget was spent.
    #[error("Fetch of {what} failed after {attempts} attempts: {reason}")]
    FetchFailed {
        what: &'static str,
        attempts: u32,
        reason: String,
    },

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_tags_round_trip_through_from_str() {
        for stage in Stage::CANONICAL {
            assert_eq!(stage.tag().parse::<Stage>().expect("parse"), stage);
        }
    }

    #[test]
    fn unknown_stage_tag_is_rejected() {
        let err = "checkout".parse::<Stage>().expect_err("unknown");
        assert!(matches!(err, FunnelError::UnknownTag { kind: "stage", .. }));
    }

    #[test]
    fn stage_serializes_as_snake_case_tag() {
        let json = serde_json::to_string(&Stage::PhoneCollected).expect("serialize");
        assert_eq!(json, "\"phone_collected\"");
    }

    #[test]
    fn layer_from_str() {
        assert_eq!("data_quality".parse::<Layer>().expect("parse"), Layer::DataQuality);
        assert!("database".parse::<Layer>().is_err());
    }

    #[test]
    fn time_range_sample_counts() {
        assert_eq!(TimeRange::Hour.sample_count(), 12);
        assert_eq!(TimeRange::Day.sample_count(), 24);
        assert_eq!(TimeRange::Week.sample_count(), 7);
        assert_eq!(TimeRange::Month.sample_count(), 30);
    }

    #[test]
    fn time_range_labels() {
        assert_eq!(TimeRange::Hour.sample_label(3), "15m");
        assert_eq!(TimeRange::Day.sample_label(7), "7:00");
        assert_eq!(TimeRange::Week.sample_label(0), "Day 1");
        assert_eq!(TimeRange::Month.sample_label(29), "Day 30");
    }

    #[test]
    fn time_range_wire_tags() {
        let json = serde_json::to_string(&TimeRange::Week).expect("serialize");
        assert_eq!(json, "\"7d\"");
        let parsed: TimeRange = serde_json::from_str("\"30d\"").expect("deserialize");
        assert_eq!(parsed, TimeRange::Month);
        assert!("2w".parse::<TimeRange>().is_err());
    }

    #[test]
    fn fraction_floors_and_compares_exactly() {
        let three_tenths = Fraction::new(3, 10);
        assert_eq!(three_tenths.of(12), 3);
        assert_eq!(three_tenths.of(30), 9);
        assert!(three_tenths.is_below(10, 30));
        assert!(!three_tenths.is_below(9, 30));
        assert!(three_tenths.is_above(8, 30));
        assert!(!three_tenths.is_above(9, 30));
    }

    #[test]
    fn default_metric_status_is_healthy() {
        assert_eq!(MetricStatus::default(), MetricStatus::Healthy);
    }
}
