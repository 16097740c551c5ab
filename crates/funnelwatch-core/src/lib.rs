//! # funnelwatch-core
//!
//! The metrics transformation and classification engine for the
//! phone-collection funnel dashboard - THE LOGIC.
//!
//! Raw metric records go in; display-ready views come out:
//! - the four-stage funnel and the reliability-by-layer table
//! - the overall health classification
//! - business impact, trend series and root-cause drilldown shaping
//!
//! ## Architectural Constraints
//!
//! - Pure: NO async, NO network, NO logging
//! - Deterministic: the same input always gives the same output
//! - Never fails on data: missing fields default, unroutable records are
//!   dropped, empty input yields the fallback datasets
//! - Integer percentages: anything computed here is computed in basis points

// =============================================================================
// MODULES
// =============================================================================

pub mod alert;
pub mod drilldown;
pub mod funnel;
pub mod health;
pub mod impact;
pub mod primitives;
pub mod record;
pub mod reliability;
pub mod trend;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{FunnelError, Layer, Likelihood, LogLevel, MetricStatus, Severity, Stage, TimeRange};

// =============================================================================
// RE-EXPORTS: Records and Transformations
// =============================================================================

pub use funnel::{FALLBACK_FUNNEL, FunnelStageView, transform_funnel_data};
pub use record::{
    FunnelObservation, MetricRecord, RawMetricRecord, ReliabilityObservation, parse_records,
    route_records,
};
pub use reliability::{
    FALLBACK_RELIABILITY_METRICS, ReliabilityMetricView, format_layer_name,
    transform_reliability_metrics,
};

// =============================================================================
// RE-EXPORTS: Classification and Supplementary Views
// =============================================================================

pub use alert::{Alert, TopError, find_alert, top_errors};
pub use drilldown::{
    IncidentReport, LatencyPoint, LogEntry, RatedSegment, RatedSegmentation, RootCauseFactor,
    SegmentBucket, Segmentation, latency_series,
};
pub use health::{HealthStatus, HealthSummary, SignalCounts, classify_health};
pub use impact::{
    ActivationImpact, ActivationSample, IncidentImpact, IncidentSeverity, incident_impacts,
};
pub use trend::{
    TrendDirection, TrendMetric, TrendPoint, TrendSummary, trend_series, trend_summaries,
};
