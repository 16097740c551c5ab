//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API. The dashboard
//! views themselves serialize straight from funnelwatch-core.

use chrono::{DateTime, Utc};
use funnelwatch_core::{
    ActivationImpact, FunnelError, FunnelStageView, HealthSummary, IncidentImpact,
    ReliabilityMetricView, TimeRange, TrendSummary,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

impl From<&FunnelError> for ErrorResponse {
    fn from(error: &FunnelError) -> Self {
        Self::new(error.to_string())
    }
}

// =============================================================================
// RANGE QUERY
// =============================================================================

/// `?range=` query parameter. Defaults to `24h`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
}

impl RangeQuery {
    pub fn time_range(&self) -> Result<TimeRange, FunnelError> {
        self.range
            .as_deref()
            .map_or(Ok(TimeRange::default()), str::parse)
    }
}

// =============================================================================
// REFRESH
// =============================================================================

/// Result of a manual refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub refreshed_at: Option<DateTime<Utc>>,
    pub failed_sources: Vec<String>,
}

/// Auto-refresh toggle request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoRefreshRequest {
    pub enabled: bool,
}

/// Current auto-refresh setting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoRefreshResponse {
    pub enabled: bool,
    pub interval_secs: u64,
}

// =============================================================================
// IMPACT / TRENDS
// =============================================================================

/// Business impact for one window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactResponse {
    pub range: TimeRange,
    pub impact: ActivationImpact,
    pub level: String,
    pub incidents: Vec<IncidentImpact>,
}

/// All trend charts for one window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendsResponse {
    pub range: TimeRange,
    pub trends: Vec<TrendSummary>,
}

// =============================================================================
// TRANSFORM
// =============================================================================

/// Views derived from a posted batch of raw records.
#[derive(Debug, Clone, Serialize)]
pub struct TransformResponse {
    pub records: usize,
    pub routed: usize,
    pub funnel: Vec<FunnelStageView>,
    pub reliability: Vec<ReliabilityMetricView>,
    pub health: HealthSummary,
}
