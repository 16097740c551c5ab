//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{
        AutoRefreshRequest, AutoRefreshResponse, ErrorResponse, HealthResponse, ImpactResponse,
        RangeQuery, RefreshResponse, TransformResponse, TrendsResponse,
    },
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use funnelwatch_core::{
    ActivationImpact, FunnelError, HealthSummary, incident_impacts, parse_records, route_records,
    transform_funnel_data, transform_reliability_metrics, trend_summaries,
};

/// HTTP status for an error.
pub fn error_status(error: &FunnelError) -> StatusCode {
    match error {
        FunnelError::InvalidRecord(_)
        | FunnelError::UnknownTag { .. }
        | FunnelError::TooManyRecords(..)
        | FunnelError::UnknownTimeRange(_)
        | FunnelError::SerializationError(_) => StatusCode::BAD_REQUEST,
        FunnelError::AlertNotFound(_) => StatusCode::NOT_FOUND,
        FunnelError::FetchFailed { .. } => StatusCode::BAD_GATEWAY,
        FunnelError::EmptyImpactSample(_)
        | FunnelError::ConfigError(_)
        | FunnelError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &FunnelError) -> Response {
    (error_status(error), Json(ErrorResponse::from(error))).into_response()
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Liveness check.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// SNAPSHOT HANDLERS
// =============================================================================

/// The full dashboard snapshot.
pub async fn dashboard_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.dashboard.snapshot().await))
}

pub async fn funnel_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.dashboard.snapshot().await.funnel))
}

pub async fn reliability_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.dashboard.snapshot().await.reliability))
}

pub async fn alerts_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.dashboard.snapshot().await.alerts))
}

pub async fn errors_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.dashboard.snapshot().await.top_errors))
}

/// Overall health banner.
pub async fn summary_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.dashboard.snapshot().await.health))
}

// =============================================================================
// RANGE HANDLERS
// =============================================================================

/// Activation impact and incident table for a window.
pub async fn impact_handler(Query(query): Query<RangeQuery>) -> Response {
    let result = query.time_range().and_then(|range| {
        let impact = ActivationImpact::estimate(range)?;
        Ok(ImpactResponse {
            range,
            level: impact.level().to_string(),
            impact,
            incidents: incident_impacts(range),
        })
    });

    match result {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// The four trend charts for a window.
pub async fn trends_handler(Query(query): Query<RangeQuery>) -> Response {
    match query.time_range() {
        Ok(range) => (
            StatusCode::OK,
            Json(TrendsResponse {
                range,
                trends: trend_summaries(range),
            }),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Root-cause drilldown for an alert.
pub async fn drilldown_handler(
    State(state): State<AppState>,
    Path(alert_id): Path<u64>,
    Query(query): Query<RangeQuery>,
) -> Response {
    let range = match query.time_range() {
        Ok(range) => range,
        Err(e) => return error_response(&e),
    };

    match state.dashboard.drilldown(alert_id, range).await {
        Ok(drilldown) => (StatusCode::OK, Json(drilldown)).into_response(),
        Err(e) => {
            tracing::warn!(alert_id, error = %e, "drilldown failed");
            error_response(&e)
        }
    }
}

// =============================================================================
// REFRESH HANDLERS
// =============================================================================

/// Refresh the snapshot now.
pub async fn refresh_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.dashboard.refresh().await;
    let response = RefreshResponse {
        refreshed_at: snapshot.refreshed_at,
        failed_sources: snapshot
            .failed_sources
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
    };
    (StatusCode::OK, Json(response))
}

fn auto_refresh_state(state: &AppState) -> AutoRefreshResponse {
    AutoRefreshResponse {
        enabled: state.dashboard.auto_refresh_enabled(),
        interval_secs: state.dashboard.refresh_interval().as_secs(),
    }
}

pub async fn get_auto_refresh_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(auto_refresh_state(&state)))
}

pub async fn set_auto_refresh_handler(
    State(state): State<AppState>,
    Json(request): Json<AutoRefreshRequest>,
) -> impl IntoResponse {
    state.dashboard.set_auto_refresh(request.enabled);
    (StatusCode::OK, Json(auto_refresh_state(&state)))
}

// =============================================================================
// TRANSFORM HANDLER
// =============================================================================

/// Transform a posted JSON array of raw metric records.
pub async fn transform_handler(body: Bytes) -> Response {
    let raw = match parse_records(&body) {
        Ok(raw) => raw,
        Err(e) => return error_response(&e),
    };

    let routed = route_records(&raw);
    if routed.len() < raw.len() {
        tracing::debug!(
            records = raw.len(),
            routed = routed.len(),
            "unroutable records dropped"
        );
    }
    let funnel = transform_funnel_data(&routed);
    let reliability = transform_reliability_metrics(&routed);
    let health = HealthSummary::assess(&[], &reliability);

    let response = TransformResponse {
        records: raw.len(),
        routed: routed.len(),
        funnel,
        reliability,
        health,
    };
    (StatusCode::OK, Json(response)).into_response()
}
