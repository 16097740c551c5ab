//! # funnelwatch HTTP API Module
//!
//! This module implements the JSON HTTP API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /dashboard` - Full snapshot
//! - `GET /funnel`, `/reliability`, `/alerts`, `/errors`, `/summary` - Snapshot slices
//! - `GET /impact?range=24h` - Activation impact and incident table
//! - `GET /trends?range=24h` - Trend charts
//! - `GET /drilldown/{alert_id}?range=24h` - Root-cause drilldown
//! - `POST /refresh` - Refresh now
//! - `GET|POST /auto-refresh` - Read or set the auto-refresh flag
//! - `POST /transform` - Transform a posted batch of raw records
//!
//! ## Configuration (Environment Variables)
//!
//! - `FUNNELWATCH_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: dashboard dev servers on ports 3000 and 5173)
//! - `FUNNELWATCH_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)

mod handlers;
mod middleware;
mod types;

pub use handlers::error_status;
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
pub use types::{
    AutoRefreshRequest, AutoRefreshResponse, ErrorResponse, HealthResponse, ImpactResponse,
    RangeQuery, RefreshResponse, TransformResponse, TrendsResponse,
};

use crate::dashboard::Dashboard;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use funnelwatch_core::FunnelError;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub const ENV_CORS_ORIGINS: &str = "FUNNELWATCH_CORS_ORIGINS";

/// Largest accepted request body (2 MB).
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
}

impl AppState {
    #[must_use]
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard: Arc::new(dashboard),
        }
    }

    #[must_use]
    pub fn from_shared(dashboard: Arc<Dashboard>) -> Self {
        Self { dashboard }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Where the dashboard front end runs during development.
const DASHBOARD_DEV_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
];

/// Origins allowed to read the API.
///
/// `*` opens the API to every origin. Otherwise the listed origins are used,
/// falling back to the dashboard dev servers when none of them is valid.
fn build_cors_layer(origins_env: Option<&str>) -> CorsLayer {
    let allow_origin = match origins_env.map(str::trim) {
        Some("*") => {
            tracing::warn!("CORS open to every origin ({}=*)", ENV_CORS_ORIGINS);
            AllowOrigin::any()
        }
        Some(list) => {
            let origins = parse_origins(list);
            if origins.is_empty() {
                tracing::warn!("{} has no valid origin, using dev servers", ENV_CORS_ORIGINS);
                AllowOrigin::list(parse_origins(&DASHBOARD_DEV_ORIGINS.join(",")))
            } else {
                AllowOrigin::list(origins)
            }
        }
        None => AllowOrigin::list(parse_origins(&DASHBOARD_DEV_ORIGINS.join(","))),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

fn parse_origins(list: &str) -> Vec<HeaderValue> {
    list.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
pub fn create_router(state: AppState) -> Router {
    let rate_limit = get_rate_limit_from_env();

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/dashboard", get(handlers::dashboard_handler))
        .route("/funnel", get(handlers::funnel_handler))
        .route("/reliability", get(handlers::reliability_handler))
        .route("/alerts", get(handlers::alerts_handler))
        .route("/errors", get(handlers::errors_handler))
        .route("/summary", get(handlers::summary_handler))
        .route("/impact", get(handlers::impact_handler))
        .route("/trends", get(handlers::trends_handler))
        .route("/drilldown/{alert_id}", get(handlers::drilldown_handler))
        .route("/refresh", post(handlers::refresh_handler))
        .route(
            "/auto-refresh",
            get(handlers::get_auto_refresh_handler).post(handlers::set_auto_refresh_handler),
        )
        .route("/transform", post(handlers::transform_handler));

    if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        router = router.layer(axum_middleware::from_fn_with_state(
            create_rate_limiter(rate_limit),
            middleware::rate_limit_middleware,
        ));
    } else {
        tracing::info!("Rate limiting disabled");
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(
                    std::env::var(ENV_CORS_ORIGINS).ok().as_deref(),
                ))
                .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Serve the API on `addr` until the process is stopped.
pub async fn run_server(addr: &str, dashboard: Arc<Dashboard>) -> Result<(), FunnelError> {
    let router = create_router(AppState::from_shared(dashboard));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| FunnelError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("funnelwatch HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| FunnelError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blanks_skipped() {
        let origins = parse_origins(" https://dash.example.com , ,http://localhost:5173");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "https://dash.example.com");
    }

    #[test]
    fn invalid_origins_are_dropped() {
        assert!(parse_origins("bad\norigin").is_empty());
        assert_eq!(parse_origins(&DASHBOARD_DEV_ORIGINS.join(",")).len(), 4);
    }
}
