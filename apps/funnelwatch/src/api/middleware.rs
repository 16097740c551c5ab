//! # Middleware Module
//!
//! Rate limiting for the funnelwatch HTTP API.
//!
//! ## Configuration
//!
//! Rate limiting is configured via environment variable:
//! - `FUNNELWATCH_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

use super::types::ErrorResponse;

pub const ENV_RATE_LIMIT: &str = "FUNNELWATCH_RATE_LIMIT";

/// Default rate limit: 100 requests per second.
const DEFAULT_RPS: NonZeroU32 = NonZeroU32::MIN.saturating_add(99);

// =============================================================================
// RATE LIMITER
// =============================================================================

/// Global rate limiter type alias.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Create a new global rate limiter. Zero falls back to the default.
pub fn create_rate_limiter(requests_per_second: u32) -> GlobalRateLimiter {
    let rps = NonZeroU32::new(requests_per_second).unwrap_or(DEFAULT_RPS);
    Arc::new(RateLimiter::direct(Quota::per_second(rps)))
}

/// Returns the value of `FUNNELWATCH_RATE_LIMIT`, or 100 if unset or invalid.
pub fn get_rate_limit_from_env() -> u32 {
    std::env::var(ENV_RATE_LIMIT)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(100)
}

/// Rejects the request with 429 once the global quota is spent.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if limiter.check().is_ok() {
        next.run(request).await
    } else {
        tracing::warn!(path = %request.uri().path(), "rate limit exceeded");
        (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse::new("Too Many Requests")),
        )
            .into_response()
    }
}

// =============================================================================
// TESTS
// =============================================================================
