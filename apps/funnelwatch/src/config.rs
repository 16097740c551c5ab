//! # Dashboard Configuration
//!
//! Resolution order: environment > TOML file > defaults.
//!
//! ```toml
//! refresh_interval_secs = 30
//! max_retries = 2
//! auto_refresh = true
//! latency_scale_percent = 100
//!
//! [latency]
//! metrics_ms = 500
//! alerts_ms = 300
//! ```
//!
//! ## Environment Variables
//!
//! - `FUNNELWATCH_REFRESH_SECS`: auto-refresh period in seconds
//! - `FUNNELWATCH_MAX_RETRIES`: retries after the first failed fetch
//! - `FUNNELWATCH_AUTO_REFRESH`: `true`/`false` (also `1`/`0`, `yes`/`no`, `on`/`off`)
//! - `FUNNELWATCH_LATENCY_SCALE_PERCENT`: scales every simulated latency; `0` disables them

use funnelwatch_core::FunnelError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_REFRESH_SECS: &str = "FUNNELWATCH_REFRESH_SECS";
pub const ENV_MAX_RETRIES: &str = "FUNNELWATCH_MAX_RETRIES";
pub const ENV_AUTO_REFRESH: &str = "FUNNELWATCH_AUTO_REFRESH";
pub const ENV_LATENCY_SCALE: &str = "FUNNELWATCH_LATENCY_SCALE_PERCENT";

/// Largest retry budget accepted.
const MAX_RETRY_BUDGET: u32 = 10;

// =============================================================================
// CONFIG TYPES
// =============================================================================

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Auto-refresh period.
    pub refresh_interval_secs: u64,
    /// Retries after the first failed attempt of a fetch.
    pub max_retries: u32,
    /// Whether auto-refresh starts enabled.
    pub auto_refresh: bool,
    /// Percentage applied to every simulated latency.
    pub latency_scale_percent: u32,
    pub latency: LatencyConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30,
            max_retries: 2,
            auto_refresh: true,
            latency_scale_percent: 100,
            latency: LatencyConfig::default(),
        }
    }
}

/// Simulated latency of each data source endpoint, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LatencyConfig {
    pub metrics_ms: u64,
    pub alerts_ms: u64,
    pub top_errors_ms: u64,
    pub root_causes_ms: u64,
    pub segmentation_ms: u64,
    pub latency_series_ms: u64,
    pub logs_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            metrics_ms: 500,
            alerts_ms: 300,
            top_errors_ms: 200,
            root_causes_ms: 300,
            segmentation_ms: 250,
            latency_series_ms: 250,
            logs_ms: 200,
        }
    }
}

// =============================================================================
// LOADING
// =============================================================================

impl DashboardConfig {
    /// Load from a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, FunnelError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FunnelError::ConfigError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            FunnelError::ConfigError(format!("Cannot parse '{}': {}", path.display(), e))
        })
    }

    /// Load the file if given, then apply process environment overrides.
    pub fn resolve(path: Option<&Path>) -> Result<Self, FunnelError> {
        Self::resolve_with_env(path, &|key| std::env::var(key).ok())
    }

    pub fn resolve_with_env(
        path: Option<&Path>,
        env_lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<Self, FunnelError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(env_lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(
        &mut self,
        env_lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<(), FunnelError> {
        if let Some(raw) = env_lookup(ENV_REFRESH_SECS) {
            self.refresh_interval_secs = parse_env_number(ENV_REFRESH_SECS, &raw)?;
        }
        if let Some(raw) = env_lookup(ENV_MAX_RETRIES) {
            self.max_retries = parse_env_number(ENV_MAX_RETRIES, &raw)?;
        }
        if let Some(raw) = env_lookup(ENV_AUTO_REFRESH) {
            self.auto_refresh = parse_env_bool(ENV_AUTO_REFRESH, &raw)?;
        }
        if let Some(raw) = env_lookup(ENV_LATENCY_SCALE) {
            self.latency_scale_percent = parse_env_number(ENV_LATENCY_SCALE, &raw)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), FunnelError> {
        if self.refresh_interval_secs == 0 {
            return Err(FunnelError::ConfigError(
                "refresh_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.max_retries > MAX_RETRY_BUDGET {
            return Err(FunnelError::ConfigError(format!(
                "max_retries {} exceeds maximum {}",
                self.max_retries, MAX_RETRY_BUDGET
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

fn parse_env_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, FunnelError> {
    raw.trim().parse::<T>().map_err(|_| {
        FunnelError::ConfigError(format!("{key}={raw:?}: expected unsigned integer"))
    })
}

fn parse_env_bool(key: &str, raw: &str) -> Result<bool, FunnelError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(FunnelError::ConfigError(format!(
            "{key}={raw:?}: expected boolean (true/false/1/0/yes/no/on/off)"
        ))),
    }
}

// =============================================================================
// TESTS
// =============================================================================
