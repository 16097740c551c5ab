//! # Dashboard Service
//!
//! Holds the current [`DashboardSnapshot`] and keeps it fresh.
//!
//! A refresh fetches metrics, alerts and top errors concurrently, each under
//! the retry policy. An endpoint that still fails contributes an empty list,
//! so the transformations fall back to their fixed datasets. The new snapshot
//! replaces the old one in a single write.

use crate::config::DashboardConfig;
use crate::source::{MockSource, RetryPolicy};
use chrono::{DateTime, Utc};
use funnelwatch_core::{
    Alert, FunnelError, FunnelStageView, HealthSummary, IncidentReport, LatencyPoint, LogEntry,
    RatedSegmentation, RawMetricRecord, ReliabilityMetricView, RootCauseFactor, TimeRange,
    TopError, find_alert, route_records, top_errors, transform_funnel_data,
    transform_reliability_metrics,
};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

// =============================================================================
// SNAPSHOT
// =============================================================================

/// One consistent set of derived views, built from one refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub funnel: Vec<FunnelStageView>,
    pub reliability: Vec<ReliabilityMetricView>,
    pub alerts: Vec<Alert>,
    pub top_errors: Vec<TopError>,
    pub health: HealthSummary,
    /// `None` until the first refresh completes.
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Endpoints whose data could not be fetched in this refresh.
    pub failed_sources: Vec<&'static str>,
}

impl DashboardSnapshot {
    /// Derive every view from raw source data.
    #[must_use]
    pub fn build(
        records: &[RawMetricRecord],
        alerts: Vec<Alert>,
        errors: &[TopError],
        refreshed_at: Option<DateTime<Utc>>,
    ) -> Self {
        let routed = route_records(records);
        let funnel = transform_funnel_data(&routed);
        let reliability = transform_reliability_metrics(&routed);
        let health = HealthSummary::assess(&alerts, &reliability);

        Self {
            funnel,
            reliability,
            alerts,
            top_errors: top_errors(errors),
            health,
            refreshed_at,
            failed_sources: Vec::new(),
        }
    }

    /// The snapshot shown before any data has arrived.
    #[must_use]
    pub fn initial() -> Self {
        Self::build(&[], Vec::new(), &[], None)
    }
}

// =============================================================================
// DRILLDOWN
// =============================================================================

/// Everything the drilldown panel shows for one alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drilldown {
    pub alert: Alert,
    pub range: TimeRange,
    pub root_causes: Vec<RootCauseFactor>,
    pub segmentation: RatedSegmentation,
    pub latency: Vec<LatencyPoint>,
    pub logs: Vec<LogEntry>,
    /// Ticket text for the incident.
    pub report: String,
}

// =============================================================================
// SERVICE
// =============================================================================

/// The dashboard service shared by the HTTP API and the CLI.
pub struct Dashboard {
    source: MockSource,
    retry: RetryPolicy,
    refresh_interval: Duration,
    auto_refresh: AtomicBool,
    snapshot: RwLock<DashboardSnapshot>,
}

impl Dashboard {
    #[must_use]
    pub fn new(source: MockSource, config: &DashboardConfig) -> Self {
        Self {
            source,
            retry: RetryPolicy::new(config.max_retries),
            refresh_interval: config.refresh_interval(),
            auto_refresh: AtomicBool::new(config.auto_refresh),
            snapshot: RwLock::new(DashboardSnapshot::initial()),
        }
    }

    /// Service backed by a mock source configured from `config`.
    #[must_use]
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(MockSource::from_config(config), config)
    }

    #[must_use]
    pub const fn source(&self) -> &MockSource {
        &self.source
    }

    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// A copy of the current snapshot.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Fetch everything and replace the snapshot.
    pub async fn refresh(&self) -> DashboardSnapshot {
        let (metrics, alerts, errors) = tokio::join!(
            self.retry.run("metrics", || self.source.metrics()),
            self.retry.run("alerts", || self.source.alerts()),
            self.retry.run("top_errors", || self.source.top_errors()),
        );

        let mut failed_sources = Vec::new();
        let records = or_empty(metrics, "metrics", &mut failed_sources);
        let alerts = or_empty(alerts, "alerts", &mut failed_sources);
        let errors = or_empty(errors, "top_errors", &mut failed_sources);

        let mut snapshot = DashboardSnapshot::build(&records, alerts, &errors, Some(Utc::now()));
        snapshot.failed_sources = failed_sources;

        if snapshot.failed_sources.is_empty() {
            tracing::info!(
                health = %snapshot.health.status,
                alerts = snapshot.alerts.len(),
                "dashboard refreshed"
            );
        } else {
            tracing::warn!(
                failed = ?snapshot.failed_sources,
                "dashboard refreshed with fallback data"
            );
        }

        *self.snapshot.write().await = snapshot.clone();
        snapshot
    }

    // =========================================================================
    // AUTO-REFRESH
    // =========================================================================

    #[must_use]
    pub fn auto_refresh_enabled(&self) -> bool {
        self.auto_refresh.load(Ordering::SeqCst)
    }

    pub fn set_auto_refresh(&self, enabled: bool) {
        let previous = self.auto_refresh.swap(enabled, Ordering::SeqCst);
        if previous != enabled {
            tracing::info!(enabled, "auto-refresh toggled");
        }
    }

    /// Refresh every `refresh_interval` while auto-refresh is enabled.
    ///
    /// The first refresh happens one full interval after the call.
    pub fn spawn_auto_refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let dashboard = Arc::clone(self);
        tokio::spawn(async move {
            let period = dashboard.refresh_interval;
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if dashboard.auto_refresh_enabled() {
                    tracing::debug!("auto-refresh tick");
                    dashboard.refresh().await;
                }
            }
        })
    }

    // =========================================================================
    // DRILLDOWN
    // =========================================================================

    /// Drilldown for an alert of the current snapshot.
    pub async fn drilldown(
        &self,
        alert_id: u64,
        range: TimeRange,
    ) -> Result<Drilldown, FunnelError> {
        let alert = {
            let snapshot = self.snapshot.read().await;
            find_alert(&snapshot.alerts, alert_id)
                .cloned()
                .ok_or(FunnelError::AlertNotFound(alert_id))?
        };

        let (root_causes, segmentation, latency, logs) = tokio::join!(
            self.retry.run("root_causes", || self.source.root_causes(alert_id)),
            self.retry.run("segmentation", || self.source.segmentation(alert_id)),
            self.retry.run("latency_series", || self.source.latency_series(alert_id, range)),
            self.retry.run("logs", || self.source.logs(alert_id)),
        );
        let root_causes = root_causes?;
        let logs = logs?;

        let report = IncidentReport::compose(&alert, range, &root_causes, &logs);

        Ok(Drilldown {
            alert,
            range,
            root_causes,
            segmentation: segmentation?.rated(),
            latency: latency?,
            logs,
            report,
        })
    }
}

fn or_empty<T>(
    result: Result<Vec<T>, FunnelError>,
    what: &'static str,
    failed: &mut Vec<&'static str>,
) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::error!(what, error = %e, "using empty data");
        failed.push(what);
        Vec::new()
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::EndpointLatency;
    use funnelwatch_core::{FALLBACK_FUNNEL, FALLBACK_RELIABILITY_METRICS, HealthStatus};

    fn instant_dashboard(config: &DashboardConfig) -> Dashboard {
        Dashboard::new(MockSource::new(EndpointLatency::none()), config)
    }

    #[test]
    fn initial_snapshot_is_fallback() {
        let snapshot = DashboardSnapshot::initial();
        assert_eq!(snapshot.funnel, FALLBACK_FUNNEL.to_vec());
        assert_eq!(snapshot.reliability, FALLBACK_RELIABILITY_METRICS.to_vec());
        assert!(snapshot.refreshed_at.is_none());
        // one critical fallback metric, no alerts
        assert_eq!(snapshot.health.status, HealthStatus::AtRisk);
    }

    #[tokio::test]
    async fn refresh_uses_source_data() {
        let dashboard = instant_dashboard(&DashboardConfig::default());
        let snapshot = dashboard.refresh().await;

        assert_eq!(snapshot.funnel[0].count, 3014);
        assert_eq!(snapshot.alerts.len(), 4);
        assert_eq!(snapshot.top_errors.len(), 4);
        assert!(snapshot.failed_sources.is_empty());
        // two critical alerts
        assert_eq!(snapshot.health.status, HealthStatus::Critical);
        assert_eq!(dashboard.snapshot().await, snapshot);
    }

    #[tokio::test]
    async fn refresh_falls_back_when_source_fails() {
        let config = DashboardConfig {
            max_retries: 1,
            ..DashboardConfig::default()
        };
        let dashboard = instant_dashboard(&config);
        dashboard.source().fail_next(u32::MAX);

        let snapshot = dashboard.refresh().await;
        assert_eq!(snapshot.funnel, FALLBACK_FUNNEL.to_vec());
        assert_eq!(snapshot.reliability, FALLBACK_RELIABILITY_METRICS.to_vec());
        assert!(snapshot.alerts.is_empty());
        assert_eq!(snapshot.failed_sources.len(), 3);
        // 3 endpoints x 2 attempts
        assert_eq!(dashboard.source().call_count(), 6);
    }

    #[tokio::test]
    async fn refresh_recovers_within_retry_budget() {
        let dashboard = instant_dashboard(&DashboardConfig::default());
        dashboard.source().fail_next(2);
        let snapshot = dashboard.refresh().await;
        assert!(snapshot.failed_sources.is_empty());
        assert_eq!(dashboard.source().call_count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_runs_endpoints_concurrently() {
        let dashboard = Dashboard::from_config(&DashboardConfig::default());
        let started = tokio::time::Instant::now();
        dashboard.refresh().await;
        // bounded by the slowest endpoint, not the sum
        assert_eq!(started.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn drilldown_for_known_alert() {
        let dashboard = instant_dashboard(&DashboardConfig::default());
        dashboard.refresh().await;

        let drilldown = dashboard.drilldown(2, TimeRange::Hour).await.expect("drilldown");
        assert_eq!(drilldown.alert.id, 2);
        assert_eq!(drilldown.root_causes[0].cause, "Database connection pool exhaustion");
        assert_eq!(drilldown.latency.len(), 12);
        assert_eq!(drilldown.segmentation.country[0].rate.as_deref(), Some("12.1"));
        assert!(drilldown.report.contains("- *Affected Layer:* Server"));
        assert!(drilldown.report.contains("- *Time Range:* 1h"));
    }

    #[tokio::test]
    async fn drilldown_for_unknown_alert() {
        let dashboard = instant_dashboard(&DashboardConfig::default());
        dashboard.refresh().await;
        let result = dashboard.drilldown(42, TimeRange::Day).await;
        assert!(matches!(result, Err(FunnelError::AlertNotFound(42))));
    }

    #[tokio::test(start_paused = true)]
    async fn auto_refresh_follows_flag() {
        let config = DashboardConfig {
            refresh_interval_secs: 30,
            auto_refresh: false,
            ..DashboardConfig::default()
        };
        let dashboard = Arc::new(instant_dashboard(&config));
        let handle = dashboard.spawn_auto_refresh();

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(dashboard.snapshot().await.refreshed_at.is_none());

        dashboard.set_auto_refresh(true);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(dashboard.snapshot().await.refreshed_at.is_some());
        assert!(dashboard.auto_refresh_enabled());

        handle.abort();
    }
}
