//! # Mock Data Source
//!
//! In-memory stand-in for the metrics backend. Every endpoint sleeps for its
//! configured latency and returns hand-authored sample data; timestamps are
//! relative to the time of the call.
//!
//! Failures can be injected with [`MockSource::fail_next`]: each pending
//! failure makes one endpoint call return an error after its latency.

use crate::config::{DashboardConfig, LatencyConfig};
use chrono::{DateTime, TimeDelta, Utc};
use funnelwatch_core::{
    Alert, FunnelError, LatencyPoint, Layer, Likelihood, LogEntry, LogLevel, MetricStatus,
    RawMetricRecord, RootCauseFactor, SegmentBucket, Segmentation, Severity, Stage, TimeRange,
    TopError, latency_series,
};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

// =============================================================================
// LATENCY
// =============================================================================

/// Simulated latency per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointLatency {
    pub metrics: Duration,
    pub alerts: Duration,
    pub top_errors: Duration,
    pub root_causes: Duration,
    pub segmentation: Duration,
    pub latency_series: Duration,
    pub logs: Duration,
}

impl EndpointLatency {
    /// Latencies from config, scaled by `scale_percent`.
    #[must_use]
    pub fn scaled(config: &LatencyConfig, scale_percent: u32) -> Self {
        let scale =
            |ms: u64| Duration::from_millis(ms.saturating_mul(u64::from(scale_percent)) / 100);
        Self {
            metrics: scale(config.metrics_ms),
            alerts: scale(config.alerts_ms),
            top_errors: scale(config.top_errors_ms),
            root_causes: scale(config.root_causes_ms),
            segmentation: scale(config.segmentation_ms),
            latency_series: scale(config.latency_series_ms),
            logs: scale(config.logs_ms),
        }
    }

    /// No simulated latency at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            metrics: Duration::ZERO,
            alerts: Duration::ZERO,
            top_errors: Duration::ZERO,
            root_causes: Duration::ZERO,
            segmentation: Duration::ZERO,
            latency_series: Duration::ZERO,
            logs: Duration::ZERO,
        }
    }
}

impl Default for EndpointLatency {
    fn default() -> Self {
        Self::scaled(&LatencyConfig::default(), 100)
    }
}

// =============================================================================
// MOCK SOURCE
// =============================================================================

/// The mock data source.
#[derive(Debug, Default)]
pub struct MockSource {
    latency: EndpointLatency,
    pending_failures: AtomicU32,
    calls: AtomicU64,
}

impl MockSource {
    #[must_use]
    pub fn new(latency: EndpointLatency) -> Self {
        Self {
            latency,
            pending_failures: AtomicU32::new(0),
            calls: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(EndpointLatency::scaled(
            &config.latency,
            config.latency_scale_percent,
        ))
    }

    #[must_use]
    pub const fn latency(&self) -> &EndpointLatency {
        &self.latency
    }

    /// Make the next `count` endpoint calls fail.
    pub fn fail_next(&self, count: u32) {
        self.pending_failures.store(count, Ordering::SeqCst);
    }

    /// Endpoint calls made so far, failed ones included.
    #[must_use]
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    async fn simulate(&self, endpoint: &'static str, delay: Duration) -> Result<(), FunnelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let injected = self
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(FunnelError::IoError(format!(
                "{endpoint}: simulated upstream failure"
            )));
        }
        Ok(())
    }

    // =========================================================================
    // ENDPOINTS
    // =========================================================================

    /// Funnel and reliability records.
    pub async fn metrics(&self) -> Result<Vec<RawMetricRecord>, FunnelError> {
        self.simulate("metrics", self.latency.metrics).await?;
        Ok(sample_metrics(Utc::now()))
    }

    pub async fn alerts(&self) -> Result<Vec<Alert>, FunnelError> {
        self.simulate("alerts", self.latency.alerts).await?;
        Ok(sample_alerts(Utc::now()))
    }

    pub async fn top_errors(&self) -> Result<Vec<TopError>, FunnelError> {
        self.simulate("top_errors", self.latency.top_errors).await?;
        Ok(sample_top_errors(Utc::now()))
    }

    /// Root causes of an alert. Unknown ids get the causes of alert 1.
    pub async fn root_causes(&self, alert_id: u64) -> Result<Vec<RootCauseFactor>, FunnelError> {
        self.simulate("root_causes", self.latency.root_causes).await?;
        Ok(sample_root_causes(alert_id))
    }

    pub async fn segmentation(&self, _alert_id: u64) -> Result<Segmentation, FunnelError> {
        self.simulate("segmentation", self.latency.segmentation).await?;
        Ok(sample_segmentation())
    }

    pub async fn latency_series(
        &self,
        _alert_id: u64,
        range: TimeRange,
    ) -> Result<Vec<LatencyPoint>, FunnelError> {
        self.simulate("latency_series", self.latency.latency_series)
            .await?;
        Ok(latency_series(range))
    }

    pub async fn logs(&self, _alert_id: u64) -> Result<Vec<LogEntry>, FunnelError> {
        self.simulate("logs", self.latency.logs).await?;
        Ok(sample_logs(Utc::now()))
    }
}

// =============================================================================
// SAMPLE DATA
// =============================================================================

fn minutes_before(now: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    now.checked_sub_signed(TimeDelta::minutes(minutes))
        .unwrap_or(now)
}

fn stage_record(
    now: DateTime<Utc>,
    stage: Stage,
    conversion: f64,
    drop_off: f64,
    delta: f64,
    count: f64,
) -> RawMetricRecord {
    RawMetricRecord {
        timestamp: Some(now),
        funnel_stage: Some(stage),
        conversion_rate: Some(conversion),
        drop_off_rate: Some(drop_off),
        comparison_delta: Some(delta),
        current_value: Some(count),
        ..Default::default()
    }
}

fn layer_record(
    now: DateTime<Utc>,
    layer: Layer,
    name: &str,
    target: &str,
    current: f64,
    status: MetricStatus,
) -> RawMetricRecord {
    RawMetricRecord {
        timestamp: Some(now),
        layer: Some(layer),
        metric_name: Some(name.to_string()),
        target_value: Some(target.to_string()),
        current_value: Some(current),
        status: Some(status),
        unit: Some("%".to_string()),
        ..Default::default()
    }
}

fn sample_metrics(now: DateTime<Utc>) -> Vec<RawMetricRecord> {
    vec![
        stage_record(now, Stage::Visitors, 100.0, 0.0, 0.0, 3014.0),
        stage_record(now, Stage::NextPage, 82.0, 18.0, -2.3, 2471.0),
        stage_record(now, Stage::PhoneCollected, 75.6, 24.4, -3.8, 1868.0),
        stage_record(now, Stage::Activation, 5.1, 94.9, 1.2, 96.0),
        layer_record(
            now,
            Layer::Client,
            "User Response Success",
            "≥ 95%",
            92.5,
            MetricStatus::Warning,
        ),
        layer_record(
            now,
            Layer::Server,
            "Validation Request Success Rate",
            "≥ 98%",
            96.5,
            MetricStatus::Warning,
        ),
        layer_record(
            now,
            Layer::Provider,
            "Phone Validation Error Rate",
            "< 5%",
            7.2,
            MetricStatus::Critical,
        ),
        layer_record(
            now,
            Layer::DataQuality,
            "Event Completeness & Accuracy",
            "≥ 99.5%",
            99.8,
            MetricStatus::Healthy,
        ),
    ]
}

fn sample_alerts(now: DateTime<Utc>) -> Vec<Alert> {
    vec![
        Alert::new(
            1,
            "Spike detected in Abandon Rate (+1.2% vs baseline)",
            Severity::Critical,
        )
        .with_layer(Layer::Client)
        .with_timestamp(minutes_before(now, 15)),
        Alert::new(
            2,
            "Server response time exceeded SLA (1.05s > 0.8s)",
            Severity::Critical,
        )
        .with_layer(Layer::Server)
        .with_timestamp(minutes_before(now, 23)),
        Alert::new(
            3,
            "Provider returning rate-limit errors (HTTP 429)",
            Severity::Warning,
        )
        .with_layer(Layer::Provider)
        .with_timestamp(minutes_before(now, 45)),
        Alert::new(
            4,
            "Event completeness below threshold (99.2% < 99.5%)",
            Severity::Warning,
        )
        .with_layer(Layer::DataQuality)
        .with_timestamp(minutes_before(now, 67)),
    ]
}

fn sample_top_errors(now: DateTime<Utc>) -> Vec<TopError> {
    let error = |message: &str, count, layer, severity, minutes| TopError {
        message: message.to_string(),
        count,
        layer,
        severity,
        last_occurrence: minutes_before(now, minutes),
    };

    vec![
        error("Server response time exceeded SLA", 47, Layer::Server, Severity::Critical, 5),
        error("Abandon Rate spike detected", 38, Layer::Client, Severity::Critical, 12),
        error("Provider rate-limit errors", 22, Layer::Provider, Severity::Warning, 28),
        error("Event completeness degraded", 15, Layer::DataQuality, Severity::Warning, 45),
    ]
}

fn sample_root_causes(alert_id: u64) -> Vec<RootCauseFactor> {
    use Likelihood::{High, Low, Medium};

    match alert_id {
        2 => vec![
            RootCauseFactor::new(
                Layer::Server,
                "Database connection pool exhaustion",
                High,
                "Connection pool at 98% capacity",
                70,
            ),
            RootCauseFactor::new(
                Layer::Server,
                "Increased query complexity",
                Medium,
                "Slow query log showing +45% execution time",
                20,
            ),
            RootCauseFactor::new(
                Layer::Provider,
                "Third-party SMS verification delays",
                Low,
                "Provider latency P95: 450ms (normal)",
                10,
            ),
        ],
        3 => vec![
            RootCauseFactor::new(
                Layer::Provider,
                "SMS provider rate limit exceeded",
                High,
                "HTTP 429 responses increased 10x",
                80,
            ),
            RootCauseFactor::new(
                Layer::Server,
                "Retry logic not properly backoff",
                Medium,
                "Retry attempts within 100ms window",
                15,
            ),
            RootCauseFactor::new(
                Layer::Client,
                "Duplicate submission attempts",
                Low,
                "Only 5% of requests are duplicates",
                5,
            ),
        ],
        4 => vec![
            RootCauseFactor::new(
                Layer::DataQuality,
                "Event tracking script loading failure",
                High,
                "Script 404 errors on 2% of page loads",
                60,
            ),
            RootCauseFactor::new(
                Layer::DataQuality,
                "Browser privacy settings blocking events",
                Medium,
                "Correlation with Firefox strict mode",
                30,
            ),
            RootCauseFactor::new(
                Layer::Server,
                "Event ingestion pipeline delay",
                Low,
                "Pipeline lag under 50ms threshold",
                10,
            ),
        ],
        _ => vec![
            RootCauseFactor::new(
                Layer::Client,
                "High JavaScript error rate in form validation",
                High,
                "Error rate increased 3x in the last hour",
                65,
            ),
            RootCauseFactor::new(
                Layer::Client,
                "Mobile Safari rendering issue",
                Medium,
                "85% of abandons from iOS Safari",
                25,
            ),
            RootCauseFactor::new(
                Layer::Server,
                "Delayed phone validation API response",
                Low,
                "P95 latency within acceptable range",
                10,
            ),
        ],
    }
}

fn sample_segmentation() -> Segmentation {
    let buckets = |rows: [(&str, u64, u64); 4]| {
        rows.into_iter()
            .map(|(name, affected, total)| SegmentBucket::new(name, affected, total))
            .collect()
    };

    Segmentation {
        country: buckets([
            ("USA", 145, 1200),
            ("UK", 38, 450),
            ("Canada", 22, 320),
            ("Germany", 18, 280),
        ]),
        browser: buckets([
            ("Chrome", 89, 1100),
            ("Safari", 67, 680),
            ("Firefox", 45, 420),
            ("Edge", 22, 250),
        ]),
        traffic_source: buckets([
            ("Organic", 98, 980),
            ("Paid", 76, 890),
            ("Direct", 34, 450),
            ("Referral", 15, 230),
        ]),
    }
}

fn sample_logs(now: DateTime<Utc>) -> Vec<LogEntry> {
    use LogLevel::{Error, Info, Warning};

    let rows: [(i64, LogLevel, &str, &str); 12] = [
        (
            2,
            Error,
            "Database connection pool exhausted, waiting for available connection",
            "api-server",
        ),
        (
            3,
            Warning,
            "Slow query detected: SELECT * FROM users WHERE phone_verified=true (2.3s)",
            "postgres",
        ),
        (5, Error, "SMS provider API returned 429 Too Many Requests", "sms-gateway"),
        (7, Info, "Connection pool size increased from 20 to 30", "api-server"),
        (10, Warning, "High abandon rate detected on phone collection step (3.2%)", "analytics"),
        (
            12,
            Error,
            "Failed to validate phone number: network timeout after 5s",
            "validation-service",
        ),
        (
            15,
            Info,
            "Rate limiter triggered: 150 requests/min exceeded (actual: 178)",
            "api-gateway",
        ),
        (
            18,
            Warning,
            "Event tracking script failed to load (404) on 2.1% of page views",
            "tracking-monitor",
        ),
        (
            20,
            Error,
            "JavaScript exception in form validation: Cannot read property 'value' of null",
            "client-errors",
        ),
        (23, Info, "Auto-scaling triggered: Added 2 new server instances", "orchestrator"),
        (25, Warning, "Memory usage high: 87% of allocated heap used", "api-server"),
        (
            28,
            Error,
            "Provider API timeout: SMS verification request failed after 10s",
            "sms-gateway",
        ),
    ];

    rows.into_iter()
        .map(|(minutes, level, message, service)| LogEntry {
            timestamp: minutes_before(now, minutes).format("%H:%M:%S").to_string(),
            level,
            message: message.to_string(),
            service: service.to_string(),
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
