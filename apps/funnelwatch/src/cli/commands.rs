//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use crate::config::DashboardConfig;
use crate::dashboard::{Dashboard, DashboardSnapshot};
use funnelwatch_core::{
    ActivationImpact, FunnelError, HealthSummary, TimeRange, incident_impacts, parse_records,
    route_records, transform_funnel_data, transform_reliability_metrics, trend_summaries,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// =============================================================================
// FILE LIMITS
// =============================================================================

/// Maximum size of a record file (16 MB).
const MAX_RECORD_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), FunnelError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| FunnelError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(FunnelError::InvalidRecord(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve `path` to an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, FunnelError> {
    let canonical = path.canonicalize().map_err(|e| {
        FunnelError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(FunnelError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), FunnelError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| FunnelError::SerializationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

/// Build a dashboard from config and run one refresh.
async fn load_snapshot(config: Option<&Path>) -> Result<DashboardSnapshot, FunnelError> {
    let config = DashboardConfig::resolve(config)?;
    let dashboard = Dashboard::from_config(&config);
    Ok(dashboard.refresh().await)
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: Option<&Path>, host: &str, port: u16) -> Result<(), FunnelError> {
    let config = DashboardConfig::resolve(config)?;
    let dashboard = Arc::new(Dashboard::from_config(&config));

    println!("funnelwatch Dashboard Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:          {}", host);
    println!("  Port:          {}", port);
    println!("  Refresh every: {}s", config.refresh_interval_secs);
    println!("  Auto-refresh:  {}", config.auto_refresh);
    println!("  Max retries:   {}", config.max_retries);
    println!(
        "  Source delay:  {:?} (metrics)",
        dashboard.source().latency().metrics
    );
    println!();
    println!("Endpoints:");
    println!("  GET  /dashboard          - Full snapshot");
    println!("  GET  /summary            - Health banner");
    println!("  GET  /impact?range=24h   - Business impact");
    println!("  GET  /trends?range=24h   - Trend charts");
    println!("  GET  /drilldown/{{id}}     - Root-cause drilldown");
    println!("  POST /refresh            - Refresh now");
    println!("  POST /transform          - Transform raw records");
    println!("  GET  /health             - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    dashboard.refresh().await;
    let auto_refresh = dashboard.spawn_auto_refresh();

    let addr = format!("{}:{}", host, port);
    let result = api::run_server(&addr, dashboard).await;
    auto_refresh.abort();
    result
}

// =============================================================================
// SNAPSHOT COMMANDS
// =============================================================================

/// Show the full dashboard.
pub async fn cmd_dashboard(config: Option<&Path>, json_mode: bool) -> Result<(), FunnelError> {
    let snapshot = load_snapshot(config).await?;

    if json_mode {
        return print_json(&snapshot);
    }

    print_health(&snapshot.health);
    println!();
    print_funnel(&snapshot);
    println!();
    print_reliability(&snapshot);
    println!();

    println!("Alerts");
    println!("======");
    for alert in &snapshot.alerts {
        println!(
            "  #{:<3} [{:<8}] {}",
            alert.id,
            alert.severity.tag().to_uppercase(),
            alert.message
        );
    }
    println!();

    println!("Top Errors");
    println!("==========");
    for error in &snapshot.top_errors {
        println!("  {:>4}x  {} ({})", error.count, error.message, error.layer);
    }

    if !snapshot.failed_sources.is_empty() {
        println!();
        println!(
            "Warning: fallback data shown for: {}",
            snapshot.failed_sources.join(", ")
        );
    }

    Ok(())
}

/// Show the funnel stages.
pub async fn cmd_funnel(config: Option<&Path>, json_mode: bool) -> Result<(), FunnelError> {
    let snapshot = load_snapshot(config).await?;
    if json_mode {
        return print_json(&snapshot.funnel);
    }
    print_funnel(&snapshot);
    Ok(())
}

/// Show reliability metrics by layer.
pub async fn cmd_reliability(config: Option<&Path>, json_mode: bool) -> Result<(), FunnelError> {
    let snapshot = load_snapshot(config).await?;
    if json_mode {
        return print_json(&snapshot.reliability);
    }
    print_reliability(&snapshot);
    Ok(())
}

/// Show the overall health banner.
pub async fn cmd_health(config: Option<&Path>, json_mode: bool) -> Result<(), FunnelError> {
    let snapshot = load_snapshot(config).await?;
    if json_mode {
        return print_json(&snapshot.health);
    }
    print_health(&snapshot.health);
    Ok(())
}

fn print_health(health: &HealthSummary) {
    println!("Funnel Health: {}", health.status);
    println!("  {}", health.headline);
    println!(
        "  Critical alerts: {}  Warning alerts: {}  Critical metrics: {}",
        health.counts.critical_alerts, health.counts.warning_alerts, health.counts.critical_metrics
    );
}

fn print_funnel(snapshot: &DashboardSnapshot) {
    println!("Funnel");
    println!("======");
    for view in &snapshot.funnel {
        println!(
            "  {:<16} {:>7}  conv {:>5}%  drop {:>5}%  delta {:+}",
            view.name, view.count, view.conversion, view.drop_off, view.delta
        );
    }
}

fn print_reliability(snapshot: &DashboardSnapshot) {
    println!("Reliability");
    println!("===========");
    for row in &snapshot.reliability {
        println!(
            "  {:<13} {:<34} {:>6}{:<2} target {:<8} {}",
            row.layer, row.metric, row.current, row.unit, row.target, row.status
        );
    }
}

// =============================================================================
// RANGE COMMANDS
// =============================================================================

/// Show business impact for a window.
pub fn cmd_impact(range: TimeRange, json_mode: bool) -> Result<(), FunnelError> {
    let impact = ActivationImpact::estimate(range)?;
    let incidents = incident_impacts(range);

    if json_mode {
        let output = serde_json::json!({
            "range": range,
            "level": impact.level(),
            "impact": impact,
            "incidents": incidents,
        });
        return print_json(&output);
    }

    println!("Business Impact ({})", range);
    println!("====================");
    println!("Activations achieved: {}", impact.achieved);
    println!("Activations lost:     {}", impact.lost);
    println!("Loss:                 {}% ({})", impact.loss_percent, impact.level());
    println!();
    println!("Incidents:");
    if incidents.is_empty() {
        println!("  (none)");
    }
    for incident in &incidents {
        println!(
            "  [{}] {} - {} lost, {} ({})",
            incident.priority,
            incident.name,
            incident.activations_lost,
            incident.window,
            incident.severity.label()
        );
    }

    Ok(())
}

/// Show the trend charts for a window.
pub fn cmd_trends(range: TimeRange, json_mode: bool) -> Result<(), FunnelError> {
    let trends = trend_summaries(range);

    if json_mode {
        return print_json(&trends);
    }

    println!("Trends ({})", range);
    println!("===========");
    for trend in &trends {
        let threshold = trend
            .threshold
            .map_or_else(|| "-".to_string(), |t| format!("{}{}", t, trend.unit));
        println!(
            "  {:<28} now {}{:<3} change {:+} threshold {:<7} alerts {}",
            trend.title, trend.current, trend.unit, trend.change, threshold, trend.alert_count
        );
    }

    Ok(())
}

/// Show the root-cause drilldown of an alert.
pub async fn cmd_drilldown(
    config: Option<&Path>,
    alert_id: u64,
    range: TimeRange,
    json_mode: bool,
) -> Result<(), FunnelError> {
    let config = DashboardConfig::resolve(config)?;
    let dashboard = Dashboard::from_config(&config);
    dashboard.refresh().await;
    let drilldown = dashboard.drilldown(alert_id, range).await?;

    if json_mode {
        return print_json(&drilldown);
    }

    println!("{}", drilldown.report);
    println!();
    println!("Segments (affected / total):");
    for (label, segments) in [
        ("Country", &drilldown.segmentation.country),
        ("Browser", &drilldown.segmentation.browser),
        ("Traffic source", &drilldown.segmentation.traffic_source),
    ] {
        let line: Vec<String> = segments
            .iter()
            .map(|s| {
                format!(
                    "{} {}/{} ({}%)",
                    s.name,
                    s.affected,
                    s.total,
                    s.rate.as_deref().unwrap_or("-")
                )
            })
            .collect();
        println!("  {:<15} {}", label, line.join(", "));
    }

    Ok(())
}

// =============================================================================
// TRANSFORM COMMAND
// =============================================================================

/// Transform raw metric records from a JSON file.
pub fn cmd_transform(file: &Path, json_mode: bool) -> Result<(), FunnelError> {
    let path = validate_file_path(file)?;
    validate_file_size(&path, MAX_RECORD_FILE_SIZE)?;

    let bytes = std::fs::read(&path)
        .map_err(|e| FunnelError::IoError(format!("Cannot read '{}': {}", path.display(), e)))?;
    let raw = parse_records(&bytes)?;
    let routed = route_records(&raw);
    let funnel = transform_funnel_data(&routed);
    let reliability = transform_reliability_metrics(&routed);

    tracing::debug!(
        records = raw.len(),
        routed = routed.len(),
        "records transformed, unroutable ones dropped"
    );

    if json_mode {
        let output = serde_json::json!({
            "records": raw.len(),
            "routed": routed.len(),
            "funnel": funnel,
            "reliability": reliability,
        });
        return print_json(&output);
    }

    println!("Records: {} read, {} routed", raw.len(), routed.len());
    println!();
    println!("Funnel");
    println!("======");
    for view in &funnel {
        println!("  {:<16} {:>7}  conv {:>5}%", view.name, view.count, view.conversion);
    }
    println!();
    println!("Reliability");
    println!("===========");
    for row in &reliability {
        println!("  {:<13} {:<34} {} [{}]", row.layer, row.metric, row.current, row.status);
    }

    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
