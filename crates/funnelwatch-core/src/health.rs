//! # Overall Health Classification
//!
//! One rule, used everywhere the dashboard summarises health. It is an ordered
//! decision list over three counts; the first matching rule wins.
//!
//! | Order | Condition | Status |
//! |-------|-----------|--------|
//! | 1 | critical alerts >= 2 or critical metrics >= 2 | `critical` |
//! | 2 | critical alerts >= 1 or critical metrics >= 1 or warning alerts >= 2 | `at_risk` |
//! | 3 | otherwise | `healthy` |

use crate::alert::Alert;
use crate::primitives::{CRITICAL_SIGNAL_LIMIT, WARNING_ALERT_LIMIT};
use crate::reliability::ReliabilityMetricView;
use crate::types::{MetricStatus, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall funnel health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    AtRisk,
    Critical,
}

impl HealthStatus {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::AtRisk => "At Risk",
            HealthStatus::Critical => "Critical",
        }
    }

    /// Headline shown next to the status.
    #[must_use]
    pub const fn headline(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "All systems operating within normal parameters",
            HealthStatus::AtRisk => "Investigate Server Latency and Client Drop-offs",
            HealthStatus::Critical => {
                "Multiple critical issues detected – Immediate action required"
            }
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The counts the classification looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalCounts {
    pub critical_alerts: usize,
    pub warning_alerts: usize,
    pub critical_metrics: usize,
}

impl SignalCounts {
    #[must_use]
    pub const fn new(
        critical_alerts: usize,
        warning_alerts: usize,
        critical_metrics: usize,
    ) -> Self {
        Self {
            critical_alerts,
            warning_alerts,
            critical_metrics,
        }
    }

    /// Count alert severities and critical reliability rows.
    ///
    /// Every alert counts, resolved or not.
    #[must_use]
    pub fn tally(alerts: &[Alert], metrics: &[ReliabilityMetricView]) -> Self {
        let count_severity =
            |severity: Severity| alerts.iter().filter(|a| a.severity == severity).count();

        Self {
            critical_alerts: count_severity(Severity::Critical),
            warning_alerts: count_severity(Severity::Warning),
            critical_metrics: metrics
                .iter()
                .filter(|m| m.status == MetricStatus::Critical)
                .count(),
        }
    }
}

/// Classify overall health. See the module table for the rule.
#[must_use]
pub fn classify_health(counts: SignalCounts) -> HealthStatus {
    if counts.critical_alerts >= CRITICAL_SIGNAL_LIMIT
        || counts.critical_metrics >= CRITICAL_SIGNAL_LIMIT
    {
        HealthStatus::Critical
    } else if counts.critical_alerts >= 1
        || counts.critical_metrics >= 1
        || counts.warning_alerts >= WARNING_ALERT_LIMIT
    {
        HealthStatus::AtRisk
    } else {
        HealthStatus::Healthy
    }
}

/// Health banner contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub status: HealthStatus,
    pub headline: String,
    #[serde(flatten)]
    pub counts: SignalCounts,
}

impl HealthSummary {
    #[must_use]
    pub fn from_counts(counts: SignalCounts) -> Self {
        let status = classify_health(counts);
        Self {
            status,
            headline: status.headline().to_string(),
            counts,
        }
    }

    #[must_use]
    pub fn assess(alerts: &[Alert], metrics: &[ReliabilityMetricView]) -> Self {
        Self::from_counts(SignalCounts::tally(alerts, metrics))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reliability::FALLBACK_RELIABILITY_METRICS;

    fn classify(c: usize, w: usize, m: usize) -> HealthStatus {
        classify_health(SignalCounts::new(c, w, m))
    }

    #[test]
    fn decision_list() {
        assert_eq!(classify(2, 0, 0), HealthStatus::Critical);
        assert_eq!(classify(0, 2, 0), HealthStatus::AtRisk);
        assert_eq!(classify(1, 0, 0), HealthStatus::AtRisk);
        assert_eq!(classify(0, 1, 0), HealthStatus::Healthy);
        assert_eq!(classify(0, 0, 2), HealthStatus::Critical);
    }

    #[test]
    fn first_match_wins() {
        // Satisfies both the critical and the at-risk rule.
        assert_eq!(classify(3, 5, 1), HealthStatus::Critical);
        assert_eq!(classify(0, 0, 1), HealthStatus::AtRisk);
        assert_eq!(classify(0, 0, 0), HealthStatus::Healthy);
    }

    #[test]
    fn tally_counts_alerts_and_metrics() {
        let alerts = vec![
            Alert::new(1, "Spike", Severity::Critical),
            Alert::new(2, "SLA", Severity::Critical),
            Alert::new(3, "429", Severity::Warning),
            Alert::new(4, "info", Severity::Info),
        ];

        let counts = SignalCounts::tally(&alerts, &FALLBACK_RELIABILITY_METRICS);
        assert_eq!(counts, SignalCounts::new(2, 1, 1));
    }

    #[test]
    fn summary_carries_headline() {
        let summary = HealthSummary::assess(&[], &FALLBACK_RELIABILITY_METRICS);
        assert_eq!(summary.status, HealthStatus::AtRisk);
        assert_eq!(summary.headline, HealthStatus::AtRisk.headline());
        assert_eq!(summary.counts.critical_metrics, 1);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&HealthStatus::AtRisk).expect("serialize");
        assert_eq!(json, "\"at_risk\"");
    }
}
