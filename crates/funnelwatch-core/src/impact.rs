//! # Business Impact Estimation
//!
//! An illustrative estimate of activations lost to reliability issues. It is
//! a lookup over a fixed table, not a forecast:
//!
//! | Range | Achieved | Lost |
//! |-------|----------|------|
//! | 1h | 87 | 9 |
//! | 24h | 96 | 12 |
//! | 7d | 672 | 84 |
//! | 30d | 2880 | 360 |
//!
//! Loss percentage is `lost / (achieved + lost) * 100`, kept in basis points.
//! Threshold checks cross-multiply so they are exact in integers.

use crate::primitives::{LOSS_CRITICAL_PERCENT, LOSS_WARNING_PERCENT};
use crate::types::{Fraction, FunnelError, MetricStatus, TimeRange};
use serde::{Deserialize, Serialize};

// =============================================================================
// ACTIVATION SAMPLES
// =============================================================================

/// Activations achieved and lost over one reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationSample {
    pub achieved: u64,
    pub lost: u64,
}

impl ActivationSample {
    #[must_use]
    pub const fn new(achieved: u64, lost: u64) -> Self {
        Self { achieved, lost }
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.achieved.saturating_add(self.lost)
    }

    /// Fixed sample for a reporting window.
    #[must_use]
    pub const fn for_range(range: TimeRange) -> Self {
        match range {
            TimeRange::Hour => Self::new(87, 9),
            TimeRange::Day => Self::new(96, 12),
            TimeRange::Week => Self::new(672, 84),
            TimeRange::Month => Self::new(2880, 360),
        }
    }
}

/// Activation impact summary for one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationImpact {
    pub range: TimeRange,
    pub achieved: u64,
    pub lost: u64,
    pub total: u64,
    /// Loss percentage in hundredths of a percent, rounded down.
    pub loss_basis_points: u64,
    /// Loss percentage with one decimal, e.g. `11.1`.
    pub loss_percent: String,
    pub status: MetricStatus,
}

impl ActivationImpact {
    /// Estimate impact for a window from the fixed sample table.
    pub fn estimate(range: TimeRange) -> Result<Self, FunnelError> {
        Self::from_sample(range, ActivationSample::for_range(range))
    }

    /// Estimate impact from an explicit sample.
    ///
    /// A sample with zero total activations has no loss percentage and is
    /// rejected.
    pub fn from_sample(range: TimeRange, sample: ActivationSample) -> Result<Self, FunnelError> {
        let total = sample.total();
        if total == 0 {
            return Err(FunnelError::EmptyImpactSample(range));
        }

        let loss_basis_points = sample.lost.saturating_mul(10_000) / total;

        // Tenths of a percent, rounded half up.
        let tenths = sample
            .lost
            .saturating_mul(2_000)
            .saturating_add(total)
            / total.saturating_mul(2);

        Ok(Self {
            range,
            achieved: sample.achieved,
            lost: sample.lost,
            total,
            loss_basis_points,
            loss_percent: format!("{}.{}", tenths / 10, tenths % 10),
            status: classify_loss(sample.lost, total),
        })
    }

    /// Badge text for the impact card.
    #[must_use]
    pub const fn level(&self) -> &'static str {
        match self.status {
            MetricStatus::Healthy => "Low",
            MetricStatus::Warning => "Medium",
            MetricStatus::Critical => "High",
        }
    }
}

/// `critical` above 15 %, `warning` above 8 %, else `healthy`.
fn classify_loss(lost: u64, total: u64) -> MetricStatus {
    let scaled = lost.saturating_mul(100);
    if scaled > LOSS_CRITICAL_PERCENT.saturating_mul(total) {
        MetricStatus::Critical
    } else if scaled > LOSS_WARNING_PERCENT.saturating_mul(total) {
        MetricStatus::Warning
    } else {
        MetricStatus::Healthy
    }
}

// =============================================================================
// INCIDENT IMPACT TABLE
// =============================================================================

/// Severity of an incident in the impact table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentSeverity {
    Critical,
    Low,
}

impl IncidentSeverity {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            IncidentSeverity::Critical => "Critical",
            IncidentSeverity::Low => "Low",
        }
    }
}

struct IncidentDefinition {
    name: &'static str,
    severity: IncidentSeverity,
    priority: &'static str,
    start: Fraction,
    end: Fraction,
    /// Activations lost per window, in `TimeRange::ALL` order.
    lost: [u64; 4],
}

impl IncidentDefinition {
    fn lost_in(&self, range: TimeRange) -> u64 {
        match range {
            TimeRange::Hour => self.lost[0],
            TimeRange::Day => self.lost[1],
            TimeRange::Week => self.lost[2],
            TimeRange::Month => self.lost[3],
        }
    }
}

const INCIDENTS: [IncidentDefinition; 3] = [
    IncidentDefinition {
        name: "Server Response Time Breach",
        severity: IncidentSeverity::Critical,
        priority: "P0",
        start: Fraction::new(30, 100),
        end: Fraction::new(45, 100),
        lost: [0, 8, 56, 240],
    },
    IncidentDefinition {
        name: "Phone validation errors affecting user activations",
        severity: IncidentSeverity::Critical,
        priority: "P0",
        start: Fraction::new(85, 100),
        end: Fraction::new(1, 1),
        lost: [9, 3, 21, 90],
    },
    IncidentDefinition {
        name: "Client Abandon Rate Spike",
        severity: IncidentSeverity::Low,
        priority: "P2",
        start: Fraction::new(55, 100),
        end: Fraction::new(62, 100),
        lost: [0, 1, 7, 30],
    },
];

/// One row of the incident impact table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentImpact {
    pub name: String,
    pub severity: IncidentSeverity,
    pub priority: String,
    pub activations_lost: u64,
    /// First sample index inside the incident.
    pub start_index: usize,
    /// First sample index after the incident.
    pub end_index: usize,
    /// Window label, e.g. `7:00 – 10:00`.
    pub window: String,
}

impl IncidentImpact {
    /// Whether the sample at `index` falls inside this incident.
    #[must_use]
    pub fn covers(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }
}

/// Incidents that cost activations in a window. Zero-loss incidents are omitted.
#[must_use]
pub fn incident_impacts(range: TimeRange) -> Vec<IncidentImpact> {
    let count = range.sample_count();

    INCIDENTS
        .iter()
        .filter(|incident| incident.lost_in(range) > 0)
        .map(|incident| {
            let start_index = incident.start.of(count);
            let end_index = incident.end.of(count);
            IncidentImpact {
                name: incident.name.to_string(),
                severity: incident.severity,
                priority: incident.priority.to_string(),
                activations_lost: incident.lost_in(range),
                start_index,
                end_index,
                window: format!(
                    "{} – {}",
                    range.sample_label(start_index),
                    range.sample_label(end_index)
                ),
            }
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_table_estimates() {
        let day = ActivationImpact::estimate(TimeRange::Day).expect("estimate");
        assert_eq!(day.total, 108);
        assert_eq!(day.loss_basis_points, 1111);
        assert_eq!(day.loss_percent, "11.1");
        assert_eq!(day.status, MetricStatus::Warning);
        assert_eq!(day.level(), "Medium");

        let hour = ActivationImpact::estimate(TimeRange::Hour).expect("estimate");
        assert_eq!(hour.total, 96);
        assert_eq!(hour.loss_basis_points, 937);
        assert_eq!(hour.loss_percent, "9.4");
        assert_eq!(hour.status, MetricStatus::Warning);
    }

    #[test]
    fn every_range_has_a_valid_sample() {
        for range in TimeRange::ALL {
            assert!(ActivationImpact::estimate(range).is_ok());
        }
    }

    #[test]
    fn thresholds_are_strict() {
        // Exactly 15 % is a warning, just above is critical.
        let at_fifteen =
            ActivationImpact::from_sample(TimeRange::Day, ActivationSample::new(85, 15))
                .expect("estimate");
        assert_eq!(at_fifteen.status, MetricStatus::Warning);

        let above_fifteen =
            ActivationImpact::from_sample(TimeRange::Day, ActivationSample::new(84, 16))
                .expect("estimate");
        assert_eq!(above_fifteen.status, MetricStatus::Critical);

        // Exactly 8 % is healthy.
        let at_eight = ActivationImpact::from_sample(TimeRange::Day, ActivationSample::new(92, 8))
            .expect("estimate");
        assert_eq!(at_eight.status, MetricStatus::Healthy);
        assert_eq!(at_eight.level(), "Low");
    }

    #[test]
    fn zero_total_is_rejected() {
        let result = ActivationImpact::from_sample(TimeRange::Week, ActivationSample::new(0, 0));
        assert!(matches!(
            result,
            Err(FunnelError::EmptyImpactSample(TimeRange::Week))
        ));
    }

    #[test]
    fn no_loss_is_zero_percent() {
        let impact = ActivationImpact::from_sample(TimeRange::Day, ActivationSample::new(50, 0))
            .expect("estimate");
        assert_eq!(impact.loss_percent, "0.0");
        assert_eq!(impact.status, MetricStatus::Healthy);
    }

    #[test]
    fn hour_window_omits_zero_loss_incidents() {
        let incidents = incident_impacts(TimeRange::Hour);
        assert_eq!(incidents.len(), 1);
        assert_eq!(
            incidents[0].name,
            "Phone validation errors affecting user activations"
        );
        assert_eq!(incidents[0].activations_lost, 9);
        assert_eq!(incidents[0].start_index, 10);
        assert_eq!(incidents[0].end_index, 12);
        assert_eq!(incidents[0].window, "50m – 60m");
    }

    #[test]
    fn day_window_lists_all_incidents() {
        let incidents = incident_impacts(TimeRange::Day);
        assert_eq!(incidents.len(), 3);

        let breach = &incidents[0];
        assert_eq!(breach.start_index, 7);
        assert_eq!(breach.end_index, 10);
        assert_eq!(breach.window, "7:00 – 10:00");
        assert_eq!(breach.priority, "P0");
        assert!(breach.covers(7));
        assert!(!breach.covers(10));

        let spike = &incidents[2];
        assert_eq!(spike.severity, IncidentSeverity::Low);
        assert_eq!(spike.start_index, 13);
        assert_eq!(spike.end_index, 14);
    }

    #[test]
    fn week_window_uses_day_labels() {
        let incidents = incident_impacts(TimeRange::Week);
        assert_eq!(incidents[0].window, "Day 3 – Day 4");
        assert_eq!(incidents[0].activations_lost, 56);
    }
}
