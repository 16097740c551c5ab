//! # Trend Series
//!
//! The four trend charts of the dashboard. Each series has one point per
//! sample of the selected window: a steady value, a degraded value inside a
//! fixed window, and an alert marker at one fixed index.
//!
//! | Metric | Steady | Degraded | Degraded window | Alert at |
//! |--------|--------|----------|-----------------|----------|
//! | User Response Success | 95.75 % | 92.25 % | (0.60, 0.75) | 0.65 |
//! | Server Response Time | 750 ms | 1150 ms | (0.50, 0.70) | 0.55 |
//! | Phone Validation Error Rate | 3 % | 15 % | (0.40, 0.60) | 0.45 |
//! | Event Completeness | 99.7 % | 99.3 % | (0.30, 0.45) | 0.35 |
//!
//! Window bounds are exclusive and alert indices are floored.

use crate::types::{Fraction, MetricStatus, TimeRange};
use serde::{Deserialize, Serialize};

/// Direction a trend is moving in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// One of the dashboard's trend charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    UserResponseSuccess,
    ServerResponseTime,
    PhoneValidationErrorRate,
    EventCompleteness,
}

struct TrendShape {
    steady: f64,
    degraded: f64,
    degraded_after: Fraction,
    degraded_before: Fraction,
    alert_at: Fraction,
    alert: &'static str,
}

impl TrendMetric {
    pub const ALL: [TrendMetric; 4] = [
        TrendMetric::UserResponseSuccess,
        TrendMetric::ServerResponseTime,
        TrendMetric::PhoneValidationErrorRate,
        TrendMetric::EventCompleteness,
    ];

    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            TrendMetric::UserResponseSuccess => "User Response Success",
            TrendMetric::ServerResponseTime => "Server Response Time",
            TrendMetric::PhoneValidationErrorRate => "Phone Validation Error Rate",
            TrendMetric::EventCompleteness => "Event Completeness",
        }
    }

    #[must_use]
    pub const fn unit(&self) -> &'static str {
        match self {
            TrendMetric::ServerResponseTime => "ms",
            TrendMetric::UserResponseSuccess
            | TrendMetric::PhoneValidationErrorRate
            | TrendMetric::EventCompleteness => "%",
        }
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            TrendMetric::UserResponseSuccess => {
                "Percentage of users who received a system response within 2 seconds"
            }
            TrendMetric::ServerResponseTime => "Average response time with SLA thresholds",
            TrendMetric::PhoneValidationErrorRate => {
                "Percentage of phone validation requests that failed due to provider errors"
            }
            TrendMetric::EventCompleteness => "Data accuracy vs baseline (99.5%)",
        }
    }

    /// Change against the prior period, in the metric's unit.
    #[must_use]
    pub const fn change(&self) -> f64 {
        match self {
            TrendMetric::UserResponseSuccess => -2.5,
            TrendMetric::ServerResponseTime => 130.0,
            TrendMetric::PhoneValidationErrorRate => 2.5,
            TrendMetric::EventCompleteness => 0.0,
        }
    }

    #[must_use]
    pub const fn direction(&self) -> TrendDirection {
        match self {
            TrendMetric::UserResponseSuccess | TrendMetric::PhoneValidationErrorRate => {
                TrendDirection::Down
            }
            TrendMetric::ServerResponseTime => TrendDirection::Up,
            TrendMetric::EventCompleteness => TrendDirection::Stable,
        }
    }

    #[must_use]
    pub const fn status(&self) -> MetricStatus {
        match self {
            TrendMetric::UserResponseSuccess | TrendMetric::ServerResponseTime => {
                MetricStatus::Warning
            }
            TrendMetric::PhoneValidationErrorRate => MetricStatus::Critical,
            TrendMetric::EventCompleteness => MetricStatus::Healthy,
        }
    }

    /// Reference line drawn on the chart, if any.
    #[must_use]
    pub const fn threshold(&self) -> Option<f64> {
        match self {
            TrendMetric::UserResponseSuccess => Some(95.0),
            TrendMetric::ServerResponseTime => Some(800.0),
            TrendMetric::PhoneValidationErrorRate => None,
            TrendMetric::EventCompleteness => Some(99.5),
        }
    }

    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            TrendMetric::UserResponseSuccess | TrendMetric::ServerResponseTime => "#F97316",
            TrendMetric::PhoneValidationErrorRate => "#EF4444",
            TrendMetric::EventCompleteness => "#10B981",
        }
    }

    const fn shape(&self) -> TrendShape {
        match self {
            TrendMetric::UserResponseSuccess => TrendShape {
                steady: 95.75,
                degraded: 92.25,
                degraded_after: Fraction::new(60, 100),
                degraded_before: Fraction::new(75, 100),
                alert_at: Fraction::new(65, 100),
                alert: "User Response Success Degradation",
            },
            TrendMetric::ServerResponseTime => TrendShape {
                steady: 750.0,
                degraded: 1150.0,
                degraded_after: Fraction::new(50, 100),
                degraded_before: Fraction::new(70, 100),
                alert_at: Fraction::new(55, 100),
                alert: "Response Time SLA Breach",
            },
            TrendMetric::PhoneValidationErrorRate => TrendShape {
                steady: 3.0,
                degraded: 15.0,
                degraded_after: Fraction::new(40, 100),
                degraded_before: Fraction::new(60, 100),
                alert_at: Fraction::new(45, 100),
                alert: "Validation Error Rate >10%",
            },
            TrendMetric::EventCompleteness => TrendShape {
                steady: 99.7,
                degraded: 99.3,
                degraded_after: Fraction::new(30, 100),
                degraded_before: Fraction::new(45, 100),
                alert_at: Fraction::new(35, 100),
                alert: "Data Quality Degradation",
            },
        }
    }
}

/// One sample of a trend chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub time: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
}

/// Build the series for one metric over one window.
#[must_use]
pub fn trend_series(metric: TrendMetric, range: TimeRange) -> Vec<TrendPoint> {
    let shape = metric.shape();
    let total = range.sample_count();
    let alert_index = shape.alert_at.of(total);

    (0..total)
        .map(|i| {
            let degraded = shape.degraded_after.is_below(i, total)
                && shape.degraded_before.is_above(i, total);
            TrendPoint {
                time: range.sample_label(i),
                value: if degraded {
                    shape.degraded
                } else {
                    shape.steady
                },
                baseline: metric.threshold(),
                alert: (i == alert_index).then(|| shape.alert.to_string()),
            }
        })
        .collect()
}

/// A trend chart with its header figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub metric: TrendMetric,
    pub title: String,
    pub unit: String,
    pub description: String,
    /// Value of the latest sample.
    pub current: f64,
    pub change: f64,
    pub direction: TrendDirection,
    pub status: MetricStatus,
    pub threshold: Option<f64>,
    pub color: String,
    pub alert_count: usize,
    pub points: Vec<TrendPoint>,
}

impl TrendSummary {
    #[must_use]
    pub fn for_range(metric: TrendMetric, range: TimeRange) -> Self {
        let points = trend_series(metric, range);
        Self {
            metric,
            title: metric.title().to_string(),
            unit: metric.unit().to_string(),
            description: metric.description().to_string(),
            current: points.last().map_or(0.0, |point| point.value),
            change: metric.change(),
            direction: metric.direction(),
            status: metric.status(),
            threshold: metric.threshold(),
            color: metric.color().to_string(),
            alert_count: points.iter().filter(|point| point.alert.is_some()).count(),
            points,
        }
    }
}

/// All four trend charts for a window.
#[must_use]
pub fn trend_summaries(range: TimeRange) -> Vec<TrendSummary> {
    TrendMetric::ALL
        .iter()
        .map(|metric| TrendSummary::for_range(*metric, range))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
