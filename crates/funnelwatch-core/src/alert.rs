//! # Alerts and Recurring Errors
//!
//! Alerts raised against the funnel and the recurring errors behind them.

use crate::primitives::TOP_ERRORS_SHOWN;
use crate::types::{Layer, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An alert raised against one layer of the funnel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub related_layer: Option<Layer>,
    #[serde(default)]
    pub is_resolved: bool,
}

impl Alert {
    #[must_use]
    pub fn new(id: u64, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            id,
            message: message.into(),
            severity,
            timestamp: None,
            related_layer: None,
            is_resolved: false,
        }
    }

    #[must_use]
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.related_layer = Some(layer);
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A recurring error grouped by message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopError {
    pub message: String,
    pub count: u64,
    pub layer: Layer,
    pub severity: Severity,
    pub last_occurrence: DateTime<Utc>,
}

/// The errors shown in the top-errors widget: the first few, in source order.
#[must_use]
pub fn top_errors(errors: &[TopError]) -> Vec<TopError> {
    errors.iter().take(TOP_ERRORS_SHOWN).cloned().collect()
}

/// Find an alert by id.
#[must_use]
pub fn find_alert(alerts: &[Alert], id: u64) -> Option<&Alert> {
    alerts.iter().find(|alert| alert.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(message: &str, count: u64) -> TopError {
        TopError {
            message: message.to_string(),
            count,
            layer: Layer::Server,
            severity: Severity::Warning,
            last_occurrence: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn top_errors_keeps_first_four() {
        let errors: Vec<TopError> = (0..6).map(|i| error(&format!("e{i}"), i)).collect();
        let shown = top_errors(&errors);
        assert_eq!(shown.len(), 4);
        assert_eq!(shown[0].message, "e0");
        assert_eq!(shown[3].message, "e3");
    }

    #[test]
    fn alert_deserializes_with_defaults() {
        let alert: Alert =
            serde_json::from_str(r#"{"id": 7, "message": "Spike", "severity": "critical"}"#)
                .expect("deserialize");
        assert_eq!(alert.id, 7);
        assert_eq!(alert.related_layer, None);
        assert!(!alert.is_resolved);
    }

    #[test]
    fn find_alert_by_id() {
        let alerts = vec![
            Alert::new(1, "a", Severity::Critical),
            Alert::new(2, "b", Severity::Warning).with_layer(Layer::Provider),
        ];
        assert_eq!(
            find_alert(&alerts, 2).and_then(|a| a.related_layer),
            Some(Layer::Provider)
        );
        assert!(find_alert(&alerts, 9).is_none());
    }
}
