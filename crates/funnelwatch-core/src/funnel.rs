//! # Funnel Transformation
//!
//! Turns routed records into the four-entry funnel view.
//!
//! - Output is always exactly four entries in canonical stage order
//! - A stage with no observation gets a zero-valued entry
//! - Duplicate observations of a stage: the first in input order wins
//! - No funnel observations at all: [`FALLBACK_FUNNEL`] is returned as is

use crate::record::{FunnelObservation, MetricRecord};
use crate::types::Stage;
use serde::Serialize;

/// One bar of the funnel chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelStageView {
    pub stage: Stage,
    pub name: &'static str,
    pub count: u64,
    pub conversion: f64,
    pub drop_off: f64,
    pub delta: f64,
    pub color: &'static str,
}

impl FunnelStageView {
    /// Entry for a stage with no observation.
    #[must_use]
    pub const fn empty(stage: Stage) -> Self {
        Self {
            stage,
            name: stage.display_name(),
            count: 0,
            conversion: 0.0,
            drop_off: 0.0,
            delta: 0.0,
            color: stage.color(),
        }
    }

    #[must_use]
    pub fn from_observation(observation: &FunnelObservation) -> Self {
        Self {
            stage: observation.stage,
            name: observation.stage.display_name(),
            count: observation.count,
            conversion: observation.conversion,
            drop_off: observation.drop_off,
            delta: observation.delta,
            color: observation.stage.color(),
        }
    }

    const fn fixed(stage: Stage, count: u64, conversion: f64, drop_off: f64, delta: f64) -> Self {
        Self {
            stage,
            name: stage.display_name(),
            count,
            conversion,
            drop_off,
            delta,
            color: stage.color(),
        }
    }
}

/// Funnel shown when no funnel observation is available.
pub const FALLBACK_FUNNEL: [FunnelStageView; 4] = [
    FunnelStageView::fixed(Stage::Visitors, 10_000, 100.0, 0.0, 0.0),
    FunnelStageView::fixed(Stage::NextPage, 7_500, 75.0, 25.0, -2.3),
    FunnelStageView::fixed(Stage::PhoneCollected, 5_400, 72.0, 28.0, -3.8),
    FunnelStageView::fixed(Stage::Activation, 4_860, 90.0, 10.0, 1.2),
];

/// Build the funnel view from a list of routed records.
#[must_use]
pub fn transform_funnel_data(records: &[MetricRecord]) -> Vec<FunnelStageView> {
    let observations: Vec<&FunnelObservation> =
        records.iter().filter_map(MetricRecord::as_funnel).collect();

    if observations.is_empty() {
        return FALLBACK_FUNNEL.to_vec();
    }

    Stage::CANONICAL
        .iter()
        .map(|stage| {
            observations
                .iter()
                .find(|observation| observation.stage == *stage)
                .map_or_else(
                    || FunnelStageView::empty(*stage),
                    |observation| FunnelStageView::from_observation(observation),
                )
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
