//! # Transformation Tier Tests (T0-T3)
//!
//! If ANY tier fails, the dashboard shows wrong numbers.
//!
//! ## Tiers
//! - T0: Record Routing
//! - T1: Funnel Shape
//! - T2: Reliability Table
//! - T3: Health and Impact Classification

use funnelwatch_core::{
    ActivationImpact, FALLBACK_FUNNEL, FALLBACK_RELIABILITY_METRICS, HealthStatus, MetricRecord,
    MetricStatus, SignalCounts, Stage, TimeRange, classify_health, parse_records, route_records,
    transform_funnel_data, transform_reliability_metrics,
};

fn routed(json: &str) -> Vec<MetricRecord> {
    let raw = parse_records(json.as_bytes()).expect("parse");
    route_records(&raw)
}

// =============================================================================
// TIER T0: RECORD ROUTING
// =============================================================================

mod t0_record_routing {
    use super::*;

    /// T0.1: Records with neither discriminator are dropped silently.
    #[test]
    fn unroutable_records_are_dropped() {
        let records = routed(r#"[{"conversion_rate": 80.0, "current_value": 10}, {}]"#);
        assert!(records.is_empty());
    }

    /// T0.2: A blank stage counts as absent rather than as an error.
    #[test]
    fn blank_stage_is_absent() {
        let records = routed(r#"[{"funnel_stage": "", "conversion_rate": 80.0}]"#);
        assert!(records.is_empty());
    }

    /// T0.3: A stage outside the enumeration drops only its own record.
    #[test]
    fn unknown_stage_drops_only_its_record() {
        let records = routed(
            r#"[{"funnel_stage": "checkout", "current_value": 12},
                {"funnel_stage": "visitors", "current_value": 3014}]"#,
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].as_funnel().expect("funnel").stage, Stage::Visitors);
    }

    /// T0.3b: Malformed numeric fields default instead of failing the batch.
    #[test]
    fn malformed_numbers_default() {
        let records = routed(
            r#"[{"funnel_stage": "visitors", "current_value": 3014},
                {"funnel_stage": "next_page", "conversion_rate": "n/a", "current_value": 2471}]"#,
        );
        assert_eq!(records.len(), 2);
        let next_page = records[1].as_funnel().expect("funnel");
        assert_eq!(next_page.count, 2471);
        assert_eq!(next_page.conversion, 0.0);
    }

    /// T0.4: camelCase field names are accepted.
    #[test]
    fn camel_case_aliases() {
        let records = routed(
            r#"[{"layer": "server", "metricName": "Validation Request Success Rate",
                 "targetValue": "≥ 98%", "currentValue": 96.5, "status": "warning"}]"#,
        );
        let row = records[0].as_reliability().expect("reliability");
        assert_eq!(row.target, "≥ 98%");
        assert_eq!(row.status, MetricStatus::Warning);
    }

    /// T0.5: Negative counts clamp to zero.
    #[test]
    fn negative_count_is_zero() {
        let records = routed(r#"[{"funnel_stage": "visitors", "current_value": -12.0}]"#);
        assert_eq!(records[0].as_funnel().expect("funnel").count, 0);
    }

    /// T0.6: Not a JSON array.
    #[test]
    fn malformed_input_is_rejected() {
        assert!(parse_records(b"{\"funnel_stage\": \"visitors\"}").is_err());
        assert!(parse_records(b"not json").is_err());
    }
}

// =============================================================================
// TIER T1: FUNNEL SHAPE
// =============================================================================

mod t1_funnel_shape {
    use super::*;

    /// T1.1: Output is four entries in canonical order for any input order.
    #[test]
    fn canonical_order_regardless_of_input_order() {
        let records = routed(
            r#"[
                {"funnel_stage": "activation", "current_value": 96},
                {"funnel_stage": "visitors", "current_value": 3014},
                {"funnel_stage": "phone_collected", "current_value": 1868}
            ]"#,
        );

        let funnel = transform_funnel_data(&records);
        let stages: Vec<Stage> = funnel.iter().map(|view| view.stage).collect();
        assert_eq!(stages, Stage::CANONICAL);
        assert_eq!(funnel[0].count, 3014);
        // next_page was never observed
        assert_eq!(funnel[1].count, 0);
        assert_eq!(funnel[1].name, "Next Page");
        assert_eq!(funnel[3].count, 96);
    }

    /// T1.2: Empty input equals the fallback exactly.
    #[test]
    fn fallback_equivalence() {
        let funnel = transform_funnel_data(&[]);
        assert_eq!(funnel, FALLBACK_FUNNEL.to_vec());

        let expected = [
            ("Visitors", 10_000, 100.0, 0.0, 0.0),
            ("Next Page", 7_500, 75.0, 25.0, -2.3),
            ("Phone Collected", 5_400, 72.0, 28.0, -3.8),
            ("Activation", 4_860, 90.0, 10.0, 1.2),
        ];
        for (view, (name, count, conversion, drop_off, delta)) in funnel.iter().zip(expected) {
            assert_eq!(view.name, name);
            assert_eq!(view.count, count);
            assert_eq!(view.conversion, conversion);
            assert_eq!(view.drop_off, drop_off);
            assert_eq!(view.delta, delta);
        }
    }

    /// T1.3: A record without a stage never reaches the funnel.
    #[test]
    fn record_without_stage_is_excluded() {
        let records = routed(
            r#"[
                {"conversion_rate": 10.0, "drop_off_rate": 90.0, "current_value": 5},
                {"funnel_stage": "visitors", "current_value": 100}
            ]"#,
        );
        let funnel = transform_funnel_data(&records);
        assert_eq!(funnel[0].count, 100);
        assert!(funnel[1..].iter().all(|view| view.count == 0));
    }

    /// T1.4: Duplicate stage: first in input order wins.
    #[test]
    fn duplicate_stage_takes_first() {
        let records = routed(
            r#"[
                {"funnel_stage": "visitors", "current_value": 111},
                {"funnel_stage": "visitors", "current_value": 222}
            ]"#,
        );
        assert_eq!(transform_funnel_data(&records)[0].count, 111);
    }

    /// T1.5: Calling twice gives the same result.
    #[test]
    fn idempotent() {
        let records = routed(r#"[{"funnel_stage": "next_page", "current_value": 2471}]"#);
        assert_eq!(transform_funnel_data(&records), transform_funnel_data(&records));
    }
}

// =============================================================================
// TIER T2: RELIABILITY TABLE
// =============================================================================

mod t2_reliability_table {
    use super::*;

    /// T2.1: Layer tags become display names.
    #[test]
    fn layer_name_formatting() {
        let records = routed(
            r#"[{"layer": "data_quality", "metric_name": "Event Completeness & Accuracy",
                 "current_value": 99.8}]"#,
        );
        let table = transform_reliability_metrics(&records);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].layer, "Data Quality");
        assert_eq!(table[0].status, MetricStatus::Healthy);
    }

    /// T2.2: A row needs both a layer and a metric name.
    #[test]
    fn filter_requires_layer_and_metric_name() {
        let records = routed(
            r#"[
                {"layer": "client", "current_value": 92.5},
                {"metric_name": "Orphan", "current_value": 1.0},
                {"layer": "server", "metric_name": "Kept", "current_value": 96.5}
            ]"#,
        );
        let table = transform_reliability_metrics(&records);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].metric, "Kept");
    }

    /// T2.3: Rows keep input order and are not deduplicated.
    #[test]
    fn order_preserved_without_dedup() {
        let records = routed(
            r#"[
                {"layer": "provider", "metric_name": "A", "status": "critical"},
                {"layer": "client", "metric_name": "B"},
                {"layer": "provider", "metric_name": "A", "status": "critical"}
            ]"#,
        );
        let table = transform_reliability_metrics(&records);
        let metrics: Vec<&str> = table.iter().map(|row| row.metric.as_ref()).collect();
        assert_eq!(metrics, ["A", "B", "A"]);
    }

    /// T2.4: No reliability rows falls back to the fixed table.
    #[test]
    fn fallback_when_empty() {
        let records = routed(r#"[{"funnel_stage": "visitors", "current_value": 1}]"#);
        assert_eq!(
            transform_reliability_metrics(&records),
            FALLBACK_RELIABILITY_METRICS.to_vec()
        );
        assert_eq!(
            transform_reliability_metrics(&records),
            transform_reliability_metrics(&records)
        );
    }
}

// =============================================================================
// TIER T3: HEALTH AND IMPACT CLASSIFICATION
// =============================================================================

mod t3_classification {
    use super::*;

    /// T3.1: The decision list, case by case.
    #[test]
    fn health_decision_list() {
        let cases = [
            ((2, 0, 0), HealthStatus::Critical),
            ((0, 2, 0), HealthStatus::AtRisk),
            ((1, 0, 0), HealthStatus::AtRisk),
            ((0, 1, 0), HealthStatus::Healthy),
            ((0, 0, 2), HealthStatus::Critical),
        ];
        for ((c, w, m), expected) in cases {
            assert_eq!(classify_health(SignalCounts::new(c, w, m)), expected);
        }
    }

    /// T3.2: Impact status for every window.
    #[test]
    fn impact_status_per_range() {
        let expected = [
            (TimeRange::Hour, "9.4", MetricStatus::Warning),
            (TimeRange::Day, "11.1", MetricStatus::Warning),
            (TimeRange::Week, "11.1", MetricStatus::Warning),
            (TimeRange::Month, "11.1", MetricStatus::Warning),
        ];
        for (range, percent, status) in expected {
            let impact = ActivationImpact::estimate(range).expect("estimate");
            assert_eq!(impact.loss_percent, percent);
            assert_eq!(impact.status, status);
        }
    }
}
