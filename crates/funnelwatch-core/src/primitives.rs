//! # Fixed Parameters
//!
//! Constants compiled into the engine. They are the thresholds the dashboard
//! has always used and are immutable at runtime.

/// Maximum number of raw records accepted in one batch.
///
/// Batches longer than this are rejected by `parse_records`.
pub const MAX_RECORDS: usize = 10_000;

/// Loss percentage above which business impact is critical.
pub const LOSS_CRITICAL_PERCENT: u64 = 15;

/// Loss percentage above which business impact is a warning.
pub const LOSS_WARNING_PERCENT: u64 = 8;

/// Number of critical signals (alerts or metrics) that make overall health critical.
pub const CRITICAL_SIGNAL_LIMIT: usize = 2;

/// Number of warning alerts that put overall health at risk.
pub const WARNING_ALERT_LIMIT: usize = 2;

/// Root-cause factors quoted in an incident report.
pub const REPORT_FACTOR_LIMIT: usize = 3;

/// Log lines quoted in an incident report.
pub const REPORT_LOG_LIMIT: usize = 5;

/// Recurring errors shown in the top-errors widget.
pub const TOP_ERRORS_SHOWN: usize = 4;
