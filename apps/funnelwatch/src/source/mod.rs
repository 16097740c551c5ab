//! # Data Source
//!
//! Where the dashboard's data comes from, and how hard it tries to get it.
//!
//! - `mock` - in-memory source with simulated latency
//! - `retry` - bounded retry policy wrapped around every fetch

mod mock;
mod retry;

pub use mock::{EndpointLatency, MockSource};
pub use retry::RetryPolicy;
