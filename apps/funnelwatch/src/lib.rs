//! # funnelwatch - Phone-Collection Funnel Dashboard Service
//!
//! The async shell around `funnelwatch-core`:
//!
//! - [`source`]: mock data source with simulated latency, plus bounded retries
//! - [`dashboard`]: concurrent refresh, fallback views, auto-refresh, drilldown
//! - [`api`]: axum JSON API
//! - [`cli`]: clap commands
//! - [`config`]: TOML file with environment overrides
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                apps/funnelwatch (THE BINARY)             │
//! │                                                          │
//! │   ┌───────────┐   ┌───────────┐   ┌──────────────────┐   │
//! │   │   CLI     │   │  HTTP API │   │  Dashboard       │   │
//! │   │  (clap)   │   │  (axum)   │◄──┤  refresh/retry   │   │
//! │   └─────┬─────┘   └─────┬─────┘   └────────┬─────────┘   │
//! │         └───────────────┼──────────────────┘             │
//! │                         ▼                                │
//! │                 ┌──────────────────┐                     │
//! │                 │ funnelwatch-core │                     │
//! │                 │   (THE LOGIC)    │                     │
//! │                 └──────────────────┘                     │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod source;
