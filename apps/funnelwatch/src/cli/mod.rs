//! # funnelwatch CLI Module
//!
//! This module implements the CLI interface for funnelwatch.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `dashboard` - Show the full dashboard
//! - `funnel` - Show the funnel stages
//! - `reliability` - Show reliability by layer
//! - `health` - Show the overall health banner
//! - `impact` - Show business impact for a window
//! - `trends` - Show the trend charts for a window
//! - `drilldown` - Show the root-cause drilldown of an alert
//! - `transform` - Transform raw metric records from a file

mod commands;

use clap::{Parser, Subcommand};
use funnelwatch_core::{FunnelError, TimeRange};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// funnelwatch - phone-collection funnel dashboard service
///
/// Turns funnel and reliability metrics into dashboard views and serves them.
#[derive(Parser, Debug)]
#[command(name = "funnelwatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Show the full dashboard
    Dashboard,

    /// Show the funnel stages
    Funnel,

    /// Show reliability metrics by layer
    Reliability,

    /// Show the overall health banner
    Health,

    /// Show business impact for a window
    Impact {
        /// Time range (1h, 24h, 7d, 30d)
        #[arg(short, long, default_value = "24h")]
        range: TimeRange,
    },

    /// Show the trend charts for a window
    Trends {
        /// Time range (1h, 24h, 7d, 30d)
        #[arg(short, long, default_value = "24h")]
        range: TimeRange,
    },

    /// Show the root-cause drilldown of an alert
    Drilldown {
        /// Alert ID
        #[arg(short, long)]
        alert: u64,

        /// Time range (1h, 24h, 7d, 30d)
        #[arg(short, long, default_value = "24h")]
        range: TimeRange,
    },

    /// Transform raw metric records from a JSON file
    Transform {
        /// Path to a JSON array of metric records
        #[arg(short, long)]
        file: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), FunnelError> {
    let json_mode = cli.json_mode;
    let config = cli.config.as_deref();

    if cli.verbose {
        tracing::info!(config = ?config, "executing command");
    }

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(config, &host, port).await,
        Some(Commands::Dashboard) | None => cmd_dashboard(config, json_mode).await,
        Some(Commands::Funnel) => cmd_funnel(config, json_mode).await,
        Some(Commands::Reliability) => cmd_reliability(config, json_mode).await,
        Some(Commands::Health) => cmd_health(config, json_mode).await,
        Some(Commands::Impact { range }) => cmd_impact(range, json_mode),
        Some(Commands::Trends { range }) => cmd_trends(range, json_mode),
        Some(Commands::Drilldown { alert, range }) => {
            cmd_drilldown(config, alert, range, json_mode).await
        }
        Some(Commands::Transform { file }) => cmd_transform(&file, json_mode),
    }
}
