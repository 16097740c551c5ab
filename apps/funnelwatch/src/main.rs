//! # funnelwatch
//!
//! Entry point: sets up logging, parses the command line and runs it.
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! funnelwatch server --host 0.0.0.0 --port 8080 -c dashboard.toml
//!
//! # CLI views
//! funnelwatch dashboard
//! funnelwatch impact --range 7d
//! funnelwatch drilldown --alert 1 --json-mode
//! funnelwatch transform -f records.json
//! ```

use clap::Parser;
use funnelwatch::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // FUNNELWATCH_LOG_FORMAT=json switches to machine-parseable output.
    let log_format =
        std::env::var("FUNNELWATCH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "funnelwatch=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_banner() {
    println!(
        r#"
  funnelwatch v{}
  visitors → next page → phone collected → activation
"#,
        env!("CARGO_PKG_VERSION")
    );
}
