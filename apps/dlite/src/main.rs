//! # dlite
//!
//! Incremental replanning on grid worlds.
//!
//! ## Usage
//!
//! ```bash
//! # Walk a scenario, replanning when hidden obstacles are sensed
//! dlite run -c scenarios/corridor.toml
//!
//! # Same walk driven by the background service, one move every 100 ms
//! dlite run -c scenarios/corridor.toml --async --interval-ms 100
//!
//! # Render the known map and the initial plan
//! dlite show -c scenarios/corridor.toml
//! ```

use clap::Parser;
use dlite::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // DLITE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("DLITE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose {
        "dlite=debug,dlite_core=debug"
    } else {
        "dlite=info,dlite_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so JSON output on stdout stays parseable.
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

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the dlite startup banner.
fn print_banner() {
    println!(
        r#"
  dlite v{}
  incremental replanning (D*-Lite)
"#,
        env!("CARGO_PKG_VERSION")
    );
}
