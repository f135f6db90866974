//! # dlite CLI Module
//!
//! ## Available Commands
//!
//! - `run` - Walk a scenario to its goal, replanning as obstacles appear
//! - `show` - Render a scenario's known map and initial plan

mod commands;

use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// dlite - incremental replanning on grid worlds
///
/// Plans a route with D*-Lite, walks it, and repairs the plan whenever the
/// agent discovers an obstacle it did not know about.
#[derive(Parser, Debug)]
#[command(name = "dlite")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk a scenario to its goal
    Run {
        /// Path to the scenario file (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Drive the planner from a background service on a timer
        #[arg(long = "async")]
        use_async: bool,

        /// Milliseconds between cycles in async mode
        #[arg(long, default_value = "50")]
        interval_ms: u64,
    },

    /// Render the known map with the initial plan
    Show {
        /// Path to the scenario file (TOML)
        #[arg(short, long)]
        config: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<()> {
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Run {
            config,
            use_async,
            interval_ms,
        } => {
            if use_async {
                cmd_run_async(&config, json_mode, interval_ms).await
            } else {
                cmd_run(&config, json_mode)
            }
        }
        Commands::Show { config } => cmd_show(&config, json_mode),
    }
}
