//! # CLI Command Implementations

use crate::config::{Scenario, ScenarioConfig};
use crate::error::{AppError, Result};
use crate::service::{self, Outcome};
use crate::world::{Cell, GridWorld};
use dlite_core::{Planner, PlannerError, RunReport, SearchStats, VertexId, run_into};
use std::path::Path;
use std::time::Duration;

/// Load and build a scenario file.
fn load_scenario(path: &Path) -> Result<(ScenarioConfig, Scenario)> {
    let config = ScenarioConfig::load(path)?;
    let scenario = config.build()?;
    tracing::debug!(
        width = scenario.world.width(),
        height = scenario.world.height(),
        start = %scenario.start,
        goal = %scenario.goal,
        "Scenario built"
    );
    Ok((config, scenario))
}

fn cells(world: &GridWorld, path: &[VertexId]) -> Vec<Cell> {
    path.iter().filter_map(|v| world.cell(*v)).collect()
}

fn format_path(path: &[Cell]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Print a run report in text or JSON.
fn print_report(
    status: &str,
    world: &GridWorld,
    report: &RunReport,
    stats: Option<SearchStats>,
    json_mode: bool,
) -> Result<()> {
    let path = cells(world, &report.path);

    if json_mode {
        let output = serde_json::json!({
            "status": status,
            "moves": report.moves(),
            "cost": report.cost,
            "replans": report.replans,
            "path": path,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Status:   {}", status);
        println!("Moves:    {}", report.moves());
        println!("Cost:     {:.3}", report.cost);
        println!("Replans:  {}", report.replans);
        if let Some(stats) = stats {
            println!(
                "Search:   {} expansions, {} vertex updates, {} repairs",
                stats.expansions, stats.vertex_updates, stats.repairs
            );
        }
        println!("Path:     {}", format_path(&path));
    }
    Ok(())
}

// =============================================================================
// RUN COMMAND
// =============================================================================

/// Walk an initialized planner to the goal, keeping the partial report when
/// it stops early.
pub fn walk(planner: &mut Planner<GridWorld>, limit: Option<usize>) -> Outcome {
    let mut report = RunReport::starting_at(planner.start());
    match run_into(planner, limit, &mut report) {
        Ok(()) => Outcome::Reached(report),
        Err(PlannerError::NoPath { from }) => Outcome::Unreachable { at: from, report },
        Err(e) => Outcome::Rejected(e),
    }
}

/// Print an outcome. Unreachable goals print their report and then fail.
fn finish(
    outcome: Outcome,
    world: &GridWorld,
    stats: Option<SearchStats>,
    json_mode: bool,
) -> Result<()> {
    match outcome {
        Outcome::Reached(report) => print_report("reached", world, &report, stats, json_mode),
        Outcome::Cancelled { report, .. } => {
            print_report("cancelled", world, &report, stats, json_mode)
        }
        Outcome::Unreachable { at, report } => {
            print_report("unreachable", world, &report, stats, json_mode)?;
            Err(AppError::Planner(PlannerError::NoPath { from: at }))
        }
        Outcome::Rejected(e) => Err(e.into()),
    }
}

/// Walk a scenario synchronously.
pub fn cmd_run(config_path: &Path, json_mode: bool) -> Result<()> {
    let (config, scenario) = load_scenario(config_path)?;
    let mut planner = Planner::new(
        scenario.start,
        scenario.goal,
        scenario.world,
        config.planner_options(),
    )?;

    let outcome = walk(&mut planner, config.max_steps);
    finish(outcome, planner.graph(), Some(planner.stats()), json_mode)
}

/// Walk a scenario from the planning service, one cycle per tick.
///
/// Ctrl-C cancels the walk before its next move.
pub async fn cmd_run_async(config_path: &Path, json_mode: bool, interval_ms: u64) -> Result<()> {
    let (config, scenario) = load_scenario(config_path)?;
    // The service owns the world; keep a copy for cell lookups.
    let world = scenario.world.clone();

    let handle = service::spawn_with_limit(
        scenario.start,
        scenario.goal,
        scenario.world,
        config.planner_options(),
        config.max_steps,
    );
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let outcome = handle
        .drive_until(Duration::from_millis(interval_ms.max(1)), shutdown)
        .await?;
    finish(outcome, &world, None, json_mode)
}

// =============================================================================
// SHOW COMMAND
// =============================================================================

/// Render the known map and the initial plan.
pub fn cmd_show(config_path: &Path, json_mode: bool) -> Result<()> {
    let (config, scenario) = load_scenario(config_path)?;
    let goal_cell = scenario.goal_cell;
    let planner = Planner::new(
        scenario.start,
        scenario.goal,
        scenario.world,
        config.planner_options(),
    )?;

    let world = planner.graph();
    let path = planner
        .path()
        .map(|path| cells(world, &path))
        .unwrap_or_default();
    let map = world.render(&path, goal_cell);
    let estimate = planner.g(planner.start());

    if json_mode {
        let output = serde_json::json!({
            "width": world.width(),
            "height": world.height(),
            "map": map.lines().collect::<Vec<_>>(),
            "path": path,
            "estimated_cost": estimate.is_finite().then_some(estimate),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", map);
        println!();
        if estimate.is_finite() {
            println!("Estimated cost: {:.3}", estimate);
            println!("Plan:           {}", format_path(&path));
        } else {
            println!("No path to the goal with what is known.");
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
