//! Integration tests for the signal-driven planning service.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use dlite::config::{Scenario, ScenarioConfig};
use dlite::service::{self, Outcome};
use dlite::world::Cell;
use dlite_core::{Planner, PlannerError, PlannerOptions, VertexId, run};
use std::time::Duration;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

const CORRIDOR: &str = r#"
connectivity = "four"
map = """
##########
S...?....G
###.###.##
#........#
##########
"""
"#;

fn scenario(text: &str) -> Scenario {
    ScenarioConfig::from_toml(text).unwrap().build().unwrap()
}

fn line(width: usize) -> Scenario {
    let map = format!("S{}G", ".".repeat(width - 2));
    scenario(&format!("connectivity = \"four\"\nmap = \"{map}\""))
}

// =============================================================================
// OUTCOMES
// =============================================================================

#[tokio::test]
async fn signalled_service_reaches_goal_like_sync_run() {
    let expected = {
        let s = scenario(CORRIDOR);
        let mut planner = Planner::with_defaults(s.start, s.goal, s.world).unwrap();
        run(&mut planner).unwrap()
    };

    let s = scenario(CORRIDOR);
    let handle = service::spawn(s.start, s.goal, s.world, PlannerOptions::default());
    while handle.signal().await {}

    let outcome = handle.wait().await.unwrap();
    assert_eq!(outcome, Outcome::Reached(expected));
    assert!(outcome.is_reached());
}

#[tokio::test]
async fn closing_trigger_cancels_without_moving_again() {
    let s = line(10);
    let handle = service::spawn(s.start, s.goal, s.world, PlannerOptions::default());

    assert!(handle.signal().await);
    assert!(handle.signal().await);
    let outcome = handle.cancel().await.unwrap();

    match outcome {
        Outcome::Cancelled { at, report } => {
            assert_eq!(at, VertexId(2));
            assert_eq!(report.moves(), 2);
            assert_eq!(report.path, vec![VertexId(0), VertexId(1), VertexId(2)]);
        }
        other => panic!("expected cancellation, got {other:?}"),
    }
}

#[tokio::test]
async fn hidden_wall_makes_goal_unreachable() {
    let s = scenario("connectivity = \"four\"\nmap = \"S.?G\"");
    let blocked_at = s.world.vertex(Cell::new(1, 0));
    let handle = service::spawn(s.start, s.goal, s.world, PlannerOptions::default());
    while handle.signal().await {}

    match handle.wait().await.unwrap() {
        Outcome::Unreachable { at, report } => {
            assert_eq!(at, blocked_at);
            assert_eq!(report.moves(), 1);
            assert_eq!(report.replans, 1);
        }
        other => panic!("expected unreachable, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_start_is_rejected() {
    let s = line(4);
    let handle = service::spawn(VertexId(99), s.goal, s.world, PlannerOptions::default());
    let outcome = handle.wait().await.unwrap();
    assert_eq!(
        outcome,
        Outcome::Rejected(PlannerError::UnknownVertex(VertexId(99)))
    );
    assert!(outcome.report().is_none());
}

#[tokio::test]
async fn start_on_goal_reports_arrival_without_signal() {
    let s = line(4);
    let handle = service::spawn(s.goal, s.goal, s.world, PlannerOptions::default());
    match handle.wait().await.unwrap() {
        Outcome::Reached(report) => assert_eq!(report.moves(), 0),
        other => panic!("expected arrival, got {other:?}"),
    }
}

#[tokio::test]
async fn move_limit_rejects_session() {
    let s = line(10);
    let handle =
        service::spawn_with_limit(s.start, s.goal, s.world, PlannerOptions::default(), Some(3));
    while handle.signal().await {}
    assert_eq!(
        handle.wait().await.unwrap(),
        Outcome::Rejected(PlannerError::StepLimit(3))
    );
}

// =============================================================================
// TIMER DRIVING
// =============================================================================

#[tokio::test(start_paused = true)]
async fn drive_signals_until_arrival() {
    let s = scenario(CORRIDOR);
    let handle = service::spawn(s.start, s.goal, s.world, PlannerOptions::default());
    let outcome = handle.drive(Duration::from_millis(10)).await.unwrap();

    let report = outcome.report().unwrap();
    assert!(outcome.is_reached());
    assert_eq!(report.moves(), 13);
    assert_eq!(report.replans, 1);
}

#[tokio::test(start_paused = true)]
async fn drive_stops_on_shutdown() {
    let s = line(30);
    let handle = service::spawn(s.start, s.goal, s.world, PlannerOptions::default());
    let outcome = handle
        .drive_until(Duration::from_secs(3600), async {})
        .await
        .unwrap();

    match outcome {
        Outcome::Cancelled { report, .. } => assert!(report.moves() <= 1),
        other => panic!("expected cancellation, got {other:?}"),
    }
}
