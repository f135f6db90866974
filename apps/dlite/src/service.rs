//! # Planning Service
//!
//! The signal-driven driving loop. A planning session runs on its own tokio
//! task and talks to its owner through two channels:
//!
//! - an inbound trigger: each `()` received runs one step/move/update cycle
//! - an outbound outcome: exactly one [`Outcome`] when the session ends
//!
//! Closing the trigger (dropping every sender) cancels the session before
//! its next move. Cancellation and arrival are reported as different
//! outcomes.

use crate::error::{AppError, Result};
use dlite_core::{Mover, Planner, PlannerError, PlannerOptions, RunReport, VertexId, cycle};
use std::future::Future;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// How a planning session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The agent stands on the goal.
    Reached(RunReport),
    /// No path leads from `at` to the goal.
    Unreachable { at: VertexId, report: RunReport },
    /// The trigger was closed before the agent arrived.
    Cancelled { at: VertexId, report: RunReport },
    /// The planner refused to start or to continue.
    Rejected(PlannerError),
}

impl Outcome {
    /// The report of the moves made, if the session got that far.
    #[must_use]
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            Outcome::Reached(report)
            | Outcome::Unreachable { report, .. }
            | Outcome::Cancelled { report, .. } => Some(report),
            Outcome::Rejected(_) => None,
        }
    }

    #[must_use]
    pub fn is_reached(&self) -> bool {
        matches!(self, Outcome::Reached(_))
    }
}

/// The owner's side of a running session.
#[derive(Debug)]
pub struct ServiceHandle {
    trigger: mpsc::Sender<()>,
    outcome: oneshot::Receiver<Outcome>,
    task: JoinHandle<()>,
}

impl ServiceHandle {
    /// Another sender for the trigger, for signal sources other than the
    /// handle itself.
    #[must_use]
    pub fn trigger(&self) -> mpsc::Sender<()> {
        self.trigger.clone()
    }

    /// Request one cycle. Returns `false` once the session has ended.
    pub async fn signal(&self) -> bool {
        self.trigger.send(()).await.is_ok()
    }

    /// Drop this handle's trigger and wait for the outcome.
    ///
    /// With no other trigger senders alive this cancels the session.
    pub async fn wait(self) -> Result<Outcome> {
        let ServiceHandle {
            trigger,
            outcome,
            task,
        } = self;
        drop(trigger);
        let outcome = outcome.await.map_err(|_| AppError::ServiceLost)?;
        let _ = task.await;
        Ok(outcome)
    }

    /// Cancel the session and wait for it to stop.
    pub async fn cancel(self) -> Result<Outcome> {
        tracing::info!("Cancelling planning service");
        self.wait().await
    }

    /// Signal once per `period` until the session ends.
    pub async fn drive(self, period: Duration) -> Result<Outcome> {
        self.drive_until(period, std::future::pending()).await
    }

    /// Like [`drive`](Self::drive), cancelling when `shutdown` completes.
    pub async fn drive_until<F>(mut self, period: Duration, shutdown: F) -> Result<Outcome>
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(period);
        tokio::pin!(shutdown);

        let finished = loop {
            tokio::select! {
                outcome = &mut self.outcome => break Some(outcome),
                () = &mut shutdown => break None,
                _ = ticker.tick() => {
                    // A full buffer already holds a pending cycle.
                    let _ = self.trigger.try_send(());
                }
            }
        };

        match finished {
            Some(outcome) => {
                let outcome = outcome.map_err(|_| AppError::ServiceLost)?;
                let _ = self.task.await;
                Ok(outcome)
            }
            None => self.cancel().await,
        }
    }
}

/// Start a planning session on the current tokio runtime.
pub fn spawn<G>(start: VertexId, goal: VertexId, mover: G, options: PlannerOptions) -> ServiceHandle
where
    G: Mover + Send + 'static,
{
    spawn_with_limit(start, goal, mover, options, None)
}

/// Like [`spawn`], rejecting the session with [`PlannerError::StepLimit`]
/// after `limit` moves.
pub fn spawn_with_limit<G>(
    start: VertexId,
    goal: VertexId,
    mover: G,
    options: PlannerOptions,
    limit: Option<usize>,
) -> ServiceHandle
where
    G: Mover + Send + 'static,
{
    let (trigger, triggers) = mpsc::channel(1);
    let (report, outcome) = oneshot::channel();

    let task = tokio::spawn(async move {
        let result = serve(start, goal, mover, options, limit, triggers).await;
        tracing::info!(outcome = ?result, "Planning service finished");
        // The owner may have gone away; nobody is left to tell.
        let _ = report.send(result);
    });

    ServiceHandle {
        trigger,
        outcome,
        task,
    }
}

async fn serve<G: Mover>(
    start: VertexId,
    goal: VertexId,
    mover: G,
    options: PlannerOptions,
    limit: Option<usize>,
    mut triggers: mpsc::Receiver<()>,
) -> Outcome {
    let mut planner = match Planner::new(start, goal, mover, options) {
        Ok(planner) => planner,
        Err(e) => return Outcome::Rejected(e),
    };
    let mut report = RunReport::starting_at(start);

    while !planner.has_arrived() {
        if let Some(limit) = limit
            && report.moves() >= limit
        {
            return Outcome::Rejected(PlannerError::StepLimit(limit));
        }
        if triggers.recv().await.is_none() {
            return Outcome::Cancelled {
                at: planner.start(),
                report,
            };
        }
        match cycle(&mut planner, &mut report) {
            Ok(_) => {}
            Err(PlannerError::NoPath { from }) => {
                return Outcome::Unreachable { at: from, report };
            }
            Err(e) => return Outcome::Rejected(e),
        }
    }

    Outcome::Reached(report)
}
