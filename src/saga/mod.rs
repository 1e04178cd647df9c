//! Saga journal
//!
//! A coordinator operation spans several stores with no transaction around
//! them, so it runs as an ordered list of named steps, each committed on its
//! own:
//!
//! - **Required** steps abort the operation when they fail. Steps that
//!   already committed stay committed; no step registers a compensating
//!   action, so the partial state is left exactly as it was at the failure.
//! - **Best-effort** steps log the failure and let the operation continue.
//!
//! The journal keeps what happened so a failure can be reported with the
//! list of steps that were already applied.

use std::fmt;
use std::future::Future;

use crate::error::AppError;

/// How a step failure affects the operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    Required,
    BestEffort,
}

/// What happened to a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    Failed(String),
}

/// One journal entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step: &'static str,
    pub policy: StepPolicy,
    pub outcome: StepOutcome,
}

/// Ordered journal of the steps of one operation
#[derive(Debug)]
pub struct Saga {
    name: &'static str,
    journal: Vec<StepRecord>,
}

impl Saga {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            journal: Vec::new(),
        }
    }

    /// Run a step whose failure aborts the operation.
    pub async fn required<T, E, F>(&mut self, step: &'static str, action: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<AppError>,
    {
        match action.await {
            Ok(value) => {
                self.record(step, StepPolicy::Required, StepOutcome::Completed);
                Ok(value)
            }
            Err(err) => {
                let err = err.into();
                self.record(step, StepPolicy::Required, StepOutcome::Failed(err.to_string()));

                let committed = self.completed_steps();
                if !committed.is_empty() {
                    tracing::warn!(
                        saga = self.name,
                        failed_step = step,
                        committed = ?committed,
                        error = %err,
                        "Saga aborted; committed steps are left in place"
                    );
                }
                Err(err)
            }
        }
    }

    /// Run a step whose failure is logged and otherwise ignored.
    pub async fn best_effort<T, E, F>(&mut self, step: &'static str, action: F) -> Option<T>
    where
        F: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        match action.await {
            Ok(value) => {
                self.record(step, StepPolicy::BestEffort, StepOutcome::Completed);
                Some(value)
            }
            Err(err) => {
                tracing::warn!(
                    saga = self.name,
                    step = step,
                    error = %err,
                    "Best-effort step failed; continuing"
                );
                self.record(step, StepPolicy::BestEffort, StepOutcome::Failed(err.to_string()));
                None
            }
        }
    }

    /// Names of the steps that completed, in order
    pub fn completed_steps(&self) -> Vec<&'static str> {
        self.journal
            .iter()
            .filter(|r| r.outcome == StepOutcome::Completed)
            .map(|r| r.step)
            .collect()
    }

    pub fn journal(&self) -> &[StepRecord] {
        &self.journal
    }

    fn record(&mut self, step: &'static str, policy: StepPolicy, outcome: StepOutcome) {
        self.journal.push(StepRecord {
            step,
            policy,
            outcome,
        });
    }
}
