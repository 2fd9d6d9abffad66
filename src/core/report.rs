//! # Final report of a supervisor run.

use crate::core::coordinator::ShutdownOutcome;
use crate::core::multiplex::Trigger;
use crate::error::RuntimeError;

/// What a supervisor run ended with.
///
/// `cause` is the reported cause: `None` only for a clean external stop.
/// Shutdown-phase errors live in `outcomes` and never become the cause.
#[derive(Debug)]
pub struct Report {
    /// Why the process is exiting (`None` = clean termination).
    pub cause: Option<RuntimeError>,
    /// The trigger that ended normal operation, if the wait was reached.
    pub trigger: Option<Trigger>,
    /// One outcome per service that received a shutdown, in start order.
    pub outcomes: Vec<ShutdownOutcome>,
}

impl Report {
    /// Outcomes that failed or timed out.
    pub fn warnings(&self) -> impl Iterator<Item = &ShutdownOutcome> {
        self.outcomes.iter().filter(|o| o.is_err())
    }

    /// True if the run ended without a reported cause.
    pub fn is_clean(&self) -> bool {
        self.cause.is_none()
    }

    /// Process exit status for this report: `0` when clean, `1` otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_clean() { 0 } else { 1 }
    }

    /// Drops the outcomes and returns the reported cause.
    pub fn into_result(self) -> Result<(), RuntimeError> {
        match self.cause {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }
}
