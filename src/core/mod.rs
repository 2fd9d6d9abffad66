//! Runtime core: supervision and lifecycle.
//!
//! The public API from this module is [`Supervisor`] (with its builder,
//! config and [`Report`]), the [`TerminationSource`] it waits on, and the
//! result types of the shutdown fan-out.
//!
//! Internal modules:
//! - [`handle`]: per-service lifecycle wrapper and [`ServiceState`];
//! - [`termination`]: OS signal / programmatic stop notification;
//! - [`multiplex`]: waits for the first fault or termination;
//! - [`coordinator`]: concurrent shutdown with a shared deadline;
//! - [`supervisor`]: orchestrates the whole sequence.

mod builder;
mod config;
mod coordinator;
mod handle;
mod multiplex;
mod report;
mod supervisor;
mod termination;

#[cfg(test)]
mod testing;

pub use builder::SupervisorBuilder;
pub use config::SupervisorConfig;
pub use coordinator::ShutdownOutcome;
pub use handle::ServiceState;
pub use multiplex::Trigger;
pub use report::Report;
pub use supervisor::Supervisor;
pub use termination::{TerminationSource, TerminationTrigger};
