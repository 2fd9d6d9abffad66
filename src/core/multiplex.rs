//! # Fault multiplexer: wait for the first trigger.
//!
//! Races every running service's fault signal against the termination source
//! and reports exactly one winner.
//!
//! ```text
//! handle[0].await_fault() ─┐
//! handle[1].await_fault() ─┼─► FuturesUnordered ─┐
//! handle[N].await_fault() ─┘                     ├─► select! ─► Trigger
//! TerminationSource::wait() ─────────────────────┘
//! ```
//!
//! ## Tie-break
//! When several triggers are ready at the same time the winner is
//! **unspecified**: `tokio::select!` picks a random branch, and
//! `FuturesUnordered` yields in wake-up order. Callers may only rely on exactly
//! one trigger being returned. Losing fault futures are dropped without
//! consuming their signal.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;

use crate::core::handle::ServiceHandle;
use crate::core::termination::TerminationSource;
use crate::error::ServiceError;

/// The event that ended normal operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// A running service terminated unexpectedly.
    ServiceFault {
        /// Name of the faulted service.
        service: Arc<str>,
        /// The fault it reported.
        error: ServiceError,
    },
    /// The host asked the process to stop.
    ExternalStop,
}

impl Trigger {
    /// Short label used as the `ShutdownRequested` reason.
    pub fn as_label(&self) -> &'static str {
        match self {
            Trigger::ServiceFault { .. } => "fault",
            Trigger::ExternalStop => "termination",
        }
    }
}

/// Blocks until one service faults or termination is requested.
pub(crate) async fn wait_first(
    handles: &[Arc<ServiceHandle>],
    termination: TerminationSource,
) -> Trigger {
    let mut faults: FuturesUnordered<_> = handles
        .iter()
        .map(|h| async move {
            let error = h.await_fault().await;
            Trigger::ServiceFault {
                service: h.name().clone(),
                error,
            }
        })
        .collect();

    let any_fault = async {
        match faults.next().await {
            Some(trigger) => trigger,
            // no services: only termination can fire
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        trigger = any_fault => trigger,
        _ = termination.wait() => Trigger::ExternalStop,
    }
}
