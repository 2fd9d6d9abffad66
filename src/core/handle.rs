//! # Service handle: one service plus its tracked lifecycle state.
//!
//! ```text
//!            start ok              shutdown requested          ok within deadline
//! Starting ───────────► Running ─────────────────────► Stopping ─────────────► Stopped
//!    │                     │                               │
//!    │ start error         │ fault observed                │ error / panic / deadline
//!    ▼                     ▼                               ▼
//!  Failed               Failed                           Failed
//! ```
//!
//! ## Rules
//! - At most one `start` and at most one `shutdown` reach the service.
//! - A faulted or start-timed-out (Failed) handle still receives its shutdown
//!   but stays Failed.
//! - Transitions are compare-exchange on an atomic, so a late completion of a
//!   timed-out shutdown cannot flip Failed back to Stopped.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{RuntimeError, ServiceError, ShutdownError};
use crate::service::ServiceRef;

/// Lifecycle state of a supervised service.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceState {
    /// Created, `start` not yet completed.
    Starting = 0,
    /// Serving.
    Running = 1,
    /// Shutdown issued, not yet completed.
    Stopping = 2,
    /// Shut down within the deadline.
    Stopped = 3,
    /// Start failed, faulted, or shutdown failed/timed out.
    Failed = 4,
}

impl ServiceState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => ServiceState::Starting,
            1 => ServiceState::Running,
            2 => ServiceState::Stopping,
            3 => ServiceState::Stopped,
            _ => ServiceState::Failed,
        }
    }

    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceState::Starting => "starting",
            ServiceState::Running => "running",
            ServiceState::Stopping => "stopping",
            ServiceState::Stopped => "stopped",
            ServiceState::Failed => "failed",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Uniform lifecycle wrapper around one service.
pub(crate) struct ServiceHandle {
    name: Arc<str>,
    service: ServiceRef,
    state: AtomicU8,
    shutdown_issued: AtomicBool,
}

impl ServiceHandle {
    pub(crate) fn new(service: ServiceRef) -> Self {
        Self {
            name: Arc::from(service.name()),
            service,
            state: AtomicU8::new(ServiceState::Starting as u8),
            shutdown_issued: AtomicBool::new(false),
        }
    }

    pub(crate) fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub(crate) fn state(&self) -> ServiceState {
        ServiceState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn transition(&self, from: ServiceState, to: ServiceState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Calls `start`, optionally bounded by `timeout`. The supervisor calls it
    /// once per handle.
    ///
    /// On timeout the start future is dropped and the handle becomes Failed;
    /// the service may already hold resources, so it still gets its shutdown.
    pub(crate) async fn start(&self, timeout: Option<Duration>) -> Result<(), RuntimeError> {
        let res = match timeout {
            Some(dur) => match tokio::time::timeout(dur, self.service.start()).await {
                Ok(r) => r,
                Err(_elapsed) => {
                    self.transition(ServiceState::Starting, ServiceState::Failed);
                    return Err(RuntimeError::StartTimedOut {
                        service: self.name.clone(),
                        timeout: dur,
                    });
                }
            },
            None => self.service.start().await,
        };

        match res {
            Ok(()) => {
                self.transition(ServiceState::Starting, ServiceState::Running);
                Ok(())
            }
            Err(error) => {
                self.transition(ServiceState::Starting, ServiceState::Failed);
                Err(RuntimeError::StartFailed {
                    service: self.name.clone(),
                    error,
                })
            }
        }
    }

    /// Waits for the service's fault; marks the handle Failed when it arrives
    /// before any shutdown was requested.
    pub(crate) async fn await_fault(&self) -> ServiceError {
        let err = self.service.await_fault().await;
        self.transition(ServiceState::Running, ServiceState::Failed);
        err
    }

    /// Issues the single `shutdown` call.
    pub(crate) async fn shutdown(&self, deadline: Instant) -> Result<(), ShutdownError> {
        if self.shutdown_issued.swap(true, Ordering::AcqRel) {
            return Err(ShutdownError::AlreadyRequested);
        }
        self.transition(ServiceState::Running, ServiceState::Stopping);

        match self.service.shutdown(deadline).await {
            Ok(()) => {
                self.transition(ServiceState::Stopping, ServiceState::Stopped);
                Ok(())
            }
            Err(e) => {
                self.transition(ServiceState::Stopping, ServiceState::Failed);
                Err(ShutdownError::Failed(e))
            }
        }
    }

    /// Records that the shutdown attempt was abandoned (deadline or panic).
    pub(crate) fn mark_abandoned(&self) {
        self.transition(ServiceState::Stopping, ServiceState::Failed);
    }
}
