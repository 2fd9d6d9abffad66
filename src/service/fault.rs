//! # One-shot fault notification.
//!
//! [`fault_channel`] creates a [`FaultReporter`] / [`FaultSignal`] pair backed by
//! [`tokio::sync::oneshot`]. The serving loop owns the reporter; the service
//! keeps the signal and returns [`FaultSignal::wait`] from
//! [`Service::await_fault`](crate::Service::await_fault).
//!
//! ## Rules
//! - `raise` consumes the reporter: at most one fault per service, enforced by ownership.
//! - `wait` resolves at most once; every later call pends forever.
//! - A reporter dropped without raising (clean exit) never resolves `wait`.
//! - Dropping a pending `wait` future does not lose the fault.

use tokio::sync::{Mutex, oneshot};

use crate::error::ServiceError;

/// Creates a connected reporter/signal pair.
pub fn fault_channel() -> (FaultReporter, FaultSignal) {
    let (tx, rx) = oneshot::channel();
    (
        FaultReporter { tx },
        FaultSignal {
            rx: Mutex::new(Some(rx)),
        },
    )
}

/// Sending half: held by the code path that can observe the failure.
#[derive(Debug)]
pub struct FaultReporter {
    tx: oneshot::Sender<ServiceError>,
}

impl FaultReporter {
    /// Reports the fault. Returns `false` if nobody is listening anymore.
    pub fn raise(self, error: ServiceError) -> bool {
        self.tx.send(error).is_ok()
    }

    /// True if the signal side was dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half: a lazy, single-value fault notification.
#[derive(Debug)]
pub struct FaultSignal {
    rx: Mutex<Option<oneshot::Receiver<ServiceError>>>,
}

impl FaultSignal {
    /// Waits for the fault.
    ///
    /// The receiver stays in place while waiting, so a cancelled `wait` can be
    /// retried. It is consumed once a value (or a closed channel) is observed.
    pub async fn wait(&self) -> ServiceError {
        let mut slot = self.rx.lock().await;
        if let Some(rx) = slot.as_mut() {
            let res = rx.await;
            *slot = None;
            if let Ok(err) = res {
                return err;
            }
        }
        drop(slot);
        std::future::pending().await
    }
}
