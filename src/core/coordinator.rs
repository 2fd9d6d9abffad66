//! # Shutdown coordinator: concurrent fan-out with a shared deadline.
//!
//! ```text
//! shutdown_all(handles, grace)
//!   deadline = now + grace
//!   for each handle ──► watcher task (JoinSet)
//!                         ├─► spawn: handle.shutdown(deadline)   (service's own work)
//!                         └─► timeout_at(deadline, work)
//!                               ├─ Ok(Ok)       → Stopped            (ServiceStopped)
//!                               ├─ Ok(Err)      → Failed(error)      (ServiceStopFailed)
//!                               ├─ Err(panic)   → Panicked           (ServiceStopFailed)
//!                               └─ Elapsed      → DeadlineExceeded   (DeadlineHit)
//!   join all watchers ──► AllStoppedWithin | GraceExceeded
//! ```
//!
//! ## Rules
//! - Every handle gets its own task; a stuck service cannot delay another one.
//! - No short-circuit: one failure never cancels the remaining attempts.
//! - At the deadline the watcher stops waiting but does **not** abort the
//!   service's shutdown task; the service is expected to honor the deadline itself.
//! - Returns after every watcher finished, i.e. within `grace` plus scheduling overhead.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::core::handle::{ServiceHandle, ServiceState};
use crate::error::ShutdownError;
use crate::events::{Bus, Event, EventKind};

/// Result of one service's shutdown attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownOutcome {
    /// Name of the service.
    pub service: Arc<str>,
    /// Lifecycle state when the attempt was settled.
    pub state: ServiceState,
    /// `Ok` if the service stopped within the deadline.
    pub result: Result<(), ShutdownError>,
}

impl ShutdownOutcome {
    /// True if the attempt failed or timed out.
    pub fn is_err(&self) -> bool {
        self.result.is_err()
    }

    /// True if the deadline was hit.
    pub fn is_timeout(&self) -> bool {
        matches!(&self.result, Err(e) if e.is_timeout())
    }
}

/// Shuts down every handle concurrently and collects one outcome per handle,
/// in handle order.
pub(crate) async fn shutdown_all(
    handles: &[Arc<ServiceHandle>],
    grace: Duration,
    bus: &Bus,
) -> Vec<ShutdownOutcome> {
    let deadline = deadline_after(grace);

    let mut set = JoinSet::new();
    for (idx, handle) in handles.iter().enumerate() {
        let handle = Arc::clone(handle);
        let bus = bus.clone();
        set.spawn(async move { (idx, shutdown_one(handle, deadline, grace, bus).await) });
    }

    let mut slots: Vec<Option<ShutdownOutcome>> = vec![None; handles.len()];
    while let Some(joined) = set.join_next().await {
        // watchers never panic: the service's shutdown runs on its own task
        if let Ok((idx, outcome)) = joined {
            slots[idx] = Some(outcome);
        }
    }

    let outcomes: Vec<ShutdownOutcome> = slots
        .into_iter()
        .zip(handles)
        .map(|(slot, h)| {
            slot.unwrap_or_else(|| ShutdownOutcome {
                service: h.name().clone(),
                state: h.state(),
                result: Err(ShutdownError::Panicked {
                    info: "shutdown watcher lost".to_string(),
                }),
            })
        })
        .collect();

    publish_summary(&outcomes, grace, bus);
    outcomes
}

/// `now + grace`, clamped to a far-future instant when `grace` is too large
/// to add (e.g. `Duration::MAX` as "wait forever").
fn deadline_after(grace: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(grace).unwrap_or_else(|| far_future(now))
}

// roughly 30 years, same horizon tokio uses for unbounded sleeps
fn far_future(now: Instant) -> Instant {
    now + Duration::from_secs(86400 * 365 * 30)
}

async fn shutdown_one(
    handle: Arc<ServiceHandle>,
    deadline: Instant,
    grace: Duration,
    bus: Bus,
) -> ShutdownOutcome {
    bus.publish(Event::new(EventKind::ServiceStopping).with_service(handle.name().clone()));

    let worker = {
        let handle = Arc::clone(&handle);
        tokio::spawn(async move { handle.shutdown(deadline).await })
    };

    let result = match tokio::time::timeout_at(deadline, worker).await {
        Ok(Ok(res)) => res,
        Ok(Err(join_err)) => {
            handle.mark_abandoned();
            Err(ShutdownError::Panicked {
                info: join_err.to_string(),
            })
        }
        Err(_elapsed) => {
            handle.mark_abandoned();
            Err(ShutdownError::DeadlineExceeded { grace })
        }
    };

    let name = handle.name().clone();
    match &result {
        Ok(()) => bus.publish(Event::new(EventKind::ServiceStopped).with_service(name.clone())),
        Err(ShutdownError::DeadlineExceeded { .. }) => bus.publish(
            Event::new(EventKind::DeadlineHit)
                .with_service(name.clone())
                .with_timeout(grace),
        ),
        Err(e) => bus.publish(
            Event::new(EventKind::ServiceStopFailed)
                .with_service(name.clone())
                .with_reason(e.to_string()),
        ),
    }

    ShutdownOutcome {
        service: name,
        state: handle.state(),
        result,
    }
}

fn publish_summary(outcomes: &[ShutdownOutcome], grace: Duration, bus: &Bus) {
    let affected: Vec<&str> = outcomes
        .iter()
        .filter(|o| o.is_err())
        .map(|o| &*o.service)
        .collect();

    if affected.is_empty() {
        bus.publish(Event::new(EventKind::AllStoppedWithin).with_timeout(grace));
    } else {
        bus.publish(
            Event::new(EventKind::GraceExceeded)
                .with_timeout(grace)
                .with_reason(affected.join(",")),
        );
    }
}
