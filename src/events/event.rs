//! # Runtime events emitted by the supervisor and the shutdown coordinator.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Startup events**: a service is starting, started or failed to start
//! - **Trigger events**: a running service faulted, shutdown was requested
//! - **Shutdown events**: per-service stop results and the fan-out summary
//!
//! The [`Event`] struct carries metadata such as timestamps, service name,
//! reasons and deadlines.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use servisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::DeadlineHit)
//!     .with_service("cron")
//!     .with_reason("shutdown deadline exceeded")
//!     .with_timeout(Duration::from_secs(5));
//!
//! assert_eq!(ev.kind, EventKind::DeadlineHit);
//! assert_eq!(ev.service.as_deref(), Some("cron"));
//! assert_eq!(ev.timeout_ms, Some(5000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Startup events ===
    /// `start` is about to be called.
    ///
    /// Sets:
    /// - `service`: service name
    ServiceStarting,

    /// `start` returned successfully; the service is running.
    ///
    /// Sets:
    /// - `service`: service name
    ServiceStarted,

    /// `start` failed or timed out; startup is aborted.
    ///
    /// Sets:
    /// - `service`: service name
    /// - `reason`: error message
    /// - `timeout_ms`: start timeout (only when it was exceeded)
    ServiceStartFailed,

    // === Trigger events ===
    /// A running service raised its fault signal and won the wait.
    ///
    /// Sets:
    /// - `service`: service name
    /// - `reason`: fault message
    ServiceFaulted,

    /// Shutdown fan-out is about to begin.
    ///
    /// Sets:
    /// - `reason`: what triggered it ("termination", "fault", "start failure")
    /// - `timeout_ms`: shared shutdown deadline
    ShutdownRequested,

    // === Shutdown events ===
    /// `shutdown` is being issued to a service.
    ///
    /// Sets:
    /// - `service`: service name
    ServiceStopping,

    /// The service shut down within the deadline.
    ///
    /// Sets:
    /// - `service`: service name
    ServiceStopped,

    /// The service's shutdown returned an error or panicked.
    ///
    /// Sets:
    /// - `service`: service name
    /// - `reason`: error message
    ServiceStopFailed,

    /// The deadline passed before the service's shutdown completed.
    ///
    /// Sets:
    /// - `service`: service name
    /// - `timeout_ms`: grace duration
    DeadlineHit,

    /// Every service stopped within the deadline.
    ///
    /// Sets:
    /// - `timeout_ms`: grace duration
    AllStoppedWithin,

    /// At least one service failed or timed out during shutdown.
    ///
    /// Sets:
    /// - `timeout_ms`: grace duration
    /// - `reason`: comma-separated names of the affected services
    GraceExceeded,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Deadline or timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Human-readable reason (error messages, trigger names).
    pub reason: Option<Arc<str>>,
    /// Name of the service, if applicable.
    pub service: Option<Arc<str>>,
    /// Event classification.
    pub kind: EventKind,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            kind,
            at: SystemTime::now(),
            timeout_ms: None,
            reason: None,
            service: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a service name.
    #[inline]
    pub fn with_service(mut self, service: impl Into<Arc<str>>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// True for events describing a shutdown-phase problem.
    #[inline]
    pub fn is_shutdown_warning(&self) -> bool {
        matches!(
            self.kind,
            EventKind::ServiceStopFailed | EventKind::DeadlineHit | EventKind::GraceExceeded
        )
    }
}
