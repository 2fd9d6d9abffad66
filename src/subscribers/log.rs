//! # LogWriter: tracing event renderer
//!
//! A subscriber that turns every incoming [`Event`] into a structured
//! [`tracing`] record. Problems in the shutdown phase are rendered at `WARN`,
//! faults and start failures at `ERROR`, everything else at `INFO`.
//!
//! ## Example output (with `tracing_subscriber::fmt`)
//! ```text
//! INFO  servisor::events: starting service="rest"
//! INFO  servisor::events: started service="rest"
//! ERROR servisor::events: faulted service="grpc" reason="bind lost"
//! INFO  servisor::events: shutdown-requested reason="fault" deadline_ms=5000
//! WARN  servisor::events: deadline-hit service="cron" deadline_ms=5000
//! WARN  servisor::events: grace-exceeded deadline_ms=5000 affected="cron"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

const TARGET: &str = "servisor::events";

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let service = e.service.as_deref().unwrap_or("");
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::ServiceStarting => {
                tracing::info!(target: TARGET, service, seq = e.seq, "starting");
            }
            EventKind::ServiceStarted => {
                tracing::info!(target: TARGET, service, seq = e.seq, "started");
            }
            EventKind::ServiceStartFailed => {
                tracing::error!(target: TARGET, service, reason, seq = e.seq, "start-failed");
            }
            EventKind::ServiceFaulted => {
                tracing::error!(target: TARGET, service, reason, seq = e.seq, "faulted");
            }
            EventKind::ShutdownRequested => {
                tracing::info!(target: TARGET, reason, deadline_ms = e.timeout_ms, seq = e.seq, "shutdown-requested");
            }
            EventKind::ServiceStopping => {
                tracing::info!(target: TARGET, service, seq = e.seq, "stopping");
            }
            EventKind::ServiceStopped => {
                tracing::info!(target: TARGET, service, seq = e.seq, "stopped");
            }
            EventKind::ServiceStopFailed => {
                tracing::warn!(target: TARGET, service, reason, seq = e.seq, "stop-failed");
            }
            EventKind::DeadlineHit => {
                tracing::warn!(target: TARGET, service, deadline_ms = e.timeout_ms, seq = e.seq, "deadline-hit");
            }
            EventKind::AllStoppedWithin => {
                tracing::info!(target: TARGET, deadline_ms = e.timeout_ms, seq = e.seq, "all-stopped-within-grace");
            }
            EventKind::GraceExceeded => {
                tracing::warn!(target: TARGET, deadline_ms = e.timeout_ms, affected = reason, seq = e.seq, "grace-exceeded");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
