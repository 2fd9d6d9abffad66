//! # servisor
//!
//! **Servisor** supervises a fixed set of long-running services inside one
//! process: it starts them, waits for the first fault or external stop request,
//! and then shuts all of them down within a shared deadline.
//!
//! It never knows what protocol a service speaks. REST listeners, gRPC
//! servers, cron schedulers and message consumers all implement the same
//! three-operation [`Service`] contract.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Service     │   │  Service     │   │  Service     │   │  Service     │
//!     │  (rest)      │   │  (grpc)      │   │  (cron)      │   │  (kafka)     │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                               │
//! │  - ServiceHandle per service (lifecycle state)                            │
//! │  - TerminationSource (SIGINT/SIGTERM/SIGQUIT or programmatic trigger)     │
//! │  - Fault multiplexer (first fault or termination wins)                    │
//! │  - Shutdown coordinator (concurrent fan-out, shared deadline)             │
//! │  - Bus ──► SubscriberSet (events for logging/metrics)                     │
//! └───────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! register TerminationSource
//! for each service: start()            (start error ─► stop started ones ─► StartFailed)
//! wait_first:
//!   ├─ service fault  ─► reported cause = ServiceFaulted
//!   └─ termination    ─► reported cause = none
//! shutdown(deadline) to every service concurrently
//!   ├─ Ok            ─► Stopped
//!   ├─ Err / panic   ─► warning
//!   └─ deadline hit  ─► warning (service left to finish on its own)
//! return reported cause
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                          |
//! |-------------------|----------------------------------------------------------------|---------------------------------------------|
//! | **Services**      | Lifecycle contract and one-shot fault signalling.              | [`Service`], [`FaultSignal`], [`FaultReporter`] |
//! | **Supervision**   | Start, wait for the first trigger, bounded shutdown.           | [`Supervisor`], [`Report`]                  |
//! | **Termination**   | OS signals or programmatic stop, fired at most once.           | [`TerminationSource`], [`TerminationTrigger`] |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, alerts).         | [`Subscribe`], [`Event`]                    |
//! | **Errors**        | Typed errors for services, shutdown and the reported cause.    | [`ServiceError`], [`ShutdownError`], [`RuntimeError`] |
//! | **Configuration** | Shutdown grace, start timeout, bus capacity.                   | [`SupervisorConfig`]                        |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a subscriber rendering events through `tracing`.
//!
//! ## Logging
//! The supervisor itself logs milestones and shutdown warnings through
//! [`tracing`]; installing a subscriber is up to the binary.
mod core;
mod error;
mod events;
mod service;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{
    Report, ServiceState, ShutdownOutcome, Supervisor, SupervisorBuilder, SupervisorConfig,
    TerminationSource, TerminationTrigger, Trigger,
};
pub use error::{RuntimeError, ServiceError, ShutdownError};
pub use events::{Bus, Event, EventKind};
pub use service::{FaultReporter, FaultSignal, Service, ServiceRef, fault_channel};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a tracing-backed logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
