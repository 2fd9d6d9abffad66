//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the supervisor and the
//! shutdown coordinator.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Supervisor` (startup, triggers), `coordinator::shutdown_all`
//!   (per-service stop results and the fan-out summary).
//! - **Consumers**: the supervisor's forwarding listener (fans out to the
//!   `SubscriberSet`) and any receiver obtained from `Supervisor::subscribe()`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
