//! # Event subscribers for the servisor runtime.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] that
//! fans runtime events out to every registered subscriber.
//!
//! ## Architecture
//! ```text
//! Supervisor / coordinator ── publish(Event) ──► Bus ──► forwarding listener
//!                                                              │
//!                                                              ▼
//!                                                       SubscriberSet::emit
//!                                                  ┌───────────┼───────────┐
//!                                                  ▼           ▼           ▼
//!                                              LogWriter    Metrics     Custom
//! ```
//!
//! ## Optional subscribers
//! - `logging` feature: [`LogWriter`] renders every event as a `tracing` record.

mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
