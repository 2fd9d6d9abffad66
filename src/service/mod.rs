//! # Service abstractions.
//!
//! This module provides the lifecycle contract the supervisor drives:
//! - [`Service`] - trait implemented by every transport (REST, gRPC, cron, ...)
//! - [`ServiceRef`] - shared reference to a service (`Arc<dyn Service>`)
//! - [`FaultReporter`] / [`FaultSignal`] - one-shot fault notification pair
//!   used to implement [`Service::await_fault`]

mod fault;
mod service;

pub use fault::{FaultReporter, FaultSignal, fault_channel};
pub use service::{Service, ServiceRef};
