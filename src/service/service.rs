//! # Service lifecycle contract.
//!
//! Every transport the supervisor runs implements [`Service`]. The supervisor
//! never knows which protocol a service speaks; it only drives these three
//! operations:
//!
//! ```text
//! start() ──► Running ──┬─► await_fault() resolves once ──► Failed
//!                       └─► shutdown(deadline) ──► Stopped | Failed
//! ```
//!
//! ## Rules
//! - `start` is called at most once and must not block beyond setup.
//! - `await_fault` resolves at most once; a healthy service never resolves it.
//! - `shutdown` is called at most once, only after a trigger was observed.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::ServiceError;

/// Shared handle to a service.
pub type ServiceRef = Arc<dyn Service>;

/// # Long-running, independently failing service.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio::time::Instant;
/// use servisor::{FaultReporter, FaultSignal, Service, ServiceError, fault_channel};
///
/// struct Demo {
///     fault: FaultSignal,
///     reporter: std::sync::Mutex<Option<FaultReporter>>,
/// }
///
/// #[async_trait]
/// impl Service for Demo {
///     fn name(&self) -> &str { "demo" }
///
///     async fn start(&self) -> Result<(), ServiceError> {
///         // spawn the serving loop and hand it the reporter...
///         Ok(())
///     }
///
///     async fn await_fault(&self) -> ServiceError {
///         self.fault.wait().await
///     }
///
///     async fn shutdown(&self, _deadline: Instant) -> Result<(), ServiceError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Returns a stable, human-readable service name.
    fn name(&self) -> &str;

    /// Begins serving.
    ///
    /// Must return as soon as the service is registered (listener bound,
    /// consumer subscribed). Fails only on immediate setup errors; the serving
    /// loop itself runs on its own task.
    async fn start(&self) -> Result<(), ServiceError>;

    /// Resolves with the error of the first unexpected termination.
    ///
    /// Never resolves for a service that does not fail. Not restartable: once
    /// it has produced a value it never produces another one.
    async fn await_fault(&self) -> ServiceError;

    /// Requests a graceful stop.
    ///
    /// Implementations should drain in-flight work and release resources before
    /// `deadline`, returning an error when that is not possible.
    async fn shutdown(&self, deadline: Instant) -> Result<(), ServiceError>;
}
