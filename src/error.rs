//! Error types used by the servisor runtime and supervised services.
//!
//! This module defines three enums:
//!
//! - [`ServiceError`]: errors raised by a service (setup, fault, stop).
//! - [`ShutdownError`]: per-service outcome of the shutdown fan-out.
//! - [`RuntimeError`]: the reported cause returned by the supervisor.
//!
//! All of them provide `as_label` / `as_message` helpers for logs and metrics.
//! Only a [`RuntimeError`] ever reaches the caller of
//! [`Supervisor::run`](crate::Supervisor::run); shutdown errors are reported
//! as warnings and absorbed.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// # Errors produced by a supervised service.
///
/// Returned from [`Service::start`](crate::Service::start) and
/// [`Service::shutdown`](crate::Service::shutdown), and carried by a
/// [`FaultSignal`](crate::FaultSignal) when a running service dies.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Synchronous setup failed (cannot bind, bad address, ...).
    #[error("setup failed: {error}")]
    Setup {
        /// The underlying error message.
        error: String,
    },

    /// The service terminated unexpectedly after a successful start.
    #[error("{error}")]
    Fault {
        /// The underlying error message.
        error: String,
    },

    /// An internal error occurred while stopping.
    #[error("stop failed: {error}")]
    Stop {
        /// The underlying error message.
        error: String,
    },

    /// The deadline passed with in-flight work still pending.
    #[error("{pending} in-flight operations left undrained")]
    Undrained {
        /// Number of operations that did not complete.
        pending: usize,
    },
}

impl ServiceError {
    /// Shorthand for [`ServiceError::Setup`].
    pub fn setup(error: impl Into<String>) -> Self {
        ServiceError::Setup {
            error: error.into(),
        }
    }

    /// Shorthand for [`ServiceError::Fault`].
    ///
    /// # Example
    /// ```
    /// use servisor::ServiceError;
    ///
    /// let err = ServiceError::fault("bind lost");
    /// assert_eq!(err.to_string(), "bind lost");
    /// ```
    pub fn fault(error: impl Into<String>) -> Self {
        ServiceError::Fault {
            error: error.into(),
        }
    }

    /// Shorthand for [`ServiceError::Stop`].
    pub fn stop(error: impl Into<String>) -> Self {
        ServiceError::Stop {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::Setup { .. } => "service_setup",
            ServiceError::Fault { .. } => "service_fault",
            ServiceError::Stop { .. } => "service_stop",
            ServiceError::Undrained { .. } => "service_undrained",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ServiceError::Setup { error } => format!("setup: {error}"),
            ServiceError::Fault { error } => format!("fault: {error}"),
            ServiceError::Stop { error } => format!("stop: {error}"),
            ServiceError::Undrained { pending } => format!("undrained: {pending}"),
        }
    }
}

/// # Failure of a single shutdown attempt.
///
/// Recorded in a [`ShutdownOutcome`](crate::ShutdownOutcome); never promoted
/// to the reported cause.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShutdownError {
    /// The service reported an error from its shutdown path.
    #[error("shutdown failed: {0}")]
    Failed(#[source] ServiceError),

    /// The service did not finish before the shared deadline.
    #[error("shutdown deadline {grace:?} exceeded")]
    DeadlineExceeded {
        /// The grace period the deadline was derived from.
        grace: Duration,
    },

    /// The service's shutdown future panicked.
    #[error("shutdown panicked: {info}")]
    Panicked {
        /// Panic payload, if it was a string.
        info: String,
    },

    /// A shutdown was already issued to this handle.
    #[error("shutdown already requested")]
    AlreadyRequested,
}

impl ShutdownError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use servisor::ShutdownError;
    /// use std::time::Duration;
    ///
    /// let err = ShutdownError::DeadlineExceeded { grace: Duration::from_secs(5) };
    /// assert_eq!(err.as_label(), "shutdown_deadline_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ShutdownError::Failed(_) => "shutdown_failed",
            ShutdownError::DeadlineExceeded { .. } => "shutdown_deadline_exceeded",
            ShutdownError::Panicked { .. } => "shutdown_panicked",
            ShutdownError::AlreadyRequested => "shutdown_already_requested",
        }
    }

    /// Indicates whether the deadline was hit.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ShutdownError::DeadlineExceeded { .. })
    }
}

/// # Errors produced by the supervisor.
///
/// This is the reported cause: why the process is exiting. A clean external
/// stop request produces no error at all.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A service failed to start; startup was aborted.
    #[error("service {service:?} failed to start: {error}")]
    StartFailed {
        /// Name of the service.
        service: Arc<str>,
        /// Error returned by `start`.
        #[source]
        error: ServiceError,
    },

    /// A service did not return from `start` within the configured timeout.
    #[error("service {service:?} did not start within {timeout:?}")]
    StartTimedOut {
        /// Name of the service.
        service: Arc<str>,
        /// The configured start timeout.
        timeout: Duration,
    },

    /// A running service faulted; this fault triggered the shutdown.
    #[error("service {service:?} faulted: {error}")]
    ServiceFaulted {
        /// Name of the service.
        service: Arc<str>,
        /// The fault carried by the service's fault signal.
        #[source]
        error: ServiceError,
    },

    /// Registering the OS termination listeners failed.
    #[error("termination signal registration failed: {0}")]
    Signal(#[from] std::io::Error),

    /// Two services were registered under the same name.
    #[error("duplicate service name {name:?}")]
    DuplicateService {
        /// The duplicated name.
        name: Arc<str>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use servisor::{RuntimeError, ServiceError};
    ///
    /// let err = RuntimeError::ServiceFaulted {
    ///     service: "grpc".into(),
    ///     error: ServiceError::fault("bind lost"),
    /// };
    /// assert_eq!(err.as_label(), "runtime_service_faulted");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::StartFailed { .. } => "runtime_start_failed",
            RuntimeError::StartTimedOut { .. } => "runtime_start_timed_out",
            RuntimeError::ServiceFaulted { .. } => "runtime_service_faulted",
            RuntimeError::Signal(_) => "runtime_signal",
            RuntimeError::DuplicateService { .. } => "runtime_duplicate_service",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::StartFailed { service, error } => {
                format!("error starting {service} server: {error}")
            }
            RuntimeError::StartTimedOut { service, timeout } => {
                format!("{service} start exceeded {timeout:?}")
            }
            RuntimeError::ServiceFaulted { service, error } => {
                format!("error running {service} server: {error}")
            }
            RuntimeError::Signal(e) => format!("signal: {e}"),
            RuntimeError::DuplicateService { name } => format!("duplicate: {name}"),
        }
    }

    /// Returns the originating service error, if any.
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            RuntimeError::StartFailed { error, .. } | RuntimeError::ServiceFaulted { error, .. } => {
                Some(error)
            }
            _ => None,
        }
    }

    /// Returns the name of the service that caused this error, if any.
    pub fn service(&self) -> Option<&str> {
        match self {
            RuntimeError::StartFailed { service, .. }
            | RuntimeError::StartTimedOut { service, .. }
            | RuntimeError::ServiceFaulted { service, .. } => Some(&**service),
            RuntimeError::DuplicateService { name } => Some(&**name),
            RuntimeError::Signal(_) => None,
        }
    }
}
