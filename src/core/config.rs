//! # Global runtime configuration.
//!
//! Provides [`SupervisorConfig`] centralized settings for the supervisor runtime.
//! Which services run, and their own settings, come from the caller; this only
//! shapes how they are supervised.
//!
//! ## Sentinel values
//! - `start_timeout = 0s` → no start timeout
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

/// Global configuration for the supervisor runtime.
///
/// ## Field semantics
/// - `grace`: Shared shutdown deadline, measured from the start of the fan-out
/// - `start_timeout`: Upper bound for each service's `start` (`0s` = unbounded)
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Maximum time every service gets to shut down gracefully.
    ///
    /// When a trigger fires:
    /// - `shutdown(deadline)` is issued to every service concurrently
    /// - `deadline = now + grace`, taken when the fan-out begins
    /// - Services still running at the deadline are reported as timed out
    pub grace: Duration,

    /// Maximum time a single `start` call may take.
    ///
    /// - `Duration::ZERO` = no timeout
    /// - `> 0` = exceeding it is a fatal start error
    pub start_timeout: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,
}

impl SupervisorConfig {
    /// Returns the start timeout as an `Option`.
    ///
    /// - `None` → unbounded
    /// - `Some(d)` → each `start` is wrapped in a timeout
    #[inline]
    pub fn start_timeout(&self) -> Option<Duration> {
        if self.start_timeout == Duration::ZERO {
            None
        } else {
            Some(self.start_timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `grace = 5s`
    /// - `start_timeout = 0s` (unbounded)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(5),
            start_timeout: Duration::ZERO,
            bus_capacity: 1024,
        }
    }
}
