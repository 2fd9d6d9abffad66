//! # Termination source: a one-shot external stop request.
//!
//! Wraps the ways the hosting environment asks the process to stop behind one
//! consumable notification, so the fault multiplexer can treat it like any
//! other trigger.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//!
//! **Windows platforms:**
//! - `Ctrl-C` and `Ctrl-Break` via `tokio::signal::windows`
//!
//! In addition, every source can be fired programmatically through a
//! [`TerminationTrigger`].
//!
//! ## Rules
//! - Listeners are registered in [`TerminationSource::os`], i.e. before any
//!   service starts; a signal arriving during startup is not lost.
//! - `wait` consumes the source: it fires at most once.

use tokio_util::sync::CancellationToken;

/// Consumable one-shot stop notification.
pub struct TerminationSource {
    os: Option<OsSignals>,
    token: CancellationToken,
}

/// Cloneable handle that fires a [`TerminationSource`] programmatically.
///
/// Firing is idempotent; only the first call has an effect.
#[derive(Clone, Debug)]
pub struct TerminationTrigger {
    token: CancellationToken,
}

impl TerminationTrigger {
    /// Requests termination.
    pub fn fire(&self) {
        self.token.cancel();
    }

    /// True once `fire` was called.
    pub fn is_fired(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl TerminationSource {
    /// Registers OS signal listeners.
    ///
    /// Must be called from within a tokio runtime. Returns `Err` if signal
    /// registration fails.
    pub fn os() -> std::io::Result<Self> {
        Ok(Self {
            os: Some(OsSignals::register()?),
            token: CancellationToken::new(),
        })
    }

    /// A source that fires only through its [`TerminationTrigger`].
    pub fn manual() -> Self {
        Self {
            os: None,
            token: CancellationToken::new(),
        }
    }

    /// Returns a trigger for this source.
    pub fn trigger(&self) -> TerminationTrigger {
        TerminationTrigger {
            token: self.token.clone(),
        }
    }

    /// True if OS signals are wired to this source.
    pub fn listens_to_os(&self) -> bool {
        self.os.is_some()
    }

    /// Waits until a stop is requested.
    pub async fn wait(self) {
        let Self { os, token } = self;
        match os {
            Some(mut os) => {
                tokio::select! {
                    _ = token.cancelled() => {},
                    _ = os.recv() => {},
                }
            }
            None => token.cancelled().await,
        }
    }
}

#[cfg(unix)]
struct OsSignals {
    sigint: tokio::signal::unix::Signal,
    sigterm: tokio::signal::unix::Signal,
    sigquit: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsSignals {
    fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
            sigquit: signal(SignalKind::quit())?,
        })
    }

    async fn recv(&mut self) {
        tokio::select! {
            _ = self.sigint.recv()  => {},
            _ = self.sigterm.recv() => {},
            _ = self.sigquit.recv() => {},
        }
    }
}

#[cfg(windows)]
struct OsSignals {
    ctrl_c: tokio::signal::windows::CtrlC,
    ctrl_break: tokio::signal::windows::CtrlBreak,
}

#[cfg(windows)]
impl OsSignals {
    fn register() -> std::io::Result<Self> {
        use tokio::signal::windows::{ctrl_break, ctrl_c};

        Ok(Self {
            ctrl_c: ctrl_c()?,
            ctrl_break: ctrl_break()?,
        })
    }

    async fn recv(&mut self) {
        tokio::select! {
            _ = self.ctrl_c.recv()     => {},
            _ = self.ctrl_break.recv() => {},
        }
    }
}
