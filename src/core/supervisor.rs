//! # Supervisor: starts services, waits for the first trigger, drives shutdown.
//!
//! The [`Supervisor`] owns the configured services, the event bus and the
//! subscriber list. [`Supervisor::run`] consumes it, so a supervisor can only
//! ever be run once.
//!
//! ## Sequence
//! ```text
//! run()
//!   0. reject duplicate service names
//!   1. register TerminationSource (OS signals unless one was injected)
//!   2. start each ServiceHandle in order
//!        ├─ start error ─► shutdown already-started handles ─► StartFailed
//!        └─ start timeout ─► shutdown started + timed-out handles ─► StartTimedOut
//!   3. multiplex::wait_first(handles, termination)
//!   4. reported cause = ServiceFaulted(..) | None (clean termination)
//!   5. coordinator::shutdown_all(handles, cfg.grace)
//!   6. every failed/timed-out outcome ─► tracing::warn! (never the cause)
//!   7. flush subscribers, return Report
//! ```
//!
//! ## Event flow
//! ```text
//! Supervisor / watchers ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit
//! ```
//! The listener ends once the run drops its bus, after draining every buffered
//! event; the subscriber set is then shut down so every subscriber has seen
//! the complete run before `run` returns.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use tokio::time::Instant;
//! use servisor::{
//!     FaultSignal, Service, ServiceError, Supervisor, SupervisorConfig, TerminationSource,
//!     fault_channel,
//! };
//!
//! struct Idle(FaultSignal);
//!
//! #[async_trait]
//! impl Service for Idle {
//!     fn name(&self) -> &str { "idle" }
//!     async fn start(&self) -> Result<(), ServiceError> { Ok(()) }
//!     async fn await_fault(&self) -> ServiceError { self.0.wait().await }
//!     async fn shutdown(&self, _deadline: Instant) -> Result<(), ServiceError> { Ok(()) }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = SupervisorConfig::default();
//!     cfg.grace = Duration::from_secs(2);
//!
//!     let (_reporter, fault) = fault_channel();
//!     let termination = TerminationSource::manual();
//!     termination.trigger().fire();
//!
//!     let sup = Supervisor::builder(cfg)
//!         .with_service(Arc::new(Idle(fault)))
//!         .with_termination(termination)
//!         .build();
//!
//!     sup.run().await?;
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::core::builder::SupervisorBuilder;
use crate::core::config::SupervisorConfig;
use crate::core::coordinator::{self, ShutdownOutcome};
use crate::core::handle::ServiceHandle;
use crate::core::multiplex::{self, Trigger};
use crate::core::report::Report;
use crate::core::termination::TerminationSource;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::service::ServiceRef;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Starts a fixed set of services and supervises them until the first trigger.
pub struct Supervisor {
    cfg: SupervisorConfig,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
    services: Vec<ServiceRef>,
    termination: Option<TerminationSource>,
}

impl Supervisor {
    /// Returns a builder with the given configuration.
    pub fn builder(cfg: SupervisorConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: SupervisorConfig,
        subscribers: Vec<Arc<dyn Subscribe>>,
        services: Vec<ServiceRef>,
        termination: Option<TerminationSource>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            cfg,
            bus,
            subscribers,
            services,
            termination,
        }
    }

    /// Returns the configuration this supervisor runs with.
    pub fn config(&self) -> &SupervisorConfig {
        &self.cfg
    }

    /// Creates a raw receiver for runtime events.
    ///
    /// Subscribe before calling [`run`](Self::run); the receiver closes when the run ends.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Runs all services until a fault or termination, then shuts them down.
    ///
    /// Returns `Ok(())` only for a clean external stop with no service fault.
    /// Shutdown-phase errors are logged as warnings and never returned.
    pub async fn run(self) -> Result<(), RuntimeError> {
        self.run_report().await.into_result()
    }

    /// Like [`run`](Self::run), but returns the full [`Report`] including
    /// every shutdown outcome.
    pub async fn run_report(self) -> Report {
        let Self {
            cfg,
            bus,
            subscribers,
            services,
            termination,
        } = self;

        let subs = Arc::new(SubscriberSet::new(subscribers));
        let listener = subscriber_listener(&bus, Arc::clone(&subs));

        let report = drive(&cfg, &bus, services, termination).await;

        drop(bus);
        let _ = listener.await;
        if let Ok(set) = Arc::try_unwrap(subs) {
            set.shutdown().await;
        }
        report
    }
}

/// Forwards bus events to the subscriber set until the bus closes.
fn subscriber_listener(bus: &Bus, set: Arc<SubscriberSet>) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => set.emit(&ev),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event listener lagged; events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn drive(
    cfg: &SupervisorConfig,
    bus: &Bus,
    services: Vec<ServiceRef>,
    termination: Option<TerminationSource>,
) -> Report {
    if let Some(name) = first_duplicate(&services) {
        return aborted(RuntimeError::DuplicateService { name });
    }

    let termination = match termination {
        Some(t) => t,
        None => match TerminationSource::os() {
            Ok(t) => t,
            Err(e) => return aborted(RuntimeError::Signal(e)),
        },
    };

    let handles: Vec<Arc<ServiceHandle>> = services
        .into_iter()
        .map(|s| Arc::new(ServiceHandle::new(s)))
        .collect();

    let mut running: Vec<Arc<ServiceHandle>> = Vec::with_capacity(handles.len());
    for handle in &handles {
        bus.publish(Event::new(EventKind::ServiceStarting).with_service(handle.name().clone()));

        match handle.start(cfg.start_timeout()).await {
            Ok(()) => {
                bus.publish(Event::new(EventKind::ServiceStarted).with_service(handle.name().clone()));
                tracing::info!(service = %handle.name(), "service is running");
                running.push(Arc::clone(handle));
            }
            Err(err) => {
                tracing::error!(service = %handle.name(), error = %err, "service failed to start; aborting startup");
                let mut ev = Event::new(EventKind::ServiceStartFailed)
                    .with_service(handle.name().clone())
                    .with_reason(err.to_string());
                if let RuntimeError::StartTimedOut { timeout, .. } = &err {
                    ev = ev.with_timeout(*timeout);
                    // abandoned mid-start: it may already hold resources
                    running.push(Arc::clone(handle));
                }
                bus.publish(ev);

                let outcomes = shutdown(&running, "start failure", cfg, bus).await;
                return Report {
                    cause: Some(err),
                    trigger: None,
                    outcomes,
                };
            }
        }
    }
    tracing::info!(services = running.len(), "all services running");

    let trigger = multiplex::wait_first(&running, termination).await;

    let cause = match &trigger {
        Trigger::ServiceFault { service, error } => {
            tracing::error!(service = %service, error = %error, "service faulted; shutting down");
            bus.publish(
                Event::new(EventKind::ServiceFaulted)
                    .with_service(service.clone())
                    .with_reason(error.to_string()),
            );
            Some(RuntimeError::ServiceFaulted {
                service: service.clone(),
                error: error.clone(),
            })
        }
        Trigger::ExternalStop => {
            tracing::info!("termination requested; shutting down");
            None
        }
    };

    let outcomes = shutdown(&running, trigger.as_label(), cfg, bus).await;
    if cause.is_none() {
        tracing::info!("exiting gracefully");
    }

    Report {
        cause,
        trigger: Some(trigger),
        outcomes,
    }
}

/// Runs the shutdown fan-out and surfaces every failed outcome as a warning.
async fn shutdown(
    handles: &[Arc<ServiceHandle>],
    reason: &'static str,
    cfg: &SupervisorConfig,
    bus: &Bus,
) -> Vec<ShutdownOutcome> {
    bus.publish(
        Event::new(EventKind::ShutdownRequested)
            .with_reason(reason)
            .with_timeout(cfg.grace),
    );

    let outcomes = coordinator::shutdown_all(handles, cfg.grace, bus).await;
    for outcome in &outcomes {
        if let Err(err) = &outcome.result {
            tracing::warn!(
                service = %outcome.service,
                state = %outcome.state,
                error = %err,
                "failed to shut down service gracefully"
            );
        }
    }
    outcomes
}

fn aborted(cause: RuntimeError) -> Report {
    tracing::error!(error = %cause, "supervisor aborted before starting services");
    Report {
        cause: Some(cause),
        trigger: None,
        outcomes: Vec::new(),
    }
}

fn first_duplicate(services: &[ServiceRef]) -> Option<Arc<str>> {
    let mut seen = HashSet::with_capacity(services.len());
    services
        .iter()
        .map(|s| s.name())
        .find(|name| !seen.insert(*name))
        .map(Arc::from)
}
