//! # Example: all_services
//!
//! Runs the four transports of a typical backend under one [`Supervisor`]:
//! REST, gRPC and Kafka are stood in for by small TCP listeners, Cron by a
//! ticker. Press Ctrl-C for a clean shutdown (exit status 0).
//!
//! ## Flow
//! ```text
//! Supervisor::run_report()
//!     ├─► TerminationSource::os()       (SIGINT/SIGTERM/SIGQUIT)
//!     ├─► start rest, grpc, cron, kafka
//!     ├─► wait_first()                  (Ctrl-C or DEMO_CRON_FAULT_AFTER_SECS)
//!     ├─► shutdown(deadline) to all 4   (grace = 5s)
//!     └─► exit(report.exit_code())
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example all_services --features logging
//! DEMO_CRON_FAULT_AFTER_SECS=3 cargo run --example all_services --features logging
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use servisor::{
    FaultReporter, FaultSignal, LogWriter, Service, ServiceError, ServiceRef, Supervisor,
    SupervisorConfig, fault_channel,
};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Accepts connections and answers each with a one-line banner.
struct ListenerService {
    name: &'static str,
    addr: SocketAddr,
    fault: FaultSignal,
    reporter: Mutex<Option<FaultReporter>>,
    stop: CancellationToken,
    conns: TaskTracker,
    accept: Mutex<Option<JoinHandle<()>>>,
}

impl ListenerService {
    fn new(name: &'static str, addr: SocketAddr) -> Arc<Self> {
        let (reporter, fault) = fault_channel();
        Arc::new(Self {
            name,
            addr,
            fault,
            reporter: Mutex::new(Some(reporter)),
            stop: CancellationToken::new(),
            conns: TaskTracker::new(),
            accept: Mutex::new(None),
        })
    }
}

#[async_trait]
impl Service for ListenerService {
    fn name(&self) -> &str {
        self.name
    }

    async fn start(&self) -> Result<(), ServiceError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| ServiceError::setup(format!("bind {}: {e}", self.addr)))?;
        let local = listener.local_addr().map_err(|e| ServiceError::setup(e.to_string()))?;
        tracing::info!(service = self.name, %local, "listening");

        let reporter = self.reporter.lock().await.take();
        let stop = self.stop.clone();
        let conns = self.conns.clone();
        let banner = format!("{} ok\n", self.name);

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stop.cancelled() => return,
                    accepted = listener.accept() => match accepted {
                        Ok((mut sock, _)) => {
                            let banner = banner.clone();
                            conns.spawn(async move {
                                let _ = sock.write_all(banner.as_bytes()).await;
                            });
                        }
                        Err(e) => {
                            if let Some(r) = reporter {
                                r.raise(ServiceError::fault(e.to_string()));
                            }
                            return;
                        }
                    },
                }
            }
        });
        *self.accept.lock().await = Some(handle);
        Ok(())
    }

    async fn await_fault(&self) -> ServiceError {
        self.fault.wait().await
    }

    async fn shutdown(&self, deadline: Instant) -> Result<(), ServiceError> {
        self.stop.cancel();
        if let Some(handle) = self.accept.lock().await.take() {
            let _ = handle.await;
        }

        self.conns.close();
        tokio::time::timeout_at(deadline, self.conns.wait())
            .await
            .map_err(|_| ServiceError::Undrained {
                pending: self.conns.len(),
            })
    }
}

/// Runs a job on a fixed interval; optionally faults after a while.
struct CronService {
    every: Duration,
    fault_after: Option<Duration>,
    fault: FaultSignal,
    reporter: Mutex<Option<FaultReporter>>,
    stop: CancellationToken,
    runner: Mutex<Option<JoinHandle<()>>>,
}

impl CronService {
    fn new(every: Duration, fault_after: Option<Duration>) -> Arc<Self> {
        let (reporter, fault) = fault_channel();
        Arc::new(Self {
            every,
            fault_after,
            fault,
            reporter: Mutex::new(Some(reporter)),
            stop: CancellationToken::new(),
            runner: Mutex::new(None),
        })
    }
}

#[async_trait]
impl Service for CronService {
    fn name(&self) -> &str {
        "cron"
    }

    async fn start(&self) -> Result<(), ServiceError> {
        if self.every.is_zero() {
            return Err(ServiceError::setup("interval must be positive"));
        }
        let reporter = self.reporter.lock().await.take();
        let stop = self.stop.clone();
        let every = self.every;
        let fault_at = self.fault_after.and_then(|d| Instant::now().checked_add(d));

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            let mut runs = 0u64;
            loop {
                tokio::select! {
                    _ = stop.cancelled() => return,
                    _ = ticker.tick() => {
                        runs += 1;
                        tracing::debug!(runs, "cron job executed");
                        if fault_at.is_some_and(|at| Instant::now() >= at) {
                            if let Some(r) = reporter {
                                r.raise(ServiceError::fault(format!("cron scheduler crashed after {runs} runs")));
                            }
                            return;
                        }
                    }
                }
            }
        });
        *self.runner.lock().await = Some(handle);
        Ok(())
    }

    async fn await_fault(&self) -> ServiceError {
        self.fault.wait().await
    }

    async fn shutdown(&self, deadline: Instant) -> Result<(), ServiceError> {
        self.stop.cancel();
        let Some(handle) = self.runner.lock().await.take() else {
            return Ok(());
        };
        match tokio::time::timeout_at(deadline, handle).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ServiceError::stop(e.to_string())),
            Err(_) => Err(ServiceError::Undrained { pending: 1 }),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let fault_after = std::env::var("DEMO_CRON_FAULT_AFTER_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs);

    let services: Vec<ServiceRef> = vec![
        ListenerService::new("rest", "127.0.0.1:8080".parse()?) as ServiceRef,
        ListenerService::new("grpc", "127.0.0.1:9090".parse()?) as ServiceRef,
        CronService::new(Duration::from_secs(1), fault_after) as ServiceRef,
        ListenerService::new("kafka", "127.0.0.1:9092".parse()?) as ServiceRef,
    ];

    let sup = Supervisor::builder(SupervisorConfig::default())
        .with_services(services)
        .with_subscriber(Arc::new(LogWriter::new()))
        .build();

    let report = sup.run_report().await;
    if let Some(cause) = &report.cause {
        tracing::error!(error = %cause, "exiting with error");
    }
    std::process::exit(report.exit_code());
}
