//! Scriptable service used by the unit tests of the runtime core.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::ServiceError;
use crate::service::{FaultReporter, FaultSignal, Service, fault_channel};

/// How the mock reacts to `shutdown`.
#[derive(Clone)]
pub(crate) enum StopBehavior {
    Clean,
    Fail(ServiceError),
    Delay(Duration),
    Hang,
    Panic,
}

pub(crate) struct MockService {
    name: String,
    start_error: Option<ServiceError>,
    hang_on_start: bool,
    stop: StopBehavior,
    pub(crate) starts: AtomicUsize,
    pub(crate) shutdowns: AtomicUsize,
    fault: FaultSignal,
    reporter: Mutex<Option<FaultReporter>>,
}

impl MockService {
    pub(crate) fn new(name: &str) -> Self {
        let (reporter, fault) = fault_channel();
        Self {
            name: name.to_string(),
            start_error: None,
            hang_on_start: false,
            stop: StopBehavior::Clean,
            starts: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
            fault,
            reporter: Mutex::new(Some(reporter)),
        }
    }

    pub(crate) fn failing_start(mut self, err: ServiceError) -> Self {
        self.start_error = Some(err);
        self
    }

    pub(crate) fn hanging_start(mut self) -> Self {
        self.hang_on_start = true;
        self
    }

    pub(crate) fn stop(mut self, behavior: StopBehavior) -> Self {
        self.stop = behavior;
        self
    }

    pub(crate) fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub(crate) fn raise(&self, err: ServiceError) {
        if let Some(r) = self.reporter.lock().unwrap().take() {
            r.raise(err);
        }
    }
}

#[async_trait]
impl Service for MockService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), ServiceError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.hang_on_start {
            std::future::pending::<()>().await;
        }
        match &self.start_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn await_fault(&self) -> ServiceError {
        self.fault.wait().await
    }

    async fn shutdown(&self, _deadline: Instant) -> Result<(), ServiceError> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        match self.stop.clone() {
            StopBehavior::Clean => Ok(()),
            StopBehavior::Fail(e) => Err(e),
            StopBehavior::Delay(d) => {
                tokio::time::sleep(d).await;
                Ok(())
            }
            StopBehavior::Hang => std::future::pending().await,
            StopBehavior::Panic => panic!("shutdown exploded"),
        }
    }
}
