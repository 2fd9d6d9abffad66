#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use servisor::{
    Event, EventKind, FaultReporter, FaultSignal, Service, ServiceError, ServiceRef, Subscribe,
    fault_channel,
};
use tokio::time::Instant;

/// How a test service reacts to `shutdown`.
#[derive(Clone)]
pub enum Stop {
    Clean,
    Fail(ServiceError),
    Hang,
}

/// Scriptable service counting lifecycle calls.
pub struct TestService {
    name: String,
    start_error: Option<ServiceError>,
    hang_on_start: bool,
    fault_after: Option<(Duration, ServiceError)>,
    stop: Stop,
    starts: AtomicUsize,
    shutdowns: AtomicUsize,
    fault: FaultSignal,
    reporter: Mutex<Option<FaultReporter>>,
}

impl TestService {
    pub fn new(name: &str) -> Self {
        let (reporter, fault) = fault_channel();
        Self {
            name: name.to_string(),
            start_error: None,
            hang_on_start: false,
            fault_after: None,
            stop: Stop::Clean,
            starts: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
            fault,
            reporter: Mutex::new(Some(reporter)),
        }
    }

    pub fn failing_start(mut self, msg: &str) -> Self {
        self.start_error = Some(ServiceError::setup(msg));
        self
    }

    pub fn hanging_start(mut self) -> Self {
        self.hang_on_start = true;
        self
    }

    pub fn fault_after(mut self, delay: Duration, msg: &str) -> Self {
        self.fault_after = Some((delay, ServiceError::fault(msg)));
        self
    }

    pub fn stop(mut self, stop: Stop) -> Self {
        self.stop = stop;
        self
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Service for TestService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), ServiceError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.hang_on_start {
            std::future::pending::<()>().await;
        }
        if let Some(e) = &self.start_error {
            return Err(e.clone());
        }
        if let Some((delay, err)) = self.fault_after.clone() {
            let reporter = self.reporter.lock().unwrap().take();
            if let Some(reporter) = reporter {
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    reporter.raise(err);
                });
            }
        }
        Ok(())
    }

    async fn await_fault(&self) -> ServiceError {
        self.fault.wait().await
    }

    async fn shutdown(&self, _deadline: Instant) -> Result<(), ServiceError> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        match self.stop.clone() {
            Stop::Clean => Ok(()),
            Stop::Fail(e) => Err(e),
            Stop::Hang => std::future::pending().await,
        }
    }
}

/// The four transports of a typical deployment.
pub fn four(
    rest: TestService,
    grpc: TestService,
    cron: TestService,
    kafka: TestService,
) -> (Vec<Arc<TestService>>, Vec<ServiceRef>) {
    let all = vec![rest.arc(), grpc.arc(), cron.arc(), kafka.arc()];
    let refs = all.iter().map(|s| s.clone() as ServiceRef).collect();
    (all, refs)
}

/// Subscriber recording every event it sees.
#[derive(Default)]
pub struct Recorder {
    pub events: Mutex<Vec<Event>>,
}

impl Recorder {
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind == kind)
            .count()
    }
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}
