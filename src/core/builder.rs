use std::sync::Arc;

use super::{config::SupervisorConfig, supervisor::Supervisor, termination::TerminationSource};
use crate::{service::ServiceRef, subscribers::Subscribe};

/// Builder for constructing a [`Supervisor`].
pub struct SupervisorBuilder {
    cfg: SupervisorConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    services: Vec<ServiceRef>,
    termination: Option<TerminationSource>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SupervisorConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            services: Vec::new(),
            termination: None,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events through dedicated workers with
    /// bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Adds a service. Services start in the order they were added.
    pub fn with_service(mut self, service: ServiceRef) -> Self {
        self.services.push(service);
        self
    }

    /// Adds several services.
    pub fn with_services(mut self, services: impl IntoIterator<Item = ServiceRef>) -> Self {
        self.services.extend(services);
        self
    }

    /// Overrides the termination source.
    ///
    /// By default the supervisor registers OS signal listeners when it runs.
    pub fn with_termination(mut self, termination: TerminationSource) -> Self {
        self.termination = Some(termination);
        self
    }

    /// Builds the supervisor. No task is spawned until it runs.
    pub fn build(self) -> Supervisor {
        Supervisor::new_internal(self.cfg, self.subscribers, self.services, self.termination)
    }
}
