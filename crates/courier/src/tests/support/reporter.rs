//! Test double for [`HealthReporter`] that records lifecycle events.

use std::sync::Mutex;

use courier_config::{Config, ControllerType, Endpoint};

use crate::bootstrap::BootstrapError;
use crate::controller::ControllerError;
use crate::health::HealthReporter;

/// Lifecycle events tracked during tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    ControllerStarting(String, ControllerType),
    ControllerBound(String, Vec<Endpoint>),
    ControllerFailed(String, String),
    ControllerStopped(String),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn controller_starting(&self, category: &str, controller_type: ControllerType) {
        self.record(HealthEvent::ControllerStarting(
            category.to_owned(),
            controller_type,
        ));
    }

    fn controller_bound(&self, category: &str, endpoints: &[Endpoint]) {
        self.record(HealthEvent::ControllerBound(
            category.to_owned(),
            endpoints.to_vec(),
        ));
    }

    fn controller_failed(&self, category: &str, error: &ControllerError) {
        self.record(HealthEvent::ControllerFailed(
            category.to_owned(),
            error.to_string(),
        ));
    }

    fn controller_stopped(&self, category: &str) {
        self.record(HealthEvent::ControllerStopped(category.to_owned()));
    }
}
