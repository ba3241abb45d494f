//! Structured health reporting for lifecycle events.

use std::sync::Arc;

use courier_config::{Config, ControllerType, Endpoint};

use crate::bootstrap::BootstrapError;
use crate::controller::ControllerError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when a controller begins its preflight checks.
    fn controller_starting(&self, category: &str, controller_type: ControllerType);

    /// Invoked once a controller has bound every endpoint.
    fn controller_bound(&self, category: &str, endpoints: &[Endpoint]);

    /// Invoked when a controller stops with an error.
    fn controller_failed(&self, category: &str, error: &ControllerError);

    /// Invoked when a controller stops after being closed.
    fn controller_stopped(&self, category: &str);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn controller_starting(&self, category: &str, controller_type: ControllerType) {
        (**self).controller_starting(category, controller_type);
    }

    fn controller_bound(&self, category: &str, endpoints: &[Endpoint]) {
        (**self).controller_bound(category, endpoints);
    }

    fn controller_failed(&self, category: &str, error: &ControllerError) {
        (**self).controller_failed(category, error);
    }

    fn controller_stopped(&self, category: &str) {
        (**self).controller_stopped(category);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            topology = ?config.topology_path(),
            service_url = %config.service_url(),
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            "bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "bootstrap failed"
        );
    }

    fn controller_starting(&self, category: &str, controller_type: ControllerType) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "controller_starting",
            controller = %category,
            controller_type = %controller_type,
            "starting controller"
        );
    }

    fn controller_bound(&self, category: &str, endpoints: &[Endpoint]) {
        let endpoints: Vec<String> = endpoints.iter().map(ToString::to_string).collect();
        tracing::info!(
            target: HEALTH_TARGET,
            event = "controller_bound",
            controller = %category,
            endpoints = ?endpoints,
            "controller bound"
        );
    }

    fn controller_failed(&self, category: &str, error: &ControllerError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "controller_failed",
            controller = %category,
            error = %error,
            "controller failed"
        );
    }

    fn controller_stopped(&self, category: &str) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "controller_stopped",
            controller = %category,
            "controller stopped"
        );
    }
}
