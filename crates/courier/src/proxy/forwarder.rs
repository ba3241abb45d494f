use std::sync::Arc;

use courier_config::{ControllerConfig, ControllerType, ExtensionConfig, Instance};
use tracing::debug;

use super::{PROXY_TARGET, ProxyError};
use crate::controller::{CloseHandle, Controller, ControllerError};
use crate::health::HealthReporter;
use crate::message::Parameters;
use crate::route::Route;

/// In-process controller that relays source traffic to the destinations.
#[derive(Debug)]
pub(crate) struct Forwarder {
    controller: Controller,
    destinations: Vec<ExtensionConfig>,
}

impl Forwarder {
    /// Builds a forwarder bound in-process under `name`.
    pub(crate) fn new(
        name: &str,
        service_url: &str,
        destination_type: ControllerType,
        destinations: Vec<ExtensionConfig>,
        reporter: Arc<dyn HealthReporter>,
    ) -> Result<Self, ProxyError> {
        let mut controller = Controller::sync_replier().with_reporter(reporter);
        controller.add_config(
            ControllerConfig::new(name, ControllerType::SyncReplier)
                .with_instance(Instance::new(name, 0)),
            service_url,
        )?;
        for destination in &destinations {
            controller.require_extension(destination.url.as_str());
            controller.add_extension_config(destination.clone());
        }
        let names = destinations
            .iter()
            .map(|destination| destination.url.clone())
            .collect();
        controller.add_route(round_robin(names, destination_type.replies()))?;
        Ok(Self {
            controller,
            destinations,
        })
    }

    pub(crate) fn destinations(&self) -> &[ExtensionConfig] {
        &self.destinations
    }

    pub(crate) fn close_handle(&self) -> CloseHandle {
        self.controller.close_handle()
    }

    pub(crate) fn run(&mut self) -> Result<(), ControllerError> {
        self.controller.run()
    }
}

/// Wildcard route sending each request to the next destination in turn.
///
/// Destinations that do not reply receive a push and the caller gets an
/// empty success.
fn round_robin(destinations: Vec<String>, replies: bool) -> Route {
    let mut next = 0_usize;
    Route::any(move |request, context| {
        let Some(name) = destinations.get(next % destinations.len().max(1)) else {
            return request.fail("no destination configured");
        };
        next = next.wrapping_add(1);
        debug!(
            target: PROXY_TARGET,
            destination = %name,
            command = %request.command,
            "forwarding request"
        );
        if replies {
            context
                .extensions()
                .request(name, &request)
                .unwrap_or_else(|error| request.fail(error.to_string()))
        } else {
            match context.extensions().push(name, &request) {
                Ok(()) => request.ok(Parameters::new()),
                Err(error) => request.fail(error.to_string()),
            }
        }
    })
}
