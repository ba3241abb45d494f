//! Proxies: a service whose source controller forwards to destinations.
//!
//! The source controller serves public traffic. Its wildcard route relays
//! every request in-process to the proxy's forwarder, which sends it on to
//! the destination instances declared in the topology and relays the reply
//! back. Exact routes installed on the source take precedence, so a proxy can
//! rewrite or answer specific commands and pass everything else through.

mod errors;
mod forwarder;
#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::thread;

use courier_config::{
    ControllerType, DESTINATION_NAME, ExtensionConfig, SOURCE_NAME, ServiceConfig, ServiceType,
};
use tracing::{debug, info};

use crate::controller::{CloseHandle, Controller};
use crate::health::HealthReporter;
use crate::route::Route;
use crate::service::Service;

pub use errors::ProxyError;
use forwarder::Forwarder;

pub(crate) const PROXY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::proxy");

/// Suffix of the in-process endpoint the forwarder binds.
pub const PROXY_CONTROLLER: &str = "proxy_controller";

/// A forwarding stage in front of a destination.
#[derive(Debug)]
pub struct Proxy {
    service: Service,
    destination: Option<ControllerType>,
    forwarder: Option<Forwarder>,
    snapshot: Option<String>,
}

impl Proxy {
    /// Builds a proxy over the topology in `config`.
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        Self::from_service(Service::new(config))
    }

    /// Wraps an already assembled service.
    #[must_use]
    pub fn from_service(service: Service) -> Self {
        Self {
            service,
            destination: None,
            forwarder: None,
            snapshot: None,
        }
    }

    /// Replaces the lifecycle reporter of every controller.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn HealthReporter>) -> Self {
        self.service = self.service.with_reporter(reporter);
        self
    }

    /// Declares the controller type the destination must be.
    pub fn require_destination(&mut self, controller_type: ControllerType) {
        self.destination = Some(controller_type);
    }

    /// Installs a fresh source controller of `controller_type`.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Controller`] for types that cannot be run.
    pub fn set_default_source(
        &mut self,
        controller_type: ControllerType,
    ) -> Result<(), ProxyError> {
        let source = Controller::new(controller_type)?;
        self.set_custom_source(source);
        Ok(())
    }

    /// Installs `source` as the controller receiving public traffic,
    /// replacing any earlier source.
    pub fn set_custom_source(&mut self, source: Controller) {
        self.service.add_controller(SOURCE_NAME, source);
    }

    /// The source controller, for adding routes or extensions.
    pub fn source_mut(&mut self) -> Option<&mut Controller> {
        self.service.controller_mut(SOURCE_NAME)
    }

    /// Service carrying the source and destination controllers.
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Mutable access to the underlying service.
    pub fn service_mut(&mut self) -> &mut Service {
        &mut self.service
    }

    /// In-process name of the forwarder, unique per proxy service.
    #[must_use]
    pub fn internal_name(&self) -> String {
        format!("{}.{PROXY_CONTROLLER}", self.service.config().id)
    }

    /// Destinations registered by [`Proxy::prepare`].
    #[must_use]
    pub fn destinations(&self) -> &[ExtensionConfig] {
        self.forwarder
            .as_ref()
            .map_or(&[], |forwarder| forwarder.destinations())
    }

    /// Topology snapshot taken by [`Proxy::run`] before the forwarder was
    /// wired into the source.
    #[must_use]
    pub fn snapshot(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }

    /// Prepares the topology as a proxy and registers the destinations.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::MissingDestination`] when no destination type
    /// was required, or the topology and service errors raised while
    /// preparing.
    pub fn prepare(&mut self) -> Result<(), ProxyError> {
        let destination_type = self.destination.ok_or(ProxyError::MissingDestination)?;
        self.service.prepare(ServiceType::Proxy)?;
        self.service
            .prepare_controller_config(DESTINATION_NAME, destination_type)?;

        let config = self.service.config();
        let destinations: Vec<ExtensionConfig> = config
            .get_controllers(DESTINATION_NAME)?
            .into_iter()
            .flat_map(|controller| controller.instances.iter())
            .map(|instance| {
                ExtensionConfig::new(instance.id.clone(), instance.port)
                    .with_host(instance.host.clone())
            })
            .collect();
        if destinations.is_empty() {
            return Err(ProxyError::NoDestinations {
                url: config.url.clone(),
            });
        }
        info!(
            target: PROXY_TARGET,
            proxy = %config.url,
            destination_type = %destination_type,
            destinations = destinations.len(),
            "registered destinations"
        );

        let forwarder = Forwarder::new(
            &self.internal_name(),
            &config.url,
            destination_type,
            destinations,
            self.service.reporter(),
        )?;
        self.forwarder = Some(forwarder);
        Ok(())
    }

    /// Close handles of the source, the other controllers, and the
    /// forwarder.
    #[must_use]
    pub fn close_handles(&self) -> Vec<CloseHandle> {
        let mut handles = self.service.close_handles();
        handles.extend(self.forwarder.as_ref().map(Forwarder::close_handle));
        handles
    }

    /// Runs the service controllers and the forwarder until they stop.
    ///
    /// The topology snapshot is taken first. The forwarder is then required
    /// by the source, which gains a pass-through wildcard route unless it
    /// already has one.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::NotPrepared`] or [`ProxyError::MissingSource`]
    /// before anything starts, otherwise the first failure of the service or
    /// the forwarder.
    pub fn run(&mut self) -> Result<(), ProxyError> {
        if self.forwarder.is_none() {
            return Err(ProxyError::NotPrepared);
        }
        let source_type = self
            .service
            .controller(SOURCE_NAME)
            .map(Controller::controller_type)
            .ok_or(ProxyError::MissingSource)?;
        self.service
            .prepare_controller_config(SOURCE_NAME, source_type)?;

        let snapshot = self.service.build_configuration()?;
        debug!(
            target: PROXY_TARGET,
            snapshot = %snapshot,
            "topology snapshot"
        );
        self.snapshot = Some(snapshot);

        let internal = self.internal_name();
        let source = self
            .service
            .controller_mut(SOURCE_NAME)
            .ok_or(ProxyError::MissingSource)?;
        source.require_extension(internal.as_str());
        source.add_extension_config(ExtensionConfig::internal(internal.as_str()));
        source.add_route(pass_through(internal))?;

        let service_handles = self.service.close_handles();
        let Self {
            service, forwarder, ..
        } = self;
        let forwarder = forwarder.as_mut().ok_or(ProxyError::NotPrepared)?;
        let forwarder_handle = forwarder.close_handle();

        thread::scope(|scope| {
            let forwarding = scope.spawn(|| {
                let result = forwarder.run();
                if result.is_err() {
                    service_handles.iter().for_each(CloseHandle::close);
                }
                result
            });
            let served = service.run();
            forwarder_handle.close();
            let forwarded = forwarding.join();
            match (served, forwarded) {
                (Err(error), _) => Err(ProxyError::Service(error)),
                (Ok(()), Ok(Err(source))) => Err(ProxyError::Forwarder { source }),
                (Ok(()), Err(_)) => Err(ProxyError::Panicked),
                (Ok(()), Ok(Ok(()))) => Ok(()),
            }
        })
    }
}

/// Wildcard route relaying every request to the forwarder named `internal`.
fn pass_through(internal: String) -> Route {
    Route::any(move |request, context| {
        context
            .extensions()
            .request(&internal, &request)
            .unwrap_or_else(|error| request.fail(error.to_string()))
    })
}
