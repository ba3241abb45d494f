//! Services: a topology plus the named controllers that serve it.

mod errors;
mod extension;

use std::collections::BTreeMap;
use std::sync::{Arc, mpsc};
use std::thread;

use courier_config::{
    ControllerConfig, ControllerType, ServiceConfig, ServiceType, TopologyError,
};
use tracing::{debug, info};

use crate::controller::{CloseHandle, Controller};
use crate::health::{HealthReporter, StructuredHealthReporter};

pub use errors::ServiceError;
pub use extension::{EXTENSION_CONTROLLER, Extension};

const SERVICE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::service");

/// A running unit: its topology and one controller per category.
pub struct Service {
    config: ServiceConfig,
    controllers: BTreeMap<String, Controller>,
    reporter: Arc<dyn HealthReporter>,
}

impl Service {
    /// Wraps `config` with no controllers.
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            controllers: BTreeMap::new(),
            reporter: Arc::new(StructuredHealthReporter::new()),
        }
    }

    /// Replaces the lifecycle reporter used by every controller.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn HealthReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub(crate) fn reporter(&self) -> Arc<dyn HealthReporter> {
        Arc::clone(&self.reporter)
    }

    /// Topology the service was built from.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Topology for programmatic assembly. Not to be changed once running.
    pub fn config_mut(&mut self) -> &mut ServiceConfig {
        &mut self.config
    }

    /// Installs `controller` under `name`, replacing any previous one.
    pub fn add_controller(&mut self, name: impl Into<String>, controller: Controller) {
        self.controllers.insert(name.into(), controller);
    }

    /// Controller installed under `name`.
    #[must_use]
    pub fn controller(&self, name: &str) -> Option<&Controller> {
        self.controllers.get(name)
    }

    /// Mutable access to the controller installed under `name`.
    pub fn controller_mut(&mut self, name: &str) -> Option<&mut Controller> {
        self.controllers.get_mut(name)
    }

    /// Number of installed controllers.
    #[must_use]
    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    /// Checks the topology for `service_type` and prepares it.
    ///
    /// A topology without a type takes `service_type`. Controllers installed
    /// without a matching topology entry get an in-process one; an entry of
    /// another controller type is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::TypeMismatch`] when the topology declares
    /// another type, or the topology's validation error.
    pub fn prepare(&mut self, service_type: ServiceType) -> Result<(), ServiceError> {
        if self.config.service_type == ServiceType::Unknown {
            self.config.service_type = service_type;
        } else if self.config.service_type != service_type {
            return Err(ServiceError::TypeMismatch {
                url: self.config.url.clone(),
                declared: self.config.service_type,
                required: service_type,
            });
        }
        self.config.prepare_service()?;

        let slots: Vec<(String, ControllerType)> = self
            .controllers
            .iter()
            .map(|(name, controller)| (name.clone(), controller.controller_type()))
            .collect();
        for (name, controller_type) in slots {
            self.prepare_controller_config(&name, controller_type)?;
        }
        Ok(())
    }

    /// Ensures the topology has a `category` slot of `controller_type`.
    ///
    /// # Errors
    ///
    /// Returns the topology error when the category exists with another type.
    pub fn prepare_controller_config(
        &mut self,
        category: &str,
        controller_type: ControllerType,
    ) -> Result<(), ServiceError> {
        self.config
            .prepare_controller_config(category, controller_type)?;
        Ok(())
    }

    /// Renders the current topology as YAML.
    ///
    /// # Errors
    ///
    /// Returns the topology error when rendering fails.
    pub fn build_configuration(&self) -> Result<String, ServiceError> {
        Ok(self.config.to_yaml()?)
    }

    /// Close handles of every controller.
    #[must_use]
    pub fn close_handles(&self) -> Vec<CloseHandle> {
        self.controllers.values().map(Controller::close_handle).collect()
    }

    /// Releases the sockets of serving controllers. Use
    /// [`Service::close_handles`] to stop a service running on another thread.
    pub fn close(&self) {
        for controller in self.controllers.values() {
            controller.close();
        }
    }

    /// Configures every controller from the topology and runs them, one
    /// thread each, until all have returned.
    ///
    /// The first controller to fail closes the others; its error is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NoControllers`], a configuration error, or the
    /// first controller failure.
    pub fn run(&mut self) -> Result<(), ServiceError> {
        if self.controllers.is_empty() {
            return Err(ServiceError::NoControllers {
                url: self.config.url.clone(),
            });
        }
        self.configure_controllers()?;

        let handles = self.close_handles();
        info!(
            target: SERVICE_TARGET,
            service = %self.config.url,
            controllers = self.controllers.len(),
            "starting service"
        );
        let outcome = thread::scope(|scope| {
            let (sender, receiver) = mpsc::channel();
            let workers: Vec<_> = self
                .controllers
                .iter_mut()
                .map(|(name, controller)| {
                    let sender = sender.clone();
                    let handles = handles.as_slice();
                    let worker_name = name.clone();
                    let worker = scope.spawn(move || {
                        let _guard = CloseOnPanic(handles);
                        let result = controller.run();
                        if result.is_err() {
                            handles.iter().for_each(CloseHandle::close);
                        }
                        sender.send((worker_name, result)).ok();
                    });
                    (name.clone(), worker)
                })
                .collect();
            drop(sender);

            // Results arrive in completion order, so the first error is the
            // one that closed the other controllers.
            let mut first_error = None;
            for (name, result) in receiver {
                if let Err(source) = result {
                    first_error.get_or_insert(ServiceError::controller(name, source));
                }
            }
            for (name, worker) in workers {
                if worker.join().is_err() {
                    first_error.get_or_insert(ServiceError::Panicked { name });
                }
            }
            first_error.map_or(Ok(()), Err)
        });
        debug!(
            target: SERVICE_TARGET,
            service = %self.config.url,
            "service stopped"
        );
        outcome
    }

    fn configure_controllers(&mut self) -> Result<(), ServiceError> {
        for (name, controller) in &mut self.controllers {
            let config = merged_config(&self.config, name)?;
            controller
                .add_config(config, self.config.url.clone())
                .map_err(|source| ServiceError::controller(name.as_str(), source))?;
            for extension in &self.config.extensions {
                controller.add_extension_config(extension.clone());
            }
            controller.set_reporter(Arc::clone(&self.reporter));
        }
        Ok(())
    }
}

/// Folds every topology entry for `category` into one configuration.
fn merged_config(config: &ServiceConfig, category: &str) -> Result<ControllerConfig, ServiceError> {
    let controller_type = config.get_controller(category)?.controller_type;
    let mut merged = ControllerConfig::new(category, controller_type);
    for entry in config.get_controllers(category)? {
        if entry.controller_type != controller_type {
            return Err(TopologyError::ControllerTypeMismatch {
                service: config.id.clone(),
                category: category.to_owned(),
                declared: entry.controller_type,
                required: controller_type,
            }
            .into());
        }
        merged.instances.extend(entry.instances.iter().cloned());
    }
    Ok(merged)
}

/// Closes every controller when a worker thread unwinds.
struct CloseOnPanic<'a>(&'a [CloseHandle]);

impl Drop for CloseOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.iter().for_each(CloseHandle::close);
        }
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Service")
            .field("config", &self.config)
            .field("controllers", &self.controllers)
            .finish_non_exhaustive()
    }
}
