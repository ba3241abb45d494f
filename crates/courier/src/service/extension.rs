use courier_config::{ControllerType, ServiceConfig, ServiceType};

use super::{Service, ServiceError};
use crate::controller::{CloseHandle, Controller};

/// Category of the single controller an extension owns.
pub const EXTENSION_CONTROLLER: &str = "main";

/// A service that other controllers depend on.
///
/// Extensions own exactly one controller, installed under
/// [`EXTENSION_CONTROLLER`].
#[derive(Debug)]
pub struct Extension {
    service: Service,
}

impl Extension {
    /// Builds an extension service over `config`.
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            service: Service::new(config),
        }
    }

    /// Wraps an already assembled service.
    #[must_use]
    pub fn from_service(service: Service) -> Self {
        Self { service }
    }

    /// Creates the extension's controller.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Controller`] for types that cannot be run.
    pub fn add_controller(&mut self, controller_type: ControllerType) -> Result<(), ServiceError> {
        let controller = Controller::new(controller_type)
            .map_err(|source| ServiceError::controller(EXTENSION_CONTROLLER, source))?;
        self.service.add_controller(EXTENSION_CONTROLLER, controller);
        Ok(())
    }

    /// Category of the controller that serves extension requests.
    #[must_use]
    pub fn controller_name(&self) -> &'static str {
        EXTENSION_CONTROLLER
    }

    /// The extension's controller, once added.
    pub fn controller_mut(&mut self) -> Option<&mut Controller> {
        self.service.controller_mut(EXTENSION_CONTROLLER)
    }

    /// Underlying service.
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Mutable access to the underlying service.
    pub fn service_mut(&mut self) -> &mut Service {
        &mut self.service
    }

    /// Prepares the topology as an extension.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::ControllerCount`] unless exactly one controller
    /// is installed, or the preparation error of [`Service::prepare`].
    pub fn prepare(&mut self) -> Result<(), ServiceError> {
        self.service.prepare(ServiceType::Extension)?;
        let count = self.service.controller_count();
        if count != 1 {
            return Err(ServiceError::ControllerCount {
                url: self.service.config().url.clone(),
                count,
            });
        }
        Ok(())
    }

    /// Runs the controller until it is closed.
    ///
    /// # Errors
    ///
    /// Returns the error of [`Service::run`].
    pub fn run(&mut self) -> Result<(), ServiceError> {
        self.service.run()
    }

    /// Close handles of every controller of the extension.
    #[must_use]
    pub fn close_handles(&self) -> Vec<CloseHandle> {
        self.service.close_handles()
    }
}
