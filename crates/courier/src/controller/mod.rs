//! Controllers: one inbound socket, one route table, one set of extension
//! clients, served sequentially on the thread that calls [`Controller::run`].

mod errors;
mod run;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use courier_config::{ControllerConfig, ControllerType, ExtensionConfig};

use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::route::{Route, RouteTable};

pub use errors::ControllerError;

pub(crate) const CONTROLLER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::controller");

/// Stops a controller from another thread.
///
/// A stop requested before the controller starts serving applies to the
/// next `run`, so a worker that has not been scheduled yet still stops. Each
/// request is consumed when that `run` returns.
#[derive(Debug, Clone, Default)]
pub struct CloseHandle(Arc<CloseState>);

#[derive(Debug, Default)]
struct CloseState {
    requested: AtomicBool,
    serving: AtomicBool,
}

impl CloseHandle {
    /// Asks the controller to stop. The controller releases its socket the
    /// next time it polls.
    pub fn close(&self) {
        self.0.requested.store(true, Ordering::SeqCst);
    }

    /// Returns `true` while a stop request is pending.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.0.requested.load(Ordering::SeqCst)
    }

    /// Returns `true` while the controller holds a bound socket.
    #[must_use]
    pub fn is_serving(&self) -> bool {
        self.0.serving.load(Ordering::SeqCst)
    }

    fn set_serving(&self, serving: bool) {
        self.0.serving.store(serving, Ordering::SeqCst);
    }

    fn reset(&self) {
        self.0.requested.store(false, Ordering::SeqCst);
    }
}

/// Receives requests on its bound endpoints and dispatches them to routes.
pub struct Controller {
    controller_type: ControllerType,
    config: Option<ControllerConfig>,
    service_url: String,
    routes: RouteTable,
    required_extensions: Vec<String>,
    extension_configs: BTreeMap<String, ExtensionConfig>,
    close: CloseHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Controller {
    /// Builds a controller of `controller_type`.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Unsupported`] for router and unknown types.
    pub fn new(controller_type: ControllerType) -> Result<Self, ControllerError> {
        match controller_type {
            ControllerType::SyncReplier | ControllerType::Puller => {
                Ok(Self::with_type(controller_type))
            }
            ControllerType::Router | ControllerType::Unknown => {
                Err(ControllerError::Unsupported { controller_type })
            }
        }
    }

    /// Builds a controller that answers every request.
    #[must_use]
    pub fn sync_replier() -> Self {
        Self::with_type(ControllerType::SyncReplier)
    }

    /// Builds a controller that never answers.
    #[must_use]
    pub fn puller() -> Self {
        Self::with_type(ControllerType::Puller)
    }

    fn with_type(controller_type: ControllerType) -> Self {
        Self {
            controller_type,
            config: None,
            service_url: String::new(),
            routes: RouteTable::new(),
            required_extensions: Vec::new(),
            extension_configs: BTreeMap::new(),
            close: CloseHandle::default(),
            reporter: Arc::new(StructuredHealthReporter::new()),
        }
    }

    /// Replaces the lifecycle reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn HealthReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub(crate) fn set_reporter(&mut self, reporter: Arc<dyn HealthReporter>) {
        self.reporter = reporter;
    }

    /// Socket discipline fixed at construction.
    #[must_use]
    pub fn controller_type(&self) -> ControllerType {
        self.controller_type
    }

    /// Category from the configuration, once one is set.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.config.as_ref().map(|config| config.category.as_str())
    }

    /// Configuration set by [`Controller::add_config`].
    #[must_use]
    pub fn config(&self) -> Option<&ControllerConfig> {
        self.config.as_ref()
    }

    /// Sets the endpoints and category to serve, replacing earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::TypeMismatch`] when the configuration is for
    /// another controller type.
    pub fn add_config(
        &mut self,
        config: ControllerConfig,
        service_url: impl Into<String>,
    ) -> Result<(), ControllerError> {
        if config.controller_type != self.controller_type {
            return Err(ControllerError::TypeMismatch {
                category: config.category,
                expected: self.controller_type,
                found: config.controller_type,
            });
        }
        self.config = Some(config);
        self.service_url = service_url.into();
        Ok(())
    }

    /// Makes an extension available to handlers, keyed by its url.
    pub fn add_extension_config(&mut self, config: ExtensionConfig) {
        self.extension_configs.insert(config.url.clone(), config);
    }

    /// Declares that handlers need the extension called `name`.
    pub fn require_extension(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.required_extensions.contains(&name) {
            self.required_extensions.push(name);
        }
    }

    /// Extensions that must be configured before `run`.
    #[must_use]
    pub fn required_extensions(&self) -> &[String] {
        &self.required_extensions
    }

    /// Configured extensions, ordered by url.
    #[must_use]
    pub fn extension_configs(&self) -> impl Iterator<Item = &ExtensionConfig> {
        self.extension_configs.values()
    }

    /// Registers `route`. A route for an already registered command is
    /// ignored and the first handler stays active.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Route`] if the table rejects the route.
    pub fn add_route(&mut self, route: Route) -> Result<(), ControllerError> {
        if self.routes.exist(route.command()) {
            return Ok(());
        }
        self.routes.add(route)?;
        Ok(())
    }

    /// Registered routes.
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Handle that stops this controller from another thread.
    #[must_use]
    pub fn close_handle(&self) -> CloseHandle {
        self.close.clone()
    }

    /// Releases the socket of a serving controller.
    ///
    /// Without a bound socket there is nothing to release and the call does
    /// nothing, so closing twice or before `run` leaves the controller
    /// runnable.
    pub fn close(&self) {
        if self.close.is_serving() {
            self.close.close();
        }
    }

    /// Returns `true` while a stop request is pending.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.close.is_closed()
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Controller")
            .field("controller_type", &self.controller_type)
            .field("category", &self.category())
            .field("service_url", &self.service_url)
            .field("routes", &self.routes.len())
            .field("required_extensions", &self.required_extensions)
            .finish_non_exhaustive()
    }
}
