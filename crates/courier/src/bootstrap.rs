//! Process bootstrap: configuration, telemetry, and the service topology.

use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use courier_config::{Config, ServiceConfig, ServiceType, TopologyError};

use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the process configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that hands out a configuration resolved elsewhere.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The topology file could not be loaded or failed validation.
    #[error("failed to load topology: {source}")]
    Topology {
        #[source]
        source: TopologyError,
    },
}

/// Everything a process needs before it builds its service.
pub struct Runtime {
    config: Config,
    topology: ServiceConfig,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Runtime {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Topology loaded from the configured file, or the default proxy
    /// topology when no file is configured.
    #[must_use]
    pub fn topology(&self) -> &ServiceConfig {
        &self.topology
    }

    /// Hands the topology over to the service being built.
    #[must_use]
    pub fn into_topology(self) -> ServiceConfig {
        self.topology
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Reporter shared with the service's controllers.
    #[must_use]
    pub fn reporter(&self) -> Arc<dyn HealthReporter> {
        Arc::clone(&self.reporter)
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Runtime")
            .field("config", &self.config)
            .field("topology", &self.topology)
            .finish_non_exhaustive()
    }
}

/// Bootstraps a process using the supplied collaborators.
///
/// # Errors
///
/// Returns the first [`BootstrapError`] raised while loading configuration,
/// installing telemetry, or loading the topology. The reporter sees the
/// failure before it is returned.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Runtime, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let topology = match config.topology_path() {
        Some(path) => ServiceConfig::load(path),
        None => Ok(ServiceConfig::new(ServiceType::Proxy, config.service_url())),
    };
    let topology = match topology {
        Ok(topology) => topology,
        Err(source) => {
            let error = BootstrapError::Topology { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    reporter.bootstrap_succeeded(&config);
    Ok(Runtime {
        config,
        topology,
        telemetry,
        reporter,
    })
}
