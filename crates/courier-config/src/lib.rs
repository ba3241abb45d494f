//! Shared configuration for courier services.
//!
//! Two kinds of configuration live here. [`Config`] is the process level
//! configuration (log filter, log format, where the topology lives) layered by
//! `ortho_config` from defaults, an optional TOML file, `COURIER_*` environment
//! variables, and command-line flags. The [`topology`] module holds the
//! declarative description of a service: its controllers, extensions, proxies
//! and pipelines, together with the lint and validation passes that must
//! succeed before any controller starts.

mod defaults;
mod endpoint;
mod logging;
pub mod topology;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_CONNECT_HOST, DEFAULT_LOG_FILTER, DEFAULT_SERVICE_URL, WILDCARD_HOST,
    default_connect_host, default_log_filter, default_log_filter_string, default_log_format,
};
pub use endpoint::{Endpoint, EndpointParseError};
pub use logging::{LogFormat, LogFormatParseError};
pub use topology::{
    ControllerConfig, ControllerType, DESTINATION_NAME, ExtensionConfig, Instance, Pipeline,
    ProxyConfig, SOURCE_NAME, ServiceConfig, ServiceType, TopologyError,
};

/// Process configuration resolved from defaults, files, environment, and CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "COURIER")]
pub struct Config {
    /// `tracing` filter expression, for example `info,courier::proxy=debug`.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// YAML file describing the service topology.
    #[serde(default)]
    pub topology_path: Option<Utf8PathBuf>,
    /// Service identity used when no topology file is supplied.
    #[serde(default)]
    pub service_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            topology_path: None,
            service_url: None,
        }
    }
}

impl Config {
    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Topology file path, when configured.
    #[must_use]
    pub fn topology_path(&self) -> Option<&Utf8Path> {
        self.topology_path.as_deref()
    }

    /// Service identity used when no topology file is supplied.
    #[must_use]
    pub fn service_url(&self) -> &str {
        self.service_url.as_deref().unwrap_or(DEFAULT_SERVICE_URL)
    }
}
