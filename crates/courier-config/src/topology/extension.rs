use serde::{Deserialize, Serialize};

use crate::defaults::default_connect_host;
use crate::endpoint::Endpoint;

/// A service another controller depends on.
///
/// Controllers require extensions by `url`; the topology supplies where each
/// one can be reached.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtensionConfig {
    /// Identity of the extension, also the in-process name when `port` is 0.
    pub url: String,
    /// Host to connect to for TCP extensions.
    #[serde(default = "default_connect_host")]
    pub host: String,
    /// TCP port, or zero for an extension living in this process.
    #[serde(default)]
    pub port: u16,
}

impl ExtensionConfig {
    /// Builds an extension reachable on `localhost:port`.
    #[must_use]
    pub fn new(url: impl Into<String>, port: u16) -> Self {
        Self {
            url: url.into(),
            host: default_connect_host(),
            port,
        }
    }

    /// Builds an extension that lives in this process.
    #[must_use]
    pub fn internal(name: impl Into<String>) -> Self {
        Self::new(name, 0)
    }

    /// Overrides the host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Address clients connect to.
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::connect(&self.url, &self.host, self.port)
    }
}

/// A proxy declared in front of this service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProxyConfig {
    /// Identity of the proxy service.
    pub url: String,
    /// Controller category the proxy exposes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    /// Host of the proxy's public controller.
    #[serde(default = "default_connect_host")]
    pub host: String,
    /// Port of the proxy's public controller.
    #[serde(default)]
    pub port: u16,
}

impl ProxyConfig {
    /// Builds a proxy declaration reachable on `localhost:port`.
    #[must_use]
    pub fn new(url: impl Into<String>, port: u16) -> Self {
        Self {
            url: url.into(),
            category: String::new(),
            host: default_connect_host(),
            port,
        }
    }

    /// Address clients connect to.
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::connect(&self.url, &self.host, self.port)
    }
}
