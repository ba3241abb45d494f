use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::defaults::WILDCARD_HOST;

/// Address a controller binds to or a client connects to.
///
/// TCP endpoints cross process boundaries. In-process endpoints are keyed by
/// name and only reachable from the process that bound them.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum Endpoint {
    /// TCP socket endpoint. A host of `*` binds every interface.
    Tcp { host: String, port: u16 },
    /// In-process endpoint addressed by name.
    Inproc { name: String },
}

impl Endpoint {
    /// Builds a TCP endpoint.
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Builds an in-process endpoint.
    #[must_use]
    pub fn inproc(name: impl Into<String>) -> Self {
        Self::Inproc { name: name.into() }
    }

    /// Address a controller named `name` binds to.
    ///
    /// A nonzero port yields `tcp://*:<port>`; port zero keeps the controller
    /// in-process under its own name.
    #[must_use]
    pub fn bind(name: &str, port: u16) -> Self {
        if port == 0 {
            Self::inproc(name)
        } else {
            Self::tcp(WILDCARD_HOST, port)
        }
    }

    /// Address a client uses to reach the service named `name`.
    #[must_use]
    pub fn connect(name: &str, host: &str, port: u16) -> Self {
        if port == 0 {
            Self::inproc(name)
        } else {
            Self::tcp(host, port)
        }
    }

    /// Returns `true` for in-process endpoints.
    #[must_use]
    pub fn is_inproc(&self) -> bool {
        matches!(self, Self::Inproc { .. })
    }

    /// Host string suitable for socket resolution, mapping `*` to all
    /// interfaces.
    #[must_use]
    pub fn socket_host(&self) -> Option<&str> {
        match self {
            Self::Tcp { host, .. } if host == WILDCARD_HOST => Some("0.0.0.0"),
            Self::Tcp { host, .. } => Some(host.as_str()),
            Self::Inproc { .. } => None,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp { host, port } => write!(formatter, "tcp://{host}:{port}"),
            Self::Inproc { name } => write!(formatter, "inproc://{name}"),
        }
    }
}

impl FromStr for Endpoint {
    type Err = EndpointParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        // `*` is not a valid URL host, so parse a stand-in and restore it.
        let wildcard_prefix = format!("tcp://{WILDCARD_HOST}:");
        let (candidate, wildcard) = match input.strip_prefix(wildcard_prefix.as_str()) {
            Some(rest) => (format!("tcp://0.0.0.0:{rest}"), true),
            None => (input.to_owned(), false),
        };

        let url = Url::parse(&candidate)?;
        match url.scheme() {
            "tcp" => {
                let host = url
                    .host_str()
                    .ok_or_else(|| EndpointParseError::MissingHost(input.to_owned()))?;
                let port = url
                    .port()
                    .ok_or_else(|| EndpointParseError::MissingPort(input.to_owned()))?;
                let host = if wildcard { WILDCARD_HOST } else { host };
                Ok(Self::tcp(host, port))
            }
            "inproc" => match url.host_str() {
                Some(name) if !name.is_empty() => Ok(Self::inproc(name)),
                _ => Err(EndpointParseError::MissingName(input.to_owned())),
            },
            other => Err(EndpointParseError::UnsupportedScheme(other.to_owned())),
        }
    }
}

/// Errors encountered while parsing an [`Endpoint`] from text.
#[derive(Debug, Error)]
pub enum EndpointParseError {
    /// Scheme was not recognised.
    #[error("unsupported endpoint scheme '{0}'")]
    UnsupportedScheme(String),
    /// TCP host name was missing.
    #[error("missing TCP host in '{0}'")]
    MissingHost(String),
    /// TCP port was missing from the address.
    #[error("missing TCP port in '{0}'")]
    MissingPort(String),
    /// In-process endpoint had no name.
    #[error("missing in-process endpoint name in '{0}'")]
    MissingName(String),
    /// URL failed to parse.
    #[error(transparent)]
    Url(#[from] url::ParseError),
}
