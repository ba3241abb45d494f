//! Outbound clients a controller holds for its extensions.

use std::collections::HashMap;

use thiserror::Error;

use crate::message::{Reply, Request};
use crate::transport::{ClientError, ClientSocket};

/// Errors raised when a handler reaches for an extension.
#[derive(Debug, Error)]
pub enum ExtensionError {
    /// No client is registered under the name.
    #[error("extension '{name}' is not configured")]
    Missing { name: String },

    /// The round trip to the extension failed.
    #[error("extension '{name}' request failed: {source}")]
    Client {
        name: String,
        #[source]
        source: ClientError,
    },
}

impl ExtensionError {
    /// Creates a missing extension error.
    pub fn missing(name: impl Into<String>) -> Self {
        Self::Missing { name: name.into() }
    }
}

/// Extension clients owned by one controller, keyed by extension url.
#[derive(Debug, Default)]
pub struct ExtensionClients {
    clients: HashMap<String, ClientSocket>,
}

impl ExtensionClients {
    /// Builds an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `client` under `name`, replacing any previous client.
    pub fn set(&mut self, name: impl Into<String>, client: ClientSocket) {
        self.clients.insert(name.into(), client);
    }

    /// Returns `true` when a client is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.clients.contains_key(name)
    }

    /// Names of the registered extensions, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clients.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the client registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::Missing`] when nothing is registered.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut ClientSocket, ExtensionError> {
        self.clients
            .get_mut(name)
            .ok_or_else(|| ExtensionError::missing(name))
    }

    /// Sends `request` to the extension and waits for its reply.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::Missing`] or [`ExtensionError::Client`].
    pub fn request(&mut self, name: &str, request: &Request) -> Result<Reply, ExtensionError> {
        self.get_mut(name)?
            .request(request)
            .map_err(|source| ExtensionError::Client {
                name: name.to_owned(),
                source,
            })
    }

    /// Sends `request` to the extension without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::Missing`] or [`ExtensionError::Client`].
    pub fn push(&mut self, name: &str, request: &Request) -> Result<(), ExtensionError> {
        self.get_mut(name)?
            .push(request)
            .map_err(|source| ExtensionError::Client {
                name: name.to_owned(),
                source,
            })
    }

    /// Drops every open connection.
    pub fn close(&mut self) {
        for client in self.clients.values_mut() {
            client.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use courier_config::Endpoint;

    use super::*;
    use crate::message::Parameters;

    #[test]
    fn missing_extension_is_named() {
        let mut clients = ExtensionClients::new();
        let error = clients
            .request("github.com/example/db", &Request::new("ping", Parameters::new()))
            .expect_err("missing");
        assert!(error.to_string().contains("github.com/example/db"));
    }

    #[test]
    fn unreachable_extension_fails_the_call_only() {
        let mut clients = ExtensionClients::new();
        clients.set(
            "cache",
            ClientSocket::new("cache", Endpoint::inproc("extension.tests.cache")),
        );
        let request = Request::new("get", Parameters::new());
        assert!(matches!(
            clients.request("cache", &request),
            Err(ExtensionError::Client { .. })
        ));
        assert!(clients.contains("cache"));
        assert_eq!(clients.names(), vec!["cache"]);
    }
}
