use serde::{Deserialize, Serialize};

/// Ordered chain of proxies placed in front of a destination.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Pipeline {
    /// Proxy urls, outermost first.
    #[serde(default)]
    pub proxies: Vec<String>,
    /// Url of the service the chain ends at.
    pub destination: String,
}

impl Pipeline {
    /// Builds a pipeline that reaches `destination` directly.
    #[must_use]
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            proxies: Vec::new(),
            destination: destination.into(),
        }
    }

    /// Appends a proxy stage behind the ones already present.
    #[must_use]
    pub fn through(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxies.push(proxy_url.into());
        self
    }

    /// Url of the stage that receives public traffic.
    #[must_use]
    pub fn head(&self) -> &str {
        self.proxies
            .first()
            .map_or(self.destination.as_str(), String::as_str)
    }
}
