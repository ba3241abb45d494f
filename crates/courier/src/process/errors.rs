//! Defines the error surface for launching and supervising a service.

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::proxy::ProxyError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching or supervising the service process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrap failed.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// The proxy could not be prepared or stopped with an error.
    #[error("service failed: {source}")]
    Service {
        #[source]
        source: ProxyError,
    },
    /// Signal handlers could not be installed.
    #[error(transparent)]
    Shutdown(#[from] ShutdownError),
}

impl From<ProxyError> for LaunchError {
    fn from(source: ProxyError) -> Self {
        Self::Service { source }
    }
}
