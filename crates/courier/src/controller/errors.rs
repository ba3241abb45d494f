use courier_config::ControllerType;
use thiserror::Error;

use crate::extension::ExtensionError;
use crate::route::RouteError;
use crate::transport::TransportError;

/// Errors raised while configuring or running a controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The controller type cannot be run.
    #[error("{controller_type} controllers are not supported")]
    Unsupported { controller_type: ControllerType },

    /// The configuration describes another controller type.
    #[error("configuration for '{category}' is {found}, expected {expected}")]
    TypeMismatch {
        category: String,
        expected: ControllerType,
        found: ControllerType,
    },

    /// `run` was called before `add_config`.
    #[error("controller has no configuration")]
    MissingConfig,

    /// The configuration lists no instances to bind.
    #[error("controller '{category}' has no instances to bind")]
    NoInstances { category: String },

    /// A required extension has no configuration.
    #[error("controller '{category}' requires an unconfigured extension: {source}")]
    Extension {
        category: String,
        #[source]
        source: ExtensionError,
    },

    /// Route registration failed.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// Binding an endpoint failed.
    #[error("controller '{category}' failed to bind: {source}")]
    Bind {
        category: String,
        #[source]
        source: TransportError,
    },

    /// Receiving from the socket failed.
    #[error("controller '{category}' failed to receive: {source}")]
    Receive {
        category: String,
        #[source]
        source: TransportError,
    },
}
