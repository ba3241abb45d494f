use courier_config::TopologyError;
use thiserror::Error;

use crate::controller::ControllerError;
use crate::service::ServiceError;

/// Errors raised while preparing or running a proxy.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// `prepare` was called before `require_destination`.
    #[error("missing the required destination, call require_destination before prepare")]
    MissingDestination,

    /// `run` was called without a source controller.
    #[error("proxy has no source controller, call set_default_source or set_custom_source")]
    MissingSource,

    /// `run` was called before a successful `prepare`.
    #[error("proxy was not prepared")]
    NotPrepared,

    /// The destination slot lists no instances.
    #[error("proxy '{url}' has no destination instances")]
    NoDestinations { url: String },

    /// The wrapped service failed to prepare or run.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The topology rejected a destination or source slot.
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// Building or configuring a controller failed.
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// The forwarding controller stopped with an error.
    #[error("proxy forwarder failed: {source}")]
    Forwarder {
        #[source]
        source: ControllerError,
    },

    /// The forwarding thread panicked.
    #[error("proxy forwarder panicked")]
    Panicked,
}
