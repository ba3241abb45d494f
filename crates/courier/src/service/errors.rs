use courier_config::{ServiceType, TopologyError};
use thiserror::Error;

use crate::controller::ControllerError;

/// Errors raised while preparing or running a service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The topology was rejected.
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// The topology declares another service type.
    #[error("service '{url}' is declared as {declared}, but is being run as {required}")]
    TypeMismatch {
        url: String,
        declared: ServiceType,
        required: ServiceType,
    },

    /// The service has no controllers to run.
    #[error("service '{url}' has no controllers")]
    NoControllers { url: String },

    /// An extension service must own exactly one controller.
    #[error("extension '{url}' must have exactly one controller, found {count}")]
    ControllerCount { url: String, count: usize },

    /// A controller could not be configured or failed while running.
    #[error("controller '{name}' failed: {source}")]
    Controller {
        name: String,
        #[source]
        source: ControllerError,
    },

    /// A controller thread panicked.
    #[error("controller '{name}' panicked")]
    Panicked { name: String },
}

impl ServiceError {
    pub(crate) fn controller(name: impl Into<String>, source: ControllerError) -> Self {
        Self::Controller {
            name: name.into(),
            source,
        }
    }
}
