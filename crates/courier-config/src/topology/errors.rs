use camino::Utf8PathBuf;
use thiserror::Error;

use super::controller::ControllerType;

/// Errors raised while loading, validating, or querying a topology.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// The service type was missing or not recognised.
    #[error("service '{url}' has an unknown type")]
    UnknownServiceType { url: String },

    /// A controller type was missing or not recognised.
    #[error("controller '{category}' in service '{service}' has an unknown type")]
    UnknownControllerType { service: String, category: String },

    /// An instance names a different category than the controller holding it.
    #[error(
        "instance '{instance}' of controller '{controller}' in service '{service}' \
         declares category '{instance_category}', expected '{controller}'"
    )]
    ConflictingCategory {
        service: String,
        controller: String,
        instance: String,
        instance_category: String,
    },

    /// No controller with the requested category exists.
    #[error("controller '{category}' not found in service '{service}'")]
    ControllerNotFound { service: String, category: String },

    /// The service declares no controllers at all.
    #[error("service '{service}' has no controllers")]
    NoControllers { service: String },

    /// A controller exists under the category but has a different type.
    #[error(
        "controller '{category}' in service '{service}' is a {declared} controller, \
         but a {required} controller is required"
    )]
    ControllerTypeMismatch {
        service: String,
        category: String,
        declared: ControllerType,
        required: ControllerType,
    },

    /// A pipeline references something the topology does not declare.
    #[error("pipeline to '{destination}' in service '{service}' is invalid: {reason}")]
    InvalidPipeline {
        service: String,
        destination: String,
        reason: String,
    },

    /// The topology file could not be read.
    #[error("failed to read topology from {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The topology document could not be parsed.
    #[error("failed to parse topology: {message}")]
    Parse { message: String },

    /// The topology could not be rendered back to YAML.
    #[error("failed to render topology: {message}")]
    Emit { message: String },
}

impl TopologyError {
    pub(crate) fn controller_not_found(service: &str, category: &str) -> Self {
        Self::ControllerNotFound {
            service: service.to_owned(),
            category: category.to_owned(),
        }
    }

    pub(crate) fn invalid_pipeline(
        service: &str,
        destination: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidPipeline {
            service: service.to_owned(),
            destination: destination.to_owned(),
            reason: reason.into(),
        }
    }
}
