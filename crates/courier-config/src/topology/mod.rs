//! Declarative description of a service and the passes that make it usable.
//!
//! A topology is parsed once at process start, validated and linted by
//! [`ServiceConfig::prepare_service`], adjusted programmatically while the
//! service is assembled (`set_controller`, `set_extension`, `set_proxy`), and
//! left untouched once controllers start running.

mod controller;
mod errors;
mod extension;
mod loader;
mod pipeline;
mod service;

pub use controller::{ControllerConfig, ControllerType, DESTINATION_NAME, Instance, SOURCE_NAME};
pub use errors::TopologyError;
pub use extension::{ExtensionConfig, ProxyConfig};
pub use pipeline::Pipeline;
pub use service::{ServiceConfig, ServiceType};
