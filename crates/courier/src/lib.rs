//! Message-socket microservice framework.
//!
//! A service is a topology (see [`courier_config::ServiceConfig`]) plus one
//! [`Controller`] per controller category. Each controller binds its
//! instances, reads newline-delimited JSON requests, and dispatches them
//! through its [`RouteTable`] to handlers. Handlers reach other services
//! through the controller's extension clients.
//!
//! Three service shapes are provided. A plain [`Service`] runs any number of
//! controllers side by side. An [`Extension`] is a service with exactly one
//! controller that other services depend on. A [`Proxy`] exposes a source
//! controller and forwards whatever it does not answer itself to the
//! destination instances named in its topology.
//!
//! Transport is TCP for instances with a port and an in-process channel for
//! instances with port zero. Controllers answer malformed and unroutable
//! requests with a failure reply and keep serving; only bind and receive
//! failures stop them.

mod bootstrap;
pub mod controller;
pub mod extension;
mod health;
pub mod message;
mod process;
pub mod proxy;
pub mod route;
pub mod service;
mod telemetry;
pub mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Runtime, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use controller::{CloseHandle, Controller, ControllerError};
pub use extension::{ExtensionClients, ExtensionError};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use message::{MessageError, Parameters, Reply, ReplyStatus, Request};
pub use process::{LaunchError, ShutdownError, run_daemon};
pub use proxy::{Proxy, ProxyError};
pub use route::{Command, HandlerContext, Route, RouteError, RouteTable, any_route};
pub use service::{Extension, Service, ServiceError};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
