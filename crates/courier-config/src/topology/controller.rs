use serde::{Deserialize, Serialize};
use strum::Display;

use crate::defaults::default_connect_host;
use crate::endpoint::Endpoint;

/// Category of the controller that receives public traffic for a proxy.
pub const SOURCE_NAME: &str = "source";

/// Category of the controller slot a proxy forwards to.
pub const DESTINATION_NAME: &str = "destination";

/// Socket discipline of a controller, fixed when the controller is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ControllerType {
    /// One request in, exactly one reply out.
    SyncReplier,
    /// One request in, no reply sent.
    Puller,
    /// Asynchronous router. Declared in topologies but not yet runnable.
    Router,
    /// Any value the loader did not recognise.
    #[default]
    #[serde(other)]
    Unknown,
}

impl ControllerType {
    /// Returns `true` when callers of this controller expect a reply.
    #[must_use]
    pub fn replies(self) -> bool {
        matches!(self, Self::SyncReplier | Self::Router)
    }
}

/// One bound copy of a controller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Instance {
    /// Category of the owning controller, filled in by the lint pass.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub controller_category: String,
    /// Instance identity; also the in-process address when `port` is zero.
    #[serde(default)]
    pub id: String,
    /// Host clients use to reach the instance.
    #[serde(default = "default_connect_host")]
    pub host: String,
    /// TCP port, or zero for an in-process instance.
    #[serde(default)]
    pub port: u16,
}

impl Instance {
    /// Builds an instance reachable on `localhost`.
    #[must_use]
    pub fn new(id: impl Into<String>, port: u16) -> Self {
        Self {
            controller_category: String::new(),
            id: id.into(),
            host: default_connect_host(),
            port,
        }
    }

    /// Overrides the host clients connect to.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Address a client uses to reach this instance.
    #[must_use]
    pub fn connect_endpoint(&self) -> Endpoint {
        Endpoint::connect(&self.id, &self.host, self.port)
    }
}

/// A logical controller role and the instances bound for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ControllerConfig {
    /// Role of the controller within its service, e.g. `main` or `source`.
    pub category: String,
    /// Socket discipline.
    #[serde(rename = "type", default)]
    pub controller_type: ControllerType,
    /// Bound instances.
    #[serde(default)]
    pub instances: Vec<Instance>,
}

impl ControllerConfig {
    /// Builds a controller configuration without instances.
    #[must_use]
    pub fn new(category: impl Into<String>, controller_type: ControllerType) -> Self {
        Self {
            category: category.into(),
            controller_type,
            instances: Vec::new(),
        }
    }

    /// Appends an instance.
    #[must_use]
    pub fn with_instance(mut self, instance: Instance) -> Self {
        self.instances.push(instance);
        self
    }

    /// Addresses the controller binds, one per instance.
    ///
    /// In-process instances are keyed by instance id, or by the category when
    /// the id is blank.
    #[must_use]
    pub fn bind_endpoints(&self) -> Vec<Endpoint> {
        self.instances
            .iter()
            .map(|instance| {
                let name = if instance.id.is_empty() {
                    self.category.as_str()
                } else {
                    instance.id.as_str()
                };
                Endpoint::bind(name, instance.port)
            })
            .collect()
    }
}
