use serde::{Deserialize, Serialize};
use strum::Display;

use super::controller::{ControllerConfig, ControllerType, Instance};
use super::errors::TopologyError;
use super::extension::{ExtensionConfig, ProxyConfig};
use super::pipeline::Pipeline;

/// Role the whole service plays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ServiceType {
    /// Stand-alone service with its own controllers.
    Independent,
    /// Service other controllers depend on.
    Extension,
    /// Forwarding stage placed in front of a destination.
    Proxy,
    /// Any value the loader did not recognise.
    #[default]
    #[serde(other)]
    Unknown,
}

/// Aggregate description of one service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Short identity. Derived from `url` by [`ServiceConfig::lint`] when blank.
    #[serde(default)]
    pub id: String,
    /// Full identity of the service.
    pub url: String,
    /// Role of the service.
    #[serde(rename = "type", default)]
    pub service_type: ServiceType,
    /// Controllers in declaration order. Categories may repeat.
    #[serde(default)]
    pub controllers: Vec<ControllerConfig>,
    /// Extensions the service's controllers may depend on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionConfig>,
    /// Proxies declared in front of the service.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proxies: Vec<ProxyConfig>,
    /// Proxy chains ending at a destination.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pipelines: Vec<Pipeline>,
}

impl ServiceConfig {
    /// Builds an empty topology for `url`, deriving the id from its last path
    /// segment.
    #[must_use]
    pub fn new(service_type: ServiceType, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id: id_from_url(&url),
            url,
            service_type,
            ..Self::default()
        }
    }

    /// Validates types, lints derived fields, and checks pipelines.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`ServiceConfig::validate_types`],
    /// [`ServiceConfig::lint`], or [`ServiceConfig::validate_pipelines`].
    pub fn prepare_service(&mut self) -> Result<(), TopologyError> {
        self.validate_types()?;
        self.lint()?;
        self.validate_pipelines()
    }

    /// Rejects unknown service or controller types.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::UnknownServiceType`] or
    /// [`TopologyError::UnknownControllerType`].
    pub fn validate_types(&self) -> Result<(), TopologyError> {
        if self.service_type == ServiceType::Unknown {
            return Err(TopologyError::UnknownServiceType {
                url: self.url.clone(),
            });
        }
        if let Some(controller) = self
            .controllers
            .iter()
            .find(|controller| controller.controller_type == ControllerType::Unknown)
        {
            return Err(TopologyError::UnknownControllerType {
                service: self.service_id(),
                category: controller.category.clone(),
            });
        }
        Ok(())
    }

    /// Fills derived fields.
    ///
    /// Derives a blank service id from the url, copies each controller's
    /// category onto its instances, and names anonymous instances.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::ConflictingCategory`] when an instance already
    /// carries a category other than its controller's.
    pub fn lint(&mut self) -> Result<(), TopologyError> {
        if self.id.is_empty() {
            self.id = id_from_url(&self.url);
        }
        for controller in &mut self.controllers {
            for (index, instance) in controller.instances.iter_mut().enumerate() {
                if instance.controller_category.is_empty() {
                    instance.controller_category.clone_from(&controller.category);
                } else if instance.controller_category != controller.category {
                    return Err(TopologyError::ConflictingCategory {
                        service: self.id.clone(),
                        controller: controller.category.clone(),
                        instance: instance.id.clone(),
                        instance_category: instance.controller_category.clone(),
                    });
                }
                if instance.id.is_empty() {
                    instance.id = instance_id(&self.id, &controller.category, index);
                }
            }
        }
        Ok(())
    }

    /// Checks that every pipeline has a destination and only names declared
    /// proxies.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvalidPipeline`].
    pub fn validate_pipelines(&self) -> Result<(), TopologyError> {
        for pipeline in &self.pipelines {
            if pipeline.destination.is_empty() {
                return Err(TopologyError::invalid_pipeline(
                    &self.id,
                    &pipeline.destination,
                    "destination is empty",
                ));
            }
            if let Some(missing) = pipeline
                .proxies
                .iter()
                .find(|url| !self.has_proxy(url))
            {
                return Err(TopologyError::invalid_pipeline(
                    &self.id,
                    &pipeline.destination,
                    format!("proxy '{missing}' is not declared"),
                ));
            }
        }
        Ok(())
    }

    /// Returns the first controller with `category`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::ControllerNotFound`] when none matches.
    pub fn get_controller(&self, category: &str) -> Result<&ControllerConfig, TopologyError> {
        self.controllers
            .iter()
            .find(|controller| controller.category == category)
            .ok_or_else(|| TopologyError::controller_not_found(&self.id, category))
    }

    /// Returns every controller with `category`, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::ControllerNotFound`] when none matches.
    pub fn get_controllers(&self, category: &str) -> Result<Vec<&ControllerConfig>, TopologyError> {
        let mut found = Vec::new();
        for controller in &self.controllers {
            if controller.category == category {
                found.push(controller);
            }
        }
        if found.is_empty() {
            return Err(TopologyError::controller_not_found(&self.id, category));
        }
        Ok(found)
    }

    /// Returns the first declared controller.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::NoControllers`] when the list is empty.
    pub fn get_first_controller(&self) -> Result<&ControllerConfig, TopologyError> {
        self.controllers
            .first()
            .ok_or_else(|| TopologyError::NoControllers {
                service: self.id.clone(),
            })
    }

    /// Looks up an extension by url.
    #[must_use]
    pub fn get_extension(&self, url: &str) -> Option<&ExtensionConfig> {
        self.extensions.iter().find(|extension| extension.url == url)
    }

    /// Looks up a proxy by url.
    #[must_use]
    pub fn get_proxy(&self, url: &str) -> Option<&ProxyConfig> {
        self.proxies.iter().find(|proxy| proxy.url == url)
    }

    /// Returns `true` when a proxy with `url` is declared.
    #[must_use]
    pub fn has_proxy(&self, url: &str) -> bool {
        self.get_proxy(url).is_some()
    }

    /// Inserts `proxy`, replacing a declaration with the same url in place.
    pub fn set_proxy(&mut self, proxy: ProxyConfig) {
        match self.proxies.iter_mut().find(|existing| existing.url == proxy.url) {
            Some(existing) => *existing = proxy,
            None => self.proxies.push(proxy),
        }
    }

    /// Inserts `extension`, replacing a declaration with the same url in
    /// place.
    pub fn set_extension(&mut self, extension: ExtensionConfig) {
        match self
            .extensions
            .iter_mut()
            .find(|existing| existing.url == extension.url)
        {
            Some(existing) => *existing = extension,
            None => self.extensions.push(extension),
        }
    }

    /// Appends `controller`. Repeated categories are kept.
    pub fn set_controller(&mut self, controller: ControllerConfig) {
        self.controllers.push(controller);
    }

    /// Inserts `pipeline`, replacing one with the same destination and head.
    pub fn set_pipeline(&mut self, pipeline: Pipeline) {
        match self.pipelines.iter_mut().find(|existing| {
            existing.destination == pipeline.destination && existing.head() == pipeline.head()
        }) {
            Some(existing) => *existing = pipeline,
            None => self.pipelines.push(pipeline),
        }
    }

    /// Ensures a controller slot for `category` exists with `controller_type`.
    ///
    /// An absent slot is created with one in-process instance.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::ControllerTypeMismatch`] when the category is
    /// already declared with another type.
    pub fn prepare_controller_config(
        &mut self,
        category: &str,
        controller_type: ControllerType,
    ) -> Result<&ControllerConfig, TopologyError> {
        let declared = self
            .controllers
            .iter()
            .find(|controller| controller.category == category)
            .map(|controller| controller.controller_type);
        match declared {
            Some(declared) if declared != controller_type => {
                return Err(TopologyError::ControllerTypeMismatch {
                    service: self.id.clone(),
                    category: category.to_owned(),
                    declared,
                    required: controller_type,
                });
            }
            Some(_) => {}
            None => {
                let mut instance = Instance::new(instance_id(&self.id, category, 0), 0);
                instance.controller_category = category.to_owned();
                self.set_controller(
                    ControllerConfig::new(category, controller_type).with_instance(instance),
                );
            }
        }
        self.get_controller(category)
    }

    /// Id used in messages, derived from the url until `lint` has filled it.
    fn service_id(&self) -> String {
        if self.id.is_empty() {
            id_from_url(&self.url)
        } else {
            self.id.clone()
        }
    }
}

fn id_from_url(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_owned()
}

fn instance_id(service: &str, category: &str, index: usize) -> String {
    format!("{service}.{category}.{index}")
}
