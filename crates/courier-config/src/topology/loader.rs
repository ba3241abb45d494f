use std::fs;

use camino::Utf8Path;

use super::errors::TopologyError;
use super::service::ServiceConfig;

impl ServiceConfig {
    /// Parses a YAML topology and runs [`ServiceConfig::prepare_service`] on
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::Parse`] for malformed YAML and any validation
    /// error raised by the preparation passes.
    pub fn from_yaml_str(input: &str) -> Result<Self, TopologyError> {
        let mut config: Self =
            serde_saphyr::from_str(input).map_err(|error| TopologyError::Parse {
                message: error.to_string(),
            })?;
        config.prepare_service()?;
        Ok(config)
    }

    /// Reads and prepares the topology stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::Read`] when the file cannot be read, otherwise
    /// the errors of [`ServiceConfig::from_yaml_str`].
    pub fn load(path: &Utf8Path) -> Result<Self, TopologyError> {
        let input = fs::read_to_string(path).map_err(|source| TopologyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&input)
    }

    /// Renders the topology as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::Emit`] when serialisation fails.
    pub fn to_yaml(&self) -> Result<String, TopologyError> {
        serde_saphyr::to_string(self).map_err(|error| TopologyError::Emit {
            message: error.to_string(),
        })
    }
}
