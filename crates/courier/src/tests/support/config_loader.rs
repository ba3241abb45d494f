//! Configuration loaders for bootstrap scenarios.

use std::ffi::OsString;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;

use courier_config::Config;

use crate::bootstrap::ConfigLoader;

/// Loader pointing at a topology file written to a temporary directory.
pub struct TopologyConfigLoader {
    _dir: TempDir,
    path: Utf8PathBuf,
}

impl TopologyConfigLoader {
    /// Writes `yaml` as the topology file.
    #[must_use]
    pub fn new(yaml: &str) -> Self {
        let dir = TempDir::new().expect("failed to create temporary directory for topology");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("topology.yaml"))
            .expect("temporary topology path was not valid UTF-8");
        std::fs::write(&path, yaml).expect("failed to write topology");
        Self { _dir: dir, path }
    }

    /// Loader whose topology file does not exist.
    #[must_use]
    pub fn missing() -> Self {
        let dir = TempDir::new().expect("failed to create temporary directory for topology");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("absent.yaml"))
            .expect("temporary topology path was not valid UTF-8");
        Self { _dir: dir, path }
    }
}

impl ConfigLoader for TopologyConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            topology_path: Some(self.path.clone()),
            ..Config::default()
        })
    }
}

/// Loader that intentionally fails by passing an unknown CLI flag.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("courierd"),
            OsString::from("--no-such-flag"),
            OsString::from("value"),
        ];
        Config::load_from_iter(args)
    }
}
