//! Shared harness for controller, service, and proxy tests.

mod config_loader;
mod network;
mod reporter;
mod running;

pub use config_loader::{FailingConfigLoader, TopologyConfigLoader};
pub use network::{free_port, request_when_ready};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use running::{RunningController, RunningProxy};
