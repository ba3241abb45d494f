//! Supervises service launch sequencing and runtime orchestration.

use std::sync::Arc;

use courier_config::ControllerType;
use tracing::info;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::proxy::Proxy;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Runs the pass-through proxy described by the configured topology until a
/// termination signal arrives.
///
/// # Errors
///
/// Returns a [`LaunchError`] when bootstrap fails, the proxy cannot be
/// prepared, signal handlers cannot be installed, or a controller fails.
pub fn run_daemon() -> Result<(), LaunchError> {
    run_daemon_with(
        &SystemConfigLoader,
        Arc::new(StructuredHealthReporter::new()),
        &SystemShutdownSignal,
    )
}

/// Runs the service with injected collaborators.
pub(crate) fn run_daemon_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    shutdown: &dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    let runtime = bootstrap_with(loader, reporter)?;
    let reporter = runtime.reporter();
    let mut proxy = Proxy::new(runtime.into_topology()).with_reporter(reporter);
    proxy.require_destination(ControllerType::SyncReplier);
    proxy.set_default_source(ControllerType::SyncReplier)?;
    proxy.prepare()?;
    info!(
        target: PROCESS_TARGET,
        service = %proxy.service().config().url,
        destinations = proxy.destinations().len(),
        "starting service runtime"
    );

    let mut watch = shutdown.watch(proxy.close_handles())?;
    let outcome = proxy.run();
    watch.stop();
    outcome?;
    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed"
    );
    Ok(())
}
