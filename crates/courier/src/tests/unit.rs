//! Unit tests for bootstrap and process launch.

use std::sync::Arc;

use courier_config::{Config, DEFAULT_SERVICE_URL, ServiceType};
use rstest::rstest;

use super::support::{
    FailingConfigLoader, HealthEvent, RecordingHealthReporter, TopologyConfigLoader,
};
use crate::bootstrap::{BootstrapError, StaticConfigLoader, bootstrap_with};
use crate::controller::CloseHandle;
use crate::process::launch::run_daemon_with;
use crate::process::shutdown::{ShutdownError, ShutdownSignal, ShutdownWatch};
use crate::process::LaunchError;

const PROXY_TOPOLOGY: &str = "\
url: example.org/proxies/unit-gateway
type: proxy
controllers:
  - category: destination
    type: sync_replier
    instances:
      - id: unit.gateway.backend
        port: 0
";

/// Shutdown signal that fires before the service starts.
struct ImmediateShutdown;

impl ShutdownSignal for ImmediateShutdown {
    fn watch(&self, handles: Vec<CloseHandle>) -> Result<ShutdownWatch, ShutdownError> {
        handles.iter().for_each(CloseHandle::close);
        Ok(ShutdownWatch::inert())
    }
}

#[test]
fn bootstrap_without_topology_uses_default_proxy() {
    let reporter = Arc::new(RecordingHealthReporter::default());
    let loader = StaticConfigLoader::new(Config::default());
    let runtime = bootstrap_with(&loader, reporter.clone()).expect("bootstrap");

    assert_eq!(runtime.topology().url, DEFAULT_SERVICE_URL);
    assert_eq!(runtime.topology().service_type, ServiceType::Proxy);
    assert_eq!(
        reporter.events(),
        vec![HealthEvent::BootstrapStarting, HealthEvent::BootstrapSucceeded]
    );
}

#[test]
fn bootstrap_loads_the_topology_file() {
    let loader = TopologyConfigLoader::new(PROXY_TOPOLOGY);
    let runtime = bootstrap_with(&loader, Arc::new(RecordingHealthReporter::default()))
        .expect("bootstrap");

    let topology = runtime.topology();
    assert_eq!(topology.id, "unit-gateway");
    let destination = topology.get_controller("destination").expect("destination");
    assert_eq!(destination.instances[0].controller_category, "destination");
}

#[rstest]
#[case::missing_file(Box::new(TopologyConfigLoader::missing()), "topology")]
#[case::bad_flag(Box::new(FailingConfigLoader), "configuration")]
fn bootstrap_failures_are_reported(
    #[case] loader: Box<dyn crate::bootstrap::ConfigLoader>,
    #[case] stage: &str,
) {
    let reporter = Arc::new(RecordingHealthReporter::default());
    let error = bootstrap_with(&*loader, reporter.clone()).expect_err("bootstrap fails");
    assert!(error.to_string().contains(stage), "unexpected error: {error}");

    let events = reporter.events();
    assert!(
        events
            .iter()
            .any(|event| matches!(event, HealthEvent::BootstrapFailed(_))),
        "failure not reported: {events:?}"
    );
    assert!(!events.contains(&HealthEvent::BootstrapSucceeded));
}

#[test]
fn invalid_topology_is_a_topology_error() {
    let loader = TopologyConfigLoader::new("url: shop/orders\ntype: gateway\n");
    let error = bootstrap_with(&loader, Arc::new(RecordingHealthReporter::default()))
        .expect_err("unknown service type");
    assert!(matches!(error, BootstrapError::Topology { .. }));
}

#[test]
fn daemon_stops_when_shutdown_is_requested() {
    let loader = TopologyConfigLoader::new(PROXY_TOPOLOGY);
    let reporter = Arc::new(RecordingHealthReporter::default());
    run_daemon_with(&loader, reporter.clone(), &ImmediateShutdown).expect("clean shutdown");
    assert!(reporter.events().contains(&HealthEvent::BootstrapSucceeded));
}

#[test]
fn daemon_refuses_non_proxy_topologies() {
    let loader = TopologyConfigLoader::new("url: shop/orders\ntype: independent\n");
    let error = run_daemon_with(
        &loader,
        Arc::new(RecordingHealthReporter::default()),
        &ImmediateShutdown,
    )
    .expect_err("independent topology");
    assert!(matches!(error, LaunchError::Service { .. }));
}
