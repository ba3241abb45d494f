use courier_config::{
    ControllerConfig, ControllerType, DESTINATION_NAME, Instance, SOURCE_NAME, ServiceConfig,
    ServiceType,
};
use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn topology() -> ServiceConfig {
    let mut config = ServiceConfig::new(ServiceType::Proxy, "example.org/proxies/doubler");
    config.set_controller(
        ControllerConfig::new(DESTINATION_NAME, ControllerType::SyncReplier)
            .with_instance(Instance::new("calculator", 4410).with_host("10.0.0.7"))
            .with_instance(Instance::new("calculator.inproc", 0)),
    );
    config
}

#[test]
fn prepare_requires_a_destination() {
    let mut proxy = Proxy::new(ServiceConfig::new(ServiceType::Proxy, "proxy.tests.bare"));
    assert!(matches!(proxy.prepare(), Err(ProxyError::MissingDestination)));
    assert!(proxy.destinations().is_empty());
}

#[rstest]
fn prepare_registers_destination_instances(topology: ServiceConfig) {
    let mut proxy = Proxy::new(topology);
    proxy.require_destination(ControllerType::SyncReplier);
    proxy.prepare().expect("prepare proxy");

    let destinations: Vec<(&str, &str, u16)> = proxy
        .destinations()
        .iter()
        .map(|destination| {
            (
                destination.url.as_str(),
                destination.host.as_str(),
                destination.port,
            )
        })
        .collect();
    assert_eq!(
        destinations,
        vec![
            ("calculator", "10.0.0.7", 4410),
            ("calculator.inproc", "localhost", 0),
        ]
    );
}

#[rstest]
fn prepare_rejects_destination_of_another_type(topology: ServiceConfig) {
    let mut proxy = Proxy::new(topology);
    proxy.require_destination(ControllerType::Puller);
    let error = proxy.prepare().expect_err("type mismatch");
    assert!(matches!(error, ProxyError::Service(_)));
}

#[test]
fn prepare_rejects_other_service_types() {
    let mut proxy = Proxy::new(ServiceConfig::new(
        ServiceType::Independent,
        "proxy.tests.independent",
    ));
    proxy.require_destination(ControllerType::SyncReplier);
    assert!(matches!(proxy.prepare(), Err(ProxyError::Service(_))));
}

#[test]
fn missing_destination_slot_becomes_in_process() {
    let mut proxy = Proxy::new(ServiceConfig::new(ServiceType::Proxy, "proxy.tests.implicit"));
    proxy.require_destination(ControllerType::SyncReplier);
    proxy.prepare().expect("prepare proxy");

    let destinations = proxy.destinations();
    assert_eq!(destinations.len(), 1);
    assert_eq!(destinations[0].port, 0);
    assert_eq!(destinations[0].url, "proxy.tests.implicit.destination.0");
}

#[rstest]
fn internal_name_is_scoped_to_the_service(topology: ServiceConfig) {
    let proxy = Proxy::new(topology);
    assert_eq!(proxy.internal_name(), "doubler.proxy_controller");
}

#[rstest]
fn run_before_prepare_is_rejected(topology: ServiceConfig) {
    let mut proxy = Proxy::new(topology);
    proxy
        .set_default_source(ControllerType::SyncReplier)
        .expect("source");
    assert!(matches!(proxy.run(), Err(ProxyError::NotPrepared)));
}

#[rstest]
fn run_without_source_is_rejected(topology: ServiceConfig) {
    let mut proxy = Proxy::new(topology);
    proxy.require_destination(ControllerType::SyncReplier);
    proxy.prepare().expect("prepare proxy");
    assert!(matches!(proxy.run(), Err(ProxyError::MissingSource)));
}

#[test]
fn router_sources_are_unsupported() {
    let mut proxy = Proxy::new(ServiceConfig::new(ServiceType::Proxy, "proxy.tests.router"));
    assert!(matches!(
        proxy.set_default_source(ControllerType::Router),
        Err(ProxyError::Controller(_))
    ));
    assert!(proxy.source_mut().is_none());
    assert_eq!(proxy.service().controller_count(), 0);
    assert!(proxy.service().controller(SOURCE_NAME).is_none());
}
