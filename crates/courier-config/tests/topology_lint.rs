use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use courier_config::{ServiceConfig, TopologyError};

#[derive(Default)]
struct TopologyWorld {
    config: Option<ServiceConfig>,
    outcome: Option<Result<(), String>>,
}

impl TopologyWorld {
    fn parse(&mut self, yaml: &str) {
        // Parse without preparing so the preparation step can be observed.
        match serde_saphyr::from_str::<ServiceConfig>(yaml) {
            Ok(config) => self.config = Some(config),
            Err(error) => panic!("invalid test topology: {error}"),
        }
    }

    fn error(&self) -> String {
        match &self.outcome {
            Some(Err(message)) => message.clone(),
            other => panic!("expected a preparation failure, got {other:?}"),
        }
    }
}

#[fixture]
fn world() -> RefCell<TopologyWorld> {
    RefCell::new(TopologyWorld::default())
}

#[given("a topology with controller \"{category}\" whose instance has no category")]
fn given_plain_instance(world: &RefCell<TopologyWorld>, category: String) {
    world.borrow_mut().parse(&format!(
        "url: shop/orders\ntype: independent\ncontrollers:\n  - category: {category}\n    type: sync_replier\n    instances:\n      - port: 4100\n"
    ));
}

#[given(
    "a topology with controller \"{category}\" whose instance declares category \"{declared}\""
)]
fn given_conflicting_instance(world: &RefCell<TopologyWorld>, category: String, declared: String) {
    world.borrow_mut().parse(&format!(
        "url: shop/orders\ntype: independent\ncontrollers:\n  - category: {category}\n    type: sync_replier\n    instances:\n      - controller_category: {declared}\n        port: 4100\n"
    ));
}

#[given("a topology with a controller of type \"{kind}\"")]
fn given_unknown_type(world: &RefCell<TopologyWorld>, kind: String) {
    world.borrow_mut().parse(&format!(
        "url: shop/orders\ntype: independent\ncontrollers:\n  - category: main\n    type: {kind}\n"
    ));
}

#[when("the topology is prepared")]
fn when_prepared(world: &RefCell<TopologyWorld>) {
    let mut world = world.borrow_mut();
    let outcome = match world.config.as_mut() {
        Some(config) => config
            .prepare_service()
            .map_err(|error: TopologyError| error.to_string()),
        None => panic!("no topology was given"),
    };
    world.outcome = Some(outcome);
}

#[then("preparation succeeds")]
fn then_succeeds(world: &RefCell<TopologyWorld>) {
    let world = world.borrow();
    assert!(
        matches!(world.outcome, Some(Ok(()))),
        "expected success, got {:?}",
        world.outcome
    );
}

#[then("every instance of \"{category}\" carries category \"{expected}\"")]
fn then_instances_carry(world: &RefCell<TopologyWorld>, category: String, expected: String) {
    let world = world.borrow();
    let Some(config) = world.config.as_ref() else {
        panic!("no topology was given");
    };
    let controller = config.get_controller(&category).expect("controller");
    assert!(
        controller
            .instances
            .iter()
            .all(|instance| instance.controller_category == expected)
    );
}

#[then("preparation fails mentioning \"{needle}\"")]
fn then_fails_mentioning(world: &RefCell<TopologyWorld>, needle: String) {
    let message = world.borrow().error();
    assert!(message.contains(&needle), "'{message}' should mention {needle}");
}

#[then("the failure mentions \"{needle}\"")]
fn then_failure_mentions(world: &RefCell<TopologyWorld>, needle: String) {
    let message = world.borrow().error();
    assert!(message.contains(&needle), "'{message}' should mention {needle}");
}

#[scenario(
    path = "tests/features/topology_lint.feature",
    name = "Instances inherit their controller's category"
)]
fn instances_inherit_category(#[from(world)] world: RefCell<TopologyWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/topology_lint.feature",
    name = "Conflicting instance categories are rejected"
)]
fn conflicting_categories_rejected(#[from(world)] world: RefCell<TopologyWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/topology_lint.feature",
    name = "Unknown controller types are rejected"
)]
fn unknown_controller_types_rejected(#[from(world)] world: RefCell<TopologyWorld>) {
    drop(world);
}
