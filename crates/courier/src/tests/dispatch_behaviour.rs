//! Behavioural tests for request dispatch through a running controller.

use std::cell::RefCell;

use courier_config::{ControllerConfig, ControllerType, Endpoint, Instance};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::controller::Controller;
use crate::message::{Parameters, Reply, Request};
use crate::route::{Route, any_route};
use crate::transport::ClientSocket;

use super::support::{RunningController, free_port, request_when_ready};

#[derive(Default)]
struct DispatchWorld {
    port: u16,
    controller: Option<Controller>,
    running: Option<RunningController>,
    client: Option<ClientSocket>,
    reply: Option<Reply>,
}

impl DispatchWorld {
    fn send(&mut self, command: &str) {
        if let Some(controller) = self.controller.take() {
            self.running = Some(RunningController::start(controller));
        }
        let port = self.port;
        let client = self
            .client
            .get_or_insert_with(|| ClientSocket::new("bdd", Endpoint::tcp("127.0.0.1", port)));
        let reply = request_when_ready(client, &Request::new(command, Parameters::new()));
        self.reply = Some(reply);
    }

    fn reply(&self) -> &Reply {
        self.reply.as_ref().expect("no reply received")
    }
}

impl Drop for DispatchWorld {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.stop().ok();
        }
    }
}

#[fixture]
fn world() -> RefCell<DispatchWorld> {
    RefCell::new(DispatchWorld::default())
}

#[given("a sync replier answering ping on a free TCP port")]
fn given_replier(world: &RefCell<DispatchWorld>) {
    let port = free_port();
    let mut controller = Controller::sync_replier();
    controller
        .add_config(
            ControllerConfig::new("main", ControllerType::SyncReplier)
                .with_instance(Instance::new("main", port)),
            "example.org/bdd/dispatch",
        )
        .expect("config");
    controller
        .add_route(Route::new("ping", |request, _context| {
            request.ok(Parameters::new().with("pong", true))
        }))
        .expect("route");
    let mut world = world.borrow_mut();
    world.port = port;
    world.controller = Some(controller);
}

#[given("the replier echoes every other command")]
fn given_wildcard(world: &RefCell<DispatchWorld>) {
    world
        .borrow_mut()
        .controller
        .as_mut()
        .expect("controller configured")
        .add_route(any_route())
        .expect("wildcard route");
}

#[when("a client sends {command}")]
fn when_client_sends(world: &RefCell<DispatchWorld>, command: String) {
    world.borrow_mut().send(&command);
}

#[then("the reply is OK")]
fn then_reply_ok(world: &RefCell<DispatchWorld>) {
    let world = world.borrow();
    let reply = world.reply();
    assert!(reply.is_ok(), "unexpected failure: {:?}", reply.message());
}

#[then("the reply is FAIL mentioning \"{needle}\"")]
fn then_reply_fail(world: &RefCell<DispatchWorld>, needle: String) {
    let world = world.borrow();
    let reply = world.reply();
    assert!(!reply.is_ok(), "unexpected success");
    let message = reply.message().unwrap_or_default();
    assert!(message.contains(&needle), "'{message}' should mention {needle}");
}

#[then("the reply parameter pong is true")]
fn then_pong(world: &RefCell<DispatchWorld>) {
    let world = world.borrow();
    let parameters = world.reply().parameters().expect("parameters");
    assert!(parameters.get_bool("pong").expect("pong"));
}

#[then("the reply parameter command is {command}")]
fn then_command(world: &RefCell<DispatchWorld>, command: String) {
    let world = world.borrow();
    let parameters = world.reply().parameters().expect("parameters");
    assert_eq!(parameters.get_string("command").expect("command"), command);
}

#[scenario(
    path = "tests/features/controller_dispatch.feature",
    name = "A routed command is answered over TCP"
)]
fn routed_command(world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/controller_dispatch.feature",
    name = "An unknown command is rejected but serving continues"
)]
fn unknown_command(world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/controller_dispatch.feature",
    name = "The wildcard route catches unrouted commands"
)]
fn wildcard_command(world: RefCell<DispatchWorld>) {
    drop(world);
}
