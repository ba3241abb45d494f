//! Helpers for talking to controllers that are still starting.

use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use crate::message::{Reply, Request};
use crate::transport::{ClientError, ClientSocket};

const READY_ATTEMPTS: usize = 200;
const READY_DELAY: Duration = Duration::from_millis(10);

/// Picks a TCP port nothing is listening on.
#[must_use]
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local address").port()
}

/// Sends `request`, retrying while the endpoint is not yet bound.
pub fn request_when_ready(client: &mut ClientSocket, request: &Request) -> Reply {
    for _ in 0..READY_ATTEMPTS {
        match client.request(request) {
            Ok(reply) => return reply,
            Err(ClientError::NotBound { .. } | ClientError::Connect { .. }) => {
                thread::sleep(READY_DELAY);
            }
            Err(error) => panic!("request failed: {error}"),
        }
    }
    panic!("{} never became ready", client.endpoint());
}
