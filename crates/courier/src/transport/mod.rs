//! Message sockets for controllers and extension clients.
//!
//! Controllers own an [`InboundSocket`]: every endpoint it binds, TCP or
//! in-process, feeds one queue of [`Delivery`] values that the controller
//! drains on its own thread. Clients talk to those endpoints through a
//! [`ClientSocket`], created and used on the thread that owns it.

mod client;
mod errors;
mod frame;
mod inbound;
mod inproc;

use std::io::Write;
use std::net::TcpStream;
use std::sync::mpsc;
use std::time::Duration;

pub use client::ClientSocket;
pub use errors::{ClientError, TransportError};
pub use inbound::InboundSocket;
#[cfg(test)]
pub(crate) use inproc::fail as fail_inproc;

use crate::message::MessageError;

const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");

/// Timeout applied when establishing TCP connections.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Out-of-band information about the sender of a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Peer address for TCP callers, client name for in-process callers.
    pub identity: String,
    /// Public key presented by the caller, if any.
    pub pub_key: Option<String>,
}

/// One inbound message together with the way back to its sender.
#[derive(Debug)]
pub struct Delivery {
    /// Raw frame, or the framing error raised while reading it.
    pub frame: Result<Vec<u8>, MessageError>,
    /// Identity of the sender.
    pub metadata: Metadata,
    /// Way back to the sender.
    pub reply: ReplySink,
}

/// Destination of the reply to a [`Delivery`].
#[derive(Debug)]
pub enum ReplySink {
    /// Write to the TCP connection the request arrived on.
    Tcp(TcpStream),
    /// Hand the frame to a waiting in-process client.
    Channel(mpsc::Sender<Vec<u8>>),
    /// The sender expects no reply.
    Discard,
}

impl ReplySink {
    /// Sends one encoded reply frame.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Send`] when the peer has gone away.
    pub fn send(self, frame: &[u8]) -> Result<(), TransportError> {
        match self {
            Self::Tcp(mut stream) => stream
                .write_all(frame)
                .and_then(|()| stream.flush())
                .map_err(|source| TransportError::Send { source }),
            Self::Channel(sender) => sender.send(frame.to_vec()).map_err(|_| TransportError::Send {
                source: std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "in-process client went away",
                ),
            }),
            Self::Discard => Ok(()),
        }
    }
}
