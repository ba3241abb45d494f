use std::io;
use std::net::SocketAddr;

use thiserror::Error;

use crate::message::MessageError;

/// Errors raised by inbound sockets.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Host and port did not resolve.
    #[error("failed to resolve TCP address {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    /// Resolution succeeded without yielding an address.
    #[error("no TCP addresses resolved for {host}:{port}")]
    ResolveEmpty { host: String, port: u16 },
    /// The TCP listener could not bind.
    #[error("failed to bind TCP listener at {addr}: {source}")]
    BindTcp {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    /// The listener could not be switched to non-blocking mode.
    #[error("failed to enable non-blocking listener: {source}")]
    NonBlocking {
        #[source]
        source: io::Error,
    },
    /// Another socket already holds the in-process name.
    #[error("in-process endpoint '{name}' is already bound")]
    AddressInUse { name: String },
    /// `bind` was given nothing to bind.
    #[error("socket has no endpoints")]
    NoEndpoints,
    /// Every binding stopped delivering.
    #[error("every binding of the socket has stopped")]
    Closed,
    /// A listener failed for good and stopped accepting connections.
    #[error("listener at {endpoint} stopped accepting: {source}")]
    Accept {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    /// The reply could not be written back.
    #[error("failed to send reply: {source}")]
    Send {
        #[source]
        source: io::Error,
    },
}

/// Errors raised by [`super::ClientSocket`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The TCP connection could not be established.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    /// No controller is bound at the in-process endpoint.
    #[error("nothing is bound at {endpoint}")]
    NotBound { endpoint: String },
    /// Reading or writing the connection failed.
    #[error("connection to {endpoint} failed: {source}")]
    Io {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    /// The peer hung up before answering.
    #[error("{endpoint} closed the connection before replying")]
    Closed { endpoint: String },
    /// The answer was not a valid reply.
    #[error("invalid reply from {endpoint}: {source}")]
    Reply {
        endpoint: String,
        #[source]
        source: MessageError,
    },
    /// The request could not be encoded.
    #[error(transparent)]
    Message(#[from] MessageError),
}
