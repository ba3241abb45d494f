use std::io::{self, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::mpsc;

use courier_config::Endpoint;
use tracing::debug;

use super::frame::{FrameRead, FrameReader};
use super::{
    CONNECTION_TIMEOUT, ClientError, Delivery, Metadata, ReplySink, TRANSPORT_TARGET, inproc,
};
use crate::message::{MAX_FRAME_SIZE, MessageError, Reply, Request};

/// Outbound socket to one controller.
///
/// The connection is opened on first use. An I/O failure drops it, and the
/// next call connects again; nothing is retried within a call.
#[derive(Debug)]
pub struct ClientSocket {
    name: String,
    endpoint: Endpoint,
    public_key: Option<String>,
    connection: Option<Connection>,
}

#[derive(Debug)]
enum Connection {
    Tcp {
        writer: TcpStream,
        reader: FrameReader<TcpStream>,
    },
    Inproc(mpsc::Sender<Delivery>),
}

impl ClientSocket {
    /// Builds a client called `name` for `endpoint` without connecting.
    #[must_use]
    pub fn new(name: impl Into<String>, endpoint: Endpoint) -> Self {
        Self {
            name: name.into(),
            endpoint,
            public_key: None,
            connection: None,
        }
    }

    /// Public key presented to in-process controllers.
    #[must_use]
    pub fn with_public_key(mut self, key: impl Into<String>) -> Self {
        self.public_key = Some(key.into());
        self
    }

    /// Identity presented to the remote controller.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Endpoint this client connects to.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Sends `request` and waits for the reply.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when connecting, sending, or reading the
    /// reply fails.
    pub fn request(&mut self, request: &Request) -> Result<Reply, ClientError> {
        let line = request.to_line()?;
        let result = self.exchange(request, &line);
        if matches!(
            result,
            Err(ClientError::Io { .. } | ClientError::Closed { .. } | ClientError::NotBound { .. })
        ) {
            self.connection = None;
        }
        result
    }

    /// Sends `request` without waiting for a reply.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when connecting or sending fails.
    pub fn push(&mut self, request: &Request) -> Result<(), ClientError> {
        let line = request.to_line()?;
        let metadata = self.metadata(request);
        let endpoint = self.endpoint.to_string();
        let result = match self.connect()? {
            Connection::Tcp { writer, .. } => write_frame(writer, &line, &endpoint),
            Connection::Inproc(sender) => {
                deliver(sender, line, metadata, ReplySink::Discard, &endpoint)
            }
        };
        if result.is_err() {
            self.connection = None;
        }
        result
    }

    /// Drops the connection. The next call reconnects.
    pub fn close(&mut self) {
        self.connection = None;
    }

    fn exchange(&mut self, request: &Request, line: &[u8]) -> Result<Reply, ClientError> {
        let metadata = self.metadata(request);
        let endpoint = self.endpoint.to_string();
        match self.connect()? {
            Connection::Tcp { writer, reader } => {
                write_frame(writer, line, &endpoint)?;
                read_reply(reader, &endpoint)
            }
            Connection::Inproc(sender) => {
                let (reply_sender, reply_receiver) = mpsc::channel();
                deliver(
                    sender,
                    line.to_vec(),
                    metadata,
                    ReplySink::Channel(reply_sender),
                    &endpoint,
                )?;
                let frame = reply_receiver
                    .recv()
                    .map_err(|_| ClientError::Closed {
                        endpoint: endpoint.clone(),
                    })?;
                Reply::parse(&frame).map_err(|source| ClientError::Reply { endpoint, source })
            }
        }
    }

    fn metadata(&self, request: &Request) -> Metadata {
        Metadata {
            identity: self.name.clone(),
            pub_key: request
                .public_key()
                .map(str::to_owned)
                .or_else(|| self.public_key.clone()),
        }
    }

    fn connect(&mut self) -> Result<&mut Connection, ClientError> {
        if self.connection.is_none() {
            let connection = open(&self.endpoint)?;
            debug!(
                target: TRANSPORT_TARGET,
                client = %self.name,
                endpoint = %self.endpoint,
                "client connected"
            );
            self.connection = Some(connection);
        }
        self.connection.as_mut().ok_or_else(|| ClientError::NotBound {
            endpoint: self.endpoint.to_string(),
        })
    }
}

fn open(endpoint: &Endpoint) -> Result<Connection, ClientError> {
    match endpoint {
        Endpoint::Inproc { name } => inproc::lookup(name)
            .map(Connection::Inproc)
            .ok_or_else(|| ClientError::NotBound {
                endpoint: endpoint.to_string(),
            }),
        Endpoint::Tcp { host, port } => {
            let display = endpoint.to_string();
            let address = resolve_tcp_address(host, *port).map_err(|source| {
                ClientError::Connect {
                    endpoint: display.clone(),
                    source,
                }
            })?;
            let connect_error = |source| ClientError::Connect {
                endpoint: display.clone(),
                source,
            };
            let writer = TcpStream::connect_timeout(&address, CONNECTION_TIMEOUT)
                .map_err(connect_error)?;
            let reader = writer.try_clone().map_err(connect_error)?;
            Ok(Connection::Tcp {
                writer,
                reader: FrameReader::new(reader),
            })
        }
    }
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    let mut addrs = (host, port).to_socket_addrs()?;
    addrs
        .find(|addr| matches!(addr, SocketAddr::V4(_) | SocketAddr::V6(_)))
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}

fn write_frame(writer: &mut TcpStream, line: &[u8], endpoint: &str) -> Result<(), ClientError> {
    writer
        .write_all(line)
        .and_then(|()| writer.flush())
        .map_err(|source| ClientError::Io {
            endpoint: endpoint.to_owned(),
            source,
        })
}

fn read_reply(reader: &mut FrameReader<TcpStream>, endpoint: &str) -> Result<Reply, ClientError> {
    let frame = loop {
        match reader.next_frame() {
            Ok(FrameRead::Frame(frame)) => break frame,
            Ok(FrameRead::Idle) => {}
            Ok(FrameRead::TooLarge(size)) => {
                return Err(ClientError::Reply {
                    endpoint: endpoint.to_owned(),
                    source: MessageError::too_large(size, MAX_FRAME_SIZE),
                });
            }
            Ok(FrameRead::Eof) => {
                return Err(ClientError::Closed {
                    endpoint: endpoint.to_owned(),
                });
            }
            Err(source) => {
                return Err(ClientError::Io {
                    endpoint: endpoint.to_owned(),
                    source,
                });
            }
        }
    };
    Reply::parse(&frame).map_err(|source| ClientError::Reply {
        endpoint: endpoint.to_owned(),
        source,
    })
}

fn deliver(
    sender: &mpsc::Sender<Delivery>,
    frame: Vec<u8>,
    metadata: Metadata,
    reply: ReplySink,
    endpoint: &str,
) -> Result<(), ClientError> {
    sender
        .send(Delivery {
            frame: Ok(frame),
            metadata,
            reply,
        })
        .map_err(|_| ClientError::NotBound {
            endpoint: endpoint.to_owned(),
        })
}
