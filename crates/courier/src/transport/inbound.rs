use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use courier_config::Endpoint;
use tracing::{debug, info, warn};

use super::frame::{FrameRead, FrameReader};
use super::inproc::{self, Mailbox};
use super::{Delivery, Metadata, ReplySink, TRANSPORT_TARGET, TransportError};
use crate::message::{MAX_FRAME_SIZE, MessageError};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);
const READ_POLL: Duration = Duration::from_millis(200);

/// Receiving side of a controller.
///
/// Every bound endpoint delivers into the same queue, so messages from all
/// instances are served in arrival order by one consumer. A listener that
/// fails for good reports through a second queue and stops accepting.
#[derive(Debug)]
pub struct InboundSocket {
    receiver: mpsc::Receiver<Delivery>,
    failures: mpsc::Receiver<TransportError>,
    failure_sender: mpsc::Sender<TransportError>,
    bindings: Vec<Binding>,
    shutdown: Arc<AtomicBool>,
}

#[derive(Debug)]
enum Binding {
    Tcp {
        endpoint: Endpoint,
        local_addr: SocketAddr,
        accept: Option<thread::JoinHandle<()>>,
    },
    Inproc {
        name: String,
    },
}

impl InboundSocket {
    /// Binds every endpoint.
    ///
    /// On failure, endpoints bound so far are released before returning.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NoEndpoints`] for an empty list, otherwise the
    /// first bind failure.
    pub fn bind(endpoints: &[Endpoint]) -> Result<Self, TransportError> {
        if endpoints.is_empty() {
            return Err(TransportError::NoEndpoints);
        }
        let (sender, receiver) = mpsc::channel();
        let (failure_sender, failures) = mpsc::channel();
        let mut socket = Self {
            receiver,
            failures,
            failure_sender,
            bindings: Vec::with_capacity(endpoints.len()),
            shutdown: Arc::new(AtomicBool::new(false)),
        };
        for endpoint in endpoints {
            let binding = socket.bind_one(endpoint, &sender)?;
            socket.bindings.push(binding);
        }
        Ok(socket)
    }

    fn bind_one(
        &self,
        endpoint: &Endpoint,
        sender: &mpsc::Sender<Delivery>,
    ) -> Result<Binding, TransportError> {
        match endpoint {
            Endpoint::Inproc { name } => {
                inproc::register(
                    name,
                    Mailbox {
                        deliveries: sender.clone(),
                        failures: self.failure_sender.clone(),
                    },
                )?;
                Ok(Binding::Inproc { name: name.clone() })
            }
            Endpoint::Tcp { port, .. } => {
                let host = endpoint.socket_host().unwrap_or_default();
                let listener = bind_tcp(host, *port)?;
                let local_addr = listener
                    .local_addr()
                    .map_err(|source| TransportError::NonBlocking { source })?;
                listener
                    .set_nonblocking(true)
                    .map_err(|source| TransportError::NonBlocking { source })?;
                let shutdown = Arc::clone(&self.shutdown);
                let sender = sender.clone();
                let failures = self.failure_sender.clone();
                let accept_endpoint = endpoint.clone();
                let accept = thread::spawn(move || {
                    let outcome = run_accept_loop(&listener, &accept_endpoint, &shutdown, &sender);
                    if let Err(error) = outcome {
                        // The socket may already be closing; nobody is left to tell.
                        drop(failures.send(error));
                    }
                });
                Ok(Binding::Tcp {
                    endpoint: endpoint.clone(),
                    local_addr,
                    accept: Some(accept),
                })
            }
        }
    }

    /// Waits up to `timeout` for the next delivery.
    ///
    /// # Errors
    ///
    /// Returns the failure of a binding that stopped receiving, or
    /// [`TransportError::Closed`] once every binding has stopped.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<Delivery>, TransportError> {
        if let Ok(error) = self.failures.try_recv() {
            return Err(error);
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(delivery) => Ok(Some(delivery)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(TransportError::Closed),
        }
    }

    /// Takes every delivery already queued without waiting.
    pub fn drain(&self) -> Vec<Delivery> {
        self.receiver.try_iter().collect()
    }

    /// Local addresses of the TCP bindings, in bind order.
    #[must_use]
    pub fn local_addrs(&self) -> Vec<SocketAddr> {
        self.bindings
            .iter()
            .filter_map(|binding| match binding {
                Binding::Tcp { local_addr, .. } => Some(*local_addr),
                Binding::Inproc { .. } => None,
            })
            .collect()
    }

    /// Releases every binding. Safe to call more than once.
    pub fn close(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        for binding in &mut self.bindings {
            match binding {
                Binding::Tcp {
                    endpoint, accept, ..
                } => {
                    if let Some(handle) = accept.take()
                        && handle.join().is_err()
                    {
                        warn!(
                            target: TRANSPORT_TARGET,
                            endpoint = %endpoint,
                            "accept thread panicked"
                        );
                    }
                }
                Binding::Inproc { name } => inproc::unregister(name),
            }
        }
        self.bindings.clear();
    }
}

impl Drop for InboundSocket {
    fn drop(&mut self) {
        self.close();
    }
}

fn run_accept_loop(
    listener: &TcpListener,
    endpoint: &Endpoint,
    shutdown: &Arc<AtomicBool>,
    sender: &mpsc::Sender<Delivery>,
) -> Result<(), TransportError> {
    info!(
        target: TRANSPORT_TARGET,
        endpoint = %endpoint,
        "socket listener active"
    );
    let mut last_error = None::<io::ErrorKind>;
    while !shutdown.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                last_error = None;
                if let Err(error) = start_connection(stream, peer, shutdown, sender) {
                    warn!(
                        target: TRANSPORT_TARGET,
                        peer = %peer,
                        error = %error,
                        "failed to prepare connection"
                    );
                }
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_BACKOFF);
            }
            Err(error) if is_transient(&error) => {
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(
                        target: TRANSPORT_TARGET,
                        error = %error,
                        "socket accept error"
                    );
                }
                last_error = Some(kind);
                thread::sleep(ERROR_BACKOFF);
            }
            Err(error) => {
                warn!(
                    target: TRANSPORT_TARGET,
                    endpoint = %endpoint,
                    error = %error,
                    "socket listener failed"
                );
                return Err(TransportError::Accept {
                    endpoint: endpoint.to_string(),
                    source: error,
                });
            }
        }
    }
    Ok(())
}

/// Accept errors worth retrying: interruptions, peers that vanished before
/// the handshake finished, and descriptor or memory exhaustion.
fn is_transient(error: &io::Error) -> bool {
    use io::ErrorKind;

    matches!(
        error.kind(),
        ErrorKind::WouldBlock
            | ErrorKind::Interrupted
            | ErrorKind::ConnectionAborted
            | ErrorKind::ConnectionReset
            | ErrorKind::TimedOut
            | ErrorKind::OutOfMemory
    ) || is_resource_exhaustion(error)
}

#[cfg(unix)]
fn is_resource_exhaustion(error: &io::Error) -> bool {
    use nix::errno::Errno;

    error.raw_os_error().is_some_and(|code| {
        [Errno::EMFILE, Errno::ENFILE, Errno::ENOBUFS, Errno::ENOMEM]
            .into_iter()
            .any(|errno| errno as i32 == code)
    })
}

#[cfg(not(unix))]
fn is_resource_exhaustion(_error: &io::Error) -> bool {
    false
}

fn start_connection(
    stream: TcpStream,
    peer: SocketAddr,
    shutdown: &Arc<AtomicBool>,
    sender: &mpsc::Sender<Delivery>,
) -> io::Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(READ_POLL))?;
    let reader = stream.try_clone()?;
    let shutdown = Arc::clone(shutdown);
    let sender = sender.clone();
    thread::spawn(move || read_connection(reader, &stream, peer, &shutdown, &sender));
    Ok(())
}

fn read_connection(
    reader: TcpStream,
    writer: &TcpStream,
    peer: SocketAddr,
    shutdown: &AtomicBool,
    sender: &mpsc::Sender<Delivery>,
) {
    let mut frames = FrameReader::new(reader);
    while !shutdown.load(Ordering::SeqCst) {
        let frame = match frames.next_frame() {
            Ok(FrameRead::Frame(bytes)) => Ok(bytes),
            Ok(FrameRead::TooLarge(size)) => Err(MessageError::too_large(size, MAX_FRAME_SIZE)),
            Ok(FrameRead::Idle) => continue,
            Ok(FrameRead::Eof) => break,
            Err(error) => {
                debug!(
                    target: TRANSPORT_TARGET,
                    peer = %peer,
                    error = %error,
                    "connection read failed"
                );
                break;
            }
        };
        let reply = match writer.try_clone() {
            Ok(stream) => ReplySink::Tcp(stream),
            Err(error) => {
                warn!(
                    target: TRANSPORT_TARGET,
                    peer = %peer,
                    error = %error,
                    "failed to clone connection for reply"
                );
                ReplySink::Discard
            }
        };
        let delivery = Delivery {
            frame,
            metadata: Metadata {
                identity: peer.to_string(),
                pub_key: None,
            },
            reply,
        };
        if sender.send(delivery).is_err() {
            break;
        }
    }
}

fn bind_tcp(host: &str, port: u16) -> Result<TcpListener, TransportError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| TransportError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?;
    let addr = addrs
        .find(|addr| matches!(addr, SocketAddr::V4(_) | SocketAddr::V6(_)))
        .ok_or_else(|| TransportError::ResolveEmpty {
            host: host.to_owned(),
            port,
        })?;
    TcpListener::bind(addr).map_err(|source| TransportError::BindTcp { addr, source })
}
