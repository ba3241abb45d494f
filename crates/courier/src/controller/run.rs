use std::time::Duration;

use courier_config::Endpoint;
use tracing::{Span, debug, debug_span, info_span, warn};

use super::{CONTROLLER_TARGET, Controller, ControllerError};
use crate::extension::{ExtensionClients, ExtensionError};
use crate::message::{Reply, Request};
use crate::route::HandlerContext;
use crate::transport::{ClientSocket, Delivery, InboundSocket, ReplySink, TransportError};

/// How long a receive waits before the close flag is checked again.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

impl Controller {
    /// Serves requests until the controller is closed.
    ///
    /// Preflight runs first: configuration present, every required extension
    /// configured, at least one instance to bind. Extension clients are then
    /// built on the calling thread and the instances are bound. Malformed or
    /// unroutable requests are answered with a failure and serving continues.
    ///
    /// # Errors
    ///
    /// Returns a [`ControllerError`] when preflight or binding fails, or when
    /// the socket stops delivering.
    pub fn run(&mut self) -> Result<(), ControllerError> {
        let category = self.category().unwrap_or_default().to_owned();
        let span = info_span!(
            target: CONTROLLER_TARGET,
            "controller",
            controller = %category,
            controller_type = %self.controller_type,
            service = %self.service_url,
        );
        let _entered = span.enter();

        self.reporter.controller_starting(&category, self.controller_type);
        let result = self.serve(&category, &span);
        self.close.set_serving(false);
        self.close.reset();
        match &result {
            Ok(()) => self.reporter.controller_stopped(&category),
            Err(error) => self.reporter.controller_failed(&category, error),
        }
        result
    }

    fn serve(&mut self, category: &str, span: &Span) -> Result<(), ControllerError> {
        let endpoints = self.preflight(category)?;
        let mut extensions = self.build_extension_clients(category);
        let socket = InboundSocket::bind(&endpoints).map_err(|source| ControllerError::Bind {
            category: category.to_owned(),
            source,
        })?;
        self.close.set_serving(true);
        self.reporter.controller_bound(category, &endpoints);

        while !self.is_closed() {
            match socket.recv_timeout(POLL_INTERVAL) {
                Ok(Some(delivery)) => self.handle(delivery, &mut extensions, span),
                Ok(None) => {}
                Err(source) => {
                    warn!(
                        target: CONTROLLER_TARGET,
                        error = %source,
                        "socket stopped receiving"
                    );
                    self.fail_pending(&socket, &source);
                    extensions.close();
                    return Err(ControllerError::Receive {
                        category: category.to_owned(),
                        source,
                    });
                }
            }
        }
        extensions.close();
        Ok(())
    }

    /// Answers callers still queued on a failed socket once, best effort.
    fn fail_pending(&self, socket: &InboundSocket, error: &TransportError) {
        let response = Reply::fail(error.to_string());
        for delivery in socket.drain() {
            self.respond(&response, delivery.reply, &delivery.metadata.identity);
        }
    }

    fn preflight(&self, category: &str) -> Result<Vec<Endpoint>, ControllerError> {
        let config = self.config.as_ref().ok_or(ControllerError::MissingConfig)?;
        if let Some(missing) = self
            .required_extensions
            .iter()
            .find(|name| !self.extension_configs.contains_key(name.as_str()))
        {
            return Err(ControllerError::Extension {
                category: category.to_owned(),
                source: ExtensionError::missing(missing.as_str()),
            });
        }
        let endpoints = config.bind_endpoints();
        if endpoints.is_empty() {
            return Err(ControllerError::NoInstances {
                category: category.to_owned(),
            });
        }
        Ok(endpoints)
    }

    fn build_extension_clients(&self, category: &str) -> ExtensionClients {
        let identity = format!("{}/{category}", self.service_url);
        let mut clients = ExtensionClients::new();
        for config in self.extension_configs.values() {
            clients.set(
                config.url.clone(),
                ClientSocket::new(identity.clone(), config.endpoint()),
            );
        }
        clients
    }

    fn handle(&mut self, delivery: Delivery, extensions: &mut ExtensionClients, span: &Span) {
        let Delivery {
            frame,
            metadata,
            reply,
        } = delivery;
        let response = match frame.and_then(|bytes| Request::parse(&bytes)) {
            Ok(mut request) => {
                if let Some(key) = metadata.pub_key {
                    request.set_public_key(key);
                }
                self.dispatch(request, &metadata.identity, extensions, span)
            }
            Err(error) => {
                warn!(
                    target: CONTROLLER_TARGET,
                    peer = %metadata.identity,
                    error = %error,
                    "rejected malformed message"
                );
                Reply::fail(error.to_string())
            }
        };
        self.respond(&response, reply, &metadata.identity);
    }

    fn dispatch(
        &mut self,
        request: Request,
        peer: &str,
        extensions: &mut ExtensionClients,
        span: &Span,
    ) -> Reply {
        let request_span = debug_span!(
            target: CONTROLLER_TARGET,
            parent: span,
            "request",
            command = %request.command,
            peer = %peer,
        );
        let _entered = request_span.enter();
        match self.routes.resolve_mut(&request.command) {
            Ok(route) => {
                let mut context = HandlerContext::new(&request_span, extensions);
                route.call(request, &mut context)
            }
            Err(error) => {
                debug!(target: CONTROLLER_TARGET, error = %error, "no route matched");
                Reply::fail(format!("route get {} failed: {error}", request.command))
            }
        }
    }

    fn respond(&self, response: &Reply, sink: ReplySink, peer: &str) {
        if !self.controller_type.replies() {
            if !response.is_ok() {
                warn!(
                    target: CONTROLLER_TARGET,
                    peer = %peer,
                    message = response.message().unwrap_or_default(),
                    "pulled request failed"
                );
            }
            return;
        }
        let line = match response.to_line() {
            Ok(line) => line,
            Err(error) => {
                warn!(
                    target: CONTROLLER_TARGET,
                    peer = %peer,
                    error = %error,
                    "failed to encode reply"
                );
                return;
            }
        };
        if let Err(error) = sink.send(&line) {
            warn!(
                target: CONTROLLER_TARGET,
                peer = %peer,
                error = %error,
                "failed to send reply"
            );
        }
    }
}
