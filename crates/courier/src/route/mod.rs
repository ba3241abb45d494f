//! Command routing for controllers.
//!
//! A [`RouteTable`] maps command names to handlers and keeps at most one
//! wildcard route that catches every command without an exact entry.

mod errors;
mod table;

use std::fmt;

use tracing::Span;

use crate::extension::ExtensionClients;
use crate::message::{Parameters, Reply, Request};

pub use errors::RouteError;
pub use table::RouteTable;

/// Handler signature: request in, reply out.
pub type Handler = Box<dyn FnMut(Request, &mut HandlerContext<'_>) -> Reply + Send>;

/// Command a route answers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// One named command.
    Exact(String),
    /// Every command without an exact route.
    Any,
}

impl Command {
    /// Builds an exact command.
    #[must_use]
    pub fn exact(name: impl Into<String>) -> Self {
        Self::Exact(name.into())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(name) => formatter.write_str(name),
            Self::Any => formatter.write_str("*"),
        }
    }
}

/// Collaborators available to a handler while it serves one request.
pub struct HandlerContext<'a> {
    span: &'a Span,
    extensions: &'a mut ExtensionClients,
}

impl<'a> HandlerContext<'a> {
    pub(crate) fn new(span: &'a Span, extensions: &'a mut ExtensionClients) -> Self {
        Self { span, extensions }
    }

    /// Span of the request being served.
    #[must_use]
    pub fn span(&self) -> &Span {
        self.span
    }

    /// Clients for the controller's extensions.
    pub fn extensions(&mut self) -> &mut ExtensionClients {
        self.extensions
    }
}

/// A command bound to its handler.
pub struct Route {
    command: Command,
    handler: Handler,
}

impl Route {
    /// Builds a route for one named command.
    pub fn new<F>(command: impl Into<String>, handler: F) -> Self
    where
        F: FnMut(Request, &mut HandlerContext<'_>) -> Reply + Send + 'static,
    {
        Self {
            command: Command::exact(command),
            handler: Box::new(handler),
        }
    }

    /// Builds the wildcard route.
    pub fn any<F>(handler: F) -> Self
    where
        F: FnMut(Request, &mut HandlerContext<'_>) -> Reply + Send + 'static,
    {
        Self {
            command: Command::Any,
            handler: Box::new(handler),
        }
    }

    /// Command this route answers.
    #[must_use]
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Runs the handler.
    pub fn call(&mut self, request: Request, context: &mut HandlerContext<'_>) -> Reply {
        (self.handler)(request, context)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Route")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

/// Wildcard route that answers every command with its own name.
#[must_use]
pub fn any_route() -> Route {
    Route::any(|request, _context| {
        let command = request.command.clone();
        request.ok(Parameters::new().with("command", command))
    })
}
