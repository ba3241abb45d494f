use thiserror::Error;

use super::Command;

/// Errors raised by [`super::RouteTable`].
#[derive(Debug, Error)]
pub enum RouteError {
    /// A route for the command is already registered.
    #[error("route '{command}' is already registered")]
    Duplicate { command: Command },

    /// No route is registered under the command.
    #[error("route '{command}' not found")]
    NotFound { command: Command },

    /// Neither an exact nor a wildcard route matches.
    #[error("no route for command '{command}'")]
    NoRoute { command: String },
}
