use std::collections::HashMap;

use super::{Command, Route, RouteError};

/// Routes of one controller.
#[derive(Debug, Default)]
pub struct RouteTable {
    exact: HashMap<String, Route>,
    fallback: Option<Route>,
}

impl RouteTable {
    /// Builds a table with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `route`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Duplicate`] when the command is taken.
    pub fn add(&mut self, route: Route) -> Result<(), RouteError> {
        if self.exist(route.command()) {
            return Err(RouteError::Duplicate {
                command: route.command().clone(),
            });
        }
        match route.command() {
            Command::Exact(name) => {
                self.exact.insert(name.clone(), route);
            }
            Command::Any => self.fallback = Some(route),
        }
        Ok(())
    }

    /// Returns the route registered under exactly `command`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::NotFound`] when nothing is registered.
    pub fn get(&self, command: &Command) -> Result<&Route, RouteError> {
        let route = match command {
            Command::Exact(name) => self.exact.get(name),
            Command::Any => self.fallback.as_ref(),
        };
        route.ok_or_else(|| RouteError::NotFound {
            command: command.clone(),
        })
    }

    /// Returns `true` when a route is registered under exactly `command`.
    #[must_use]
    pub fn exist(&self, command: &Command) -> bool {
        match command {
            Command::Exact(name) => self.exact.contains_key(name),
            Command::Any => self.fallback.is_some(),
        }
    }

    /// Selects the route serving `command`: the exact route first, then the
    /// wildcard.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::NoRoute`] when neither exists.
    pub fn resolve_mut(&mut self, command: &str) -> Result<&mut Route, RouteError> {
        if let Some(route) = self.exact.get_mut(command) {
            return Ok(route);
        }
        self.fallback.as_mut().ok_or_else(|| RouteError::NoRoute {
            command: command.to_owned(),
        })
    }

    /// Number of registered routes, the wildcard included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exact.len() + usize::from(self.fallback.is_some())
    }

    /// Returns `true` when no route is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
