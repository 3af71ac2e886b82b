//! Controller registry: `"Controller@method"` names resolved to functions registered at
//! startup.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::dispatcher::{DispatchError, Unresolved};
use crate::server::{Request, Response};

/// A controller action. Receives the request and the captured path parameters in
/// placeholder order.
pub type ActionFn =
    Arc<dyn Fn(&Request, &[String]) -> Result<Response, DispatchError> + Send + Sync>;

/// Builds actions on demand for names that were not registered up front.
pub type ActionResolver = Arc<dyn Fn(&str, &str) -> Option<ActionFn> + Send + Sync>;

#[derive(Clone, Default)]
pub struct ControllerRegistry {
    controllers: HashMap<String, HashMap<String, ActionFn>>,
    resolver: Option<ActionResolver>,
}

impl ControllerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `controller@method`. Registering the same pair again replaces it.
    pub fn action<F>(&mut self, controller: &str, method: &str, f: F) -> &mut Self
    where
        F: Fn(&Request, &[String]) -> Result<Response, DispatchError> + Send + Sync + 'static,
    {
        debug!(controller, method, "Registering controller action");
        self.controllers
            .entry(controller.to_string())
            .or_default()
            .insert(method.to_string(), Arc::new(f));
        self
    }

    /// Consult `resolver` for `(controller, method)` pairs with no registered action.
    ///
    /// Returning `None` leaves the pair unresolved.
    pub fn with_resolver<F>(&mut self, resolver: F) -> &mut Self
    where
        F: Fn(&str, &str) -> Option<ActionFn> + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    #[must_use]
    pub fn contains(&self, controller: &str) -> bool {
        self.controllers.contains_key(controller)
    }

    /// Look up an action, falling back to the resolver if one is installed.
    ///
    /// # Errors
    ///
    /// [`Unresolved::Controller`] when the controller is unknown, [`Unresolved::Action`] when
    /// it has no such method.
    pub fn resolve(&self, controller: &str, method: &str) -> Result<ActionFn, DispatchError> {
        let registered = self.controllers.get(controller);
        if let Some(action) = registered.and_then(|actions| actions.get(method)) {
            return Ok(Arc::clone(action));
        }
        if let Some(action) = self.resolver.as_ref().and_then(|r| r(controller, method)) {
            return Ok(action);
        }
        let err = match registered {
            None => Unresolved::Controller(controller.to_string()),
            Some(_) => Unresolved::Action {
                controller: controller.to_string(),
                method: method.to_string(),
            },
        };
        Err(err.into())
    }
}
