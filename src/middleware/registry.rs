use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::{AuthMiddleware, LogMiddleware, Middleware, MiddlewareSpec};
use crate::dispatcher::{DispatchError, Unresolved};
use crate::server::{Request, Response};

/// Constructs a fresh middleware instance for one invocation.
pub type MiddlewareFactory = Arc<dyn Fn() -> Box<dyn Middleware> + Send + Sync>;

/// A static middleware operation, called without an instance.
pub type StaticMiddlewareFn = Arc<dyn Fn(&Request, &[String]) -> Option<Response> + Send + Sync>;

#[derive(Clone, Default)]
struct MiddlewareClass {
    factory: Option<MiddlewareFactory>,
    statics: HashMap<String, StaticMiddlewareFn>,
}

/// Name → middleware mapping, populated at startup.
///
/// A name can carry an instance constructor (used by the `Name` and `Name#args` forms),
/// static operations (used by `Name@method:args`), or both.
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    classes: HashMap<String, MiddlewareClass>,
}

impl MiddlewareRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with `Auth` and `Log`.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register("Auth", || AuthMiddleware)
            .register("Log", || LogMiddleware);
        registry
    }

    /// Register an instance constructor under `name`.
    pub fn register<M, F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        M: Middleware + 'static,
        F: Fn() -> M + Send + Sync + 'static,
    {
        let factory: MiddlewareFactory = Arc::new(move || Box::new(factory()));
        self.classes.entry(name.to_string()).or_default().factory = Some(factory);
        self
    }

    /// Register a static operation `name@method`.
    pub fn register_static<F>(&mut self, name: &str, method: &str, f: F) -> &mut Self
    where
        F: Fn(&Request, &[String]) -> Option<Response> + Send + Sync + 'static,
    {
        self.classes
            .entry(name.to_string())
            .or_default()
            .statics
            .insert(method.to_string(), Arc::new(f));
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Resolve and invoke one specification.
    ///
    /// `Ok(None)` lets the chain continue, `Ok(Some(response))` terminates the request, and
    /// an unresolvable name or method is an [`DispatchError::UnresolvedHandler`].
    pub fn run(&self, spec: &MiddlewareSpec, req: &Request) -> Result<Option<Response>, DispatchError> {
        let name = spec.name();
        let class = self
            .classes
            .get(name)
            .ok_or_else(|| Unresolved::Middleware(name.to_string()))?;

        debug!(middleware = %spec, "Running middleware");
        match spec {
            MiddlewareSpec::Simple(_) | MiddlewareSpec::WithArgs(_, _) => {
                let factory = class
                    .factory
                    .as_ref()
                    .ok_or_else(|| Unresolved::MiddlewareHandle(name.to_string()))?;
                Ok(factory().handle(req, spec.args()))
            }
            MiddlewareSpec::StaticCall(_, method, args) => {
                let op = class.statics.get(method).ok_or_else(|| Unresolved::MiddlewareMethod {
                    middleware: name.to_string(),
                    method: method.clone(),
                })?;
                Ok(op(req, args))
            }
        }
    }
}
