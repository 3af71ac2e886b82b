//! Route table and registration handles.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::Method;
use smallvec::SmallVec;
use tracing::{debug, info};

use super::matcher::{ParamVec, PathMatcher};
use crate::dispatcher::DispatchError;
use crate::middleware::MiddlewareSpec;
use crate::registry::ActionFn;
use crate::server::{Request, Response};

/// Methods registered by [`RouteTable::any`].
pub const ANY_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

/// What a matched route invokes.
#[derive(Clone)]
pub enum Action {
    /// `"Controller@method"`, resolved through the controller registry at dispatch time.
    Controller { controller: String, method: String },
    /// A function registered directly on the route.
    Callable(ActionFn),
}

impl Action {
    /// Parse a `"Controller@method"` reference.
    ///
    /// A string without `@` keeps an empty method name, which fails to resolve at dispatch.
    #[must_use]
    pub fn parse(reference: &str) -> Self {
        let (controller, method) = reference.split_once('@').unwrap_or((reference, ""));
        Action::Controller {
            controller: controller.to_string(),
            method: method.to_string(),
        }
    }

    /// Wrap a closure as a direct action.
    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&Request, &[String]) -> Result<Response, DispatchError> + Send + Sync + 'static,
    {
        Action::Callable(Arc::new(f))
    }
}

impl From<&str> for Action {
    fn from(reference: &str) -> Self {
        Action::parse(reference)
    }
}

impl From<String> for Action {
    fn from(reference: String) -> Self {
        Action::parse(&reference)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Controller { controller, method } => write!(f, "{controller}@{method}"),
            Action::Callable(_) => f.write_str("<callable>"),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One registered `(method, pattern)` with its action and middleware chain.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    method: Method,
    pattern: String,
    action: Action,
    middleware: Vec<MiddlewareSpec>,
    matcher: PathMatcher,
}

impl RouteEntry {
    fn new(method: Method, pattern: &str, action: Action) -> Self {
        Self {
            matcher: PathMatcher::new(pattern),
            method,
            pattern: pattern.to_string(),
            action,
            middleware: Vec::new(),
        }
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The raw pattern as registered.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Middleware specifications in execution order.
    #[must_use]
    pub fn middleware(&self) -> &[MiddlewareSpec] {
        &self.middleware
    }

    /// Match a trimmed request path against this entry's pattern.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<ParamVec> {
        self.matcher.captures(path)
    }
}

/// Ordered route table: method → patterns in registration order.
///
/// Registering a pattern that already exists under the same method replaces the entry in
/// place, so it keeps its original match priority. Among patterns that could all match a
/// path, the first registered one wins; there is no specificity ranking.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<Method, Vec<RouteEntry>>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` for `method` + `pattern` and return a handle for attaching middleware.
    pub fn register(
        &mut self,
        method: Method,
        pattern: &str,
        action: impl Into<Action>,
    ) -> RouteHandle<'_> {
        let index = self.insert(RouteEntry::new(method.clone(), pattern, action.into()));
        let mut targets = SmallVec::new();
        targets.push((method, index));
        RouteHandle {
            table: self,
            targets,
        }
    }

    pub fn get(&mut self, pattern: &str, action: impl Into<Action>) -> RouteHandle<'_> {
        self.register(Method::GET, pattern, action)
    }

    pub fn post(&mut self, pattern: &str, action: impl Into<Action>) -> RouteHandle<'_> {
        self.register(Method::POST, pattern, action)
    }

    pub fn put(&mut self, pattern: &str, action: impl Into<Action>) -> RouteHandle<'_> {
        self.register(Method::PUT, pattern, action)
    }

    pub fn delete(&mut self, pattern: &str, action: impl Into<Action>) -> RouteHandle<'_> {
        self.register(Method::DELETE, pattern, action)
    }

    pub fn patch(&mut self, pattern: &str, action: impl Into<Action>) -> RouteHandle<'_> {
        self.register(Method::PATCH, pattern, action)
    }

    /// Register `pattern` under GET, POST, PUT and DELETE as four independent entries.
    ///
    /// The returned handle covers all four entries: middleware attached to it is appended to
    /// each of them.
    pub fn any(&mut self, pattern: &str, action: impl Into<Action>) -> RouteHandle<'_> {
        let action = action.into();
        let mut targets = SmallVec::new();
        for method in ANY_METHODS {
            let index = self.insert(RouteEntry::new(method.clone(), pattern, action.clone()));
            targets.push((method, index));
        }
        RouteHandle {
            table: self,
            targets,
        }
    }

    fn insert(&mut self, entry: RouteEntry) -> usize {
        let entries = self.routes.entry(entry.method.clone()).or_default();
        if let Some(index) = entries.iter().position(|e| e.pattern == entry.pattern) {
            debug!(method = %entry.method, pattern = %entry.pattern, "Replacing route entry");
            entries[index] = entry;
            index
        } else {
            entries.push(entry);
            entries.len() - 1
        }
    }

    /// Find the first entry under `method` whose pattern matches `path`.
    ///
    /// `path` must already be trimmed of leading/trailing `/` and stripped of its query.
    #[must_use]
    pub fn find(&self, method: &Method, path: &str) -> Option<(&RouteEntry, ParamVec)> {
        self.routes
            .get(method)?
            .iter()
            .find_map(|entry| entry.captures(path).map(|params| (entry, params)))
    }

    /// Entries registered under `method`, in priority order.
    pub fn entries(&self, method: &Method) -> impl Iterator<Item = &RouteEntry> {
        self.routes.get(method).into_iter().flatten()
    }

    /// All entries, grouped by method.
    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.values().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Log every registered route at info level.
    pub fn log_routes(&self) {
        info!(routes_count = self.len(), "Routing table loaded");
        for entry in self.iter() {
            info!(
                method = %entry.method,
                pattern = %entry.pattern,
                action = %entry.action,
                middleware = ?entry.middleware,
                "Route registered"
            );
        }
    }
}

/// Fluent handle returned by route registration.
pub struct RouteHandle<'a> {
    table: &'a mut RouteTable,
    targets: SmallVec<[(Method, usize); 4]>,
}

impl RouteHandle<'_> {
    /// Append a middleware specification (see [`MiddlewareSpec::parse`]) to the route.
    pub fn middleware(self, spec: &str) -> Self {
        let parsed = MiddlewareSpec::parse(spec);
        for (method, index) in &self.targets {
            if let Some(entry) = self
                .table
                .routes
                .get_mut(method)
                .and_then(|entries| entries.get_mut(*index))
            {
                entry.middleware.push(parsed.clone());
            }
        }
        self
    }

    /// The entries this handle refers to.
    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.targets.iter().filter_map(|(method, index)| {
            self.table
                .routes
                .get(method)
                .and_then(|entries| entries.get(*index))
        })
    }
}
