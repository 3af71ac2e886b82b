use std::sync::Arc;

use tracing::{debug, info_span, warn};

use super::DispatchError;
use crate::middleware::MiddlewareRegistry;
use crate::registry::ControllerRegistry;
use crate::router::{Action, RouteTable};
use crate::server::{Request, Response};

/// Handler invoked when no route matches. Its response status is forced to 404.
pub type NotFoundFn = Arc<dyn Fn(&Request) -> Response + Send + Sync>;

/// Resolves matched routes to middleware and controller actions.
///
/// The dispatcher holds no route state of its own; the table is passed to every
/// [`dispatch`](Self::dispatch) call so several independent tables can share one dispatcher.
#[derive(Clone)]
pub struct Dispatcher {
    controllers: ControllerRegistry,
    middleware: MiddlewareRegistry,
    not_found: Option<NotFoundFn>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(controllers: ControllerRegistry, middleware: MiddlewareRegistry) -> Self {
        Self {
            controllers,
            middleware,
            not_found: None,
        }
    }

    /// Install the handler used for unmatched requests.
    #[must_use]
    pub fn with_not_found<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.not_found = Some(Arc::new(handler));
        self
    }

    pub fn controllers_mut(&mut self) -> &mut ControllerRegistry {
        &mut self.controllers
    }

    pub fn middleware_mut(&mut self) -> &mut MiddlewareRegistry {
        &mut self.middleware
    }

    /// Run one request through matching, middleware and the action.
    ///
    /// # Errors
    ///
    /// Unresolvable middleware or controller names abort with
    /// [`DispatchError::UnresolvedHandler`]; action failures are passed through.
    pub fn dispatch(&self, routes: &RouteTable, req: &Request) -> Result<Response, DispatchError> {
        let span = info_span!(
            "dispatch",
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path()
        );
        let _entered = span.enter();

        let Some(method) = req.effective_method() else {
            warn!(
                override_method = ?req.override_method(),
                "Unparseable method override, treating as not found"
            );
            return Ok(self.not_found(req));
        };
        if method != req.method {
            debug!(effective = %method, "Method overridden");
        }

        let path = req.route_path();
        let Some((entry, params)) = routes.find(&method, path) else {
            debug!(state = "not_found", "No route matched");
            return Ok(self.not_found(req));
        };
        debug!(
            state = "middleware",
            pattern = %entry.pattern(),
            params = ?params,
            chain = entry.middleware().len(),
            "Route matched"
        );

        for spec in entry.middleware() {
            if let Some(response) = self.middleware.run(spec, req)? {
                debug!(middleware = %spec, status = response.status, "Middleware ended request");
                return Ok(response);
            }
        }

        debug!(state = "action", action = %entry.action(), "Invoking action");
        let response = match entry.action() {
            Action::Callable(f) => f(req, &params)?,
            Action::Controller { controller, method } => {
                let f = self.controllers.resolve(controller, method)?;
                f(req, &params)?
            }
        };
        debug!(state = "done", status = response.status, "Dispatch complete");
        Ok(response)
    }

    fn not_found(&self, req: &Request) -> Response {
        match &self.not_found {
            Some(handler) => handler(req).with_status(404),
            None => Response::not_found(),
        }
    }
}
