use crate::server::{Request, Response};

/// A pre-action request handler.
///
/// `handle` receives the positional arguments from the route's specification (empty for the
/// bare `Name` form). Returning `Some(response)` terminates the request with that response:
/// the remaining middleware and the controller action do not run.
pub trait Middleware: Send + Sync {
    fn handle(&self, req: &Request, args: &[String]) -> Option<Response>;
}

impl<F> Middleware for F
where
    F: Fn(&Request, &[String]) -> Option<Response> + Send + Sync,
{
    fn handle(&self, req: &Request, args: &[String]) -> Option<Response> {
        self(req, args)
    }
}
