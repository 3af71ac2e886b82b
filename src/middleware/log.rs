use tracing::info;

use super::Middleware;
use crate::server::{Request, Response};

/// `Log`: records the request and lets it through.
pub struct LogMiddleware;

impl Middleware for LogMiddleware {
    fn handle(&self, req: &Request, args: &[String]) -> Option<Response> {
        info!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path(),
            tags = ?args,
            "Request received"
        );
        None
    }
}
