use super::Middleware;
use crate::server::{Request, Response};

/// `Auth` / `Auth#token1&token2`
///
/// With tokens, admits requests whose `Authorization` header equals one of them, either
/// verbatim or as `Bearer <token>`. Without tokens, any non-empty `Authorization` header is
/// admitted. Everything else is answered with 401.
pub struct AuthMiddleware;

impl Middleware for AuthMiddleware {
    fn handle(&self, req: &Request, args: &[String]) -> Option<Response> {
        let header = req.header("authorization").map(str::trim).unwrap_or_default();
        let presented = header.strip_prefix("Bearer ").unwrap_or(header);
        let admitted = if args.is_empty() {
            !header.is_empty()
        } else {
            args.iter().any(|t| !t.is_empty() && (t == header || t == presented))
        };
        if admitted {
            None
        } else {
            Some(Response::json(401, &serde_json::json!({ "error": "Unauthorized" })))
        }
    }
}
