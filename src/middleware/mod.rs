//! # Middleware Module
//!
//! Middleware run in the order stored on the matched route, before its action. Each route
//! stores [`MiddlewareSpec`]s parsed at registration; at dispatch the
//! [`MiddlewareRegistry`] resolves the name and invokes it in the spec's calling form.
//!
//! ```rust
//! use nineverse::middleware::{MiddlewareRegistry, MiddlewareSpec};
//! use nineverse::server::{Request, Response};
//!
//! let mut registry = MiddlewareRegistry::with_builtins();
//! registry.register_static("Maintenance", "on", |_req: &Request, _args: &[String]| {
//!     Some(Response::text(503, "Down for maintenance"))
//! });
//!
//! let req = Request::new(http::Method::GET, "/");
//! let halted = registry
//!     .run(&MiddlewareSpec::parse("Maintenance@on"), &req)
//!     .unwrap();
//! assert_eq!(halted.unwrap().status, 503);
//! ```

mod auth;
mod core;
mod log;
mod registry;
mod spec;

pub use auth::AuthMiddleware;
pub use core::Middleware;
pub use log::LogMiddleware;
pub use registry::{MiddlewareFactory, MiddlewareRegistry, StaticMiddlewareFn};
pub use spec::MiddlewareSpec;
