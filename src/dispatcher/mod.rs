//! # Dispatcher Module
//!
//! Turns a decoded [`Request`](crate::server::Request) into a
//! [`Response`](crate::server::Response) against an explicit
//! [`RouteTable`](crate::router::RouteTable).
//!
//! ## Request Flow
//!
//! 1. The effective method is computed: a POST whose input carries `_method` dispatches as
//!    that (upper-cased) method.
//! 2. The effective method's patterns are tried in registration order against the route path
//!    (query stripped, `/` trimmed). The first match wins.
//! 3. The route's middleware run in stored order. A middleware returning a response ends the
//!    request with that response; an unresolvable middleware aborts dispatch with
//!    [`DispatchError::UnresolvedHandler`].
//! 4. The action is resolved (direct callable, or `Controller@method` through the
//!    [`ControllerRegistry`](crate::registry::ControllerRegistry)) and invoked with the
//!    captured path parameters in placeholder order.
//! 5. With no match, the not-found handler runs once and its response is forced to 404.
//!
//! ```rust
//! use nineverse::dispatcher::Dispatcher;
//! use nineverse::registry::ControllerRegistry;
//! use nineverse::middleware::MiddlewareRegistry;
//! use nineverse::router::RouteTable;
//! use nineverse::server::{Request, Response};
//!
//! let mut controllers = ControllerRegistry::new();
//! controllers.action("UserController", "show", |_req, params| {
//!     Ok(Response::text(200, format!("user {}", params[0])))
//! });
//!
//! let mut routes = RouteTable::new();
//! routes.get("users/{id}", "UserController@show");
//!
//! let dispatcher = Dispatcher::new(controllers, MiddlewareRegistry::new());
//! let res = dispatcher
//!     .dispatch(&routes, &Request::new(http::Method::GET, "/users/42"))
//!     .unwrap();
//! assert_eq!(res.body, "user 42");
//! ```

mod core;
mod error;

pub use core::{Dispatcher, NotFoundFn};
pub use error::{DispatchError, Unresolved};
