//! # Router Module
//!
//! The router module holds the route table and the path matcher used by the
//! [`Dispatcher`](crate::dispatcher::Dispatcher).
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Registering routes per HTTP method, in insertion order
//! - Compiling `{param}` patterns into anchored matchers
//! - Finding the first registered route that matches a request path
//! - Extracting captured path segments as positional parameters
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Registration**: Patterns such as `users/{id}/posts/{slug}` are compiled into regexes
//!    once, when the route is registered. Middleware specifications attached through the
//!    returned [`RouteHandle`] are parsed at the same time.
//!
//! 2. **Matching**: For each incoming request, the table walks the effective method's routes
//!    in registration order and returns the first one whose matcher accepts the path, along
//!    with the captured segments in left-to-right order.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use nineverse::router::RouteTable;
//!
//! let mut routes = RouteTable::new();
//! routes
//!     .get("users/{id}/posts/{slug}", "PostController@show")
//!     .middleware("Auth#secret");
//!
//! let (entry, params) = routes.find(&Method::GET, "users/42/posts/hello-world").unwrap();
//! assert_eq!(entry.pattern(), "users/{id}/posts/{slug}");
//! assert_eq!(params.as_slice(), ["42", "hello-world"]);
//! ```
//!
//! ## Priority
//!
//! There is no "most specific wins" rule. If `{any}` is registered before `users`, a request
//! for `users` matches `{any}`.

mod core;
mod matcher;

pub use core::{Action, RouteEntry, RouteHandle, RouteTable, ANY_METHODS};
pub use matcher::{ParamVec, PathMatcher, MAX_INLINE_PARAMS};
