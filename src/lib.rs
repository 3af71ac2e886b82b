//! # NineVerse
//!
//! A small web framework: an ordered route table with middleware chains, a dispatcher that
//! honours HTML form method spoofing, and **Nixs**, a directive template engine with layout
//! inheritance.
//!
//! ## Architecture
//!
//! - **[`router`]** - Route table, registration handles and `{param}` path matching
//! - **[`middleware`]** - Middleware specifications (`Name`, `Name#args`, `Name@method:args`),
//!   the [`Middleware`](middleware::Middleware) trait and the name registry
//! - **[`registry`]** - Controller registry resolving `Controller@method` actions
//! - **[`dispatcher`]** - Matching, middleware, action invocation and 404 handling
//! - **[`server`]** - Request/response types and the `may_minihttp` adapter
//! - **[`view`]** - Nixs compiler, render context and renderer
//! - **[`routes`]** - YAML route manifest
//! - **[`hot_reload`]** - Manifest watching with lock-free table swaps
//! - **[`config`]**, **[`dotenv`]**, **[`logging`]** - Application configuration and startup
//! - **[`generator`]**, **[`cli`]** - The `fany` scaffolding tool
//!
//! ## Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Service as server::AppService
//!     participant Dispatcher
//!     participant Table as router::RouteTable
//!     participant MW as middleware::MiddlewareRegistry
//!     participant Ctl as registry::ControllerRegistry
//!     participant View as view::Renderer
//!
//!     Client->>Service: HTTP request
//!     Service->>Dispatcher: dispatch(table, request)
//!     Dispatcher->>Dispatcher: effective method (_method override)
//!     Dispatcher->>Table: find(method, path)
//!     alt no match
//!         Dispatcher-->>Service: 404
//!     else match
//!         loop each middleware spec
//!             Dispatcher->>MW: run(spec)
//!             MW-->>Dispatcher: continue / response
//!         end
//!         Dispatcher->>Ctl: resolve(controller, method)
//!         Ctl->>View: render(view, data)
//!         View-->>Ctl: HTML
//!         Ctl-->>Dispatcher: Response
//!     end
//!     Service-->>Client: HTTP response
//! ```
//!
//! ## Example
//!
//! ```rust
//! use nineverse::dispatcher::Dispatcher;
//! use nineverse::middleware::MiddlewareRegistry;
//! use nineverse::registry::ControllerRegistry;
//! use nineverse::router::RouteTable;
//! use nineverse::server::{Request, Response};
//!
//! let mut routes = RouteTable::new();
//! routes.get("posts/{id}", "PostController@show").middleware("Log");
//! routes.delete("posts/{id}", "PostController@destroy").middleware("Auth#secret");
//!
//! let mut controllers = ControllerRegistry::new();
//! controllers
//!     .action("PostController", "show", |_, p| Ok(Response::text(200, format!("post {}", p[0]))))
//!     .action("PostController", "destroy", |_, p| Ok(Response::text(200, format!("deleted {}", p[0]))));
//!
//! let dispatcher = Dispatcher::new(controllers, MiddlewareRegistry::with_builtins());
//!
//! // A form submission spoofing DELETE through `_method`.
//! let req = Request::new(http::Method::POST, "/posts/7")
//!     .with_header("Authorization", "Bearer secret")
//!     .with_form(&[("_method", "delete")]);
//! let res = dispatcher.dispatch(&routes, &req).unwrap();
//! assert_eq!(res.body, "deleted 7");
//! ```

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod dotenv;
pub mod generator;
pub mod hot_reload;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod registry;
pub mod router;
pub mod routes;
pub mod server;
pub mod view;

pub use dispatcher::{DispatchError, Dispatcher};
pub use router::RouteTable;
pub use server::{Request, Response};
pub use view::{RenderContext, Renderer, ViewError};
