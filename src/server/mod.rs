//! # Server Module
//!
//! Request/response types shared by the dispatcher, middleware and controllers, and the
//! `may_minihttp` adapter that feeds decoded requests into the
//! [`Dispatcher`](crate::dispatcher::Dispatcher).

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_query_params, Request, METHOD_OVERRIDE_FIELD};
pub use response::{write_response, ContentType, Response};
pub use service::AppService;
