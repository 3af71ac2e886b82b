//! End-to-end tests through `may_minihttp`: raw TCP request → AppService → dispatcher →
//! response on the wire.

use arc_swap::ArcSwap;
use nineverse::dispatcher::Dispatcher;
use nineverse::middleware::MiddlewareRegistry;
use nineverse::registry::ControllerRegistry;
use nineverse::router::RouteTable;
use nineverse::server::{AppService, HttpServer, Response, ServerHandle};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

mod common;
use common::http::send_request;
use common::test_server::setup_may_runtime;

/// Starts a server on a free port and stops it on drop.
struct TestServer {
    handle: Option<ServerHandle>,
    addr: SocketAddr,
}

impl TestServer {
    fn new() -> Self {
        setup_may_runtime();

        let mut controllers = ControllerRegistry::new();
        controllers
            .action("UserController", "show", |_req, params| {
                Ok(Response::text(200, format!("user {}", params[0])))
            })
            .action("UserController", "destroy", |_req, params| {
                Ok(Response::text(200, format!("deleted {}", params[0])))
            });

        let mut routes = RouteTable::new();
        routes.get("users/{id}", "UserController@show");
        routes
            .delete("users/{id}", "UserController@destroy")
            .middleware("Auth#secret");
        routes.get("broken", "NobodyController@index");

        let dispatcher = Dispatcher::new(controllers, MiddlewareRegistry::with_builtins());
        let service = AppService::new(
            Arc::new(ArcSwap::from_pointee(routes)),
            Arc::new(dispatcher),
        );

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let handle = HttpServer(service).start(addr).unwrap();
        handle.wait_ready().unwrap();
        Self {
            handle: Some(handle),
            addr,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }
}

#[test]
fn test_get_route() {
    let server = TestServer::new();
    let (status, body) = send_request(
        &server.addr,
        "GET /users/42 HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    assert_eq!(status, 200);
    assert_eq!(body, "user 42");
}

#[test]
fn test_unknown_route_is_404() {
    let server = TestServer::new();
    let (status, body) = send_request(
        &server.addr,
        "GET /nowhere HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    assert_eq!(status, 404);
    assert_eq!(body, "404 Not Found");
}

#[test]
fn test_spoofed_delete_with_auth() {
    let server = TestServer::new();
    let form = "_method=DELETE";

    let request = format!(
        "POST /users/7 HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{form}",
        form.len()
    );
    let (status, _) = send_request(&server.addr, &request);
    assert_eq!(status, 401);

    let request = format!(
        "POST /users/7 HTTP/1.1\r\nHost: localhost\r\nAuthorization: Bearer secret\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{form}",
        form.len()
    );
    let (status, body) = send_request(&server.addr, &request);
    assert_eq!(status, 200);
    assert_eq!(body, "deleted 7");
}

#[test]
fn test_unresolved_controller_is_500() {
    let server = TestServer::new();
    let (status, body) = send_request(
        &server.addr,
        "GET /broken HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    assert_eq!(status, 500);
    assert!(body.contains("Controller NobodyController not found."));
}
