use http::Method;
use nineverse::dispatcher::{DispatchError, Dispatcher, Unresolved};
use nineverse::middleware::MiddlewareRegistry;
use nineverse::registry::ControllerRegistry;
use nineverse::router::{Action, RouteTable};
use nineverse::server::{ContentType, Request, Response};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

mod common;
use common::views::fixture_renderer;

fn user_controllers() -> ControllerRegistry {
    let mut controllers = ControllerRegistry::new();
    controllers
        .action("UserController", "index", |_req, _params| {
            Ok(Response::text(200, "all users"))
        })
        .action("UserController", "show", |_req, params| {
            Ok(Response::text(200, format!("user {}", params[0])))
        })
        .action("UserController", "destroy", |_req, params| {
            Ok(Response::text(200, format!("deleted {}", params[0])))
        })
        .action("UserController", "store", |req, _params| {
            let name = req.input_str("name").unwrap_or_default().to_string();
            Ok(Response::json(201, &json!({ "created": name })))
        });
    controllers
}

fn user_routes() -> RouteTable {
    let mut routes = RouteTable::new();
    routes.get("users", "UserController@index");
    routes.get("users/{id}", "UserController@show");
    routes.post("users", "UserController@store");
    routes.delete("users/{id}", "UserController@destroy");
    routes
}

#[test]
fn test_dispatch_with_captured_params() {
    let dispatcher = Dispatcher::new(user_controllers(), MiddlewareRegistry::new());
    let res = dispatcher
        .dispatch(&user_routes(), &Request::new(Method::GET, "/users/42"))
        .unwrap();
    assert_eq!(res.status, 200);
    assert_eq!(res.body, "user 42");
}

#[test]
fn test_query_string_ignored_for_matching() {
    let dispatcher = Dispatcher::new(user_controllers(), MiddlewareRegistry::new());
    let res = dispatcher
        .dispatch(&user_routes(), &Request::new(Method::GET, "/users/?page=2"))
        .unwrap();
    assert_eq!(res.body, "all users");
}

#[test]
fn test_post_body_reaches_action() {
    let dispatcher = Dispatcher::new(user_controllers(), MiddlewareRegistry::new());
    let req = Request::new(Method::POST, "/users").with_form(&[("name", "ada")]);
    let res = dispatcher.dispatch(&user_routes(), &req).unwrap();
    assert_eq!(res.status, 201);
    assert_eq!(res.content_type, ContentType::Json);
    assert_eq!(res.body, r#"{"created":"ada"}"#);
}

#[test]
fn test_method_override_from_form_field() {
    let dispatcher = Dispatcher::new(user_controllers(), MiddlewareRegistry::new());
    let req = Request::new(Method::POST, "/users/7").with_form(&[("_method", "delete")]);
    let res = dispatcher.dispatch(&user_routes(), &req).unwrap();
    assert_eq!(res.body, "deleted 7");
}

#[test]
fn test_method_override_from_urlencoded_body() {
    let dispatcher = Dispatcher::new(user_controllers(), MiddlewareRegistry::new());
    let req = Request::new(Method::POST, "/users/9")
        .with_header("Content-Type", "application/x-www-form-urlencoded")
        .with_body(b"_method=DELETE&confirm=1");
    let res = dispatcher.dispatch(&user_routes(), &req).unwrap();
    assert_eq!(res.body, "deleted 9");
}

#[test]
fn test_override_ignored_on_get() {
    let dispatcher = Dispatcher::new(user_controllers(), MiddlewareRegistry::new());
    let req = Request::new(Method::GET, "/users/3?_method=DELETE");
    let res = dispatcher.dispatch(&user_routes(), &req).unwrap();
    assert_eq!(res.body, "user 3");
}

#[test]
fn test_override_in_query_string_keeps_post() {
    let dispatcher = Dispatcher::new(user_controllers(), MiddlewareRegistry::new());
    let req = Request::from_parts("POST", "/users?_method=DELETE", Default::default(), b"").unwrap();
    let res = dispatcher.dispatch(&user_routes(), &req).unwrap();
    assert_eq!(res.status, 201);
    assert_eq!(res.body, r#"{"created":""}"#);
}

#[test]
fn test_unknown_override_is_not_found() {
    let dispatcher = Dispatcher::new(user_controllers(), MiddlewareRegistry::new());
    let req = Request::new(Method::POST, "/users/3").with_form(&[("_method", "PURGE")]);
    let res = dispatcher.dispatch(&user_routes(), &req).unwrap();
    assert_eq!(res.status, 404);
}

#[test]
fn test_default_not_found() {
    let dispatcher = Dispatcher::new(user_controllers(), MiddlewareRegistry::new());
    let res = dispatcher
        .dispatch(&user_routes(), &Request::new(Method::GET, "/nowhere"))
        .unwrap();
    assert_eq!(res.status, 404);
    assert_eq!(res.body, "404 Not Found");
}

#[test]
fn test_not_found_handler_runs_once_with_404() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let dispatcher = Dispatcher::new(user_controllers(), MiddlewareRegistry::new())
        .with_not_found(move |req: &Request| {
            counter.fetch_add(1, Ordering::SeqCst);
            // Status is forced to 404 regardless of what the handler returns.
            Response::html(200, format!("<h1>No page at {}</h1>", req.path()))
        });

    let res = dispatcher
        .dispatch(&user_routes(), &Request::new(Method::PUT, "/users/1"))
        .unwrap();
    assert_eq!(res.status, 404);
    assert_eq!(res.body, "<h1>No page at /users/1</h1>");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_middleware_halts_chain() {
    let trace: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let mut middleware = MiddlewareRegistry::new();
    let t = Arc::clone(&trace);
    middleware.register_static("Trace", "first", move |_req: &Request, _args: &[String]| {
        t.lock().unwrap().push("first");
        None
    });
    let t = Arc::clone(&trace);
    middleware.register_static("Trace", "halt", move |_req: &Request, _args: &[String]| {
        t.lock().unwrap().push("halt");
        Some(Response::text(403, "stopped"))
    });
    let t = Arc::clone(&trace);
    middleware.register_static("Trace", "third", move |_req: &Request, _args: &[String]| {
        t.lock().unwrap().push("third");
        None
    });

    let mut controllers = ControllerRegistry::new();
    let t = Arc::clone(&trace);
    controllers.action("Secret", "show", move |_req, _params| {
        t.lock().unwrap().push("action");
        Ok(Response::text(200, "secret"))
    });

    let mut routes = RouteTable::new();
    routes
        .get("secret", "Secret@show")
        .middleware("Trace@first")
        .middleware("Trace@halt")
        .middleware("Trace@third");

    let dispatcher = Dispatcher::new(controllers, middleware);
    let res = dispatcher
        .dispatch(&routes, &Request::new(Method::GET, "/secret"))
        .unwrap();
    assert_eq!(res.status, 403);
    assert_eq!(res.body, "stopped");
    assert_eq!(*trace.lock().unwrap(), ["first", "halt"]);
}

#[test]
fn test_unresolved_middleware_aborts_before_action() {
    let ran = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&ran);
    let mut controllers = ControllerRegistry::new();
    controllers.action("Secret", "show", move |_req, _params| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Response::text(200, "secret"))
    });

    let mut routes = RouteTable::new();
    routes
        .get("secret", "Secret@show")
        .middleware("Log")
        .middleware("Missing")
        .middleware("Auth");

    let dispatcher = Dispatcher::new(controllers, MiddlewareRegistry::with_builtins());
    let err = dispatcher
        .dispatch(&routes, &Request::new(Method::GET, "/secret"))
        .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::UnresolvedHandler(Unresolved::Middleware(ref name)) if name == "Missing"
    ));
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unresolved_controller_and_method() {
    let mut routes = RouteTable::new();
    routes.get("ghost", "GhostController@index");
    routes.get("users/{id}/edit", "UserController@edit");

    let dispatcher = Dispatcher::new(user_controllers(), MiddlewareRegistry::new());

    let err = dispatcher
        .dispatch(&routes, &Request::new(Method::GET, "/ghost"))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "unresolved handler: Controller GhostController not found."
    );

    let err = dispatcher
        .dispatch(&routes, &Request::new(Method::GET, "/users/1/edit"))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "unresolved handler: Method edit not found in UserController."
    );
}

#[test]
fn test_callable_route_skips_registry() {
    let mut routes = RouteTable::new();
    routes.get(
        "hello/{name}",
        Action::callable(|_req, params| Ok(Response::text(200, format!("hello {}", params[0])))),
    );
    let dispatcher = Dispatcher::new(ControllerRegistry::new(), MiddlewareRegistry::new());
    let res = dispatcher
        .dispatch(&routes, &Request::new(Method::GET, "/hello/ada"))
        .unwrap();
    assert_eq!(res.body, "hello ada");
}

#[test]
fn test_action_error_passes_through() {
    let mut controllers = ControllerRegistry::new();
    controllers.action("Broken", "run", |_req, _params| {
        Err(anyhow::anyhow!("database unavailable").into())
    });
    let mut routes = RouteTable::new();
    routes.get("broken", "Broken@run");

    let dispatcher = Dispatcher::new(controllers, MiddlewareRegistry::new());
    let err = dispatcher
        .dispatch(&routes, &Request::new(Method::GET, "/broken"))
        .unwrap_err();
    assert!(matches!(err, DispatchError::Action(_)));
    assert_eq!(err.to_string(), "action failed: database unavailable");
}

#[test]
fn test_action_renders_view() {
    let renderer = Arc::new(fixture_renderer());
    let mut controllers = ControllerRegistry::new();
    let views = Arc::clone(&renderer);
    controllers.action("GreetingController", "show", move |_req, params| {
        let html = views.render("greeting", json!({ "name": params[0] }))?;
        Ok(Response::html(200, html))
    });
    let missing = Arc::clone(&renderer);
    controllers.action("GreetingController", "missing", move |_req, _params| {
        let html = missing.render("does.not.exist", json!({}))?;
        Ok(Response::html(200, html))
    });

    let mut routes = RouteTable::new();
    routes.get("greet/{name}", "GreetingController@show");
    routes.get("missing", "GreetingController@missing");

    let dispatcher = Dispatcher::new(controllers, MiddlewareRegistry::new());
    let res = dispatcher
        .dispatch(&routes, &Request::new(Method::GET, "/greet/%3Cb%3E"))
        .unwrap();
    assert_eq!(res.content_type, ContentType::Html);
    assert_eq!(res.body, "<p>%3Cb%3E</p>");

    let err = dispatcher
        .dispatch(&routes, &Request::new(Method::GET, "/missing"))
        .unwrap_err();
    assert_eq!(err.to_string(), "view error: View does.not.exist not found.");
}
