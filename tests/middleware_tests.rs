use http::Method;
use nineverse::dispatcher::{DispatchError, Unresolved};
use nineverse::middleware::{Middleware, MiddlewareRegistry, MiddlewareSpec};
use nineverse::server::{Request, Response};
use std::sync::{Arc, Mutex};

/// Admits only the roles named in its arguments, read from the `x-role` header.
struct RoleMiddleware;

impl Middleware for RoleMiddleware {
    fn handle(&self, req: &Request, args: &[String]) -> Option<Response> {
        let role = req.header("x-role").unwrap_or_default();
        if args.iter().any(|allowed| allowed == role) {
            None
        } else {
            Some(Response::text(403, format!("role '{role}' not allowed")))
        }
    }
}

fn run(registry: &MiddlewareRegistry, spec: &str, req: &Request) -> Option<Response> {
    registry.run(&MiddlewareSpec::parse(spec), req).unwrap()
}

#[test]
fn test_simple_form_calls_handle_without_args() {
    let seen: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let mut registry = MiddlewareRegistry::new();
    registry.register("Record", move || {
        let recorder = Arc::clone(&recorder);
        move |_req: &Request, args: &[String]| -> Option<Response> {
            recorder.lock().unwrap().push(args.to_vec());
            None
        }
    });

    let req = Request::new(Method::GET, "/");
    assert!(run(&registry, "Record", &req).is_none());
    assert!(run(&registry, "Record#a&b", &req).is_none());
    assert_eq!(
        *seen.lock().unwrap(),
        vec![Vec::<String>::new(), vec!["a".to_string(), "b".to_string()]]
    );
}

#[test]
fn test_args_form_reaches_instance() {
    let mut registry = MiddlewareRegistry::new();
    registry.register("Role", || RoleMiddleware);

    let editor = Request::new(Method::GET, "/").with_header("X-Role", "editor");
    assert!(run(&registry, "Role#admin&editor", &editor).is_none());

    let guest = Request::new(Method::GET, "/").with_header("X-Role", "guest");
    let res = run(&registry, "Role#admin&editor", &guest).unwrap();
    assert_eq!(res.status, 403);
    assert_eq!(res.body, "role 'guest' not allowed");
}

#[test]
fn test_static_form_receives_args() {
    let mut registry = MiddlewareRegistry::new();
    registry.register_static("Throttle", "limit", |_req: &Request, args: &[String]| {
        let max: usize = args.first().and_then(|a| a.parse().ok()).unwrap_or(0);
        (max < 10).then(|| Response::text(429, format!("limit {max}")))
    });

    let req = Request::new(Method::GET, "/");
    assert!(run(&registry, "Throttle@limit:60", &req).is_none());
    assert_eq!(run(&registry, "Throttle@limit:5", &req).unwrap().body, "limit 5");
    assert_eq!(run(&registry, "Throttle@limit", &req).unwrap().body, "limit 0");
}

#[test]
fn test_auth_builtin() {
    let registry = MiddlewareRegistry::with_builtins();

    let anonymous = Request::new(Method::GET, "/");
    let denied = run(&registry, "Auth", &anonymous).unwrap();
    assert_eq!(denied.status, 401);
    assert_eq!(denied.body, r#"{"error":"Unauthorized"}"#);

    let any_token = Request::new(Method::GET, "/").with_header("Authorization", "whatever");
    assert!(run(&registry, "Auth", &any_token).is_none());

    let bearer = Request::new(Method::GET, "/").with_header("Authorization", "Bearer s3cret");
    assert!(run(&registry, "Auth#other&s3cret", &bearer).is_none());
    assert_eq!(run(&registry, "Auth#other", &bearer).unwrap().status, 401);
}

#[test]
fn test_log_builtin_passes() {
    let registry = MiddlewareRegistry::with_builtins();
    let req = Request::new(Method::POST, "/audit");
    assert!(run(&registry, "Log#audit", &req).is_none());
}

#[test]
fn test_resolution_errors() {
    let mut registry = MiddlewareRegistry::new();
    registry.register_static("OnlyStatic", "check", |_req: &Request, _args: &[String]| None);
    let req = Request::new(Method::GET, "/");

    let err = registry
        .run(&MiddlewareSpec::parse("Nope"), &req)
        .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::UnresolvedHandler(Unresolved::Middleware(_))
    ));

    let err = registry
        .run(&MiddlewareSpec::parse("OnlyStatic"), &req)
        .unwrap_err();
    assert_eq!(err.to_string(), "unresolved handler: handle() not found in OnlyStatic.");

    let err = registry
        .run(&MiddlewareSpec::parse("OnlyStatic@missing:1"), &req)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "unresolved handler: Method missing not found in middleware OnlyStatic."
    );
}
