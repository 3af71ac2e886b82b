use arc_swap::ArcSwap;
use http::Method;
use nineverse::hot_reload::watch_routes;
use nineverse::routes::{build_table, load_routes, parse_routes, save_routes, RouteDef};
use std::sync::{Arc, Mutex};
use std::time::Duration;

mod common;
use common::temp_files;

const MANIFEST: &str = r#"
- method: GET
  path: /
  action: HomeController@index
- method: any
  path: "{page}"
  action: PageController@show
  middleware:
    - Log
    - Auth#secret
- method: post
  path: users
  action: UserController@store
"#;

#[test]
fn test_load_manifest() {
    let path = temp_files::create_temp_yaml(MANIFEST);
    let routes = load_routes(&path).unwrap();

    // 1 GET + 4 for ANY + 1 POST
    assert_eq!(routes.len(), 6);

    let (home, _) = routes.find(&Method::GET, "").unwrap();
    assert_eq!(home.action().to_string(), "HomeController@index");

    let (page, params) = routes.find(&Method::DELETE, "about").unwrap();
    assert_eq!(page.action().to_string(), "PageController@show");
    assert_eq!(params.as_slice(), ["about"]);
    let specs: Vec<String> = page.middleware().iter().map(ToString::to_string).collect();
    assert_eq!(specs, ["Log", "Auth#secret"]);

    // `{page}` was registered for POST before `users`, so it wins.
    let (post, _) = routes.find(&Method::POST, "users").unwrap();
    assert_eq!(post.pattern(), "{page}");

    temp_files::cleanup_temp_files(&[path]);
}

#[test]
fn test_invalid_method_rejected() {
    let defs = parse_routes("- { method: \"GE T\", path: x, action: A@b }").unwrap();
    let err = build_table(&defs).unwrap_err();
    assert!(err.to_string().contains("Invalid method"));
}

#[test]
fn test_empty_manifest() {
    assert!(parse_routes("").unwrap().is_empty());
    assert!(parse_routes("not: [a, list").is_err());
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("routes").join("web.yaml");
    let defs = vec![
        RouteDef::new("get", "posts/{id}", "PostController@show").with_middleware("Auth"),
        RouteDef::new("DELETE", "posts/{id}", "PostController@destroy"),
    ];
    save_routes(&path, &defs).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(parse_routes(&content).unwrap(), defs);
    let routes = load_routes(&path).unwrap();
    assert!(routes.find(&Method::GET, "posts/1").is_some());
    assert!(routes.find(&Method::DELETE, "posts/1").is_some());
}

#[test]
fn test_watch_routes_reload() {
    const V1: &str = "- { method: GET, path: foo, action: FooController@one }\n";
    const V2: &str = "- { method: GET, path: foo, action: FooController@two }\n";
    const BROKEN: &str = "- { method: GET, path: foo, action: [\n";

    let path = temp_files::create_temp_yaml(V1);
    let routes = Arc::new(ArcSwap::from_pointee(load_routes(&path).unwrap()));

    let reloads: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&reloads);
    let _watcher = watch_routes(&path, Arc::clone(&routes), move |table| {
        if let Some((entry, _)) = table.find(&Method::GET, "foo") {
            seen.lock().unwrap().push(entry.action().to_string());
        }
    })
    .expect("watch_routes");

    // allow watcher thread to start
    std::thread::sleep(Duration::from_millis(100));
    std::fs::write(&path, V2).unwrap();

    for _ in 0..20 {
        if !reloads.lock().unwrap().is_empty() {
            break;
        }
        std::thread::sleep(Duration::from_millis(100));
    }

    let current = routes.load();
    let (entry, _) = current.find(&Method::GET, "foo").unwrap();
    assert_eq!(entry.action().to_string(), "FooController@two");
    assert!(reloads
        .lock()
        .unwrap()
        .iter()
        .any(|action| action == "FooController@two"));

    // A broken manifest keeps the previous table.
    std::fs::write(&path, BROKEN).unwrap();
    std::thread::sleep(Duration::from_millis(300));
    let current = routes.load();
    let (entry, _) = current.find(&Method::GET, "foo").unwrap();
    assert_eq!(entry.action().to_string(), "FooController@two");

    temp_files::cleanup_temp_files(&[path]);
}
