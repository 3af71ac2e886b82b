//! Welcome demo: routes from `routes/web.yaml`, controllers registered in code, Nixs views.
//!
//! ```bash
//! cargo run --example welcome
//! curl http://127.0.0.1:8080/
//! curl -X POST -d '_method=PUT&name=Ada' http://127.0.0.1:8080/users/1
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use arc_swap::ArcSwap;
use nineverse::config::DEFAULT_STACK_SIZE;
use nineverse::dispatcher::{DispatchError, Dispatcher};
use nineverse::dotenv::EnvVars;
use nineverse::hot_reload::watch_routes;
use nineverse::logging;
use nineverse::middleware::MiddlewareRegistry;
use nineverse::registry::ControllerRegistry;
use nineverse::routes::load_routes;
use nineverse::server::{AppService, HttpServer, Request, Response};
use nineverse::view::{Renderer, ViewPaths};
use serde_json::json;
use tracing::warn;

fn demo_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join("welcome")
}

fn controllers(views: &Arc<Renderer>) -> ControllerRegistry {
    let mut registry = ControllerRegistry::new();

    let renderer = Arc::clone(views);
    registry.action("HomeController", "index", move |_req, _params| {
        let features = ["Ordered route table", "Middleware chains", "Nixs templates"];
        let html = renderer.render("home", json!({ "features": features }))?;
        Ok(Response::html(200, html))
    });

    let renderer = Arc::clone(views);
    registry.action("UserController", "show", move |req, params| {
        let html = renderer.render(
            "users.show",
            json!({
                "id": params[0],
                "name": req.input_str("name").unwrap_or("Guest"),
                "stars": 3,
            }),
        )?;
        Ok(Response::html(200, html))
    });

    registry.action("UserController", "update", |req, params| {
        let name = req
            .input_str("name")
            .ok_or_else(|| DispatchError::Action(anyhow!("missing field 'name'")))?;
        Ok(Response::json(200, &json!({ "id": params[0], "name": name })))
    });

    registry.action("UserController", "destroy", |_req, params| {
        Ok(Response::json(200, &json!({ "deleted": params[0] })))
    });

    registry
}

fn main() -> Result<()> {
    let _guard = logging::init_logging()?;
    may::config().set_stack_size(DEFAULT_STACK_SIZE);

    let base = demo_dir();
    let vars = EnvVars::load(base.join(".env"))?;
    let renderer = Arc::new(Renderer::new(ViewPaths::new(base.join("views"))).with_env_vars(vars));

    let manifest = base.join("routes").join("web.yaml");
    let table = load_routes(&manifest)?;
    table.log_routes();
    let routes = Arc::new(ArcSwap::from_pointee(table));

    let not_found_views = Arc::clone(&renderer);
    let dispatcher = Dispatcher::new(controllers(&renderer), MiddlewareRegistry::with_builtins())
        .with_not_found(move |req: &Request| {
            match not_found_views.render("errors.404", json!({ "path": req.path() })) {
                Ok(html) => Response::html(404, html),
                Err(err) => {
                    warn!(error = %err, "Failed to render 404 page");
                    Response::not_found()
                }
            }
        });

    let mut service = AppService::new(Arc::clone(&routes), Arc::new(dispatcher));
    service.watcher = Some(watch_routes(&manifest, Arc::clone(&routes), |table| {
        table.log_routes();
    })?);

    let addr = std::env::var("NINEVERSE_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let handle = HttpServer(service).start(addr.as_str())?;
    println!("🚀 Welcome demo listening on http://{}", handle.addr());
    handle
        .join()
        .map_err(|e| anyhow!("server coroutine panicked: {e:?}"))
}
