use std::num::NonZeroUsize;
use std::sync::Arc;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use serde_json::json;
use tracing::info;

use crate::config::AppConfig;
use crate::dispatcher::{DispatchError, Dispatcher};
use crate::dotenv::EnvVars;
use crate::hot_reload::watch_routes;
use crate::middleware::MiddlewareRegistry;
use crate::registry::{ActionFn, ControllerRegistry};
use crate::router::RouteTable;
use crate::routes::load_routes;
use crate::server::{AppService, HttpServer, Request, Response, ServerHandle};
use crate::view::{ArtifactStore, Renderer, ViewPaths};

/// Controller name whose method is the dotted name of a view to render.
pub const VIEW_CONTROLLER: &str = "ViewController";

/// Build the renderer described by `config`.
///
/// # Errors
///
/// Fails if the `.env` file is unreadable or the artifact directory cannot be created.
pub fn build_renderer(config: &AppConfig) -> Result<Renderer> {
    let views = ViewPaths::new(&config.views.dir).with_extension(&config.views.extension);
    let vars = EnvVars::load(&config.env_file)
        .with_context(|| format!("Failed to read {}", config.env_file.display()))?;
    let mut renderer = Renderer::new(views).with_env_vars(vars);
    if let Some(dir) = &config.views.artifacts_dir {
        let capacity = NonZeroUsize::new(config.views.artifacts_capacity).unwrap_or(NonZeroUsize::MIN);
        let store = ArtifactStore::new(dir, capacity)
            .with_context(|| format!("Failed to create artifact dir {}", dir.display()))?;
        renderer = renderer.with_artifacts(store);
    }
    Ok(renderer)
}

/// Controllers for the development server.
///
/// `ViewController@home.index` renders view `home.index` with `{params, input}`; every other
/// `Controller@method` answers with a JSON description of the matched request.
pub fn dev_controllers(renderer: Arc<Renderer>) -> ControllerRegistry {
    let mut registry = ControllerRegistry::new();
    registry.with_resolver(move |controller, method| {
        let action: ActionFn = if controller == VIEW_CONTROLLER {
            let renderer = Arc::clone(&renderer);
            let view = method.to_string();
            Arc::new(move |req: &Request, params: &[String]| -> Result<Response, DispatchError> {
                let html = renderer.render(&view, json!({ "params": params, "input": req.input }))?;
                Ok(Response::html(200, html))
            })
        } else {
            let name = format!("{controller}@{method}");
            Arc::new(move |req: &Request, params: &[String]| -> Result<Response, DispatchError> {
                Ok(echo(&name, req, params))
            })
        };
        Some(action)
    });
    registry
}

/// JSON description of a dispatched request.
#[must_use]
pub fn echo(action: &str, req: &Request, params: &[String]) -> Response {
    Response::json(
        200,
        &json!({
            "action": action,
            "method": req.method.as_str(),
            "path": req.path(),
            "params": params,
            "input": req.input,
            "request_id": req.request_id,
        }),
    )
}

/// Start the development server described by `config`.
///
/// # Errors
///
/// Renderer, manifest, watcher and bind failures.
pub fn serve(config: &AppConfig, watch: bool) -> Result<ServerHandle> {
    may::config().set_stack_size(config.server.stack_size);

    let renderer = Arc::new(build_renderer(config)?);
    let table = load_routes(&config.routes)?;
    table.log_routes();
    let routes = Arc::new(ArcSwap::from_pointee(table));

    let dispatcher = Dispatcher::new(dev_controllers(renderer), MiddlewareRegistry::with_builtins());
    let mut service = AppService::new(Arc::clone(&routes), Arc::new(dispatcher));
    if watch {
        let watcher = watch_routes(&config.routes, Arc::clone(&routes), |table: &RouteTable| {
            table.log_routes();
        })
        .with_context(|| format!("Failed to watch {}", config.routes.display()))?;
        service.watcher = Some(watcher);
    }

    info!(app = %config.app_name, addr = %config.server.addr, "Starting server");
    let handle = HttpServer(service)
        .start(config.server.addr.as_str())
        .with_context(|| format!("Failed to bind {}", config.server.addr))?;
    Ok(handle)
}
