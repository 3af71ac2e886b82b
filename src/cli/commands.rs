use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use super::serve::serve;
use crate::config::{AppConfig, DEFAULT_CONFIG_PATH};
use crate::generator::{self, RouteVerb, Scaffold};
use crate::logging;
use crate::view::{RenderContext, Renderer, ViewPaths};

/// Command-line interface for NineVerse applications
#[derive(Parser)]
#[command(name = "fany")]
#[command(about = "Fany: the NineVerse command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the route manifest; `ViewController@<view>` actions render views, others echo
    Serve {
        /// Application config file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Route manifest (overrides the config)
        #[arg(long)]
        routes: Option<PathBuf>,

        /// Views directory (overrides the config)
        #[arg(long)]
        views: Option<PathBuf>,

        /// Address and port to bind (overrides the config)
        #[arg(long)]
        addr: Option<String>,

        /// Reload the route manifest when it changes
        #[arg(long, default_value_t = false)]
        watch: bool,
    },
    /// Create a controller with resource actions
    #[command(name = "make:controller")]
    MakeController {
        name: String,

        #[arg(long, default_value = "src/controllers")]
        dir: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },
    /// Create a middleware
    #[command(name = "make:middleware")]
    MakeMiddleware {
        name: String,

        #[arg(long, default_value = "src/middleware")]
        dir: PathBuf,

        #[arg(short, long, default_value_t = false)]
        force: bool,
    },
    /// Create an empty view (dotted name)
    #[command(name = "make:view")]
    MakeView {
        name: String,

        #[arg(long, default_value = "views")]
        views: PathBuf,

        #[arg(short, long, default_value_t = false)]
        force: bool,
    },
    /// Append resource routes to the manifest
    #[command(name = "make:route")]
    MakeRoute {
        name: String,

        /// GET <name> → index
        #[arg(long)]
        get: bool,

        /// POST <name> → create
        #[arg(long)]
        post: bool,

        /// PUT <name> → update
        #[arg(long)]
        put: bool,

        /// DELETE <name>/{id} → destroy
        #[arg(long)]
        delete: bool,

        /// Controller class (default: <Name>Controller)
        #[arg(long)]
        controller: Option<String>,

        /// Middleware spec attached to every new route (repeatable)
        #[arg(short, long)]
        middleware: Vec<String>,

        #[arg(long, default_value = "routes/web.yaml")]
        routes: PathBuf,
    },
    /// Print the compiled form of a view
    Compile {
        view: String,

        #[arg(long, default_value = "views")]
        views: PathBuf,
    },
}

impl Commands {
    /// Verbs selected by the `make:route` flags, in GET/POST/PUT/DELETE order.
    #[must_use]
    pub fn route_verbs(get: bool, post: bool, put: bool, delete: bool) -> Vec<RouteVerb> {
        [
            (get, RouteVerb::Get),
            (post, RouteVerb::Post),
            (put, RouteVerb::Put),
            (delete, RouteVerb::Delete),
        ]
        .into_iter()
        .filter_map(|(selected, verb)| selected.then_some(verb))
        .collect()
    }
}

/// Parse arguments, initialise logging and execute the command.
///
/// # Errors
///
/// Returns an error if logging cannot be initialised or the command fails.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init_logging()?;
    run(cli)
}

/// Execute an already-parsed command line.
///
/// # Errors
///
/// Config, manifest, view and file system failures, and server start-up errors.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            config,
            routes,
            views,
            addr,
            watch,
        } => {
            let mut app = AppConfig::load(&config)?;
            if let Some(routes) = routes {
                app.routes = routes;
            }
            if let Some(views) = views {
                app.views.dir = views;
            }
            if let Some(addr) = addr {
                app.server.addr = addr;
            }
            let handle = serve(&app, watch)?;
            handle
                .join()
                .map_err(|e| anyhow!("server coroutine panicked: {e:?}"))
        }
        Commands::MakeController { name, dir, force } => {
            report("Controller", &generator::make_controller(&dir, &name, force)?);
            Ok(())
        }
        Commands::MakeMiddleware { name, dir, force } => {
            report("Middleware", &generator::make_middleware(&dir, &name, force)?);
            Ok(())
        }
        Commands::MakeView { name, views, force } => {
            report("View", &generator::make_view(&ViewPaths::new(views), &name, force)?);
            Ok(())
        }
        Commands::MakeRoute {
            name,
            get,
            post,
            put,
            delete,
            controller,
            middleware,
            routes,
        } => {
            let verbs = Commands::route_verbs(get, post, put, delete);
            let added =
                generator::add_routes(&routes, &name, &verbs, controller.as_deref(), &middleware)?;
            println!("✅ Route(s) added to {}:", routes.display());
            for def in added {
                println!("   {} {} → {}", def.method, def.path, def.action);
            }
            Ok(())
        }
        Commands::Compile { view, views } => {
            let renderer = Renderer::new(ViewPaths::new(views));
            let mut ctx = RenderContext::new();
            let compiled = renderer.compile(&view, &mut ctx)?;
            println!("{compiled}");
            if let Some(layout) = ctx.layout() {
                eprintln!("layout: {layout}");
            }
            Ok(())
        }
    }
}

fn report(kind: &str, outcome: &Scaffold) {
    match outcome {
        Scaffold::Written(path) => println!("✅ {kind} created: {}", path.display()),
        Scaffold::Skipped(path) => println!(
            "⚠️  {kind} already exists: {} (use --force to overwrite)",
            path.display()
        ),
    }
}
