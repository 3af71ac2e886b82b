//! # CLI Module
//!
//! The `fany` command line.
//!
//! ```bash
//! # Serve routes/web.yaml with views from views/
//! fany serve --watch
//!
//! # Scaffolding
//! fany make:controller user
//! fany make:middleware audit
//! fany make:view users.index
//! fany make:route user --get --post --delete -m Auth
//!
//! # Inspect what a view compiles to
//! fany compile layouts.master
//! ```

mod commands;
mod serve;

pub use commands::{run, run_cli, Cli, Commands};
pub use serve::{build_renderer, dev_controllers, echo, serve, VIEW_CONTROLLER};
