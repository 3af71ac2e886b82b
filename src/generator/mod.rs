//! # Generator Module
//!
//! Scaffolding behind the `fany make:*` commands. Source files are rendered from askama
//! templates under `templates/`; routes are appended to the YAML manifest.
//!
//! Existing files are left untouched unless `force` is set; the returned [`Scaffold`] says
//! which happened.

mod scaffold;
mod templates;

pub use scaffold::{
    add_routes, controller_class, make_controller, make_middleware, make_view, middleware_class,
    ucfirst, RouteVerb, Scaffold,
};
pub use templates::{
    ActionStub, ControllerTemplate, MiddlewareTemplate, ViewTemplate, RESOURCE_ACTIONS,
};
