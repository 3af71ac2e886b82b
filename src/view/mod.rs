//! # View Module
//!
//! The Nixs template engine. Views are files under a views directory named by dotted paths
//! (`layouts.master` → `layouts/master.nixs.html`). A render compiles the view's directives
//! into minijinja template text ([`compile`]), evaluates it against the caller's data and,
//! when the view called `@extends`, compiles and evaluates the layout the same way and
//! returns the layout's output instead.
//!
//! ```rust
//! use std::collections::HashMap;
//! use nineverse::view::Renderer;
//!
//! let mut views = HashMap::new();
//! views.insert(
//!     "layouts.master".to_string(),
//!     "<title>@yield('title')</title>".to_string(),
//! );
//! views.insert(
//!     "home".to_string(),
//!     "@extends('layouts.master')@section('title'){{ $name }}@endsection".to_string(),
//! );
//!
//! let html = Renderer::new(views)
//!     .render("home", serde_json::json!({ "name": "<NineVerse>" }))
//!     .unwrap();
//! assert_eq!(html, "<title>&lt;NineVerse&gt;</title>");
//! ```
//!
//! ## Template helpers
//!
//! - `escape_html(value)`: what `{{ }}` expands to
//! - `env(key, default)`: `.env` value, then process environment, then `default`
//! - `method(verb)`: hidden `_method` input for spoofed forms
//! - `pairs(value)`: key/value pairs, used by `@foreach(xs as k => v)`
//! - `count(value)`: length of a sequence, map or string

mod artifacts;
mod compiler;
mod context;
mod error;
mod functions;
mod renderer;
mod source;

pub use artifacts::{ArtifactStore, DEFAULT_ARTIFACT_CAPACITY};
pub use compiler::{compile, method_field, WHILE_ITERATION_LIMIT};
pub use context::RenderContext;
pub use error::ViewError;
pub use functions::{escape_html, escape_str};
pub use renderer::Renderer;
pub use source::{ViewPaths, ViewSource, DEFAULT_EXTENSION};
