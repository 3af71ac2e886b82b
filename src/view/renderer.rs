use std::sync::Arc;

use minijinja::{AutoEscape, Environment, Value};
use serde::Serialize;
use tracing::{debug, debug_span};

use super::artifacts::ArtifactStore;
use super::compiler::compile;
use super::context::RenderContext;
use super::error::ViewError;
use super::functions;
use super::source::{ViewPaths, ViewSource};
use crate::dotenv::EnvVars;

/// Compiles and executes views, wrapping them in their declared layout.
pub struct Renderer<S = ViewPaths> {
    views: S,
    vars: Arc<EnvVars>,
    artifacts: Option<ArtifactStore>,
}

impl<S: ViewSource> Renderer<S> {
    pub fn new(views: S) -> Self {
        Self {
            views,
            vars: Arc::new(EnvVars::new()),
            artifacts: None,
        }
    }

    /// Values served by the `env()` template function ahead of the process environment.
    #[must_use]
    pub fn with_env_vars(mut self, vars: EnvVars) -> Self {
        self.vars = Arc::new(vars);
        self
    }

    /// Keep compiled bodies on disk.
    #[must_use]
    pub fn with_artifacts(mut self, store: ArtifactStore) -> Self {
        self.artifacts = Some(store);
        self
    }

    pub fn views(&self) -> &S {
        &self.views
    }

    /// Compile a view without executing it.
    ///
    /// # Errors
    ///
    /// [`ViewError::ViewNotFound`] if the view does not exist.
    pub fn compile(&self, name: &str, ctx: &mut RenderContext) -> Result<String, ViewError> {
        let source = self
            .views
            .read(name)
            .ok_or_else(|| ViewError::ViewNotFound(name.to_string()))?;
        Ok(compile(&source, ctx, &self.views))
    }

    /// Render `name` with `data` bound as template variables, using a fresh context.
    ///
    /// # Errors
    ///
    /// Missing views and layouts, template evaluation failures and artifact write failures.
    pub fn render<T: Serialize>(&self, name: &str, data: T) -> Result<String, ViewError> {
        let mut ctx = RenderContext::new();
        self.render_with(name, data, &mut ctx)
    }

    /// Render with a caller-owned context.
    ///
    /// When the view declares a layout, only the layout's output is returned; the view's own
    /// top-level markup is discarded and its sections reach the page through `@yield`.
    /// Layouts are single-level: an `@extends` inside the layout is recorded but not followed.
    ///
    /// # Errors
    ///
    /// See [`render`](Self::render).
    pub fn render_with<T: Serialize>(
        &self,
        name: &str,
        data: T,
        ctx: &mut RenderContext,
    ) -> Result<String, ViewError> {
        let span = debug_span!("render", view = name);
        let _entered = span.enter();

        let env = self.environment();
        let data = Value::from_serialize(&data);

        let compiled = self.compile(name, ctx)?;
        self.store_artifact(name, &compiled)?;
        let content = execute(&env, name, &compiled, &data)?;

        let Some(layout) = ctx.layout().map(str::to_string) else {
            return Ok(content);
        };
        debug!(layout = %layout, "Rendering layout");
        let source = self
            .views
            .read(&layout)
            .ok_or_else(|| ViewError::LayoutNotFound(layout.clone()))?;
        let compiled = compile(&source, ctx, &self.views);
        self.store_artifact(&layout, &compiled)?;
        execute(&env, &layout, &compiled, &data)
    }

    fn environment(&self) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        functions::register(&mut env, Arc::clone(&self.vars));
        env
    }

    fn store_artifact(&self, name: &str, compiled: &str) -> Result<(), ViewError> {
        if let Some(store) = &self.artifacts {
            store
                .write(&self.views.locate(name), compiled)
                .map_err(|source| ViewError::Io {
                    path: store.dir().to_path_buf(),
                    source,
                })?;
        }
        Ok(())
    }
}

fn execute(
    env: &Environment<'_>,
    view: &str,
    compiled: &str,
    data: &Value,
) -> Result<String, ViewError> {
    env.render_named_str(view, compiled, data)
        .map_err(|source| ViewError::Template {
            view: view.to_string(),
            source,
        })
}
