use std::collections::HashMap;

/// Sections and pending layout collected while compiling one render.
///
/// A fresh context is created for every [`Renderer::render`](super::Renderer::render) call,
/// so sections and layouts never leak between renders. Callers that want to carry state
/// across renders pass their own context to [`Renderer::render_with`](super::Renderer::render_with).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    sections: HashMap<String, String>,
    layout: Option<String>,
}

impl RenderContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout recorded by the last `@extends`.
    #[must_use]
    pub fn layout(&self) -> Option<&str> {
        self.layout.as_deref()
    }

    pub fn set_layout(&mut self, name: impl Into<String>) {
        self.layout = Some(name.into());
    }

    /// Lowered body recorded for `name`, if any.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&str> {
        self.sections.get(name).map(String::as_str)
    }

    /// Record a section body, replacing any earlier body with the same name.
    pub fn set_section(&mut self, name: impl Into<String>, body: impl Into<String>) {
        self.sections.insert(name.into(), body.into());
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn reset(&mut self) {
        self.sections.clear();
        self.layout = None;
    }
}
