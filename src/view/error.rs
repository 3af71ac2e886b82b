use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors raised while rendering a view.
#[derive(Debug)]
pub enum ViewError {
    /// The requested view does not exist
    ViewNotFound(String),
    /// The view extends a layout that does not exist
    LayoutNotFound(String),
    /// The compiled text failed to parse or evaluate
    Template {
        view: String,
        source: minijinja::Error,
    },
    /// Writing a compiled artifact failed
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::ViewNotFound(name) => write!(f, "View {name} not found."),
            ViewError::LayoutNotFound(name) => write!(f, "Layout {name} not found."),
            ViewError::Template { view, source } => {
                write!(f, "failed to render view {view}: {source}")
            }
            ViewError::Io { path, source } => {
                write!(f, "failed to write compiled view {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewError::Template { source, .. } => Some(source),
            ViewError::Io { source, .. } => Some(source),
            ViewError::ViewNotFound(_) | ViewError::LayoutNotFound(_) => None,
        }
    }
}
