use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

/// File extension appended to dotted view names.
pub const DEFAULT_EXTENSION: &str = "nixs.html";

/// Where view sources come from.
pub trait ViewSource {
    /// Raw source of the view called `name` (dotted), or `None` when it does not exist.
    fn read(&self, name: &str) -> Option<String>;

    /// Human-readable location of `name`, used to key compiled artifacts.
    fn locate(&self, name: &str) -> String {
        name.to_string()
    }
}

/// Views on disk: `layouts.master` → `<root>/layouts/master.nixs.html`.
#[derive(Debug, Clone)]
pub struct ViewPaths {
    root: PathBuf,
    extension: String,
}

impl ViewPaths {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    #[must_use]
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a dotted name onto the view directory.
    ///
    /// Each `.`-separated segment becomes one path component; empty segments are dropped so
    /// a name can never climb out of the root.
    #[must_use]
    pub fn resolve(&self, name: &str) -> PathBuf {
        let mut path = self.root.clone();
        let segments: Vec<&str> = name.split('.').filter(|s| !s.is_empty()).collect();
        if let Some((last, dirs)) = segments.split_last() {
            for dir in dirs {
                path.push(dir);
            }
            path.push(format!("{last}.{}", self.extension));
        }
        path
    }
}

impl ViewSource for ViewPaths {
    fn read(&self, name: &str) -> Option<String> {
        let path = self.resolve(name);
        match fs::read_to_string(&path) {
            Ok(source) => Some(source),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(view = name, path = %path.display(), error = %err, "Unreadable view");
                None
            }
        }
    }

    fn locate(&self, name: &str) -> String {
        self.resolve(name).display().to_string()
    }
}

/// In-memory views keyed by dotted name.
impl ViewSource for HashMap<String, String> {
    fn read(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<S: ViewSource + ?Sized> ViewSource for &S {
    fn read(&self, name: &str) -> Option<String> {
        (**self).read(name)
    }

    fn locate(&self, name: &str) -> String {
        (**self).locate(name)
    }
}
