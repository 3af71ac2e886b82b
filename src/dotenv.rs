//! `.env` file loading on top of `dotenvy`.
//!
//! Values are collected into an [`EnvVars`] set instead of being exported, so views read
//! them through `env()` without touching the process environment. Lines `dotenvy` cannot
//! parse are skipped with a warning.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars {
    vars: HashMap<String, String>,
}

impl EnvVars {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path`. A missing file yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns any I/O error other than `NotFound`, or a failed variable substitution.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, dotenvy::Error> {
        let path = path.as_ref();
        match dotenvy::from_path_iter(path) {
            Ok(entries) => {
                let vars = Self::collect(entries)?;
                debug!(path = %path.display(), count = vars.len(), "Loaded .env file");
                Ok(vars)
            }
            Err(err) if err.not_found() => {
                debug!(path = %path.display(), "No .env file");
                Ok(Self::new())
            }
            Err(err) => Err(err),
        }
    }

    /// Parse `.env` content held in memory.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        Self::collect(dotenvy::from_read_iter(content.as_bytes())).unwrap_or_default()
    }

    fn collect<I>(entries: I) -> Result<Self, dotenvy::Error>
    where
        I: Iterator<Item = Result<(String, String), dotenvy::Error>>,
    {
        let mut vars = HashMap::new();
        for entry in entries {
            match entry {
                Ok((key, value)) => {
                    vars.insert(key, value);
                }
                Err(dotenvy::Error::LineParse(line, index)) => {
                    warn!(line = %line, index, "Skipping unparseable .env line");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(Self { vars })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// File value for `key`, falling back to the process environment.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(str::to_string)
            .or_else(|| std::env::var(key).ok())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Export every value into the process environment.
    ///
    /// Call during startup, before any threads or coroutines are spawned.
    pub fn apply(&self) {
        for (key, value) in &self.vars {
            std::env::set_var(key, value);
        }
    }
}
