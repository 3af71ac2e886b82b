//! # Configuration Module
//!
//! Application settings are read from a YAML file (`config/config.yaml` by default) and
//! then overridden by environment variables:
//!
//! | Variable | Field |
//! |---|---|
//! | `NINEVERSE_ADDR` | `server.addr` |
//! | `NINEVERSE_VIEWS_DIR` | `views.dir` |
//! | `NINEVERSE_ROUTES` | `routes` |
//! | `NINEVERSE_STACK_SIZE` | `server.stack_size` (decimal or `0x` hex) |
//!
//! Every field has a default, so an empty or missing file yields a runnable configuration.
//!
//! ```yaml
//! app_name: NineVerse
//! routes: routes/web.yaml
//! env_file: .env
//! server:
//!   addr: 127.0.0.1:8080
//!   stack_size: 0x8000
//! views:
//!   dir: views
//!   extension: nixs.html
//!   artifacts_dir: /tmp/nineverse
//!   artifacts_capacity: 128
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::view::{DEFAULT_ARTIFACT_CAPACITY, DEFAULT_EXTENSION};

/// Default coroutine stack size (16 KB).
pub const DEFAULT_STACK_SIZE: usize = 0x4000;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app_name: String,
    /// Route manifest
    pub routes: PathBuf,
    /// `.env` file served to the `env()` template function
    pub env_file: PathBuf,
    pub server: ServerConfig,
    pub views: ViewsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    #[serde(deserialize_with = "deserialize_stack_size")]
    pub stack_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ViewsConfig {
    pub dir: PathBuf,
    pub extension: String,
    /// Where compiled views are written; unset disables artifact output
    pub artifacts_dir: Option<PathBuf>,
    pub artifacts_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "NineVerse".to_string(),
            routes: PathBuf::from("routes/web.yaml"),
            env_file: PathBuf::from(".env"),
            server: ServerConfig::default(),
            views: ViewsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("views"),
            extension: DEFAULT_EXTENSION.to_string(),
            artifacts_dir: None,
            artifacts_capacity: DEFAULT_ARTIFACT_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Load `path` (defaults when it does not exist) and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            Self::from_yaml(&content)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse YAML content. Empty content yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed YAML.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Invalid configuration YAML")
    }

    /// Apply `NINEVERSE_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("NINEVERSE_ADDR") {
            self.server.addr = addr;
        }
        if let Some(dir) = lookup("NINEVERSE_VIEWS_DIR") {
            self.views.dir = PathBuf::from(dir);
        }
        if let Some(routes) = lookup("NINEVERSE_ROUTES") {
            self.routes = PathBuf::from(routes);
        }
        if let Some(size) = lookup("NINEVERSE_STACK_SIZE") {
            self.server.stack_size = parse_stack_size(&size).unwrap_or(DEFAULT_STACK_SIZE);
        }
    }
}

/// Parse a stack size given in decimal or `0x`-prefixed hex.
#[must_use]
pub fn parse_stack_size(value: &str) -> Option<usize> {
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

fn deserialize_stack_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(usize),
        Text(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => parse_stack_size(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid stack size: {s}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config = AppConfig::from_yaml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.views.extension, "nixs.html");
        assert_eq!(config.server.stack_size, 0x4000);
    }

    #[test]
    fn test_partial_yaml() {
        let config = AppConfig::from_yaml(
            "app_name: Demo\nserver:\n  stack_size: \"0x8000\"\nviews:\n  dir: app/views\n",
        )
        .unwrap();
        assert_eq!(config.app_name, "Demo");
        assert_eq!(config.server.stack_size, 0x8000);
        assert_eq!(config.server.addr, "127.0.0.1:8080");
        assert_eq!(config.views.dir, PathBuf::from("app/views"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("NINEVERSE_ADDR", "0.0.0.0:9000"),
            ("NINEVERSE_STACK_SIZE", "32768"),
            ("NINEVERSE_ROUTES", "r.yaml"),
        ]
        .into_iter()
        .collect();
        let mut config = AppConfig::default();
        config.apply_env(|key| env.get(key).map(|v| (*v).to_string()));
        assert_eq!(config.server.addr, "0.0.0.0:9000");
        assert_eq!(config.server.stack_size, 32768);
        assert_eq!(config.routes, PathBuf::from("r.yaml"));
        assert_eq!(config.views.dir, PathBuf::from("views"));
    }

    #[test]
    fn test_parse_stack_size() {
        assert_eq!(parse_stack_size("0x4000"), Some(16384));
        assert_eq!(parse_stack_size("16384"), Some(16384));
        assert_eq!(parse_stack_size("zz"), None);
    }
}
