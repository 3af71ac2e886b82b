use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use http::Method;
use tracing::info;

use super::RouteDef;
use crate::router::RouteTable;

/// Parse manifest YAML. Empty content is an empty manifest.
///
/// # Errors
///
/// Returns an error on malformed YAML.
pub fn parse_routes(content: &str) -> Result<Vec<RouteDef>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yaml::from_str(content).context("Invalid route manifest")
}

/// Register `defs` into a new table, in order.
///
/// # Errors
///
/// Returns an error for a method that is neither `ANY` nor a valid HTTP method token.
pub fn build_table(defs: &[RouteDef]) -> Result<RouteTable> {
    let mut table = RouteTable::new();
    for def in defs {
        let verb = def.method.trim().to_ascii_uppercase();
        let mut handle = if verb == "ANY" {
            table.any(&def.path, def.action.as_str())
        } else {
            let Ok(method) = Method::from_bytes(verb.as_bytes()) else {
                bail!("Invalid method '{}' for route '{}'", def.method, def.path);
            };
            table.register(method, &def.path, def.action.as_str())
        };
        for spec in &def.middleware {
            handle = handle.middleware(spec);
        }
    }
    Ok(table)
}

/// Load the manifest at `path` into a [`RouteTable`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid manifest.
pub fn load_routes<P: AsRef<Path>>(path: P) -> Result<RouteTable> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read route manifest {}", path.display()))?;
    let defs = parse_routes(&content)
        .with_context(|| format!("Failed to parse route manifest {}", path.display()))?;
    let table = build_table(&defs)
        .with_context(|| format!("Failed to build routes from {}", path.display()))?;
    info!(path = %path.display(), routes = table.len(), "Route manifest loaded");
    Ok(table)
}

/// Write `defs` back to `path` as YAML.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save_routes<P: AsRef<Path>>(path: P, defs: &[RouteDef]) -> Result<()> {
    let path = path.as_ref();
    let yaml = serde_yaml::to_string(defs).context("Failed to serialize route manifest")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, yaml).with_context(|| format!("Failed to write {}", path.display()))
}
