//! # Hot Reload Module
//!
//! Watches the route manifest and swaps a freshly built [`RouteTable`] into the shared
//! [`ArcSwap`] whenever the file changes. Requests in flight keep the table they loaded.
//!
//! A manifest that fails to load is logged and the previous table stays active, so a
//! half-saved file never takes routing down. An empty file is treated the same way: editors
//! and `fs::write` truncate before writing, and the truncation fires its own event.
//!
//! ```rust,ignore
//! let routes = Arc::new(ArcSwap::from_pointee(load_routes("routes/web.yaml")?));
//! let watcher = watch_routes("routes/web.yaml", Arc::clone(&routes), |table| {
//!     table.log_routes();
//! })?;
//! // keep `watcher` alive for as long as reloading should happen
//! ```

use crate::router::RouteTable;
use crate::routes::{build_table, parse_routes};
use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Re-read the manifest. `Ok(None)` means the file is empty.
fn reload(path: &Path) -> Result<Option<RouteTable>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read route manifest {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    build_table(&parse_routes(&content)?).map(Some)
}

/// Watch `manifest` and replace the table in `routes` on every modification.
///
/// `on_reload` runs after each successful swap with the new table.
///
/// # Errors
///
/// Returns an error if the watcher cannot be created or the file cannot be watched.
pub fn watch_routes<P, F>(
    manifest: P,
    routes: Arc<ArcSwap<RouteTable>>,
    mut on_reload: F,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: FnMut(&RouteTable) + Send + 'static,
{
    let path: PathBuf = manifest.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    match reload(&watch_path) {
                        Ok(None) => debug!("hot-reload: manifest empty, keeping previous routes"),
                        Ok(Some(table)) => {
                            info!(routes = table.len(), "hot-reload: route table replaced");
                            let table = Arc::new(table);
                            routes.store(Arc::clone(&table));
                            on_reload(&table);
                        }
                        Err(err) => {
                            error!(error = %format!("{err:#}"), "hot-reload: keeping previous routes");
                        }
                    }
                }
            }
            Err(err) => error!(error = %err, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
