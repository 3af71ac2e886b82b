use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use lru::LruCache;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// Default number of compiled artifacts kept on disk.
pub const DEFAULT_ARTIFACT_CAPACITY: usize = 256;

/// On-disk store of compiled view bodies, bounded by an LRU policy.
///
/// Every compile writes a new `nixs_<sha256>.html` file keyed by the source location and
/// the compile time. Once more than `capacity` files exist, the least recently written file
/// is deleted.
pub struct ArtifactStore {
    dir: PathBuf,
    written: Mutex<LruCache<PathBuf, ()>>,
}

impl ArtifactStore {
    /// Create the store, creating `dir` if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new<P: Into<PathBuf>>(dir: P, capacity: NonZeroUsize) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            written: Mutex::new(LruCache::new(capacity)),
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of artifacts currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write `compiled` for the view at `location` and return the artifact path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self, location: &str, compiled: &str) -> io::Result<PathBuf> {
        let path = self.dir.join(artifact_name(location));
        fs::write(&path, compiled)?;
        debug!(view = location, artifact = %path.display(), "Compiled view written");

        let evicted = self
            .written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.clone(), ());
        if let Some((old, ())) = evicted {
            if old != path {
                if let Err(err) = fs::remove_file(&old) {
                    warn!(artifact = %old.display(), error = %err, "Failed to remove evicted artifact");
                }
            }
        }
        Ok(path)
    }
}

fn artifact_name(location: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(location.as_bytes());
    hasher.update(nanos.to_string().as_bytes());
    let hash: String = hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();
    format!("nixs_{hash}.html")
}
