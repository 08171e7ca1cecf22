//! Durable key/value cache.
//!
//! One typed interface over two schemas: the cart-line list (survives
//! restarts) and the session-scoped pending action slot. Reads are
//! tolerant: a corrupt or missing payload is `None`, logged and never
//! fatal - losing a cached cart is an inconvenience, not an error.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Cache keys. One constant per schema; callers never invent keys.
pub mod keys {
    /// Durable cart-line list.
    pub const CART_LINES: &str = "cart_lines";
    /// Single-slot pending cart action (session-scoped).
    pub const PENDING_ACTION: &str = "pending_action";
}

/// Typed durable storage.
pub trait DurableCache {
    /// Read and deserialize a value. Missing or corrupt payloads are `None`.
    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T>;

    /// Serialize and write a value. Failures are logged, not surfaced.
    fn set<T: Serialize>(&self, key: &str, value: &T);

    /// Delete a key. Absent keys are a no-op.
    fn clear(&self, key: &str);
}

// =============================================================================
// In-memory implementation (tests, ephemeral sessions)
// =============================================================================

/// Ephemeral cache backed by a map of JSON strings.
#[derive(Default)]
pub struct MemoryCache {
    entries: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, std::collections::HashMap<String, String>> {
        // A poisoned lock means a panicked writer; the map itself is still
        // just strings, so keep going with it.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl DurableCache for MemoryCache {
    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = self.lock();
        let raw = entries.get(key)?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "corrupt cache payload, treating as absent");
                None
            }
        }
    }

    fn set<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => {
                self.lock().insert(key.to_owned(), raw);
            }
            Err(e) => tracing::warn!(key, error = %e, "failed to serialize cache payload"),
        }
    }

    fn clear(&self, key: &str) {
        self.lock().remove(key);
    }
}

// =============================================================================
// On-disk implementation
// =============================================================================

/// Durable cache as one JSON file per key under a directory.
pub struct JsonFileCache {
    dir: std::path::PathBuf,
}

impl JsonFileCache {
    /// Create a cache rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns the IO error if the directory cannot be created.
    pub fn new(dir: impl Into<std::path::PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl DurableCache for JsonFileCache {
    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = std::fs::read_to_string(self.path(key)).ok()?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "corrupt cache file, treating as absent");
                None
            }
        }
    }

    fn set<T: Serialize>(&self, key: &str, value: &T) {
        let payload = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize cache payload");
                return;
            }
        };
        if let Err(e) = std::fs::write(self.path(key), payload) {
            tracing::warn!(key, error = %e, "failed to write cache file");
        }
    }

    fn clear(&self, key: &str) {
        if let Err(e) = std::fs::remove_file(self.path(key))
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(key, error = %e, "failed to remove cache file");
        }
    }
}
