//! Per-file result cache keyed by content and configuration hashes.
//!
//! A hit is valid only when both hashes match. The cache is bound to one
//! configuration hash for its whole lifetime; loading a store recorded
//! under a different configuration discards it wholesale — there is no
//! per-check dependency tracking, by design. A miss only ever costs a full
//! re-analysis, so correctness never depends on the cache being present or
//! intact.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::violation::Violation;

/// Lowercase hex SHA-256 of a text.
#[must_use]
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[derive(Serialize)]
struct StoreOut<'a> {
    config: &'a str,
    files: &'a BTreeMap<String, Vec<Violation>>,
}

#[derive(Deserialize)]
struct StoreIn {
    config: String,
    #[serde(default)]
    files: BTreeMap<String, Vec<Violation>>,
}

/// Failed to persist the cache. Loading never fails — a missing or corrupt
/// store degrades to an empty cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// IO error writing the store.
    #[error("failed to write cache file {path}: {source}")]
    Io {
        /// Path that failed to write.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The store could not be serialized.
    #[error("failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Map from content hash to the final violation list of that content.
///
/// An empty stored list is a valid "no violations" entry, distinct from an
/// absent key. Files that failed to parse or analyze are never stored.
#[derive(Debug)]
pub struct ResultCache {
    config_hash: String,
    entries: BTreeMap<String, Vec<Violation>>,
}

impl ResultCache {
    /// An empty cache bound to a configuration hash.
    #[must_use]
    pub fn new(config_hash: impl Into<String>) -> Self {
        Self {
            config_hash: config_hash.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Loads a store from disk, discarding it if it was written under a
    /// different configuration or cannot be read.
    #[must_use]
    pub fn load(path: &Path, config_hash: &str) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Self::new(config_hash);
            }
            Err(e) => {
                warn!("failed to read cache file {}: {e}", path.display());
                return Self::new(config_hash);
            }
        };
        match serde_json::from_str::<StoreIn>(&data) {
            Ok(store) if store.config == config_hash => Self {
                config_hash: store.config,
                entries: store.files,
            },
            Ok(_) => {
                debug!("configuration changed, discarding cache {}", path.display());
                Self::new(config_hash)
            }
            Err(e) => {
                warn!("corrupt cache file {}: {e}", path.display());
                Self::new(config_hash)
            }
        }
    }

    /// The cached violation list for the given pair of hashes, if any.
    #[must_use]
    pub fn lookup(&self, content_hash: &str, config_hash: &str) -> Option<&[Violation]> {
        if config_hash != self.config_hash {
            return None;
        }
        self.entries.get(content_hash).map(Vec::as_slice)
    }

    /// Records the (possibly empty) violation list for a content hash.
    ///
    /// A store under a foreign configuration hash is a caller bug and is
    /// dropped with a warning rather than poisoning the cache.
    pub fn store(&mut self, content_hash: &str, config_hash: &str, violations: Vec<Violation>) {
        if config_hash != self.config_hash {
            warn!("refusing to cache entry under a different configuration hash");
            return;
        }
        self.entries.insert(content_hash.to_string(), violations);
    }

    /// Persists the store as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] on serialization or write failure.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let out = StoreOut {
            config: &self.config_hash,
            files: &self.entries,
        };
        let data = serde_json::to_string(&out)?;
        std::fs::write(path, data).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Number of cached files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
