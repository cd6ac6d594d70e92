//! Cache backend trait definition.

use super::{CacheEntry, CacheStats};
use crate::core::fingerprint::GridSize;
use crate::error::CacheError;
use std::path::Path;
use std::time::SystemTime;

/// Trait for fingerprint cache backends
pub trait FingerprintCache: Send + Sync {
    /// Get a cached fingerprint if it exists and is still valid for the
    /// file's current size, mtime, and the requested grid size.
    fn get(
        &self,
        path: &Path,
        current_size: u64,
        current_modified: SystemTime,
        grid: GridSize,
    ) -> Result<Option<CacheEntry>, CacheError>;

    /// Store a fingerprint in the cache
    fn set(&self, entry: CacheEntry) -> Result<(), CacheError>;

    /// Remove a specific entry
    fn remove(&self, path: &Path) -> Result<(), CacheError>;

    /// Clear all cached entries
    fn clear(&self) -> Result<(), CacheError>;

    /// Get cache statistics
    fn stats(&self) -> Result<CacheStats, CacheError>;

    /// Remove entries for files that no longer exist.
    ///
    /// Returns the number of entries removed.
    fn prune_orphans(&self) -> Result<usize, CacheError>;
}
