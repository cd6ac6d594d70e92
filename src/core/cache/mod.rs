//! # Cache Module
//!
//! Persists fingerprints so unchanged files are not re-decoded across runs.
//!
//! ## Validation
//! An entry is served only while the file's byte size and mtime both still
//! match, and only when it was computed at the grid size the current run
//! uses. Everything else is a miss and the file is re-fingerprinted.
//!
//! ## Backends
//! - `SqliteCache` - persistent storage under the user cache directory
//! - `InMemoryCache` - tests and one-shot runs

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemoryCache;
pub use sqlite::SqliteCache;
pub use traits::FingerprintCache;

use crate::core::fingerprint::GridSize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;

/// A cached fingerprint entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub path: PathBuf,
    /// Raw fingerprint bytes
    pub fingerprint: Vec<u8>,
    /// Grid size the fingerprint was computed at
    pub grid: GridSize,
    /// Image dimensions at time of fingerprinting
    pub width: u32,
    pub height: u32,
    /// File size at time of fingerprinting
    pub file_size: u64,
    /// File modification time at time of fingerprinting
    pub file_modified: SystemTime,
    /// When the entry was cached
    pub cached_at: SystemTime,
}

impl CacheEntry {
    /// Check whether this entry still describes the file on disk.
    ///
    /// Timestamps compare at second precision since SQLite stores seconds.
    pub fn is_valid_for(&self, file_size: u64, file_modified: SystemTime, grid: GridSize) -> bool {
        let to_secs = |t: SystemTime| {
            t.duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        };

        self.file_size == file_size
            && to_secs(self.file_modified) == to_secs(file_modified)
            && self.grid == grid
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    /// Total size of stored fingerprint bytes
    pub total_size_bytes: u64,
}
