//! In-memory cache backend.

use super::{CacheEntry, CacheStats, FingerprintCache};
use crate::core::fingerprint::GridSize;
use crate::error::CacheError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::SystemTime;

/// In-memory cache backend
///
/// Backs tests and one-shot runs where persistence isn't wanted.
pub struct InMemoryCache {
    entries: RwLock<HashMap<PathBuf, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintCache for InMemoryCache {
    fn get(
        &self,
        path: &Path,
        current_size: u64,
        current_modified: SystemTime,
        grid: GridSize,
    ) -> Result<Option<CacheEntry>, CacheError> {
        let entries = self.entries.read().map_err(|_| CacheError::Corrupted {
            path: PathBuf::from("memory"),
        })?;

        if let Some(entry) = entries.get(path) {
            if entry.is_valid_for(current_size, current_modified, grid) {
                return Ok(Some(entry.clone()));
            }
        }

        Ok(None)
    }

    fn set(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Corrupted {
            path: PathBuf::from("memory"),
        })?;

        entries.insert(entry.path.clone(), entry);
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Corrupted {
            path: PathBuf::from("memory"),
        })?;

        entries.remove(path);
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Corrupted {
            path: PathBuf::from("memory"),
        })?;

        entries.clear();
        Ok(())
    }

    fn stats(&self) -> Result<CacheStats, CacheError> {
        let entries = self.entries.read().map_err(|_| CacheError::Corrupted {
            path: PathBuf::from("memory"),
        })?;

        Ok(CacheStats {
            total_entries: entries.len(),
            total_size_bytes: entries.values().map(|e| e.fingerprint.len() as u64).sum(),
        })
    }

    fn prune_orphans(&self) -> Result<usize, CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Corrupted {
            path: PathBuf::from("memory"),
        })?;

        let before = entries.len();
        entries.retain(|path, _| path.exists());
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> CacheEntry {
        let now = SystemTime::now();
        CacheEntry {
            path: PathBuf::from(path),
            fingerprint: vec![0xDE, 0xAD, 0xBE, 0xEF],
            grid: GridSize::Standard,
            width: 32,
            height: 32,
            file_size: 1000,
            file_modified: now,
            cached_at: now,
        }
    }

    #[test]
    fn miss_returns_none() {
        let cache = InMemoryCache::new();
        let result = cache
            .get(
                Path::new("/none.png"),
                1000,
                SystemTime::now(),
                GridSize::Standard,
            )
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn hit_returns_entry() {
        let cache = InMemoryCache::new();
        let e = entry("/a.png");
        let modified = e.file_modified;
        cache.set(e).unwrap();

        let result = cache
            .get(Path::new("/a.png"), 1000, modified, GridSize::Standard)
            .unwrap();

        assert_eq!(result.unwrap().fingerprint, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn wrong_grid_size_is_a_miss() {
        let cache = InMemoryCache::new();
        let e = entry("/a.png");
        let modified = e.file_modified;
        cache.set(e).unwrap();

        let result = cache
            .get(Path::new("/a.png"), 1000, modified, GridSize::Fine)
            .unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn modified_file_is_a_miss() {
        let cache = InMemoryCache::new();
        let e = entry("/a.png");
        let later = e.file_modified + std::time::Duration::from_secs(60);
        cache.set(e).unwrap();

        let result = cache
            .get(Path::new("/a.png"), 1000, later, GridSize::Standard)
            .unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = InMemoryCache::new();
        cache.set(entry("/a.png")).unwrap();
        cache.set(entry("/b.png")).unwrap();

        cache.clear().unwrap();

        assert_eq!(cache.stats().unwrap().total_entries, 0);
    }

    #[test]
    fn stats_count_entries_and_bytes() {
        let cache = InMemoryCache::new();
        cache.set(entry("/a.png")).unwrap();
        cache.set(entry("/b.png")).unwrap();

        let stats = cache.stats().unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.total_size_bytes, 8);
    }

    #[test]
    fn remove_deletes_one_entry() {
        let cache = InMemoryCache::new();
        let e = entry("/a.png");
        let modified = e.file_modified;
        cache.set(e).unwrap();

        cache.remove(Path::new("/a.png")).unwrap();

        assert!(cache
            .get(Path::new("/a.png"), 1000, modified, GridSize::Standard)
            .unwrap()
            .is_none());
    }
}
