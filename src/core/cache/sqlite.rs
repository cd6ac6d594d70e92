//! SQLite cache backend for persistent storage.

use super::{CacheEntry, CacheStats, FingerprintCache};
use crate::core::fingerprint::GridSize;
use crate::error::CacheError;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// SQLite-backed persistent cache
///
/// Uses WAL mode so readers proceed while writes are happening.
pub struct SqliteCache {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteCache {
    /// Open or create a cache database at the given path
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::OpenFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let conn = Connection::open(path).map_err(|e| CacheError::OpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS fingerprints (
                path TEXT PRIMARY KEY,
                fingerprint BLOB NOT NULL,
                grid_cells INTEGER NOT NULL,
                width INTEGER NOT NULL,
                height INTEGER NOT NULL,
                file_size INTEGER NOT NULL,
                file_modified INTEGER NOT NULL,
                cached_at INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        })
    }

    /// Default cache location under the user cache directory
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lookalike")
            .join("fingerprints.db")
    }

    fn to_timestamp(time: SystemTime) -> i64 {
        time.duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs() as i64
    }

    fn from_timestamp(timestamp: i64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(timestamp.max(0) as u64)
    }

    fn grid_to_cells(grid: GridSize) -> i64 {
        grid.cells() as i64
    }

    fn cells_to_grid(cells: i64) -> GridSize {
        match cells {
            8 => GridSize::Standard,
            _ => GridSize::Fine,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::Corrupted {
            path: self.db_path.clone(),
        })
    }
}

impl FingerprintCache for SqliteCache {
    fn get(
        &self,
        path: &Path,
        current_size: u64,
        current_modified: SystemTime,
        grid: GridSize,
    ) -> Result<Option<CacheEntry>, CacheError> {
        let conn = self.lock()?;
        let path_str = path.to_string_lossy();

        let result = conn.query_row(
            "SELECT fingerprint, grid_cells, width, height, file_size, file_modified, cached_at
             FROM fingerprints WHERE path = ?",
            [&path_str],
            |row| {
                Ok(CacheEntry {
                    path: path.to_path_buf(),
                    fingerprint: row.get(0)?,
                    grid: Self::cells_to_grid(row.get(1)?),
                    width: row.get::<_, i64>(2)? as u32,
                    height: row.get::<_, i64>(3)? as u32,
                    file_size: row.get::<_, i64>(4)? as u64,
                    file_modified: Self::from_timestamp(row.get(5)?),
                    cached_at: Self::from_timestamp(row.get(6)?),
                })
            },
        );

        match result {
            Ok(entry) => {
                if entry.is_valid_for(current_size, current_modified, grid) {
                    Ok(Some(entry))
                } else {
                    Ok(None)
                }
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(CacheError::QueryFailed(e.to_string())),
        }
    }

    fn set(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let conn = self.lock()?;
        let path_str = entry.path.to_string_lossy().into_owned();

        conn.execute(
            "INSERT OR REPLACE INTO fingerprints
             (path, fingerprint, grid_cells, width, height, file_size, file_modified, cached_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                path_str,
                entry.fingerprint,
                Self::grid_to_cells(entry.grid),
                entry.width as i64,
                entry.height as i64,
                entry.file_size as i64,
                Self::to_timestamp(entry.file_modified),
                Self::to_timestamp(entry.cached_at),
            ],
        )
        .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<(), CacheError> {
        let conn = self.lock()?;
        let path_str = path.to_string_lossy();

        conn.execute("DELETE FROM fingerprints WHERE path = ?", [&path_str])
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let conn = self.lock()?;

        conn.execute("DELETE FROM fingerprints", [])
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn stats(&self) -> Result<CacheStats, CacheError> {
        let conn = self.lock()?;

        let (total_entries, total_size_bytes) = conn
            .query_row(
                "SELECT COUNT(*), COALESCE(SUM(LENGTH(fingerprint)), 0) FROM fingerprints",
                [],
                |row| Ok((row.get::<_, i64>(0)? as usize, row.get::<_, i64>(1)? as u64)),
            )
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(CacheStats {
            total_entries,
            total_size_bytes,
        })
    }

    fn prune_orphans(&self) -> Result<usize, CacheError> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare("SELECT path FROM fingerprints")
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        let paths: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        drop(stmt);

        let mut removed = 0;
        for path in paths {
            if !Path::new(&path).exists() {
                conn.execute("DELETE FROM fingerprints WHERE path = ?", [&path])
                    .map_err(|e| CacheError::QueryFailed(e.to_string()))?;
                removed += 1;
            }
        }

        tracing::debug!(removed, "pruned orphaned cache entries");
        Ok(removed)
    }
}
