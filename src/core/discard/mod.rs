//! # Discard Module
//!
//! The "move to trash" capability behind an abstract seam.
//!
//! The engine decides *which* records are safe to discard; this module is
//! the only place that touches the filesystem to act on that decision, and
//! it never deletes outright - files go to the OS trash where the user can
//! still recover them.

use crate::error::DiscardError;
use std::path::{Path, PathBuf};

/// Capability to move one file to the trash.
///
/// Production uses [`SystemTrash`]; tests substitute doubles.
pub trait DiscardBin: Send + Sync {
    fn discard(&self, path: &Path) -> Result<(), DiscardError>;
}

/// Moves files to the operating system trash / recycle bin
pub struct SystemTrash;

impl DiscardBin for SystemTrash {
    fn discard(&self, path: &Path) -> Result<(), DiscardError> {
        trash::delete(path).map_err(|e| DiscardError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Outcome of a batch discard
#[derive(Debug, Default)]
pub struct DiscardReport {
    pub discarded: Vec<PathBuf>,
    pub failures: Vec<DiscardError>,
}

impl DiscardReport {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Discard a batch of files, continuing past per-file failures.
///
/// A locked or already-missing file is reported in `failures`; it never
/// aborts the rest of the batch.
pub fn discard_all(bin: &dyn DiscardBin, paths: &[PathBuf]) -> DiscardReport {
    let mut report = DiscardReport::default();

    for path in paths {
        match bin.discard(path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "moved to trash");
                report.discarded.push(path.clone());
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), reason = %e.reason, "discard failed");
                report.failures.push(e);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Test double that records calls and fails on demand
    struct FakeBin {
        fail_on: Option<PathBuf>,
        calls: Mutex<Vec<PathBuf>>,
    }

    impl FakeBin {
        fn new(fail_on: Option<PathBuf>) -> Self {
            Self {
                fail_on,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl DiscardBin for FakeBin {
        fn discard(&self, path: &Path) -> Result<(), DiscardError> {
            self.calls.lock().unwrap().push(path.to_path_buf());
            if self.fail_on.as_deref() == Some(path) {
                return Err(DiscardError {
                    path: path.to_path_buf(),
                    reason: "file is in use".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn discards_every_path() {
        let bin = FakeBin::new(None);
        let paths = vec![PathBuf::from("/a.png"), PathBuf::from("/b.png")];

        let report = discard_all(&bin, &paths);

        assert!(report.all_succeeded());
        assert_eq!(report.discarded, paths);
    }

    #[test]
    fn one_failure_does_not_stop_the_batch() {
        let bin = FakeBin::new(Some(PathBuf::from("/b.png")));
        let paths = vec![
            PathBuf::from("/a.png"),
            PathBuf::from("/b.png"),
            PathBuf::from("/c.png"),
        ];

        let report = discard_all(&bin, &paths);

        // All three were attempted; only the middle one failed.
        assert_eq!(bin.calls.lock().unwrap().len(), 3);
        assert_eq!(report.discarded.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, PathBuf::from("/b.png"));
    }

    #[test]
    fn empty_batch_is_a_clean_report() {
        let bin = FakeBin::new(None);
        let report = discard_all(&bin, &[]);
        assert!(report.all_succeeded());
        assert!(report.discarded.is_empty());
    }
}
