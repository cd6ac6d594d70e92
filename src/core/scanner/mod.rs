//! # Scanner Module
//!
//! Discovers candidate image files in directory trees.
//!
//! ## Supported Extensions
//! .jpg .jpeg .png .gif .bmp .webp .pbm .tga .tiff .tif, case-insensitive.
//!
//! Inaccessible subtrees are recorded as typed errors alongside the files
//! that were found - a permission problem in one corner of the tree never
//! silently discards the rest of the scan.

mod filter;
mod walker;

pub use filter::ExtensionFilter;
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;

/// A discovered candidate file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageEntry {
    pub path: PathBuf,
    /// File size in bytes
    pub byte_size: u64,
    /// Last modified time, for cache validation
    pub modified: SystemTime,
}

/// Everything a traversal produced: candidates plus non-fatal errors.
///
/// `errors` being non-empty is a typed, scan-level signal distinct from
/// "no duplicates found" - callers surface it, they do not infer it from
/// an empty file list.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub files: Vec<ImageEntry>,
    pub errors: Vec<ScanError>,
}

/// Trait for candidate-file scanners
///
/// Implement this to substitute a custom source (e.g. a fixed list in
/// tests) for directory traversal.
pub trait FileScanner: Send + Sync {
    /// Scan roots and return discovered files in traversal order
    fn scan(&self, roots: &[PathBuf]) -> ScanOutcome;

    /// Scan with progress reporting via events
    fn scan_with_events(&self, roots: &[PathBuf], events: &EventSender) -> ScanOutcome;
}
