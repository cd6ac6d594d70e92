//! # Error Module
//!
//! Typed error taxonomy for the duplicate image sweeper.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Per-file failures stay per-file** - a corrupt image or a locked file
//!   skips that file, it never aborts the scan or the sweep
//! - **Include context** - paths, file names, what went wrong

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum LookalikeError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Fingerprinting error: {0}")]
    Hash(#[from] HashError),

    #[error("Distance error: {0}")]
    Distance(#[from] DistanceError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Discard error: {0}")]
    Discard(#[from] DiscardError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while discovering candidate files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scan was cancelled")]
    Cancelled,
}

/// Errors that occur while fingerprinting an image
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Image has no pixels: {path}")]
    EmptyImage { path: PathBuf },

    #[error("Failed to open image file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Contract violations in fingerprint comparison.
///
/// A length mismatch cannot happen in a single run with one grid size, so it
/// always indicates a programming or configuration error. Tests fail loudly
/// on it; the clustering pass degrades to a max-distance sentinel instead of
/// crashing a long scan.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DistanceError {
    #[error("Fingerprint length mismatch: {left_bits} bits vs {right_bits} bits")]
    LengthMismatch { left_bits: u32, right_bits: u32 },
}

/// Errors that occur with the fingerprint cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to open cache database at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Cache corruption detected at {path}. Delete this file and try again.")]
    Corrupted { path: PathBuf },
}

/// A failure to move one file to the OS trash.
///
/// Reported per file; the rest of the batch continues.
#[derive(Error, Debug)]
#[error("Could not move {path} to the trash: {reason}")]
pub struct DiscardError {
    pub path: PathBuf,
    pub reason: String,
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, LookalikeError>;
