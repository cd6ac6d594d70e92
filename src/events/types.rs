//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the duplicate-finding pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// File discovery events
    Scan(ScanEvent),
    /// Fingerprinting events
    Hash(HashEvent),
    /// Clustering / keeper-selection events
    Group(GroupEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during file discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    Started { roots: Vec<PathBuf> },
    Progress(ScanProgress),
    FileFound { path: PathBuf },
    /// A subtree or file could not be read; the scan continues
    Error { path: PathBuf, message: String },
    Completed { total_files: usize },
}

/// Progress information during discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    pub directories_scanned: usize,
    pub files_found: usize,
    pub current_path: PathBuf,
}

/// Events during fingerprinting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashEvent {
    Started { total_files: usize },
    Progress(HashProgress),
    Fingerprinted { path: PathBuf },
    /// A fingerprint was served from the cache without decoding
    CacheHit { path: PathBuf },
    /// The file could not be decoded; it is skipped
    Error { path: PathBuf, message: String },
    Completed { total_hashed: usize, cache_hits: usize },
}

/// Progress information during fingerprinting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashProgress {
    pub completed: usize,
    pub total: usize,
    pub current_path: PathBuf,
    pub cache_hits: usize,
}

/// Events during clustering and keeper selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GroupEvent {
    Started { total_records: usize },
    Completed { groups: usize, removable: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    Started,
    PhaseChanged { phase: PipelinePhase },
    Completed { summary: PipelineSummary },
    Cancelled,
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Fingerprinting,
    Grouping,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Fingerprinting => write!(f, "Fingerprinting"),
            PipelinePhase::Grouping => write!(f, "Grouping"),
        }
    }
}

/// Summary of a completed pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub total_images: usize,
    pub duplicate_groups: usize,
    /// Removable members across all groups (keepers excluded)
    pub removable_count: usize,
    /// Bytes freed if every removable is discarded
    pub reclaimable_bytes: u64,
    pub duration_ms: u64,
}
