//! # Core Module
//!
//! The GUI-agnostic duplicate detection engine.
//!
//! ## Modules
//! - `scanner` - discovers candidate files in directory trees
//! - `hasher` - decodes images and computes perceptual fingerprints
//! - `fingerprint` - the fingerprint type and bit-difference metric
//! - `record` - the per-image data unit
//! - `comparator` - clusters records and picks each group's keeper
//! - `cache` - persists fingerprints across runs
//! - `discard` - the move-to-trash capability
//! - `pipeline` - orchestrates the full workflow

pub mod cache;
pub mod comparator;
pub mod discard;
pub mod fingerprint;
pub mod hasher;
pub mod pipeline;
pub mod record;
pub mod scanner;

// Re-export commonly used types
pub use comparator::find_duplicates;
pub use discard::{discard_all, DiscardBin, SystemTrash};
pub use fingerprint::{Fingerprint, GridSize};
pub use hasher::FingerprintExtractor;
pub use pipeline::{CancelToken, Pipeline, PipelineResult};
pub use record::{ImageRecord, Role};
pub use scanner::ImageEntry;
