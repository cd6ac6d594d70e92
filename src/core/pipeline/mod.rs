//! # Pipeline Module
//!
//! Orchestrates the full workflow: scan directories, fingerprint files in
//! parallel, cluster the records, pick keepers.

mod executor;

pub use executor::{Pipeline, PipelineBuilder, PipelineConfig, PipelineResult};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation handle for a running pipeline.
///
/// Cancellation is checked per file during fingerprinting and once more
/// before clustering starts; results for files already fingerprinted are
/// simply discarded, no rollback needed.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; takes effect at the next check point
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
