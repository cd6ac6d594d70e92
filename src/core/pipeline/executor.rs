//! Pipeline execution implementation.

use super::CancelToken;
use crate::core::cache::{CacheEntry, FingerprintCache, InMemoryCache};
use crate::core::comparator::find_duplicates;
use crate::core::fingerprint::{Fingerprint, GridSize};
use crate::core::hasher::FingerprintExtractor;
use crate::core::record::{ImageRecord, Role};
use crate::core::scanner::{FileScanner, ImageEntry, ScanConfig, WalkDirScanner};
use crate::error::{LookalikeError, ScanError};
use crate::events::{
    null_sender, Event, EventSender, GroupEvent, HashEvent, HashProgress, PipelineEvent,
    PipelinePhase, PipelineSummary,
};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Instant, SystemTime};

/// Result of a pipeline run
#[derive(Debug)]
pub struct PipelineResult {
    /// Records in emitted groups, annotated: clusters in discovery order,
    /// keeper first, removables after in keeper-ranking order
    pub duplicates: Vec<ImageRecord>,
    /// Number of emitted groups
    pub group_count: usize,
    /// Candidate files discovered by the scan
    pub total_images: usize,
    /// Files successfully fingerprinted
    pub hashed: usize,
    /// Fingerprints served from the cache
    pub cache_hits: usize,
    /// Per-file fingerprint failures (file skipped, scan continued)
    pub hash_failures: Vec<(PathBuf, String)>,
    /// Subtree-level scan errors (scan continued elsewhere)
    pub scan_errors: Vec<ScanError>,
    pub duration_ms: u64,
}

impl PipelineResult {
    pub fn removable_count(&self) -> usize {
        self.duplicates
            .iter()
            .filter(|r| r.role == Role::Removable)
            .count()
    }

    /// Bytes freed if every removable member is discarded
    pub fn reclaimable_bytes(&self) -> u64 {
        self.duplicates
            .iter()
            .filter(|r| r.role == Role::Removable)
            .map(|r| r.byte_size())
            .sum()
    }

    fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            total_images: self.total_images,
            duplicate_groups: self.group_count,
            removable_count: self.removable_count(),
            reclaimable_bytes: self.reclaimable_bytes(),
            duration_ms: self.duration_ms,
        }
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directories to scan
    pub roots: Vec<PathBuf>,
    /// Fingerprint grid resolution
    pub grid: GridSize,
    /// Maximum Hamming distance for two images to group (lower = stricter)
    pub threshold: u32,
    /// Scanner configuration
    pub scan_config: ScanConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            grid: GridSize::default(),
            threshold: 10,
            scan_config: ScanConfig::default(),
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    cache: Option<Box<dyn FingerprintCache>>,
    cancel: CancelToken,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            cache: None,
            cancel: CancelToken::new(),
        }
    }

    /// Add directories to scan
    pub fn roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.config.roots = roots;
        self
    }

    /// Set the fingerprint grid resolution
    pub fn grid(mut self, grid: GridSize) -> Self {
        self.config.grid = grid;
        self
    }

    /// Set the grouping threshold
    pub fn threshold(mut self, threshold: u32) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Set the cache backend
    pub fn cache(mut self, cache: Box<dyn FingerprintCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Include hidden files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.scan_config.include_hidden = include;
        self
    }

    /// Attach a cancellation token
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
            cache: self.cache.unwrap_or_else(|| Box::new(InMemoryCache::new())),
            cancel: self.cancel,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The duplicate detection pipeline
pub struct Pipeline {
    config: PipelineConfig,
    cache: Box<dyn FingerprintCache>,
    cancel: CancelToken,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, LookalikeError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(
        &self,
        events: &EventSender,
    ) -> Result<PipelineResult, LookalikeError> {
        let start_time = Instant::now();

        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: discovery
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let scanner = WalkDirScanner::new(self.config.scan_config.clone());
        let scan = scanner.scan_with_events(&self.config.roots, events);
        let total_images = scan.files.len();

        if self.cancelled(events) {
            return Err(ScanError::Cancelled.into());
        }

        // Phase 2: fingerprinting
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Fingerprinting,
        }));
        events.send(Event::Hash(HashEvent::Started {
            total_files: total_images,
        }));

        let (records, cache_hits, hash_failures) = self.fingerprint_files(&scan.files, events);

        events.send(Event::Hash(HashEvent::Completed {
            total_hashed: records.len(),
            cache_hits,
        }));

        // The caller may abandon the run here; fingerprints already computed
        // are simply discarded.
        if self.cancelled(events) {
            return Err(ScanError::Cancelled.into());
        }

        // Phase 3: clustering + keeper selection, single-threaded so the
        // claimed-set walk and group-id counter stay deterministic
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Grouping,
        }));
        events.send(Event::Group(GroupEvent::Started {
            total_records: records.len(),
        }));

        let hashed = records.len();
        let duplicates = find_duplicates(records, self.config.threshold);
        let group_count = duplicates
            .iter()
            .filter(|r| r.role == Role::Keeper)
            .count();

        events.send(Event::Group(GroupEvent::Completed {
            groups: group_count,
            removable: duplicates.len() - group_count,
        }));

        let result = PipelineResult {
            duplicates,
            group_count,
            total_images,
            hashed,
            cache_hits,
            hash_failures,
            scan_errors: scan.errors,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: result.summary(),
        }));

        Ok(result)
    }

    /// Fingerprint candidates on the rayon pool.
    ///
    /// Completions happen in any order, but the indexed collect puts
    /// results back in discovery order - clustering depends on that.
    fn fingerprint_files(
        &self,
        files: &[ImageEntry],
        events: &EventSender,
    ) -> (Vec<ImageRecord>, usize, Vec<(PathBuf, String)>) {
        let extractor = FingerprintExtractor::new(self.config.grid);
        let cache_hits = AtomicUsize::new(0);
        let completed = AtomicUsize::new(0);
        let total = files.len();

        let results: Vec<Result<ImageRecord, (PathBuf, String)>> = files
            .par_iter()
            .filter_map(|file| {
                if self.cancel.is_cancelled() {
                    return None;
                }

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;

                // Cache first: an unchanged file needs no decode.
                if let Ok(Some(entry)) =
                    self.cache
                        .get(&file.path, file.byte_size, file.modified, self.config.grid)
                {
                    cache_hits.fetch_add(1, Ordering::SeqCst);
                    events.send(Event::Hash(HashEvent::CacheHit {
                        path: file.path.clone(),
                    }));

                    return Some(Ok(ImageRecord::new(
                        file.path.clone(),
                        file.byte_size,
                        entry.width,
                        entry.height,
                        Fingerprint::from_bytes(&entry.fingerprint),
                    )));
                }

                match extractor.fingerprint_file(&file.path) {
                    Ok(hashed) => {
                        if let Err(e) = self.cache.set(CacheEntry {
                            path: file.path.clone(),
                            fingerprint: hashed.fingerprint.as_bytes().to_vec(),
                            grid: self.config.grid,
                            width: hashed.width,
                            height: hashed.height,
                            file_size: file.byte_size,
                            file_modified: file.modified,
                            cached_at: SystemTime::now(),
                        }) {
                            tracing::debug!(error = %e, "cache write failed, continuing");
                        }

                        events.send(Event::Hash(HashEvent::Progress(HashProgress {
                            completed: done,
                            total,
                            current_path: file.path.clone(),
                            cache_hits: cache_hits.load(Ordering::SeqCst),
                        })));

                        Some(Ok(ImageRecord::new(
                            file.path.clone(),
                            file.byte_size,
                            hashed.width,
                            hashed.height,
                            hashed.fingerprint,
                        )))
                    }
                    Err(e) => {
                        events.send(Event::Hash(HashEvent::Error {
                            path: file.path.clone(),
                            message: e.to_string(),
                        }));
                        Some(Err((file.path.clone(), e.to_string())))
                    }
                }
            })
            .collect();

        let mut records = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(record) => records.push(record),
                Err(failure) => failures.push(failure),
            }
        }

        (records, cache_hits.load(Ordering::SeqCst), failures)
    }

    fn cancelled(&self, events: &EventSender) -> bool {
        if self.cancel.is_cancelled() {
            tracing::info!("pipeline cancelled");
            events.send(Event::Pipeline(PipelineEvent::Cancelled));
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, name: &str, side: u32, split: fn(u32, u32, u32) -> u8) {
        let img = GrayImage::from_fn(side, side, |x, y| Luma([split(x, y, side)]));
        img.save(dir.path().join(name)).unwrap();
    }

    fn top_half_bright(_x: u32, y: u32, side: u32) -> u8 {
        if y < side / 2 {
            230
        } else {
            25
        }
    }

    fn left_half_bright(x: u32, _y: u32, side: u32) -> u8 {
        if x < side / 2 {
            230
        } else {
            25
        }
    }

    #[test]
    fn builder_sets_configuration() {
        let pipeline = Pipeline::builder()
            .roots(vec![PathBuf::from("/photos")])
            .grid(GridSize::Standard)
            .threshold(4)
            .build();

        assert_eq!(pipeline.config.threshold, 4);
        assert_eq!(pipeline.config.grid, GridSize::Standard);
    }

    #[test]
    fn empty_directory_finds_nothing() {
        let dir = TempDir::new().unwrap();

        let pipeline = Pipeline::builder()
            .roots(vec![dir.path().to_path_buf()])
            .build();

        let result = pipeline.run().unwrap();

        assert_eq!(result.total_images, 0);
        assert_eq!(result.group_count, 0);
        assert!(result.duplicates.is_empty());
    }

    #[test]
    fn rescaled_copies_group_with_the_larger_as_keeper() {
        let dir = TempDir::new().unwrap();
        write_png(&dir, "copy_small.png", 64, top_half_bright);
        write_png(&dir, "copy_large.png", 128, top_half_bright);
        write_png(&dir, "other.png", 64, left_half_bright);

        let pipeline = Pipeline::builder()
            .roots(vec![dir.path().to_path_buf()])
            .threshold(4)
            .build();

        let result = pipeline.run().unwrap();

        assert_eq!(result.group_count, 1);
        assert_eq!(result.duplicates.len(), 2);
        assert_eq!(result.duplicates[0].role, Role::Keeper);
        assert!(result.duplicates[0].path().ends_with("copy_large.png"));
        assert_eq!(result.duplicates[1].role, Role::Removable);
    }

    #[test]
    fn corrupt_file_is_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"garbage").unwrap();
        write_png(&dir, "fine.png", 32, top_half_bright);

        let pipeline = Pipeline::builder()
            .roots(vec![dir.path().to_path_buf()])
            .build();

        let result = pipeline.run().unwrap();

        assert_eq!(result.total_images, 2);
        assert_eq!(result.hashed, 1);
        assert_eq!(result.hash_failures.len(), 1);
        assert!(result.hash_failures[0].0.ends_with("broken.png"));
    }

    #[test]
    fn cancelled_token_stops_the_run() {
        let dir = TempDir::new().unwrap();
        write_png(&dir, "a.png", 32, top_half_bright);

        let token = CancelToken::new();
        token.cancel();

        let pipeline = Pipeline::builder()
            .roots(vec![dir.path().to_path_buf()])
            .cancel_token(token)
            .build();

        let result = pipeline.run();

        assert!(matches!(
            result,
            Err(LookalikeError::Scan(ScanError::Cancelled))
        ));
    }
}
