//! Directory walking implementation using walkdir.

use super::{filter::ExtensionFilter, FileScanner, ImageEntry, ScanOutcome};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent, ScanProgress};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
}

/// Scanner implementation over the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: ExtensionFilter,
}

impl WalkDirScanner {
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = ExtensionFilter::new().with_hidden(config.include_hidden);
        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions.clone());
        }
        Self { config, filter }
    }

    fn scan_root(
        &self,
        root: &PathBuf,
        seen: &mut HashSet<PathBuf>,
        outcome: &mut ScanOutcome,
        events: &EventSender,
    ) {
        if !root.is_dir() {
            outcome
                .errors
                .push(ScanError::DirectoryNotFound { path: root.clone() });
            return;
        }

        let mut walker = WalkDir::new(root).follow_links(self.config.follow_symlinks);
        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut directories_scanned = 0;

        for entry_result in walker {
            match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    if path.is_dir() {
                        directories_scanned += 1;

                        if !self.config.include_hidden {
                            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                                if name.starts_with('.') && path != root.as_path() {
                                    continue;
                                }
                            }
                        }

                        events.send(Event::Scan(ScanEvent::Progress(ScanProgress {
                            directories_scanned,
                            files_found: outcome.files.len(),
                            current_path: path.to_path_buf(),
                        })));
                        continue;
                    }

                    if !self.filter.should_include(path) {
                        continue;
                    }

                    // Overlapping roots must not yield the same file twice.
                    if !seen.insert(path.to_path_buf()) {
                        continue;
                    }

                    match fs::metadata(path) {
                        Ok(metadata) => {
                            let file = ImageEntry {
                                path: path.to_path_buf(),
                                byte_size: metadata.len(),
                                modified: metadata
                                    .modified()
                                    .unwrap_or(std::time::SystemTime::UNIX_EPOCH),
                            };

                            events.send(Event::Scan(ScanEvent::FileFound {
                                path: file.path.clone(),
                            }));

                            outcome.files.push(file);
                        }
                        Err(e) => {
                            let error = ScanError::ReadDirectory {
                                path: path.to_path_buf(),
                                source: e,
                            };
                            events.send(Event::Scan(ScanEvent::Error {
                                path: path.to_path_buf(),
                                message: error.to_string(),
                            }));
                            outcome.errors.push(error);
                        }
                    }
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();

                    let error = if e.io_error().map(|e| e.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadDirectory {
                            path: path.clone(),
                            source: std::io::Error::other(e.to_string()),
                        }
                    };

                    tracing::warn!(path = %path.display(), "subtree unreadable, continuing scan");
                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));
                    outcome.errors.push(error);
                }
            }
        }
    }
}

impl FileScanner for WalkDirScanner {
    fn scan(&self, roots: &[PathBuf]) -> ScanOutcome {
        self.scan_with_events(roots, &crate::events::null_sender())
    }

    fn scan_with_events(&self, roots: &[PathBuf], events: &EventSender) -> ScanOutcome {
        events.send(Event::Scan(ScanEvent::Started {
            roots: roots.to_vec(),
        }));

        let mut outcome = ScanOutcome::default();
        let mut seen = HashSet::new();

        for root in roots {
            self.scan_root(root, &mut seen, &mut outcome, events);
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_files: outcome.files.len(),
        }));

        outcome
    }
}
