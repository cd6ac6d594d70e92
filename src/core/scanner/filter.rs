//! File filtering for the scanner.

use std::collections::HashSet;
use std::path::Path;

/// Decides which files count as candidate raster images
pub struct ExtensionFilter {
    extensions: HashSet<String>,
    include_hidden: bool,
}

impl ExtensionFilter {
    /// Create a filter with the default supported raster extensions
    pub fn new() -> Self {
        Self {
            extensions: [
                "jpg", "jpeg", "png", "gif", "bmp", "webp", "pbm", "tga", "tiff", "tif",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            include_hidden: false,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Override the accepted extension list
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.to_lowercase())
            .collect();
        self
    }

    /// Check whether a file should enter the candidate list
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    return false;
                }
            }
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.contains(&ext.to_lowercase()),
            None => false,
        }
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new()
    }
}
