//! # Hasher Module
//!
//! Turns an image file into a perceptual fingerprint plus its original
//! dimensions.
//!
//! ## How It Works
//! 1. Decode the file to a luminance grid at original size
//! 2. Downsample the grid to S x S samples (box filter, SIMD-accelerated)
//! 3. Threshold each sample against the grid mean to produce the bits
//!
//! ## Performance Optimizations
//! - JPEG decodes through `zune-jpeg` straight to luma (1.5-2x faster than
//!   the image crate)
//! - Downsampling uses `fast_image_resize` (SIMD convolution)
//!
//! Extraction is stateless and deterministic: the same file bytes and grid
//! size always produce the same fingerprint, on every platform.

pub mod decode;
mod resize;

use crate::core::fingerprint::{Fingerprint, GridSize};
use crate::error::HashError;
use image::GrayImage;
use std::path::Path;

/// Computes fingerprints for images at a fixed grid size.
#[derive(Debug, Clone, Copy)]
pub struct FingerprintExtractor {
    grid: GridSize,
}

/// A successfully fingerprinted image
#[derive(Debug, Clone)]
pub struct HashedImage {
    pub fingerprint: Fingerprint,
    /// Original (pre-downsample) width
    pub width: u32,
    /// Original (pre-downsample) height
    pub height: u32,
}

impl FingerprintExtractor {
    pub fn new(grid: GridSize) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    /// Fingerprint an already-decoded luminance grid.
    ///
    /// Pure and infallible apart from degenerate input: a zero-area grid
    /// yields `None`, never an all-zero fingerprint.
    pub fn fingerprint_image(&self, luma: &GrayImage) -> Option<Fingerprint> {
        let samples = resize::downsample(luma, self.grid.cells())?;
        Fingerprint::of_samples(&samples, self.grid)
    }

    /// Decode and fingerprint a file.
    ///
    /// Decode failures are per-file errors the caller is expected to skip;
    /// they never abort a scan.
    pub fn fingerprint_file(&self, path: &Path) -> Result<HashedImage, HashError> {
        let luma = decode::decode_luma(path)?;
        let (width, height) = luma.dimensions();

        let fingerprint =
            self.fingerprint_image(&luma)
                .ok_or_else(|| HashError::EmptyImage {
                    path: path.to_path_buf(),
                })?;

        Ok(HashedImage {
            fingerprint,
            width,
            height,
        })
    }
}

impl Default for FingerprintExtractor {
    fn default() -> Self {
        Self::new(GridSize::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn solid_image(side: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(side, side, Luma([value]))
    }

    #[test]
    fn solid_image_fingerprints_to_all_ones() {
        let extractor = FingerprintExtractor::new(GridSize::Standard);
        let fp = extractor.fingerprint_image(&solid_image(100, 128)).unwrap();
        assert!(fp.as_bytes().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn zero_area_image_yields_no_fingerprint() {
        let extractor = FingerprintExtractor::new(GridSize::Standard);
        let empty = GrayImage::new(0, 0);
        assert!(extractor.fingerprint_image(&empty).is_none());
    }

    #[test]
    fn extraction_is_deterministic() {
        let extractor = FingerprintExtractor::new(GridSize::Fine);
        let image = GrayImage::from_fn(64, 48, |x, y| Luma([(x * 3 + y * 5) as u8]));

        let first = extractor.fingerprint_image(&image).unwrap();
        let second = extractor.fingerprint_image(&image).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn grid_size_sets_bit_length() {
        let image = GrayImage::from_fn(64, 64, |x, y| Luma([(x ^ y) as u8]));

        let standard = FingerprintExtractor::new(GridSize::Standard)
            .fingerprint_image(&image)
            .unwrap();
        let fine = FingerprintExtractor::new(GridSize::Fine)
            .fingerprint_image(&image)
            .unwrap();

        assert_eq!(standard.bit_len(), 64);
        assert_eq!(fine.bit_len(), 256);
    }

    #[test]
    fn rescaled_image_keeps_its_fingerprint() {
        // The same half-bright half-dark pattern at two sizes reduces to
        // the same sample grid.
        let pattern = |side: u32| {
            GrayImage::from_fn(side, side, |_, y| {
                if y < side / 2 {
                    Luma([230u8])
                } else {
                    Luma([25u8])
                }
            })
        };

        let extractor = FingerprintExtractor::new(GridSize::Fine);
        let small = extractor.fingerprint_image(&pattern(64)).unwrap();
        let large = extractor.fingerprint_image(&pattern(128)).unwrap();

        assert_eq!(small.distance(&large).unwrap(), 0);
    }

    #[test]
    fn fingerprint_file_reports_missing_file() {
        let extractor = FingerprintExtractor::default();
        let result = extractor.fingerprint_file(Path::new("/nonexistent/image.png"));
        assert!(result.is_err());
    }
}
