//! Decoding image files to luminance grids.
//!
//! JPEG goes through zune-jpeg configured to emit luma directly, skipping
//! an RGB round-trip; everything else decodes with the image crate and
//! converts. Either way the caller receives a grayscale grid at the
//! image's original dimensions.

use crate::error::HashError;
use image::GrayImage;
use std::fs;
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

fn is_jpeg(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref(),
        Some("jpg" | "jpeg")
    )
}

/// Decode a file to a luminance grid at original width/height.
pub fn decode_luma(path: &Path) -> Result<GrayImage, HashError> {
    if is_jpeg(path) {
        // Fall back to the image crate when the fast path rejects the file
        // (progressive edge cases, misnamed formats).
        decode_jpeg_luma(path).or_else(|_| decode_fallback(path))
    } else {
        decode_fallback(path)
    }
}

/// Fast JPEG decoding, straight to luma, using zune-jpeg
fn decode_jpeg_luma(path: &Path) -> Result<GrayImage, HashError> {
    let file_bytes = fs::read(path).map_err(|e| HashError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::Luma);
    let mut decoder = JpegDecoder::new_with_options(&file_bytes, options);

    let pixels = decoder.decode().map_err(|e| HashError::Decode {
        path: path.to_path_buf(),
        reason: format!("zune-jpeg decode failed: {:?}", e),
    })?;

    let info = decoder.info().ok_or_else(|| HashError::Decode {
        path: path.to_path_buf(),
        reason: "missing image info after decode".to_string(),
    })?;

    if decoder.get_output_colorspace() != Some(ColorSpace::Luma) {
        return Err(HashError::Decode {
            path: path.to_path_buf(),
            reason: "decoder did not produce luma output".to_string(),
        });
    }

    GrayImage::from_raw(info.width as u32, info.height as u32, pixels).ok_or_else(|| {
        HashError::Decode {
            path: path.to_path_buf(),
            reason: "pixel buffer does not match reported dimensions".to_string(),
        }
    })
}

/// image-crate decoding for every other supported format
fn decode_fallback(path: &Path) -> Result<GrayImage, HashError> {
    let image = image::open(path).map_err(|e| HashError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(image.to_luma8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};
    use tempfile::TempDir;

    #[test]
    fn decodes_png_to_original_dimensions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gradient.png");

        let img: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_fn(20, 10, |x, _| Luma([(x * 12) as u8]));
        img.save(&path).unwrap();

        let luma = decode_luma(&path).unwrap();
        assert_eq!(luma.dimensions(), (20, 10));
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image at all").unwrap();

        let result = decode_luma(&path);
        assert!(matches!(result, Err(HashError::Decode { .. })));
    }

    #[test]
    fn misnamed_jpeg_falls_back_to_image_crate() {
        // A PNG wearing a .jpg extension: zune-jpeg rejects it, the
        // fallback decodes it anyway.
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("actually_png.jpg");

        let img: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_fn(4, 4, |x, y| Luma([(x + y) as u8 * 16]));
        img.save_with_format(&path, image::ImageFormat::Png).unwrap();

        let luma = decode_luma(&path).unwrap();
        assert_eq!(luma.dimensions(), (4, 4));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(decode_luma(Path::new("/no/such/file.png")).is_err());
    }
}
