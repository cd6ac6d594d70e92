//! SIMD-accelerated downsampling to the fingerprint sample grid.
//!
//! The reduction filter is fixed to a box (area-average) convolution: each
//! output sample is the mean of the source pixels it covers, which matches
//! the averaging character of the hash and produces identical grids on
//! every platform. Changing the filter changes every stored fingerprint.

use fast_image_resize::{images::Image, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::GrayImage;

/// Reduce a luminance grid to exactly `cells` x `cells` samples, row-major.
///
/// Returns `None` for a zero-area source; a grid with no pixels has no
/// fingerprint.
pub(super) fn downsample(luma: &GrayImage, cells: u32) -> Option<Vec<u8>> {
    let (width, height) = luma.dimensions();
    if width == 0 || height == 0 || cells == 0 {
        return None;
    }

    let src = Image::from_vec_u8(width, height, luma.as_raw().clone(), PixelType::U8).ok()?;
    let mut dst = Image::new(cells, cells, PixelType::U8);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(
        fast_image_resize::FilterType::Box,
    ));

    let mut resizer = Resizer::new();
    resizer.resize(&src, &mut dst, &options).ok()?;

    Some(dst.into_vec())
}
