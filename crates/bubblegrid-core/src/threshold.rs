//! Binarization strategies.
//!
//! Two deliberately different strategies coexist: fiducial detection uses a
//! fixed global cutoff (markers are printed high-contrast and must be found
//! with stable sensitivity), while column content discovery uses a
//! Gaussian-weighted adaptive threshold (pencil ink competes with uneven
//! lighting across a photographed sheet). Both produce inverted masks:
//! dark ink becomes foreground (255).

use image::{GrayImage, ImageBuffer, Luma};

/// Global inverted threshold: pixels at or below `cutoff` become foreground.
pub(crate) fn threshold_inv(gray: &GrayImage, cutoff: u8) -> GrayImage {
    imageproc::map::map_colors(gray, |p| Luma([if p[0] <= cutoff { 255u8 } else { 0 }]))
}

/// Gaussian-weighted adaptive inverted threshold.
///
/// A pixel becomes foreground when it is darker than the Gaussian-weighted
/// mean of its neighborhood by more than `offset`. The mean is computed in
/// f32 so the offset comparison is not quantized away. Sigma follows the
/// usual support rule for a `block`-pixel kernel,
/// σ = 0.3·((block − 1)/2 − 1) + 0.8.
pub(crate) fn adaptive_threshold_inv(gray: &GrayImage, block: u32, offset: f32) -> GrayImage {
    let (w, h) = gray.dimensions();
    let mut f: ImageBuffer<Luma<f32>, Vec<f32>> = ImageBuffer::new(w, h);
    for (x, y, p) in gray.enumerate_pixels() {
        f.put_pixel(x, y, Luma([p[0] as f32]));
    }

    let sigma = 0.3 * ((block as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let mean = imageproc::filter::gaussian_blur_f32(&f, sigma);

    let mut out = GrayImage::new(w, h);
    for (x, y, p) in gray.enumerate_pixels() {
        let fg = (p[0] as f32) <= mean.get_pixel(x, y)[0] - offset;
        out.put_pixel(x, y, Luma([if fg { 255 } else { 0 }]));
    }
    out
}
