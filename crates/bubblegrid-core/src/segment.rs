//! Column segmentation of a rectified sheet.
//!
//! The sheet is cut into equal-width vertical strips (the last strip
//! absorbs the integer-division remainder), and each strip is tightened to
//! the bounding box of its actual ink content: adaptive thresholding,
//! external contours, union of the boxes of contours above a noise floor.
//! A strip with no qualifying content is omitted rather than failing the
//! sheet.

use image::RgbImage;

use crate::config::ColumnConfig;
use crate::fiducial::{contour_area, external_contours};
use crate::threshold::adaptive_threshold_inv;

/// Split the rectified sheet into up to `n_columns` content-tightened
/// column crops, left to right.
pub fn segment_columns(sheet: &RgbImage, config: &ColumnConfig, n_columns: usize) -> Vec<RgbImage> {
    let (width, height) = sheet.dimensions();
    if n_columns == 0 {
        return Vec::new();
    }
    let strip_width = width / n_columns as u32;
    if strip_width == 0 || height == 0 {
        return Vec::new();
    }

    let mut columns = Vec::with_capacity(n_columns);
    for i in 0..n_columns as u32 {
        let x0 = i * strip_width;
        let w = if i as usize + 1 == n_columns {
            width - x0
        } else {
            strip_width
        };
        let strip = image::imageops::crop_imm(sheet, x0, 0, w, height).to_image();

        match content_box(&strip, config) {
            Some((bx, by, bw, bh)) => {
                columns.push(image::imageops::crop_imm(&strip, bx, by, bw, bh).to_image());
            }
            None => {
                tracing::debug!("column {} skipped: no content above noise floor", i);
            }
        }
    }
    columns
}

/// Union bounding box of the strip's qualifying ink contours, with the
/// configured margin applied and clamped to the strip. `None` when nothing
/// qualifies or the margin collapses the box.
fn content_box(strip: &RgbImage, config: &ColumnConfig) -> Option<(u32, u32, u32, u32)> {
    let (width, height) = strip.dimensions();
    let gray = image::imageops::grayscale(strip);
    let binary = adaptive_threshold_inv(&gray, config.adaptive_block, config.adaptive_offset);

    let mut x_min = width as i64;
    let mut y_min = height as i64;
    let mut x_max = 0i64;
    let mut y_max = 0i64;
    let mut any = false;

    for contour in external_contours(&binary) {
        if contour_area(&contour) <= config.min_contour_area {
            continue;
        }
        any = true;
        for p in &contour {
            x_min = x_min.min(p.x as i64);
            y_min = y_min.min(p.y as i64);
            x_max = x_max.max(p.x as i64 + 1);
            y_max = y_max.max(p.y as i64 + 1);
        }
    }
    if !any {
        return None;
    }

    let margin = config.bbox_margin as i64;
    let x_min = (x_min - margin).clamp(0, width as i64);
    let y_min = (y_min - margin).clamp(0, height as i64);
    let x_max = (x_max + margin).clamp(0, width as i64);
    let y_max = (y_max + margin).clamp(0, height as i64);
    if x_max <= x_min || y_max <= y_min {
        return None;
    }

    Some((
        x_min as u32,
        y_min as u32,
        (x_max - x_min) as u32,
        (y_max - y_min) as u32,
    ))
}

// ── Tests ────────────────────────────────────────────────────────────────
