//! Perspective rectification of a sheet photo into canonical coordinates.
//!
//! The four ordered fiducial centroids define a quadrilateral; the target
//! rectangle takes its width from the longer of the two horizontal edges
//! and its height from the longer of the two vertical edges. The full
//! color photo is warped through the quad-to-rect homography, then fixed
//! top and bottom margins (header/footer bands outside the answer grid)
//! are trimmed.

use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

use crate::config::{RectifyConfig, SheetConfig};
use crate::fiducial::{find_fiducials, order_corners, InsufficientFiducialsError, QuadCorners};
use crate::homography;

// ── Error types ──────────────────────────────────────────────────────────

/// Degenerate rectification geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Computed target rectangle has zero width or height.
    DegenerateQuad { width: i64, height: i64 },
    /// The fixed margins meet or exceed the warped sheet height.
    MarginExceedsHeight {
        height: u32,
        trim_top: u32,
        trim_bottom: u32,
    },
    /// The corner correspondence produced no invertible transform.
    SingularTransform(String),
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DegenerateQuad { width, height } => {
                write!(f, "degenerate corner quad: {}x{} target", width, height)
            }
            Self::MarginExceedsHeight {
                height,
                trim_top,
                trim_bottom,
            } => write!(
                f,
                "margin trim {}+{} leaves no rows of a {}-row sheet",
                trim_top, trim_bottom, height
            ),
            Self::SingularTransform(msg) => write!(f, "singular perspective transform: {}", msg),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Rectification failure: either the markers were not found or the
/// geometry they describe is unusable. Propagated unchanged to the
/// caller — a failed sheet yields no partial result.
#[derive(Debug, Clone, PartialEq)]
pub enum RectifyError {
    Fiducials(InsufficientFiducialsError),
    Geometry(GeometryError),
}

impl std::fmt::Display for RectifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fiducials(e) => e.fmt(f),
            Self::Geometry(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for RectifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fiducials(e) => Some(e),
            Self::Geometry(e) => Some(e),
        }
    }
}

impl From<InsufficientFiducialsError> for RectifyError {
    fn from(e: InsufficientFiducialsError) -> Self {
        Self::Fiducials(e)
    }
}

impl From<GeometryError> for RectifyError {
    fn from(e: GeometryError) -> Self {
        Self::Geometry(e)
    }
}

// ── Rectification ────────────────────────────────────────────────────────

/// Detect fiducials, order corners, warp, and trim in one step.
pub fn rectify_sheet(photo: &RgbImage, config: &SheetConfig) -> Result<RgbImage, RectifyError> {
    let fiducials = find_fiducials(photo, &config.fiducial);
    let corners = order_corners(&fiducials)?;
    Ok(warp_and_trim(photo, &corners, &config.rectify)?)
}

/// Warp the photo through the quad-to-rect transform and trim margins.
pub fn warp_and_trim(
    photo: &RgbImage,
    corners: &QuadCorners,
    config: &RectifyConfig,
) -> Result<RgbImage, GeometryError> {
    let (width, height) = target_size(corners)?;

    let h = homography::quad_to_rect(corners, width, height)
        .map_err(|e| GeometryError::SingularTransform(e.to_string()))?;
    let m = [
        h[(0, 0)] as f32, h[(0, 1)] as f32, h[(0, 2)] as f32,
        h[(1, 0)] as f32, h[(1, 1)] as f32, h[(1, 2)] as f32,
        h[(2, 0)] as f32, h[(2, 1)] as f32, h[(2, 2)] as f32,
    ];
    let projection = Projection::from_matrix(m)
        .ok_or_else(|| GeometryError::SingularTransform("non-invertible matrix".into()))?;

    // Samples outside the source quad read as paper, not ink.
    let mut warped = RgbImage::new(width, height);
    warp_into(
        photo,
        &projection,
        Interpolation::Bilinear,
        Rgb([255, 255, 255]),
        &mut warped,
    );

    trim_margins(&warped, config)
}

/// Target rectangle: width from the longer horizontal edge, height from
/// the longer vertical edge, floored to whole pixels.
fn target_size(corners: &QuadCorners) -> Result<(u32, u32), GeometryError> {
    let width = distance(corners.top_left, corners.top_right)
        .max(distance(corners.bottom_left, corners.bottom_right))
        .floor() as i64;
    let height = distance(corners.top_left, corners.bottom_left)
        .max(distance(corners.top_right, corners.bottom_right))
        .floor() as i64;
    if width <= 0 || height <= 0 {
        return Err(GeometryError::DegenerateQuad { width, height });
    }
    Ok((width as u32, height as u32))
}

fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

fn trim_margins(warped: &RgbImage, config: &RectifyConfig) -> Result<RgbImage, GeometryError> {
    let (width, height) = warped.dimensions();
    let trim = config.trim_top.saturating_add(config.trim_bottom);
    if trim >= height {
        return Err(GeometryError::MarginExceedsHeight {
            height,
            trim_top: config.trim_top,
            trim_bottom: config.trim_bottom,
        });
    }
    Ok(image::imageops::crop_imm(warped, 0, config.trim_top, width, height - trim).to_image())
}

// ── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{blank_photo, draw_triangle};

    fn axis_aligned_corners(w: f64, h: f64) -> QuadCorners {
        QuadCorners {
            top_left: [0.0, 0.0],
            top_right: [w, 0.0],
            bottom_right: [w, h],
            bottom_left: [0.0, h],
        }
    }

    #[test]
    fn rectifies_a_marked_photo_to_the_corner_span() {
        let mut photo = blank_photo(1000, 1400);
        for c in [
            [60.0, 100.0],
            [860.0, 100.0],
            [860.0, 1300.0],
            [60.0, 1300.0],
        ] {
            draw_triangle(&mut photo, c, 30.0);
        }

        let config = SheetConfig::default();
        let sheet = rectify_sheet(&photo, &config).unwrap();
        let (w, h) = sheet.dimensions();

        // Corner span is 800 × 1200 (± centroid rasterization), minus the
        // 150 + 200 margin trim.
        assert!((795..=805).contains(&w), "width {}", w);
        let expected_h = 1200 - 350;
        assert!(
            (expected_h - 5..=expected_h + 5).contains(&(h as i32)),
            "height {}",
            h
        );
    }

    #[test]
    fn three_markers_fail_with_found_count() {
        let mut photo = blank_photo(1000, 1400);
        for c in [[60.0, 100.0], [860.0, 100.0], [860.0, 1300.0]] {
            draw_triangle(&mut photo, c, 30.0);
        }

        let err = rectify_sheet(&photo, &SheetConfig::default()).unwrap_err();
        assert_eq!(
            err,
            RectifyError::Fiducials(InsufficientFiducialsError { found: 3 })
        );
    }

    #[test]
    fn unmarked_photo_reports_zero_found() {
        let photo = blank_photo(400, 400);
        let err = rectify_sheet(&photo, &SheetConfig::default()).unwrap_err();
        assert_eq!(
            err,
            RectifyError::Fiducials(InsufficientFiducialsError { found: 0 })
        );
    }

    #[test]
    fn oversized_trim_is_a_geometry_error_not_a_panic() {
        let photo = blank_photo(300, 300);
        let corners = axis_aligned_corners(299.0, 299.0);
        let config = RectifyConfig {
            trim_top: 150,
            trim_bottom: 200,
        };
        let err = warp_and_trim(&photo, &corners, &config).unwrap_err();
        assert!(matches!(err, GeometryError::MarginExceedsHeight { .. }));
    }

    #[test]
    fn collapsed_quad_is_degenerate() {
        let corners = QuadCorners {
            top_left: [10.0, 10.0],
            top_right: [10.0, 10.0],
            bottom_right: [10.0, 10.0],
            bottom_left: [10.0, 10.0],
        };
        assert!(matches!(
            target_size(&corners),
            Err(GeometryError::DegenerateQuad { .. })
        ));
    }

    #[test]
    fn warp_of_axis_aligned_corners_preserves_content() {
        // Content drawn inside an axis-aligned quad survives the warp at
        // (nearly) the same coordinates once margins are accounted for.
        let mut photo = blank_photo(400, 800);
        imageproc::drawing::draw_filled_rect_mut(
            &mut photo,
            imageproc::rect::Rect::at(180, 390).of_size(40, 40),
            image::Rgb([0, 0, 0]),
        );
        let corners = axis_aligned_corners(399.0, 799.0);
        let config = RectifyConfig {
            trim_top: 100,
            trim_bottom: 100,
        };
        let sheet = warp_and_trim(&photo, &corners, &config).unwrap();
        assert_eq!(sheet.dimensions(), (399, 599));
        // Mark center moved up by the top trim.
        assert!(sheet.get_pixel(200, 310)[0] < 60);
        assert!(sheet.get_pixel(20, 20)[0] > 200);
    }
}
