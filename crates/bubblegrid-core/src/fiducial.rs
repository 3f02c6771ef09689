//! Triangular fiducial detection and corner ordering.
//!
//! Sheets print three high-contrast triangles at known corners; the fourth
//! corner is implied by sheet geometry and recovered from a fourth printed
//! triangle on the opposite edge. Detection runs on a blurred, globally
//! thresholded mask: external contours are approximated to polygons and
//! only exact triangles above a minimum area survive.

use image::RgbImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;

use crate::config::FiducialConfig;
use crate::threshold::threshold_inv;

// ── Types ────────────────────────────────────────────────────────────────

/// A detected triangular marker.
#[derive(Debug, Clone)]
pub struct Fiducial {
    /// Approximated triangle vertices, in photo pixels.
    pub vertices: [[f64; 2]; 3],
    /// Area-weighted polygon centroid, in photo pixels.
    pub centroid: [f64; 2],
    /// Polygon area in px².
    pub area: f64,
}

/// The four marker centroids ordered top-left, top-right, bottom-right,
/// bottom-left.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadCorners {
    pub top_left: [f64; 2],
    pub top_right: [f64; 2],
    pub bottom_right: [f64; 2],
    pub bottom_left: [f64; 2],
}

impl QuadCorners {
    /// Corners in ordering convention order (TL, TR, BR, BL).
    pub fn as_array(&self) -> [[f64; 2]; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }
}

/// Fewer than four qualifying markers were found. Unrecoverable for the
/// sheet: the same pixels always yield the same markers, so there is
/// nothing to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientFiducialsError {
    pub found: usize,
}

impl std::fmt::Display for InsufficientFiducialsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "only {} of 4 triangular fiducial markers detected",
            self.found
        )
    }
}

impl std::error::Error for InsufficientFiducialsError {}

// ── Detection ────────────────────────────────────────────────────────────

/// Detect triangular fiducial markers in a sheet photo.
///
/// Returns every qualifying marker, in no particular order; see
/// [`order_corners`] for the ordering step.
pub fn find_fiducials(photo: &RgbImage, config: &FiducialConfig) -> Vec<Fiducial> {
    let gray = image::imageops::grayscale(photo);
    let smoothed = imageproc::filter::gaussian_blur_f32(&gray, config.blur_sigma);
    let binary = threshold_inv(&smoothed, config.threshold);

    let mut fiducials = Vec::new();
    for contour in external_contours(&binary) {
        if contour.len() < 3 {
            continue;
        }
        let epsilon = config.approx_tolerance * arc_length(&contour, true);
        let polygon = approximate_polygon_dp(&contour, epsilon, true);
        if polygon.len() != 3 {
            continue;
        }
        let Some((centroid, area)) = polygon_centroid(&polygon) else {
            continue;
        };
        if area <= config.min_area {
            continue;
        }
        fiducials.push(Fiducial {
            vertices: [
                [polygon[0].x as f64, polygon[0].y as f64],
                [polygon[1].x as f64, polygon[1].y as f64],
                [polygon[2].x as f64, polygon[2].y as f64],
            ],
            centroid,
            area,
        });
    }
    fiducials
}

/// Order marker centroids into [`QuadCorners`].
///
/// The two topmost-by-y centroids form the upper pair (sorted by x
/// ascending → TL, TR) and the two bottommost-by-y form the lower pair
/// (sorted by x descending → BR, BL); extra detections between the pairs
/// are discarded as noise. The y-first split assumes the sheet is rotated
/// less than ~45° in the photo — a documented limitation of the layout,
/// not of the sort.
pub fn order_corners(fiducials: &[Fiducial]) -> Result<QuadCorners, InsufficientFiducialsError> {
    if fiducials.len() < 4 {
        return Err(InsufficientFiducialsError {
            found: fiducials.len(),
        });
    }

    let mut centers: Vec<[f64; 2]> = fiducials.iter().map(|f| f.centroid).collect();
    centers.sort_by(|a, b| a[1].total_cmp(&b[1]));

    let mut upper = [centers[0], centers[1]];
    let mut lower = [centers[centers.len() - 2], centers[centers.len() - 1]];
    upper.sort_by(|a, b| a[0].total_cmp(&b[0]));
    lower.sort_by(|a, b| b[0].total_cmp(&a[0]));

    Ok(QuadCorners {
        top_left: upper[0],
        top_right: upper[1],
        bottom_right: lower[0],
        bottom_left: lower[1],
    })
}

// ── Contour helpers ──────────────────────────────────────────────────────

/// External contours of a binary mask: outermost borders only, holes and
/// nested content excluded.
pub(crate) fn external_contours(binary: &image::GrayImage) -> Vec<Vec<Point<i32>>> {
    find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| c.points)
        .collect()
}

/// Unsigned shoelace area of a closed contour, in px².
pub(crate) fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut doubled = 0.0;
    for i in 0..points.len() {
        let p = points[i];
        let q = points[(i + 1) % points.len()];
        doubled += p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
    }
    (doubled * 0.5).abs()
}

/// Area-weighted centroid of a closed polygon via its first moments,
/// `(M10/M00, M01/M00)`. Returns `None` when the signed area vanishes
/// (degenerate polygon).
fn polygon_centroid(points: &[Point<i32>]) -> Option<([f64; 2], f64)> {
    if points.len() < 3 {
        return None;
    }
    let mut m00 = 0.0;
    let mut m10 = 0.0;
    let mut m01 = 0.0;
    for i in 0..points.len() {
        let p = points[i];
        let q = points[(i + 1) % points.len()];
        let cross = p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
        m00 += cross;
        m10 += (p.x + q.x) as f64 * cross;
        m01 += (p.y + q.y) as f64 * cross;
    }
    m00 *= 0.5;
    if m00.abs() < f64::EPSILON {
        return None;
    }
    Some(([m10 / (6.0 * m00), m01 / (6.0 * m00)], m00.abs()))
}

// ── Tests ────────────────────────────────────────────────────────────────
