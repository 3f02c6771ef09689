//! Shared synthetic-sheet rendering for image-based unit tests.
//!
//! Consolidates the triangle, frame, and filled-bubble drawing used across
//! the stage tests, plus a full photo generator whose geometry is chosen
//! so that the default [`crate::config::SheetConfig`] maps it onto a known
//! cell grid:
//!
//! - fiducial centroids span 800 × 1200, so the rectified sheet is
//!   800 × 850 after the default 150/200 trim;
//! - each 266-wide column strip carries a 242 × 826 frame inset by 12 px,
//!   which the segmenter tightens by 7 px per side to a 228 × 812 crop;
//! - the crop divides into 38-wide cells and 40-tall bands, and a filled
//!   bubble covers 30 × 32 = 960 px of ink, comfortably past the 600-px
//!   floor even after warp resampling.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;

pub(crate) const PAPER: Rgb<u8> = Rgb([245, 245, 245]);
pub(crate) const INK: Rgb<u8> = Rgb([15, 15, 15]);

/// Nominal flat-sheet layout constants (see module docs).
const STRIP_W: i32 = 266;
const FRAME_INSET: i32 = 12;
const FRAME_W: u32 = 242;
const FRAME_H: u32 = 826;
const CELL_W: i32 = 38;
const BAND_H: i32 = 40;
const TIGHTEN: i32 = 7;

pub(crate) fn blank_photo(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, PAPER)
}

/// Filled triangle whose vertex mean sits on `centroid`.
pub(crate) fn draw_triangle(img: &mut RgbImage, centroid: [f64; 2], radius: f64) {
    let (cx, cy) = (centroid[0], centroid[1]);
    let points = [
        Point::new(cx as i32, (cy - radius) as i32),
        Point::new((cx - 0.9 * radius) as i32, (cy + 0.5 * radius) as i32),
        Point::new((cx + 0.9 * radius) as i32, (cy + 0.5 * radius) as i32),
    ];
    draw_polygon_mut(img, &points, INK);
}

/// Hollow rectangle of the given stroke thickness.
pub(crate) fn draw_column_frame(
    img: &mut RgbImage,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    thickness: u32,
) {
    for t in 0..thickness {
        draw_hollow_rect_mut(
            img,
            Rect::at(x + t as i32, y + t as i32).of_size(width - 2 * t, height - 2 * t),
            INK,
        );
    }
}

/// Fill the bubble of `option` in band `question` of a column whose cells
/// are `cell_width` × `band_height`, leaving a 4-px rim inside the cell.
pub(crate) fn fill_option_cell(
    img: &mut RgbImage,
    cell_width: u32,
    band_height: u32,
    question: usize,
    option: usize,
) {
    let x = (option as u32 + 1) * cell_width + 4;
    let y = question as u32 * band_height + 4;
    draw_filled_rect_mut(
        img,
        Rect::at(x as i32, y as i32).of_size(cell_width - 8, band_height - 8),
        INK,
    );
}

/// Draw the three framed answer columns (and any filled bubbles) with
/// their top-left corner at `(dx, dy)`. Marks are `(column, question,
/// option)` triples, zero-based.
fn draw_answer_area(img: &mut RgbImage, dx: i32, dy: i32, marks: &[(usize, usize, usize)]) {
    for i in 0..3 {
        draw_column_frame(img, dx + i * STRIP_W + FRAME_INSET, dy + FRAME_INSET, FRAME_W, FRAME_H, 3);
    }
    for &(column, question, option) in marks {
        let x = dx
            + column as i32 * STRIP_W
            + FRAME_INSET
            + TIGHTEN
            + (option as i32 + 1) * CELL_W
            + 4;
        let y = dy + FRAME_INSET + TIGHTEN + question as i32 * BAND_H + 4;
        draw_filled_rect_mut(img, Rect::at(x, y).of_size(30, 32), INK);
    }
}

/// An already-rectified sheet (no markers, no margins) matching the
/// default layout: 800 × 850 with the answer area at the origin.
pub(crate) fn draw_flat_sheet(marks: &[(usize, usize, usize)]) -> RgbImage {
    let mut sheet = blank_photo(800, 850);
    draw_answer_area(&mut sheet, 0, 0, marks);
    sheet
}

/// Geometry of a synthetic sheet photo.
pub(crate) struct SheetPhotoSpec {
    pub photo_size: (u32, u32),
    /// Fiducial centroids: TL, TR, BR, BL.
    pub corners: [[f64; 2]; 4],
    pub marker_radius: f64,
    /// Leave out the bottom-left marker to provoke a fiducial failure.
    pub drop_last_fiducial: bool,
}

impl Default for SheetPhotoSpec {
    fn default() -> Self {
        Self {
            photo_size: (1000, 1400),
            corners: [
                [60.0, 100.0],
                [860.0, 100.0],
                [860.0, 1300.0],
                [60.0, 1300.0],
            ],
            marker_radius: 30.0,
            drop_last_fiducial: false,
        }
    }
}

/// Render a whole sheet photo: fiducial triangles at the given corners and
/// the answer area placed where the default rectification will land it
/// (offset by the top-left centroid plus the 150-px top trim).
pub(crate) fn draw_sheet_photo(
    spec: &SheetPhotoSpec,
    marks: &[(usize, usize, usize)],
) -> RgbImage {
    let mut photo = blank_photo(spec.photo_size.0, spec.photo_size.1);

    let count = if spec.drop_last_fiducial { 3 } else { 4 };
    for corner in spec.corners.iter().take(count) {
        draw_triangle(&mut photo, *corner, spec.marker_radius);
    }

    let dx = spec.corners[0][0] as i32;
    let dy = spec.corners[0][1] as i32 + 150;
    draw_answer_area(&mut photo, dx, dy, marks);

    photo
}
