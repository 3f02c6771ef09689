//! Debug rendering of pipeline artifacts.
//!
//! Pure functions from artifacts to annotated images; persisting them is
//! the caller's concern. Used by CLI debug output, never by the
//! classification path.

use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::classify;
use crate::fiducial::Fiducial;
use crate::AnswerVerdict;

const MARKER_COLOR: Rgb<u8> = Rgb([0, 200, 0]);
const DIVIDER_COLOR: Rgb<u8> = Rgb([220, 0, 0]);
const WINNER_COLOR: Rgb<u8> = Rgb([0, 180, 0]);

/// Detected fiducials over the photo: triangle outlines plus centroid
/// crosses.
pub fn render_fiducial_overlay(photo: &RgbImage, fiducials: &[Fiducial]) -> RgbImage {
    let mut canvas = photo.clone();
    for fiducial in fiducials {
        let v = fiducial.vertices;
        for i in 0..3 {
            let a = v[i];
            let b = v[(i + 1) % 3];
            draw_line_segment_mut(
                &mut canvas,
                (a[0] as f32, a[1] as f32),
                (b[0] as f32, b[1] as f32),
                MARKER_COLOR,
            );
        }
        draw_cross_mut(
            &mut canvas,
            MARKER_COLOR,
            fiducial.centroid[0] as i32,
            fiducial.centroid[1] as i32,
        );
    }
    canvas
}

/// One question band with its option-cell dividers and, for a letter
/// verdict, a box around the winning cell.
pub fn render_band_grid(band: &GrayImage, verdict: AnswerVerdict) -> RgbImage {
    let mut canvas = imageproc::map::map_colors(band, |p| Rgb([p[0], p[0], p[0]]));
    let (width, height) = canvas.dimensions();
    let cell_width = width / classify::BAND_CELLS;
    if cell_width == 0 || height == 0 {
        return canvas;
    }

    for j in 1..classify::BAND_CELLS {
        let x = (j * cell_width) as f32;
        draw_line_segment_mut(&mut canvas, (x, 0.0), (x, height as f32), DIVIDER_COLOR);
    }

    if let Some(option) = verdict.option_index() {
        let x = (option as u32 + 1) * cell_width;
        draw_hollow_rect_mut(
            &mut canvas,
            Rect::at(x as i32, 0).of_size(cell_width, height),
            WINNER_COLOR,
        );
    }
    canvas
}

// ── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::blank_photo;
    use image::Luma;

    #[test]
    fn band_grid_draws_dividers_and_winner_box() {
        let band = GrayImage::from_pixel(240, 42, Luma([255]));
        let rendered = render_band_grid(&band, AnswerVerdict::C);

        // Divider at the first cell boundary.
        assert_eq!(*rendered.get_pixel(40, 10), DIVIDER_COLOR);
        // Winner box on cell C (cells are 40 wide, C starts at 120).
        assert_eq!(*rendered.get_pixel(130, 0), WINNER_COLOR);
        // Cell interiors stay untouched.
        assert_eq!(*rendered.get_pixel(20, 20), Rgb([255, 255, 255]));
    }

    #[test]
    fn blank_verdict_draws_no_winner_box() {
        let band = GrayImage::from_pixel(240, 42, Luma([255]));
        let rendered = render_band_grid(&band, AnswerVerdict::Blank);
        assert_eq!(*rendered.get_pixel(130, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn fiducial_overlay_marks_the_triangle() {
        let photo = blank_photo(100, 100);
        let fiducial = Fiducial {
            vertices: [[10.0, 10.0], [60.0, 10.0], [10.0, 60.0]],
            centroid: [26.6, 26.6],
            area: 1250.0,
        };
        let rendered = render_fiducial_overlay(&photo, &[fiducial]);
        assert_eq!(*rendered.get_pixel(30, 10), MARKER_COLOR);
        assert_eq!(*rendered.get_pixel(26, 26), MARKER_COLOR);
    }
}
