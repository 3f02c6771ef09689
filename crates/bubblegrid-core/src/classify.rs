//! Per-question bubble-fill classification.
//!
//! A column is sliced into equal-height question bands (truncating
//! division; leftover rows at the bottom belong to no band). Each band is
//! divided into six equal-width cells: the leftmost holds the printed
//! question number and is never scored, the remaining five map to options
//! A–E. Ink density — foreground pixels after a fixed inverted
//! binarization — decides the verdict: the densest cell wins if it clears
//! the floor strictly, ties go to the lowest letter, and anything else is
//! blank.

use image::{GrayImage, RgbImage};

use crate::config::BubbleConfig;
use crate::observer::SheetObserver;
use crate::{AnswerVerdict, OPTION_COUNT};

/// Cells per question band: one question-number cell plus the options.
pub(crate) const BAND_CELLS: u32 = OPTION_COUNT as u32 + 1;

/// Classify one column into exactly `questions` verdicts.
pub fn classify_column(
    column: &RgbImage,
    config: &BubbleConfig,
    questions: usize,
) -> Vec<AnswerVerdict> {
    let gray = image::imageops::grayscale(column);
    (0..questions)
        .map(|q| {
            let ink = ink_profile(&gray, q, questions, config.ink_threshold);
            verdict_from_ink(&ink, config.min_ink_pixels)
        })
        .collect()
}

/// As [`classify_column`], additionally notifying `observer` per band.
///
/// The observer is a read-only tap; verdicts are identical to the plain
/// variant.
pub fn classify_column_observed(
    column: &RgbImage,
    config: &BubbleConfig,
    questions: usize,
    column_index: usize,
    observer: &mut dyn SheetObserver,
) -> Vec<AnswerVerdict> {
    let gray = image::imageops::grayscale(column);
    let (width, height) = gray.dimensions();
    let band_height = if questions == 0 {
        0
    } else {
        height / questions as u32
    };

    (0..questions)
        .map(|q| {
            let ink = ink_profile(&gray, q, questions, config.ink_threshold);
            let verdict = verdict_from_ink(&ink, config.min_ink_pixels);
            let band = image::imageops::crop_imm(
                &gray,
                0,
                q as u32 * band_height,
                width,
                band_height.max(1),
            )
            .to_image();
            observer.on_band(column_index, q, &band, &ink, verdict);
            verdict
        })
        .collect()
}

/// Foreground pixel counts for the five option cells of band `q`.
///
/// Bands or cells of zero size simply count nothing, which downstream
/// resolves to blank verdicts.
fn ink_profile(
    gray: &GrayImage,
    q: usize,
    questions: usize,
    ink_threshold: u8,
) -> [u32; OPTION_COUNT] {
    let (width, height) = gray.dimensions();
    let band_height = height / questions.max(1) as u32;
    let cell_width = width / BAND_CELLS;
    let y0 = q as u32 * band_height;

    let mut ink = [0u32; OPTION_COUNT];
    for (option, count) in ink.iter_mut().enumerate() {
        let x0 = (option as u32 + 1) * cell_width;
        for y in y0..y0 + band_height {
            for x in x0..x0 + cell_width {
                if gray.get_pixel(x, y)[0] <= ink_threshold {
                    *count += 1;
                }
            }
        }
    }
    ink
}

/// Pick the winning option for one band.
///
/// The first maximum wins ties, and the maximum must clear `min_ink`
/// strictly — a count exactly at the floor is still blank.
pub(crate) fn verdict_from_ink(ink: &[u32; OPTION_COUNT], min_ink: u32) -> AnswerVerdict {
    let mut best = 0;
    for i in 1..OPTION_COUNT {
        if ink[i] > ink[best] {
            best = i;
        }
    }
    if ink[best] > min_ink {
        AnswerVerdict::from_option_index(best).unwrap_or(AnswerVerdict::Blank)
    } else {
        AnswerVerdict::Blank
    }
}

// ── Tests ────────────────────────────────────────────────────────────────
