//! Pipeline observers — debug taps at stage boundaries.
//!
//! Observers receive intermediate artifacts (detected markers, the
//! rectified sheet, column crops, question bands) without coupling to
//! stage logic. They are strictly read-only: the pipeline produces
//! identical verdicts with or without one attached. Typical use is
//! writing annotated debug imagery from a CLI.

use image::{GrayImage, RgbImage};

use crate::fiducial::Fiducial;
use crate::{AnswerVerdict, OPTION_COUNT};

/// Stage notifications for one `process` call, delivered in pipeline order.
#[allow(unused_variables)]
pub trait SheetObserver {
    /// All qualifying fiducial candidates, before corner ordering.
    fn on_fiducials(&mut self, photo: &RgbImage, fiducials: &[Fiducial]) {}

    /// The rectified, margin-trimmed sheet.
    fn on_rectified(&mut self, sheet: &RgbImage) {}

    /// One content-tightened column crop. `index` is the strip index of
    /// located columns, left to right.
    fn on_column(&mut self, index: usize, column: &RgbImage) {}

    /// One classified question band with its per-option ink counts.
    fn on_band(
        &mut self,
        column: usize,
        question: usize,
        band: &GrayImage,
        ink: &[u32; OPTION_COUNT],
        verdict: AnswerVerdict,
    ) {
    }
}

/// The do-nothing observer; `process` is `process_with_observer` over this.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SheetObserver for NullObserver {}
