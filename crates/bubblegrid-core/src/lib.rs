//! bubblegrid-core — answer extraction from photographed bubble sheets.
//!
//! Sheets carry three printed triangular fiducial markers plus one implicit
//! corner; answers are filled-in bubbles arranged in three columns of twenty
//! questions with five options each. The pipeline stages are:
//!
//! 1. **Fiducial** – triangle marker detection on a blurred, globally
//!    thresholded mask; corner ordering.
//! 2. **Rectify** – quad-to-rectangle perspective warp (DLT homography),
//!    fixed top/bottom margin trim.
//! 3. **Segment** – three vertical strips, each tightened to its ink
//!    content via adaptive thresholding and contour bounding.
//! 4. **Classify** – per-question ink-density comparison across the five
//!    option cells, producing a letter or blank verdict.
//!
//! # Public API
//! [`SheetPipeline`] is the primary entry point; [`SheetConfig`] carries
//! every tunable constant. [`SheetObserver`] is an optional debug tap that
//! never influences results. The individual stages are public for callers
//! that want to run them separately.

pub mod classify;
pub mod config;
pub mod fiducial;
pub mod homography;
pub mod observer;
pub mod pipeline;
pub mod rectify;
pub mod segment;
pub mod vis;

mod threshold;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{BubbleConfig, ColumnConfig, FiducialConfig, RectifyConfig, SheetConfig, SheetLayout};
pub use fiducial::{Fiducial, InsufficientFiducialsError, QuadCorners};
pub use observer::{NullObserver, SheetObserver};
pub use pipeline::SheetPipeline;
pub use rectify::{GeometryError, RectifyError};

use serde::{Deserialize, Serialize};

/// Number of answer options per question. The leading sixth cell of each
/// question band holds the printed question number and is never scored.
pub const OPTION_COUNT: usize = 5;

/// The classifier's decision for one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerVerdict {
    A,
    B,
    C,
    D,
    E,
    /// No option cell reached the ink floor.
    #[serde(rename = "-")]
    Blank,
}

impl AnswerVerdict {
    /// Verdict for a zero-based option cell index (0 ⇒ A … 4 ⇒ E).
    pub fn from_option_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::A),
            1 => Some(Self::B),
            2 => Some(Self::C),
            3 => Some(Self::D),
            4 => Some(Self::E),
            _ => None,
        }
    }

    /// Zero-based option cell index, or `None` for [`AnswerVerdict::Blank`].
    pub fn option_index(self) -> Option<usize> {
        match self {
            Self::A => Some(0),
            Self::B => Some(1),
            Self::C => Some(2),
            Self::D => Some(3),
            Self::E => Some(4),
            Self::Blank => None,
        }
    }

    pub fn is_blank(self) -> bool {
        self == Self::Blank
    }

    /// The letter, or `-` for a blank verdict (the tabular output form).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::Blank => "-",
        }
    }
}

impl std::fmt::Display for AnswerVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered verdicts for one sheet, column by column, question by question.
///
/// Sixty entries when all three columns are located; a multiple of twenty
/// otherwise. The association with a sheet identity (filename, candidate
/// index) belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetResult {
    pub verdicts: Vec<AnswerVerdict>,
}

impl SheetResult {
    /// An entirely blank sheet is a valid result; whether to keep it is the
    /// caller's decision.
    pub fn is_all_blank(&self) -> bool {
        self.verdicts.iter().all(|v| v.is_blank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_letters_round_trip_option_indices() {
        for idx in 0..OPTION_COUNT {
            let v = AnswerVerdict::from_option_index(idx).unwrap();
            assert_eq!(v.option_index(), Some(idx));
            assert!(!v.is_blank());
        }
        assert_eq!(AnswerVerdict::from_option_index(OPTION_COUNT), None);
        assert_eq!(AnswerVerdict::Blank.option_index(), None);
    }

    #[test]
    fn verdict_serializes_as_letter_or_dash() {
        assert_eq!(serde_json::to_string(&AnswerVerdict::C).unwrap(), "\"C\"");
        assert_eq!(serde_json::to_string(&AnswerVerdict::Blank).unwrap(), "\"-\"");
        let back: AnswerVerdict = serde_json::from_str("\"-\"").unwrap();
        assert_eq!(back, AnswerVerdict::Blank);
    }

    #[test]
    fn all_blank_detection() {
        let blank = SheetResult {
            verdicts: vec![AnswerVerdict::Blank; 60],
        };
        assert!(blank.is_all_blank());

        let mut one_mark = blank.clone();
        one_mark.verdicts[17] = AnswerVerdict::B;
        assert!(!one_mark.is_all_blank());
    }
}
