//! End-to-end sheet processing.
//!
//! [`SheetPipeline`] composes rectification, column segmentation, and
//! bubble classification for one photo. Each call is independent and
//! stateless: the pipeline holds only configuration, so sheets may be
//! processed from parallel threads without synchronization.

use image::RgbImage;

use crate::classify::{classify_column, classify_column_observed};
use crate::config::SheetConfig;
use crate::fiducial::{find_fiducials, order_corners};
use crate::observer::SheetObserver;
use crate::rectify::{warp_and_trim, RectifyError};
use crate::segment::segment_columns;
use crate::SheetResult;

/// Primary processing interface. Create once, process many sheets.
#[derive(Debug, Clone, Default)]
pub struct SheetPipeline {
    config: SheetConfig,
}

impl SheetPipeline {
    pub fn new(config: SheetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    /// Process one sheet photo into its ordered verdict sequence.
    ///
    /// Fails the whole sheet atomically on fiducial or geometry errors —
    /// a partially rectified sheet would silently misalign every
    /// downstream answer. An all-blank result is valid; the caller
    /// decides its fate.
    pub fn process(&self, photo: &RgbImage) -> Result<SheetResult, RectifyError> {
        self.run(photo, None)
    }

    /// As [`SheetPipeline::process`], notifying `observer` at each stage.
    pub fn process_with_observer(
        &self,
        photo: &RgbImage,
        observer: &mut dyn SheetObserver,
    ) -> Result<SheetResult, RectifyError> {
        self.run(photo, Some(observer))
    }

    fn run(
        &self,
        photo: &RgbImage,
        mut observer: Option<&mut dyn SheetObserver>,
    ) -> Result<SheetResult, RectifyError> {
        let fiducials = find_fiducials(photo, &self.config.fiducial);
        tracing::debug!("{} fiducial candidates", fiducials.len());
        if let Some(obs) = observer.as_mut() {
            obs.on_fiducials(photo, &fiducials);
        }

        let corners = order_corners(&fiducials)?;
        let sheet = warp_and_trim(photo, &corners, &self.config.rectify)?;
        tracing::debug!(
            "rectified sheet {}x{}",
            sheet.width(),
            sheet.height()
        );
        if let Some(obs) = observer.as_mut() {
            obs.on_rectified(&sheet);
        }

        let columns = segment_columns(&sheet, &self.config.column, self.config.layout.columns);
        tracing::info!(
            "{} of {} columns located",
            columns.len(),
            self.config.layout.columns
        );

        let questions = self.config.layout.questions_per_column;
        let mut verdicts = Vec::with_capacity(columns.len() * questions);
        for (index, column) in columns.iter().enumerate() {
            match observer.as_mut() {
                Some(obs) => {
                    obs.on_column(index, column);
                    verdicts.extend(classify_column_observed(
                        column,
                        &self.config.bubble,
                        questions,
                        index,
                        &mut **obs,
                    ));
                }
                None => {
                    verdicts.extend(classify_column(column, &self.config.bubble, questions));
                }
            }
        }
        tracing::info!(
            "{} verdicts, {} marked",
            verdicts.len(),
            verdicts.iter().filter(|v| !v.is_blank()).count()
        );

        Ok(SheetResult { verdicts })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────
