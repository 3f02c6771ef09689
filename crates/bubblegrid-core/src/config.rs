//! Pipeline configuration.
//!
//! Every numeric constant of the pipeline lives here, grouped by stage and
//! injected at construction, so tests can vary the geometry (e.g. a
//! different question count) without touching algorithm code. Defaults
//! encode the physical sheet: printed margins around the fiducials, the
//! 3-column × 20-question grid, and thresholds tuned for scanned photos.

/// Triangular fiducial detection parameters.
#[derive(Debug, Clone)]
pub struct FiducialConfig {
    /// Gaussian smoothing sigma applied before thresholding (the support of
    /// a 5-pixel kernel), suppressing photographic noise.
    pub blur_sigma: f32,
    /// Global binarization cutoff, inverted polarity (dark ink becomes
    /// foreground). Deliberately not adaptive: fiducials are printed
    /// high-contrast, and a fixed cutoff keeps marker detection
    /// sensitivity independent of local lighting.
    pub threshold: u8,
    /// Polygon approximation tolerance as a fraction of contour arc length.
    pub approx_tolerance: f64,
    /// Minimum marker area in px²; smaller triangles are noise.
    pub min_area: f64,
}

impl Default for FiducialConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1,
            threshold: 60,
            approx_tolerance: 0.03,
            min_area: 500.0,
        }
    }
}

/// Post-warp margin trim, in canonical (rectified) pixels.
///
/// The sheet prints header and footer content above/below the fiducial
/// line; these bands carry no answers and are cut away.
#[derive(Debug, Clone)]
pub struct RectifyConfig {
    /// Rows removed from the top of the warped sheet.
    pub trim_top: u32,
    /// Rows removed from the bottom of the warped sheet.
    pub trim_bottom: u32,
}

impl Default for RectifyConfig {
    fn default() -> Self {
        Self {
            trim_top: 150,
            trim_bottom: 200,
        }
    }
}

/// Column content discovery parameters.
#[derive(Debug, Clone)]
pub struct ColumnConfig {
    /// Block size of the Gaussian-weighted adaptive threshold. Adaptive
    /// (unlike fiducial detection) because lighting varies across the
    /// photographed sheet.
    pub adaptive_block: u32,
    /// Constant subtracted from the local mean before comparison.
    pub adaptive_offset: f32,
    /// Contours below this area (px²) do not contribute to the content box.
    pub min_contour_area: f64,
    /// Applied to the union box as `min - margin .. max + margin` before
    /// clamping to the strip. The negative default tightens the crop by
    /// 7 px per side, cutting the printed column frame line.
    pub bbox_margin: i32,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            adaptive_block: 11,
            adaptive_offset: 2.0,
            min_contour_area: 100.0,
            bbox_margin: -7,
        }
    }
}

/// Bubble-fill classification parameters.
#[derive(Debug, Clone)]
pub struct BubbleConfig {
    /// Fixed inverted binarization cutoff for ink counting inside a cell.
    pub ink_threshold: u8,
    /// An option wins only with strictly more foreground pixels than this;
    /// a band whose maximum sits at or below the floor is blank.
    pub min_ink_pixels: u32,
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            ink_threshold: 127,
            min_ink_pixels: 600,
        }
    }
}

/// Grid geometry of the answer area.
#[derive(Debug, Clone)]
pub struct SheetLayout {
    /// Vertical strips the rectified sheet is divided into.
    pub columns: usize,
    /// Equal-height question bands per column.
    pub questions_per_column: usize,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            columns: 3,
            questions_per_column: 20,
        }
    }
}

/// Complete, immutable pipeline configuration.
#[derive(Debug, Clone, Default)]
pub struct SheetConfig {
    pub fiducial: FiducialConfig,
    pub rectify: RectifyConfig,
    pub column: ColumnConfig,
    pub bubble: BubbleConfig,
    pub layout: SheetLayout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_sheet_geometry() {
        let config = SheetConfig::default();
        assert_eq!(config.fiducial.threshold, 60);
        assert_eq!(config.rectify.trim_top, 150);
        assert_eq!(config.rectify.trim_bottom, 200);
        assert_eq!(config.column.adaptive_block, 11);
        assert_eq!(config.column.bbox_margin, -7);
        assert_eq!(config.bubble.min_ink_pixels, 600);
        assert_eq!(config.layout.columns, 3);
        assert_eq!(config.layout.questions_per_column, 20);
    }
}
