//! Configuration types for nucleus segmentation.
//!
//! This module defines the flat [`Config`] struct used by every pipeline
//! stage. Parameters are grouped by comments into logical sections. The struct
//! deserializes from YAML with missing fields taking their defaults.

use serde::{Deserialize, Serialize};

use crate::convolution::kernel_radius;

// ============================================================================
// Enums
// ============================================================================

/// Pixel connectivity for connected component labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// Pixels at (x±1, y) and (x, y±1) are connected.
    #[default]
    Four,
    /// All 8 surrounding pixels are connected.
    Eight,
}

// ============================================================================
// Configuration
// ============================================================================

/// Parameters of the seed-driven watershed pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use nuclei::SegmentationConfig;
///
/// let mut config = SegmentationConfig::high_magnification();
/// config.min_nucleus_size = 40;
/// config.validate();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // -- Thresholds --
    /// Fraction of `confidence_max` above which a segmentation pixel is foreground.
    pub seg_thres: f32,
    /// Fraction of `confidence_max` handed to the peak detector.
    pub det_thres: f32,
    /// Upper end of the confidence range of both input maps.
    pub confidence_max: f32,

    // -- Geometry --
    /// Half-width of the square polygon-extraction window in pixels.
    pub window_half_size: usize,
    /// Extra padding beyond `window_half_size` for smoothing and dilation.
    pub padding_slack: usize,
    /// Minimum accepted nucleus area in working-resolution pixels.
    pub min_nucleus_size: usize,
    /// Seedless foreground components at or above this area get no synthesized seed.
    pub max_nucleus_size: usize,

    // -- Surface / flooding --
    /// Gaussian sigma applied to the padded segmentation map.
    pub smoothing_sigma: f32,
    /// Weight of the distance-to-marker term in the watershed priority.
    pub compactness: f32,
    /// Connectivity of foreground regions during seed recall.
    pub recall_connectivity: Connectivity,
    /// Connectivity used when grouping dilated seeds into markers.
    pub marker_connectivity: Connectivity,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Thresholds
            seg_thres: 0.33,
            det_thres: 0.07,
            confidence_max: 255.0,

            // Geometry
            window_half_size: 200,
            padding_slack: 10,
            min_nucleus_size: 20,
            max_nucleus_size: 65536,

            // Surface / flooding
            smoothing_sigma: 0.5,
            compactness: 1.0,
            recall_connectivity: Connectivity::Four,
            marker_connectivity: Connectivity::Eight,
        }
    }
}

impl Config {
    /// Validate the configuration, panicking if invalid.
    pub fn validate(&self) {
        // Thresholds
        assert!(
            self.seg_thres > 0.0 && self.seg_thres < 1.0,
            "seg_thres must be in (0, 1), got {}",
            self.seg_thres
        );
        assert!(
            self.det_thres >= 0.0 && self.det_thres < 1.0,
            "det_thres must be in [0, 1), got {}",
            self.det_thres
        );
        assert!(
            self.confidence_max > 0.0,
            "confidence_max must be positive, got {}",
            self.confidence_max
        );

        // Geometry
        assert!(
            self.window_half_size >= 1,
            "window_half_size must be at least 1, got {}",
            self.window_half_size
        );
        assert!(
            self.min_nucleus_size >= 1,
            "min_nucleus_size must be at least 1, got {}",
            self.min_nucleus_size
        );
        assert!(
            self.max_nucleus_size >= self.min_nucleus_size,
            "max_nucleus_size ({}) must be >= min_nucleus_size ({})",
            self.max_nucleus_size,
            self.min_nucleus_size
        );

        // Surface / flooding
        assert!(
            self.smoothing_sigma > 0.0,
            "smoothing_sigma must be positive, got {}",
            self.smoothing_sigma
        );
        assert!(
            self.compactness >= 0.0,
            "compactness must be non-negative, got {}",
            self.compactness
        );

        // Foreground can bleed `kernel_radius` pixels into the padding and the
        // marker dilation adds one more; the window around any seed must still
        // fit inside the padded grid.
        let required_slack = kernel_radius(self.smoothing_sigma).max(1);
        assert!(
            self.padding_slack >= required_slack,
            "padding_slack ({}) must cover the smoothing radius and marker dilation ({})",
            self.padding_slack,
            required_slack
        );
    }

    /// Zero margin added around both input maps.
    #[inline]
    pub fn padding_margin(&self) -> usize {
        self.window_half_size + self.padding_slack
    }

    /// Side length of the polygon-extraction window.
    #[inline]
    pub fn window_size(&self) -> usize {
        2 * self.window_half_size + 1
    }

    /// Number of pixels in the polygon-extraction window.
    #[inline]
    pub fn window_area(&self) -> usize {
        self.window_size() * self.window_size()
    }

    /// Absolute foreground threshold on the segmentation map.
    #[inline]
    pub fn foreground_threshold(&self) -> f32 {
        self.seg_thres * self.confidence_max
    }

    // =========================================================================
    // Preset Constructors
    // =========================================================================

    /// Tiles scanned at 40x where nuclei are large and well separated.
    ///
    /// Raises the minimum area so debris is dropped and leaves room for very
    /// large nuclei in the extraction window.
    pub fn high_magnification() -> Self {
        Self {
            min_nucleus_size: 80,
            window_half_size: 250,
            ..Self::default()
        }
    }

    /// Tiles scanned at 20x with small, tightly packed nuclei.
    ///
    /// A smaller window keeps extraction cheap and a smaller minimum area keeps
    /// lymphocytes.
    pub fn low_magnification() -> Self {
        Self {
            min_nucleus_size: 8,
            window_half_size: 100,
            max_nucleus_size: 16384,
            ..Self::default()
        }
    }
}
