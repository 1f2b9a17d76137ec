//! Nuclei - nucleus instance extraction for whole-slide microscopy tiles.
//!
//! Turns per-pixel nucleus *detection* and *segmentation* confidence maps into
//! nucleus polygons in global slide coordinates:
//! - Peak detection and seed recall for unseeded foreground regions
//! - Compact marker-controlled watershed on the smoothed segmentation map
//! - Per-seed hole-filled basin extraction and exterior contour tracing
//! - CSV feature files with a JSON metadata sidecar
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use nuclei::{NucleusSegmenter, SegmentationConfig, SlideInfo};
//!
//! let segmenter = NucleusSegmenter::from_config(SegmentationConfig::default());
//! let report = segmenter.process_tile("tiles/0_0_1000_1000_0_2_SEG.png".as_ref(), &SlideInfo::default())?;
//!
//! println!("Found {} nuclei", report.diagnostics.final_nucleus_count);
//! ```

pub(crate) mod config;
pub(crate) mod contour;
pub(crate) mod convolution;
pub(crate) mod error;
pub(crate) mod extraction;
pub(crate) mod features;
pub(crate) mod labeling;
pub(crate) mod markers;
pub(crate) mod metadata;
pub(crate) mod morphology;
pub(crate) mod nucleus;
pub(crate) mod padding;
pub(crate) mod peaks;
pub(crate) mod seed_recall;
pub(crate) mod segmenter;
pub(crate) mod threshold_mask;
pub(crate) mod tile;
pub(crate) mod transform;
pub(crate) mod watershed;

// ============================================================================
// Configuration and errors
// ============================================================================

pub use config::{Config as SegmentationConfig, Connectivity};
pub use error::{Result, SegmentationError};

// ============================================================================
// Segmentation
// ============================================================================

pub use extraction::{Rejection, RejectionCounts};
pub use nucleus::Nucleus;
pub use peaks::{LocalMaximaPeaks, PeakDetector};
pub use segmenter::{
    NucleusSegmenter, SegmentationDiagnostics, SegmentationResult, TileReport,
};
pub use transform::CoordinateTransform;

// ============================================================================
// Pipeline stages
// ============================================================================

pub use contour::exterior_contour;
pub use convolution::gaussian_smooth;
pub use labeling::LabelMap;
pub use markers::build_markers;
pub use morphology::{dilate_mask, fill_holes};
pub use padding::{pad, pad_mask, unpad};
pub use seed_recall::{SeedRecall, recall_seeds};
pub use watershed::watershed;

// ============================================================================
// Tile I/O
// ============================================================================

pub use features::{FEATURES_CSV_HEADER, FeatureWriter, format_polygon, render_features};
pub use metadata::{AlgorithmMetadata, AlgorithmParameters, SlideInfo};
pub use tile::{TILE_SUFFIX, TileGeometry, TileMaps, TileName, read_tile};

// Re-export the grid types used throughout the public API.
pub use common::{BitBuffer2, Buffer2};
