//! Nucleus segmenter: the full seed-driven watershed pipeline.
//!
//! This module contains the main [`NucleusSegmenter`] struct, its result and
//! diagnostics types, and the tile-level drivers that read a tile, segment it
//! and write the feature file plus its metadata sidecar.


// =============================================================================
// Imports
// =============================================================================

use std::path::{Path, PathBuf};

use glam::IVec2;
use rayon::prelude::*;
use serde::Serialize;

use common::Buffer2;

use crate::config::Config;
use crate::convolution::gaussian_smooth;
use crate::error::{Result, SegmentationError};
use crate::extraction::{RejectionCounts, extract_nuclei};
use crate::features::render_features;
use crate::markers::build_markers;
use crate::metadata::{AlgorithmMetadata, SlideInfo};
use crate::nucleus::Nucleus;
use crate::padding::{pad, pad_mask, unpad};
use crate::peaks::{LocalMaximaPeaks, PeakDetector};
use crate::seed_recall::recall_seeds;
use crate::threshold_mask::create_threshold_mask;
use crate::tile::{TileGeometry, TileName, read_tile};
use crate::watershed::watershed;

/// Result of segmenting one tile.
#[derive(Debug, Clone)]
pub struct SegmentationResult {
    /// Accepted nuclei in row-major seed order.
    pub nuclei: Vec<Nucleus>,
    /// Detected and synthesized seeds in tile pixel coordinates, row-major.
    ///
    /// Synthesized seeds can sit slightly outside the tile where smoothing
    /// spread foreground into the padding.
    pub seeds: Vec<IVec2>,
    /// Diagnostic information from the pipeline.
    pub diagnostics: SegmentationDiagnostics,
    /// Watershed labels over the unpadded tile; 0 is background.
    pub labels: Buffer2<u32>,
}

/// Counters collected while segmenting one tile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SegmentationDiagnostics {
    /// Seeds reported by the peak detector.
    pub detected_seeds: usize,
    /// Seeds added by seed recall.
    pub synthesized_seeds: usize,
    /// Seedless foreground regions too large to receive a seed.
    pub seedless_oversized_regions: usize,
    /// Distinct watershed markers after dilation and labeling.
    pub markers: usize,
    /// Padded-frame pixels above the foreground threshold.
    pub foreground_pixels: usize,
    /// Foreground pixels reached by the flood.
    pub labeled_pixels: usize,
    /// Seeds that produced no nucleus, by reason.
    pub rejections: RejectionCounts,
    /// Number of nuclei returned.
    pub final_nucleus_count: usize,
}

/// Files written for one tile.
#[derive(Debug, Clone)]
pub struct TileReport {
    pub tile: PathBuf,
    pub features_path: PathBuf,
    pub metadata_path: PathBuf,
    pub diagnostics: SegmentationDiagnostics,
}

// =============================================================================
// NucleusSegmenter
// =============================================================================

/// Turns detection and segmentation confidence maps into nucleus polygons.
///
/// # Example
///
/// ```rust,ignore
/// use nuclei::{NucleusSegmenter, SegmentationConfig, TileGeometry};
///
/// let segmenter = NucleusSegmenter::from_config(SegmentationConfig::default());
/// let result = segmenter.segment(&detection, &segmentation, &TileGeometry::default());
/// println!("{} nuclei", result.nuclei.len());
/// ```
#[derive(Debug)]
pub struct NucleusSegmenter<D: PeakDetector = LocalMaximaPeaks> {
    config: Config,
    detector: D,
}

impl Default for NucleusSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NucleusSegmenter {
    /// Create a segmenter with the default configuration.
    pub fn new() -> Self {
        Self::from_config(Config::default())
    }

    /// Create a segmenter using the built-in local maxima peak detector.
    pub fn from_config(config: Config) -> Self {
        let detector = LocalMaximaPeaks {
            confidence_max: config.confidence_max,
        };
        Self::with_detector(config, detector)
    }
}

impl<D: PeakDetector> NucleusSegmenter<D> {
    /// Create a segmenter with a custom peak detector.
    pub fn with_detector(config: Config, detector: D) -> Self {
        config.validate();
        Self { config, detector }
    }

    /// Get reference to the underlying configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Segment one tile given at working resolution.
    pub fn segment(
        &self,
        detection: &Buffer2<f32>,
        segmentation: &Buffer2<f32>,
        geometry: &TileGeometry,
    ) -> SegmentationResult {
        assert_eq!(
            (detection.width(), detection.height()),
            (segmentation.width(), segmentation.height()),
            "detection and segmentation maps must have the same dimensions"
        );

        let config = &self.config;
        let margin = config.padding_margin();

        // Step 1: Seeds from the detection map
        let peaks = self.detector.peaks(detection, config.det_thres);
        let mut diagnostics = SegmentationDiagnostics {
            detected_seeds: peaks.count_ones(),
            ..Default::default()
        };
        let seeds = pad_mask(&peaks, margin);

        // Step 2: Pad and smooth the segmentation map
        let smoothed = gaussian_smooth(&pad(segmentation, margin), config.smoothing_sigma);
        let foreground = create_threshold_mask(&smoothed, config.foreground_threshold());
        diagnostics.foreground_pixels = foreground.count_ones();
        tracing::debug!(
            detected_seeds = diagnostics.detected_seeds,
            foreground_pixels = diagnostics.foreground_pixels,
            margin,
            "Prepared padded maps"
        );

        // Step 3: Make sure small foreground regions own a seed
        let recall = recall_seeds(
            &seeds,
            &foreground,
            &smoothed,
            config.recall_connectivity,
            config.max_nucleus_size,
        );
        diagnostics.synthesized_seeds = recall.synthesized;
        diagnostics.seedless_oversized_regions = recall.seedless_oversized;
        if recall.synthesized > 0 || recall.seedless_oversized > 0 {
            tracing::debug!(
                synthesized = recall.synthesized,
                seedless_oversized = recall.seedless_oversized,
                "Seed recall"
            );
        }

        // Step 4: Markers and compact watershed on the negated surface
        let markers = build_markers(&recall.seeds, config.marker_connectivity);
        diagnostics.markers = markers.num_labels();
        let surface = smoothed.map(|&v| -v);
        let labels = watershed(
            &surface,
            markers.as_buffer(),
            &foreground,
            config.compactness,
        );
        diagnostics.labeled_pixels = labels.iter().filter(|&&l| l != 0).count();
        tracing::debug!(
            markers = diagnostics.markers,
            labeled_pixels = diagnostics.labeled_pixels,
            "Watershed flooded"
        );

        // Step 5: One polygon per seed
        let extraction = extract_nuclei(&labels, &recall.seeds, config, geometry);
        diagnostics.rejections = extraction.rejections;
        diagnostics.final_nucleus_count = extraction.nuclei.len();
        tracing::debug!(
            nuclei = diagnostics.final_nucleus_count,
            rejected = diagnostics.rejections.total(),
            "Extracted polygons"
        );

        let seeds = recall
            .seeds
            .iter_ones()
            .map(|(x, y)| IVec2::new(x as i32 - margin as i32, y as i32 - margin as i32))
            .collect();

        SegmentationResult {
            nuclei: extraction.nuclei,
            seeds,
            diagnostics,
            labels: unpad(&labels, margin),
        }
    }

    /// Segment the tile at `path` and write its feature file and sidecar next
    /// to it.
    ///
    /// Nothing is written unless reading and segmentation succeed.
    pub fn process_tile(&self, path: &Path, slide: &SlideInfo) -> Result<TileReport> {
        let name = TileName::from_path(path)?;
        let maps = read_tile(path, name.geometry.resize_factor)?;
        tracing::debug!(
            tile = %path.display(),
            width = maps.width(),
            height = maps.height(),
            resize_factor = name.geometry.resize_factor,
            "Read tile"
        );

        let result = self.segment(&maps.detection, &maps.segmentation, &name.geometry);

        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        let features_file = name.features_file_name();
        let features_path = dir.join(&features_file);
        let metadata_path = dir.join(name.metadata_file_name());

        let bytes = render_features(&result.nuclei).map_err(|source| SegmentationError::Csv {
            path: features_path.clone(),
            source,
        })?;
        std::fs::write(&features_path, bytes).map_err(|source| SegmentationError::Io {
            path: features_path.clone(),
            source,
        })?;

        AlgorithmMetadata::new(
            path,
            &features_file,
            slide,
            name.geometry,
            &self.config,
            result.nuclei.len(),
        )
        .write(&metadata_path)?;

        tracing::info!(
            tile = %path.display(),
            nuclei = result.diagnostics.final_nucleus_count,
            synthesized_seeds = result.diagnostics.synthesized_seeds,
            rejected = result.diagnostics.rejections.total(),
            "Tile segmented"
        );

        Ok(TileReport {
            tile: path.to_path_buf(),
            features_path,
            metadata_path,
            diagnostics: result.diagnostics,
        })
    }

    /// Process many tiles in parallel. A failing tile does not stop the others.
    ///
    /// Results are returned in input order.
    pub fn process_tiles(&self, paths: &[PathBuf], slide: &SlideInfo) -> Vec<Result<TileReport>> {
        paths
            .par_iter()
            .map(|path| {
                let report = self.process_tile(path, slide);
                if let Err(e) = &report {
                    tracing::error!(tile = %path.display(), error = %e, "Tile failed");
                }
                report
            })
            .collect()
    }
}
