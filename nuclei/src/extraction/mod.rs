//! Per-seed polygon extraction from the watershed label map.
//!
//! Each seed looks at a square window centered on itself, takes the basin
//! carrying its own label, fills holes, applies the area limits and traces
//! the exterior contour. A basin is extracted once, for the first of its
//! seeds in row-major order. Seeds are independent and run on the rayon pool;
//! results keep the row-major seed order.

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use glam::IVec2;
use rayon::prelude::*;
use serde::Serialize;

use common::{BitBuffer2, Buffer2};

use crate::config::Config;
use crate::contour::exterior_contour;
use crate::morphology::fill_holes;
use crate::nucleus::Nucleus;
use crate::tile::TileGeometry;
use crate::transform::CoordinateTransform;

/// Why a seed produced no nucleus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The seed lies outside the flooded foreground.
    Unlabeled,
    /// Filled area below `min_nucleus_size`.
    TooSmall,
    /// Filled area covers the whole window.
    WindowOverflow,
    /// Contour with fewer than 3 vertices.
    DegenerateContour,
    /// An earlier seed already claimed the same basin.
    DuplicateBasin,
}

/// Rejection tally for one tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RejectionCounts {
    pub unlabeled: usize,
    pub too_small: usize,
    pub window_overflow: usize,
    pub degenerate_contour: usize,
    pub duplicate_basin: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::Unlabeled => self.unlabeled += 1,
            Rejection::TooSmall => self.too_small += 1,
            Rejection::WindowOverflow => self.window_overflow += 1,
            Rejection::DegenerateContour => self.degenerate_contour += 1,
            Rejection::DuplicateBasin => self.duplicate_basin += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.unlabeled
            + self.too_small
            + self.window_overflow
            + self.degenerate_contour
            + self.duplicate_basin
    }
}

/// Output of [`extract_nuclei`].
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Accepted nuclei in row-major seed order.
    pub nuclei: Vec<Nucleus>,
    pub rejections: RejectionCounts,
}

/// Extract one nucleus per seed from a padded label map.
///
/// `labels` and `seeds` live in the frame padded by `config.padding_margin()`.
pub fn extract_nuclei(
    labels: &Buffer2<u32>,
    seeds: &BitBuffer2,
    config: &Config,
    geometry: &TileGeometry,
) -> Extraction {
    assert_eq!(
        (labels.width(), labels.height()),
        (seeds.width(), seeds.height()),
        "labels and seeds must have the same dimensions"
    );

    let seed_positions: Vec<(usize, usize)> = seeds.iter_ones().collect();

    // Seeds merged into one marker share a basin; only the first extracts it
    let mut claimed = HashSet::new();
    let owners: Vec<bool> = seed_positions
        .iter()
        .map(|&(x, y)| {
            let label = labels[(x, y)];
            label == 0 || claimed.insert(label)
        })
        .collect();

    let results: Vec<Result<Nucleus, Rejection>> = seed_positions
        .par_iter()
        .zip(owners.par_iter())
        .map(|(&seed, &owner)| {
            if owner {
                extract_nucleus(labels, seed, config, geometry)
            } else {
                Err(Rejection::DuplicateBasin)
            }
        })
        .collect();

    let mut extraction = Extraction::default();
    for (&(x, y), result) in seed_positions.iter().zip(results) {
        match result {
            Ok(nucleus) => extraction.nuclei.push(nucleus),
            Err(rejection) => {
                tracing::trace!(x, y, ?rejection, "Seed rejected");
                extraction.rejections.record(rejection);
            }
        }
    }

    extraction
}

/// Extract the nucleus grown from the seed at `(x, y)`.
pub fn extract_nucleus(
    labels: &Buffer2<u32>,
    (x, y): (usize, usize),
    config: &Config,
    geometry: &TileGeometry,
) -> Result<Nucleus, Rejection> {
    let half = config.window_half_size;
    let size = config.window_size();
    assert!(
        x >= half && y >= half && x + half < labels.width() && y + half < labels.height(),
        "window around seed ({x}, {y}) leaves the {}x{} label map",
        labels.width(),
        labels.height()
    );

    let label = labels[(x, y)];
    if label == 0 {
        return Err(Rejection::Unlabeled);
    }

    let (x0, y0) = (x - half, y - half);
    let basin = BitBuffer2::from_fn(size, size, |wx, wy| labels[(x0 + wx, y0 + wy)] == label);
    let filled = fill_holes(&basin);

    let pixel_area = filled.count_ones();
    if pixel_area < config.min_nucleus_size {
        return Err(Rejection::TooSmall);
    }
    if pixel_area >= config.window_area() {
        return Err(Rejection::WindowOverflow);
    }

    let contour = exterior_contour(&filled, (half, half));
    if contour.len() < 3 {
        return Err(Rejection::DegenerateContour);
    }

    let transform = CoordinateTransform::for_window(
        IVec2::new(x0 as i32, y0 as i32),
        config.padding_margin(),
        geometry.resize_factor,
        geometry.offset(),
    );
    let polygon = contour.into_iter().map(|p| transform.apply(p)).collect();

    Ok(Nucleus::new(polygon, pixel_area, geometry.resize_factor))
}
