//! Seed recall: every small foreground region gets at least one seed.
//!
//! The detector can miss faint or crowded nuclei that the segmentation map
//! still covers. Regions without any detector seed receive a synthesized seed
//! at their highest-potential pixel, unless the region is so large that it is
//! more likely tissue background than a single nucleus.


use common::{BitBuffer2, Buffer2};

use crate::config::Connectivity;
use crate::labeling::LabelMap;

/// Result of [`recall_seeds`].
#[derive(Debug, Clone)]
pub struct SeedRecall {
    /// Original seeds plus synthesized ones.
    pub seeds: BitBuffer2,
    /// Number of seeds added.
    pub synthesized: usize,
    /// Seedless regions left alone because they reached `max_nucleus_size`.
    pub seedless_oversized: usize,
}

/// Per-region bookkeeping gathered in one row-major pass.
#[derive(Debug, Clone, Copy, Default)]
struct RegionStats {
    size: usize,
    has_seed: bool,
    /// Linear index of the first pixel holding the maximum potential.
    best_idx: usize,
    best_value: f32,
}

/// Add one seed to each seedless foreground region smaller than
/// `max_nucleus_size`.
///
/// The new seed sits at the region's maximum of `potential`; ties go to the
/// first pixel in row-major order. `seeds` is left untouched.
pub fn recall_seeds(
    seeds: &BitBuffer2,
    foreground: &BitBuffer2,
    potential: &Buffer2<f32>,
    connectivity: Connectivity,
    max_nucleus_size: usize,
) -> SeedRecall {
    let width = foreground.width();
    assert_eq!(
        (seeds.width(), seeds.height()),
        (width, foreground.height()),
        "seed and foreground grids must match"
    );
    assert_eq!(
        (potential.width(), potential.height()),
        (width, foreground.height()),
        "potential and foreground grids must match"
    );

    let regions = LabelMap::from_mask(foreground, connectivity);
    let mut stats = vec![RegionStats::default(); regions.num_labels()];

    for (idx, &label) in regions.labels().iter().enumerate() {
        if label == 0 {
            continue;
        }
        let region = &mut stats[label as usize - 1];
        let value = potential[idx];
        if region.size == 0 || value > region.best_value {
            region.best_idx = idx;
            region.best_value = value;
        }
        region.size += 1;
    }

    for (x, y) in seeds.iter_ones() {
        let label = regions.label_at(x, y);
        if label != 0 {
            stats[label as usize - 1].has_seed = true;
        }
    }

    let mut recalled = seeds.clone();
    let mut synthesized = 0;
    let mut seedless_oversized = 0;
    for region in stats.iter().filter(|r| !r.has_seed) {
        if region.size < max_nucleus_size {
            recalled.set_xy(region.best_idx % width, region.best_idx / width, true);
            synthesized += 1;
        } else {
            seedless_oversized += 1;
        }
    }

    SeedRecall {
        seeds: recalled,
        synthesized,
        seedless_oversized,
    }
}
