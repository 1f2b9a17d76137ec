//! Peak detection on the detection confidence map.
//!
//! The pipeline only needs a binary grid of candidate nucleus centers, so
//! detectors sit behind the [`PeakDetector`] trait. [`LocalMaximaPeaks`] is
//! the built-in detector.


use rayon::prelude::*;

use common::{BitBuffer2, Buffer2};

/// Turns a detection confidence map into candidate seed pixels.
pub trait PeakDetector: Sync {
    /// `threshold` is a fraction of the map's confidence range.
    fn peaks(&self, map: &Buffer2<f32>, threshold: f32) -> BitBuffer2;
}

/// Marks strict-enough 8-neighbourhood maxima above the threshold.
///
/// A pixel is a peak when its value exceeds `threshold * confidence_max`, is
/// `>=` all 8 neighbours and `>` the neighbours that precede it in row-major
/// order. Only plateau pixels without an equal neighbour earlier in scan order
/// survive, so a compact plateau yields one peak. Neighbours outside the grid
/// are ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalMaximaPeaks {
    pub confidence_max: f32,
}

impl Default for LocalMaximaPeaks {
    fn default() -> Self {
        Self {
            confidence_max: 255.0,
        }
    }
}

/// 8-neighbour offsets in row-major order; the first four precede the center.
const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

impl LocalMaximaPeaks {
    #[inline]
    fn is_peak(map: &Buffer2<f32>, x: usize, y: usize, value: f32) -> bool {
        NEIGHBORS.iter().enumerate().all(|(i, &(dx, dy))| {
            let nx = x as isize + dx;
            let ny = y as isize + dy;
            if nx < 0 || ny < 0 || nx as usize >= map.width() || ny as usize >= map.height() {
                return true;
            }
            let neighbor = map[(nx as usize, ny as usize)];
            if i < 4 { value > neighbor } else { value >= neighbor }
        })
    }
}

impl PeakDetector for LocalMaximaPeaks {
    fn peaks(&self, map: &Buffer2<f32>, threshold: f32) -> BitBuffer2 {
        let min_value = threshold * self.confidence_max;
        let mut peaks = BitBuffer2::new_default(map.width(), map.height());
        let words_per_row = peaks.words_per_row();
        if words_per_row == 0 {
            return peaks;
        }

        peaks
            .words_mut()
            .par_chunks_mut(words_per_row)
            .enumerate()
            .for_each(|(y, row_words)| {
                for (x, &value) in map.row(y).iter().enumerate() {
                    if value > min_value && Self::is_peak(map, x, y, value) {
                        row_words[x / 64] |= 1u64 << (x % 64);
                    }
                }
            });

        peaks
    }
}
