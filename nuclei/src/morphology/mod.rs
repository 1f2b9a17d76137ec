//! Binary morphology on bit masks.
//!
//! Dilation is separable (horizontal then vertical) and works on packed
//! 64-bit words. Hole filling floods the background from the grid border.

#[cfg(test)]
mod tests;

use rayon::prelude::*;

use common::BitBuffer2;

use crate::config::Connectivity;
use crate::labeling::LabelMap;

/// Dilate `mask` with a square structuring element of side `2 * radius + 1`.
pub fn dilate_mask(mask: &BitBuffer2, radius: usize) -> BitBuffer2 {
    if radius == 0 || mask.is_empty() {
        return mask.clone();
    }

    let width = mask.width();
    let height = mask.height();
    let words_per_row = mask.words_per_row();

    // Horizontal pass
    let mut horizontal = BitBuffer2::new_default(width, height);
    horizontal
        .words_mut()
        .par_chunks_mut(words_per_row)
        .zip(mask.words().par_chunks(words_per_row))
        .for_each(|(out_row, in_row)| {
            for (word_idx, out) in out_row.iter_mut().enumerate() {
                let mut result = if radius <= 63 {
                    dilate_word_fast(in_row, word_idx, radius)
                } else {
                    dilate_word_slow(in_row, word_idx, width, radius)
                };

                // Mask off bits beyond width in the last word
                let base_x = word_idx * 64;
                if base_x + 64 > width {
                    result &= (1u64 << (width - base_x)) - 1;
                }
                *out = result;
            }
        });

    // Vertical pass: each output row ORs the horizontal rows within `radius`
    let mut output = BitBuffer2::new_default(width, height);
    let source = horizontal.words();
    output
        .words_mut()
        .par_chunks_mut(words_per_row)
        .enumerate()
        .for_each(|(y, out_row)| {
            let y_min = y.saturating_sub(radius);
            let y_max = (y + radius).min(height - 1);
            for src_row in source[y_min * words_per_row..(y_max + 1) * words_per_row]
                .chunks(words_per_row)
            {
                for (out, &word) in out_row.iter_mut().zip(src_row) {
                    *out |= word;
                }
            }
        });

    output
}

/// Horizontal dilation of one word using bit smearing (radius <= 63).
#[inline]
fn dilate_word_fast(row: &[u64], word_idx: usize, radius: usize) -> u64 {
    let current = row[word_idx];
    let mut result = current;

    for shift in 1..=radius {
        result |= current << shift;
        result |= current >> shift;
    }

    // Left word contributes to our low bits
    if word_idx > 0 {
        let prev = row[word_idx - 1];
        if prev != 0 {
            for shift in 1..=radius {
                result |= prev >> (64 - shift);
            }
        }
    }

    // Right word contributes to our high bits
    if word_idx + 1 < row.len() {
        let next = row[word_idx + 1];
        if next != 0 {
            for shift in 1..=radius {
                result |= next << (64 - shift);
            }
        }
    }

    result
}

/// Per-bit horizontal dilation for radii spanning more than one word.
fn dilate_word_slow(row: &[u64], word_idx: usize, width: usize, radius: usize) -> u64 {
    let base_x = word_idx * 64;
    let mut result = 0u64;

    for bit in 0..64usize {
        let x = base_x + bit;
        if x >= width {
            break;
        }
        let x_min = x.saturating_sub(radius);
        let x_max = (x + radius).min(width - 1);
        if (x_min..=x_max).any(|sx| (row[sx / 64] >> (sx % 64)) & 1 != 0) {
            result |= 1u64 << bit;
        }
    }

    result
}

/// Fill holes: background pixels not 4-connected to the grid border become set.
pub fn fill_holes(mask: &BitBuffer2) -> BitBuffer2 {
    let width = mask.width();
    let height = mask.height();
    if width == 0 || height == 0 {
        return mask.clone();
    }

    let mut background = mask.clone();
    background.invert();
    let regions = LabelMap::from_mask(&background, Connectivity::Four);
    if regions.num_labels() == 0 {
        return mask.clone();
    }

    // Background labels touching the border, indexed by label
    let mut outside = vec![false; regions.num_labels() + 1];
    for x in 0..width {
        outside[regions.label_at(x, 0) as usize] = true;
        outside[regions.label_at(x, height - 1) as usize] = true;
    }
    for y in 0..height {
        outside[regions.label_at(0, y) as usize] = true;
        outside[regions.label_at(width - 1, y) as usize] = true;
    }
    outside[0] = true;

    let mut filled = mask.clone();
    for (idx, &label) in regions.labels().iter().enumerate() {
        if !outside[label as usize] {
            filled.set_xy(idx % width, idx / width, true);
        }
    }
    filled
}
