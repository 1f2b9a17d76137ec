//! Foreground masks from confidence maps.

use rayon::prelude::*;

use common::{BitBuffer2, Buffer2};

/// Mark pixels strictly above `threshold`.
///
/// Rows are packed into words independently and in parallel.
pub fn create_threshold_mask(pixels: &Buffer2<f32>, threshold: f32) -> BitBuffer2 {
    let width = pixels.width();
    let mut mask = BitBuffer2::new_default(width, pixels.height());
    let words_per_row = mask.words_per_row();
    if words_per_row == 0 {
        return mask;
    }

    mask.words_mut()
        .par_chunks_mut(words_per_row)
        .enumerate()
        .for_each(|(y, row_words)| {
            for (x, &value) in pixels.row(y).iter().enumerate() {
                if value > threshold {
                    row_words[x / 64] |= 1u64 << (x % 64);
                }
            }
        });

    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_strict() {
        let pixels = Buffer2::new(4, 1, vec![10.0f32, 84.15, 84.2, 255.0]);
        let mask = create_threshold_mask(&pixels, 84.15);
        assert!(!mask.get_xy(0, 0));
        assert!(!mask.get_xy(1, 0));
        assert!(mask.get_xy(2, 0));
        assert!(mask.get_xy(3, 0));
    }

    #[test]
    fn test_threshold_wide_rows() {
        let pixels = Buffer2::from_fn(130, 3, |x, y| {
            if x == 129 || (x == 64 && y == 1) {
                1.0
            } else {
                0.0
            }
        });
        let mask = create_threshold_mask(&pixels, 0.5);
        assert_eq!(mask.count_ones(), 4);
        assert!(mask.get_xy(64, 1));
        assert!(mask.get_xy(129, 2));
    }
}
