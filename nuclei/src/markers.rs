//! Watershed markers from seed pixels.

use common::BitBuffer2;

use crate::config::Connectivity;
use crate::labeling::LabelMap;
use crate::morphology::dilate_mask;

/// Dilate `seeds` by a 3x3 square and label the result.
///
/// Seeds whose dilations touch end up under one marker and later share a
/// basin. Labels are `1..=n` in row-major order of first appearance.
pub fn build_markers(seeds: &BitBuffer2, connectivity: Connectivity) -> LabelMap {
    let dilated = dilate_mask(seeds, 1);
    LabelMap::from_mask(&dilated, connectivity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_seed_becomes_3x3_marker() {
        let seeds = BitBuffer2::from_fn(7, 7, |x, y| (x, y) == (3, 3));
        let markers = build_markers(&seeds, Connectivity::Eight);

        assert_eq!(markers.num_labels(), 1);
        assert_eq!(markers.component_sizes(), vec![9]);
        assert_eq!(markers.label_at(2, 2), 1);
        assert_eq!(markers.label_at(4, 4), 1);
        assert_eq!(markers.label_at(5, 3), 0);
    }

    #[test]
    fn test_nearby_seeds_merge() {
        // Dilations of (1, 1) and (4, 1) touch edge to edge
        let seeds = BitBuffer2::from_fn(8, 4, |x, y| y == 1 && (x == 1 || x == 4));
        let markers = build_markers(&seeds, Connectivity::Eight);
        assert_eq!(markers.num_labels(), 1);
    }

    #[test]
    fn test_diagonal_touch_depends_on_connectivity() {
        // Dilated squares meet only at a corner
        let seeds = BitBuffer2::from_fn(8, 8, |x, y| (x, y) == (1, 1) || (x, y) == (4, 4));

        assert_eq!(build_markers(&seeds, Connectivity::Eight).num_labels(), 1);
        assert_eq!(build_markers(&seeds, Connectivity::Four).num_labels(), 2);
    }

    #[test]
    fn test_distant_seeds_get_sequential_labels() {
        let seeds = BitBuffer2::from_fn(12, 12, |x, y| (x, y) == (9, 2) || (x, y) == (2, 8));
        let markers = build_markers(&seeds, Connectivity::Eight);

        assert_eq!(markers.num_labels(), 2);
        assert_eq!(markers.label_at(9, 2), 1);
        assert_eq!(markers.label_at(2, 8), 2);
    }
}
