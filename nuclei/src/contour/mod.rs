//! Exterior contour of a binary region.
//!
//! Border following is delegated to `imageproc` (Suzuki-Abe). The traced
//! chain is then compressed so only the end points of straight horizontal,
//! vertical and diagonal runs remain.


use glam::IVec2;
use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, find_contours};

use common::BitBuffer2;

use crate::config::Connectivity;
use crate::labeling::LabelMap;

/// Outer border of the 8-connected component of `mask` containing `seed`.
///
/// Vertices are pixel centers in mask coordinates, starting at the topmost
/// then leftmost pixel. Returns an empty vector when `seed` is not set.
pub fn exterior_contour(mask: &BitBuffer2, seed: (usize, usize)) -> Vec<IVec2> {
    let (seed_x, seed_y) = seed;
    if !mask.get_xy(seed_x, seed_y) {
        return Vec::new();
    }

    let components = LabelMap::from_mask(mask, Connectivity::Eight);
    let target = components.label_at(seed_x, seed_y);

    // One pixel of background on every side: imageproc only starts outer
    // borders at pixels whose left neighbour is background.
    let mut image = GrayImage::new(mask.width() as u32 + 2, mask.height() as u32 + 2);
    for (idx, _) in components
        .labels()
        .iter()
        .enumerate()
        .filter(|&(_, &label)| label == target)
    {
        let x = (idx % mask.width()) as u32 + 1;
        let y = (idx / mask.width()) as u32 + 1;
        image.put_pixel(x, y, Luma([255]));
    }

    let Some(border) = find_contours::<i32>(&image)
        .into_iter()
        .find(|contour| contour.border_type == BorderType::Outer)
    else {
        return Vec::new();
    };

    let chain: Vec<IVec2> = border
        .points
        .iter()
        .map(|p| IVec2::new(p.x - 1, p.y - 1))
        .collect();
    compress_chain(&chain)
}

/// Drop chain points lying strictly inside a straight run.
///
/// The chain is treated as closed. A point is kept when the step arriving at
/// it differs from the step leaving it.
pub fn compress_chain(chain: &[IVec2]) -> Vec<IVec2> {
    let n = chain.len();
    if n < 3 {
        return chain.to_vec();
    }

    (0..n)
        .filter(|&i| {
            let prev = chain[(i + n - 1) % n];
            let next = chain[(i + 1) % n];
            chain[i] - prev != next - chain[i]
        })
        .map(|i| chain[i])
        .collect()
}
