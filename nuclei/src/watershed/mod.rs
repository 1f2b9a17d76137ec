//! Compact marker-controlled watershed.
//!
//! Priority flooding from labeled markers over a surface, restricted to a
//! binary mask. The priority of a pixel is its surface value plus
//! `compactness` times its Euclidean distance to the marker pixel the flood
//! came from, which keeps basins round where the surface is flat. Entries
//! with equal priority pop in insertion order.


use std::cmp::Ordering;
use std::collections::BinaryHeap;

use common::{BitBuffer2, Buffer2};

/// 4-connected neighbour offsets.
const NEIGHBORS: [(isize, isize); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

/// Heap entry for the flooding queue.
#[derive(Debug, Clone, Copy)]
struct FloodItem {
    value: f64,
    age: u64,
    index: usize,
    source: usize,
}

impl PartialEq for FloodItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloodItem {}

impl PartialOrd for FloodItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloodItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on (value, age): lowest surface first, oldest among equals
        other
            .value
            .total_cmp(&self.value)
            .then_with(|| other.age.cmp(&self.age))
    }
}

/// Flood `surface` from `markers` within `mask`.
///
/// `markers` holds one non-zero label per marker pixel; marker pixels outside
/// `mask` are dropped. Returns a label grid where every masked pixel reachable
/// from a marker carries that marker's label and everything else is 0.
pub fn watershed(
    surface: &Buffer2<f32>,
    markers: &Buffer2<u32>,
    mask: &BitBuffer2,
    compactness: f32,
) -> Buffer2<u32> {
    let width = surface.width();
    let height = surface.height();
    assert_eq!(
        (markers.width(), markers.height()),
        (width, height),
        "markers and surface must have the same dimensions"
    );
    assert_eq!(
        (mask.width(), mask.height()),
        (width, height),
        "mask and surface must have the same dimensions"
    );

    let compactness = compactness as f64;
    let mut output = Buffer2::new_default(width, height);
    let mut heap = BinaryHeap::new();

    // Markers enter in row-major order; their ages keep ties deterministic
    let mut age = 0u64;
    for (x, y) in mask.iter_ones() {
        let label = markers[(x, y)];
        if label == 0 {
            continue;
        }
        let index = y * width + x;
        output[index] = label;
        heap.push(FloodItem {
            value: surface[index] as f64,
            age,
            index,
            source: index,
        });
        age += 1;
    }

    while let Some(item) = heap.pop() {
        if item.index != item.source && output[item.index] != 0 {
            // Reached earlier through a cheaper or older path
            continue;
        }
        output[item.index] = output[item.source];

        let (x, y) = (item.index % width, item.index / width);
        let (sx, sy) = (item.source % width, item.source / width);
        for &(dx, dy) in &NEIGHBORS {
            let nx = x as isize + dx;
            let ny = y as isize + dy;
            if nx < 0 || ny < 0 || nx as usize >= width || ny as usize >= height {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if !mask.get_xy(nx, ny) {
                continue;
            }
            let index = ny * width + nx;
            if output[index] != 0 {
                continue;
            }

            let mut value = surface[index] as f64;
            if compactness > 0.0 {
                let ddx = nx as f64 - sx as f64;
                let ddy = ny as f64 - sy as f64;
                value += compactness * (ddx * ddx + ddy * ddy).sqrt();
            }
            heap.push(FloodItem {
                value,
                age,
                index,
                source: item.source,
            });
            age += 1;
        }
    }

    output
}
