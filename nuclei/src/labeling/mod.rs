//! Connected component labeling using union-find.
//!
//! Run-length encoded, word-level scan of a [`BitBuffer2`]:
//! - Runs are extracted per row with trailing-zero counting
//! - Runs overlapping the previous row are merged through union-find
//! - Provisional labels are flattened to sequential `1..=n`
//!
//! Union always keeps the smaller root, so final labels follow the row-major
//! order in which components first appear.

#[cfg(test)]
mod tests;

use common::{BitBuffer2, Buffer2};

use crate::config::Connectivity;

// ============================================================================
// Run-Length Encoding
// ============================================================================

/// A horizontal run of foreground pixels.
#[derive(Debug, Clone, Copy)]
struct Run {
    start: u32, // Starting x coordinate (inclusive)
    end: u32,   // Ending x coordinate (exclusive)
    label: u32, // Provisional label
}

impl Run {
    /// Search window in the previous row as `(start, end)`, end exclusive.
    #[inline]
    fn search_window(&self, connectivity: Connectivity) -> (u32, u32) {
        match connectivity {
            Connectivity::Four => (self.start, self.end),
            Connectivity::Eight => (self.start.saturating_sub(1), self.end + 1),
        }
    }
}

/// Check if two runs from adjacent rows are connected.
#[inline]
fn runs_connected(prev: &Run, curr: &Run, connectivity: Connectivity) -> bool {
    match connectivity {
        Connectivity::Four => prev.start < curr.end && prev.end > curr.start,
        Connectivity::Eight => prev.start < curr.end + 1 && prev.end + 1 > curr.start,
    }
}

/// Extract runs from one row of packed mask words.
fn extract_runs_from_row(row_words: &[u64], width: usize, runs: &mut Vec<Run>) {
    let width = width as u32;
    let mut in_run = false;
    let mut run_start = 0u32;

    for (word_idx, &word) in row_words.iter().enumerate() {
        let base_x = (word_idx * 64) as u32;

        if word == 0 {
            if in_run {
                runs.push(Run {
                    start: run_start,
                    end: base_x.min(width),
                    label: 0,
                });
                in_run = false;
            }
            continue;
        }

        if word == !0u64 {
            if !in_run {
                run_start = base_x;
                in_run = true;
            }
            continue;
        }

        // Mixed word: jump between transitions with CTZ
        let word_end = (base_x + 64).min(width);
        let mut pos = base_x;
        while pos < word_end {
            let remaining = word >> (pos - base_x);
            if in_run {
                let end_pos = pos + (!remaining).trailing_zeros();
                if end_pos >= word_end {
                    break;
                }
                runs.push(Run {
                    start: run_start,
                    end: end_pos,
                    label: 0,
                });
                in_run = false;
                pos = end_pos;
            } else {
                if remaining == 0 {
                    break;
                }
                let start_pos = pos + remaining.trailing_zeros();
                if start_pos >= word_end {
                    break;
                }
                run_start = start_pos;
                in_run = true;
                pos = start_pos;
            }
        }
    }

    if in_run {
        runs.push(Run {
            start: run_start,
            end: width,
            label: 0,
        });
    }
}

// ============================================================================
// LabelMap
// ============================================================================

/// A 2D label map from connected component analysis.
///
/// Background pixels are 0, components are numbered `1..=num_labels`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    labels: Buffer2<u32>,
    num_labels: usize,
}

impl LabelMap {
    /// Label the set pixels of `mask`.
    pub fn from_mask(mask: &BitBuffer2, connectivity: Connectivity) -> Self {
        let mut labels = Buffer2::new_default(mask.width(), mask.height());
        if mask.is_empty() {
            return Self {
                labels,
                num_labels: 0,
            };
        }

        let num_labels = label_mask(mask, &mut labels, connectivity);
        Self { labels, num_labels }
    }

    /// Number of connected components (excluding background).
    #[inline]
    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.labels.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.labels.height()
    }

    /// Get the raw labels slice.
    #[inline]
    pub fn labels(&self) -> &[u32] {
        self.labels.pixels()
    }

    #[inline]
    pub fn label_at(&self, x: usize, y: usize) -> u32 {
        self.labels[(x, y)]
    }

    /// Pixel count of every component, indexed by `label - 1`.
    pub fn component_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.num_labels];
        for &l in self.labels.iter() {
            if l != 0 {
                sizes[l as usize - 1] += 1;
            }
        }
        sizes
    }

    pub fn as_buffer(&self) -> &Buffer2<u32> {
        &self.labels
    }

    pub fn into_buffer(self) -> Buffer2<u32> {
        self.labels
    }
}

impl std::ops::Index<usize> for LabelMap {
    type Output = u32;

    #[inline]
    fn index(&self, idx: usize) -> &Self::Output {
        &self.labels[idx]
    }
}

// ============================================================================
// Labeling
// ============================================================================

/// Merge the current row's runs with the previous row's runs.
///
/// Runs without an overlapping predecessor get a fresh label.
fn merge_runs_with_prev(
    curr_runs: &mut [Run],
    prev_runs: &[Run],
    connectivity: Connectivity,
    uf: &mut UnionFind,
) {
    let mut prev_idx = 0;
    for run in curr_runs.iter_mut() {
        let (search_start, search_end) = run.search_window(connectivity);

        while prev_idx < prev_runs.len() && prev_runs[prev_idx].end <= search_start {
            prev_idx += 1;
        }

        let mut assigned_label = None;
        let mut check_idx = prev_idx;
        while check_idx < prev_runs.len() && prev_runs[check_idx].start < search_end {
            let prev_run = &prev_runs[check_idx];
            if runs_connected(prev_run, run, connectivity) {
                match assigned_label {
                    Some(label) if label != prev_run.label => uf.union(label, prev_run.label),
                    None => assigned_label = Some(prev_run.label),
                    _ => {}
                }
            }
            check_idx += 1;
        }

        run.label = assigned_label.unwrap_or_else(|| uf.make_set());
    }
}

fn label_mask(mask: &BitBuffer2, labels: &mut Buffer2<u32>, connectivity: Connectivity) -> usize {
    let width = mask.width();
    let words_per_row = mask.words_per_row();

    let mut uf = UnionFind::new();
    let mut prev_runs: Vec<Run> = Vec::with_capacity(width / 4);
    let mut curr_runs: Vec<Run> = Vec::with_capacity(width / 4);

    for (y, row_words) in mask.words().chunks(words_per_row).enumerate() {
        curr_runs.clear();
        extract_runs_from_row(row_words, width, &mut curr_runs);

        if curr_runs.is_empty() {
            prev_runs.clear();
            continue;
        }

        merge_runs_with_prev(&mut curr_runs, &prev_runs, connectivity, &mut uf);

        let row_start = y * width;
        for run in &curr_runs {
            labels.pixels_mut()[row_start + run.start as usize..row_start + run.end as usize]
                .fill(run.label);
        }

        std::mem::swap(&mut prev_runs, &mut curr_runs);
    }

    uf.flatten_labels(labels.pixels_mut())
}

// ============================================================================
// Union-Find
// ============================================================================

#[derive(Debug)]
struct UnionFind {
    parent: Vec<u32>,
    next_label: u32,
}

impl UnionFind {
    fn new() -> Self {
        Self {
            parent: Vec::with_capacity(256),
            next_label: 1,
        }
    }

    #[inline]
    fn make_set(&mut self) -> u32 {
        let label = self.next_label;
        self.parent.push(label);
        self.next_label += 1;
        label
    }

    /// Find root with two-pass path compression.
    fn find(&mut self, label: u32) -> u32 {
        let mut root = label;
        while self.parent[(root - 1) as usize] != root {
            root = self.parent[(root - 1) as usize];
        }

        let mut current = label;
        while current != root {
            let next = self.parent[(current - 1) as usize];
            self.parent[(current - 1) as usize] = root;
            current = next;
        }

        root
    }

    #[inline]
    fn union(&mut self, a: u32, b: u32) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            let (smaller, larger) = if root_a < root_b {
                (root_a, root_b)
            } else {
                (root_b, root_a)
            };
            self.parent[(larger - 1) as usize] = smaller;
        }
    }

    /// Flatten labels to sequential `1..=n` and return `n`.
    fn flatten_labels(&mut self, labels: &mut [u32]) -> usize {
        if self.parent.is_empty() {
            return 0;
        }

        let len = self.parent.len();
        let mut label_map = vec![0u32; len + 1];
        let mut num_labels = 0u32;

        for i in 1..=len as u32 {
            let root = self.find(i);
            if label_map[root as usize] == 0 {
                num_labels += 1;
                label_map[root as usize] = num_labels;
            }
            label_map[i as usize] = label_map[root as usize];
        }

        for l in labels.iter_mut() {
            if *l != 0 {
                *l = label_map[*l as usize];
            }
        }

        num_labels as usize
    }
}
