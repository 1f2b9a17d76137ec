//! Gaussian smoothing of the segmentation confidence map.
//!
//! Separable convolution (rows, then columns) with mirror boundary handling:
//! out-of-range samples reflect about the edge pixel, so `-1 -> 1` and
//! `n -> n - 2`. Rows are processed in parallel chunks.


use rayon::prelude::*;

use common::Buffer2;

/// Rows handed to one rayon task.
const ROWS_PER_CHUNK: usize = 8;

/// Kernel radius for a given sigma: `ceil(3 * sigma)`.
#[inline]
pub fn kernel_radius(sigma: f32) -> usize {
    (3.0 * sigma).ceil() as usize
}

/// Compute a normalized 1D Gaussian kernel of length `2 * kernel_radius(sigma) + 1`.
pub fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    assert!(sigma > 0.0, "Sigma must be positive");

    let radius = kernel_radius(sigma);
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

/// Reflect `i` into `0..n` about the edge pixels.
#[inline]
fn mirror_index(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let mut i = i.rem_euclid(period);
    if i >= n as isize {
        i = period - i;
    }
    i as usize
}

/// Smooth `pixels` with a Gaussian of standard deviation `sigma`.
pub fn gaussian_smooth(pixels: &Buffer2<f32>, sigma: f32) -> Buffer2<f32> {
    let kernel = gaussian_kernel_1d(sigma);
    let width = pixels.width();
    let height = pixels.height();

    if width == 0 || height == 0 {
        return pixels.clone();
    }

    let mut temp = Buffer2::new_default(width, height);
    convolve_rows(pixels, &mut temp, &kernel);

    let mut output = Buffer2::new_default(width, height);
    convolve_cols(&temp, &mut output, &kernel);

    output
}

fn convolve_rows(input: &Buffer2<f32>, output: &mut Buffer2<f32>, kernel: &[f32]) {
    let width = input.width();
    let radius = (kernel.len() / 2) as isize;

    output
        .pixels_mut()
        .par_chunks_mut(width * ROWS_PER_CHUNK)
        .enumerate()
        .for_each(|(chunk_idx, out_chunk)| {
            let y_start = chunk_idx * ROWS_PER_CHUNK;
            for (local_y, out_row) in out_chunk.chunks_mut(width).enumerate() {
                let in_row = input.row(y_start + local_y);
                for (x, out) in out_row.iter_mut().enumerate() {
                    *out = kernel
                        .iter()
                        .enumerate()
                        .map(|(k, &kval)| {
                            let sx = mirror_index(x as isize + k as isize - radius, width);
                            in_row[sx] * kval
                        })
                        .sum();
                }
            }
        });
}

fn convolve_cols(input: &Buffer2<f32>, output: &mut Buffer2<f32>, kernel: &[f32]) {
    let width = input.width();
    let height = input.height();
    let radius = (kernel.len() / 2) as isize;

    output
        .pixels_mut()
        .par_chunks_mut(width * ROWS_PER_CHUNK)
        .enumerate()
        .for_each(|(chunk_idx, out_chunk)| {
            let y_start = chunk_idx * ROWS_PER_CHUNK;
            for (local_y, out_row) in out_chunk.chunks_mut(width).enumerate() {
                let y = (y_start + local_y) as isize;
                for (x, out) in out_row.iter_mut().enumerate() {
                    *out = kernel
                        .iter()
                        .enumerate()
                        .map(|(k, &kval)| {
                            let sy = mirror_index(y + k as isize - radius, height);
                            input[(x, sy)] * kval
                        })
                        .sum();
                }
            }
        });
}
