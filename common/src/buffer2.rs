//! Row-major 2D grid of values.
//!
//! Coordinates are `(x, y)` with `x` the column and `y` the row; the linear
//! index of a pixel is `y * width + x`, which is also the scan order used
//! anywhere a deterministic "first occurrence" is needed.

use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::slice;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer2<T> {
    pixels: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> Buffer2<T> {
    pub fn new(width: usize, height: usize, pixels: Vec<T>) -> Self {
        assert_eq!(
            pixels.len(),
            width * height,
            "pixels length must equal width * height"
        );
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Build a grid by evaluating `f(x, y)` for every pixel in row-major order.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            pixels,
            width,
            height,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        debug_assert!(x < self.width && y < self.height);
        &self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        debug_assert!(x < self.width && y < self.height);
        &mut self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Inverse of [`Buffer2::index`].
    #[inline]
    pub fn coords(&self, idx: usize) -> (usize, usize) {
        (idx % self.width, idx / self.width)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [T] {
        &mut self.pixels
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.pixels
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    /// Apply `f` to every pixel, producing a grid of the same shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Buffer2<U> {
        Buffer2 {
            pixels: self.pixels.iter().map(f).collect(),
            width: self.width,
            height: self.height,
        }
    }
}

impl<T: Copy> Buffer2<T> {
    /// Copy out the `width x height` rectangle whose top-left corner is `(x0, y0)`.
    ///
    /// The rectangle must lie entirely inside the grid.
    pub fn crop(&self, x0: usize, y0: usize, width: usize, height: usize) -> Self {
        assert!(
            x0 + width <= self.width && y0 + height <= self.height,
            "crop {}x{} at ({}, {}) exceeds {}x{} grid",
            width,
            height,
            x0,
            y0,
            self.width,
            self.height
        );
        let mut pixels = Vec::with_capacity(width * height);
        for y in y0..y0 + height {
            let start = y * self.width + x0;
            pixels.extend_from_slice(&self.pixels[start..start + width]);
        }
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Copy `src` into this grid with its top-left corner at `(x0, y0)`.
    pub fn blit(&mut self, src: &Self, x0: usize, y0: usize) {
        assert!(
            x0 + src.width <= self.width && y0 + src.height <= self.height,
            "blit target out of bounds"
        );
        for y in 0..src.height {
            let dst_start = (y0 + y) * self.width + x0;
            self.pixels[dst_start..dst_start + src.width].copy_from_slice(src.row(y));
        }
    }
}

impl<T: Default + Clone> Buffer2<T> {
    pub fn new_default(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![T::default(); width * height],
            width,
            height,
        }
    }
}

impl<T: Clone> Buffer2<T> {
    pub fn new_filled(width: usize, height: usize, value: T) -> Self {
        Self {
            pixels: vec![value; width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn fill(&mut self, value: T) {
        self.pixels.fill(value);
    }
}

impl<T> Index<(usize, usize)> for Buffer2<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.pixels[y * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Buffer2<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        &mut self.pixels[y * self.width + x]
    }
}

impl<T> Index<usize> for Buffer2<T> {
    type Output = T;

    #[inline]
    fn index(&self, idx: usize) -> &Self::Output {
        &self.pixels[idx]
    }
}

impl<T> IndexMut<usize> for Buffer2<T> {
    #[inline]
    fn index_mut(&mut self, idx: usize) -> &mut Self::Output {
        &mut self.pixels[idx]
    }
}

impl<T> Deref for Buffer2<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.pixels
    }
}

impl<T> DerefMut for Buffer2<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.pixels
    }
}

impl<'a, T> IntoIterator for &'a Buffer2<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.pixels.iter()
    }
}

impl<T> From<Buffer2<T>> for Vec<T> {
    #[inline]
    fn from(buffer: Buffer2<T>) -> Self {
        buffer.pixels
    }
}
