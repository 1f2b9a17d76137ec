//! Bit-packed 2D buffer for boolean masks.
//!
//! Each row starts on a fresh `u64` word so row-oriented algorithms (run
//! extraction, horizontal dilation) can work on whole words. Padding bits past
//! `width` in the last word of a row are always zero.

/// Number of bits per storage word.
const BITS_PER_WORD: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBuffer2 {
    words: Vec<u64>,
    width: usize,
    height: usize,
    words_per_row: usize,
}

impl BitBuffer2 {
    /// All bits set to `value`.
    pub fn new_filled(width: usize, height: usize, value: bool) -> Self {
        let words_per_row = width.div_ceil(BITS_PER_WORD);
        let mut buffer = Self {
            words: vec![0u64; words_per_row * height],
            width,
            height,
            words_per_row,
        };
        if value {
            buffer.fill(true);
        }
        buffer
    }

    pub fn new_default(width: usize, height: usize) -> Self {
        Self::new_filled(width, height, false)
    }

    /// Build a mask by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut buffer = Self::new_default(width, height);
        for y in 0..height {
            let row_start = y * buffer.words_per_row;
            for x in 0..width {
                if f(x, y) {
                    buffer.words[row_start + x / BITS_PER_WORD] |= 1u64 << (x % BITS_PER_WORD);
                }
            }
        }
        buffer
    }

    /// Build a mask from a row-major slice of booleans.
    pub fn from_slice(width: usize, height: usize, data: &[bool]) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "data length {} does not match dimensions {}x{}",
            data.len(),
            width,
            height
        );
        Self::from_fn(width, height, |x, y| data[y * width + x])
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels (`width * height`).
    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn words_per_row(&self) -> usize {
        self.words_per_row
    }

    /// Packed storage, `words_per_row` words per row, LSB = lowest x.
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    #[inline]
    pub fn words_mut(&mut self) -> &mut [u64] {
        &mut self.words
    }

    #[inline]
    pub fn get_xy(&self, x: usize, y: usize) -> bool {
        debug_assert!(x < self.width && y < self.height);
        let word = self.words[y * self.words_per_row + x / BITS_PER_WORD];
        (word >> (x % BITS_PER_WORD)) & 1 != 0
    }

    #[inline]
    pub fn set_xy(&mut self, x: usize, y: usize, value: bool) {
        debug_assert!(x < self.width && y < self.height);
        let word = &mut self.words[y * self.words_per_row + x / BITS_PER_WORD];
        let bit = 1u64 << (x % BITS_PER_WORD);
        if value {
            *word |= bit;
        } else {
            *word &= !bit;
        }
    }

    /// Get by row-major linear index `y * width + x`.
    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        self.get_xy(idx % self.width, idx / self.width)
    }

    pub fn fill(&mut self, value: bool) {
        if !value {
            self.words.fill(0);
            return;
        }
        let tail_bits = self.width % BITS_PER_WORD;
        for row in self.words.chunks_mut(self.words_per_row.max(1)) {
            row.fill(!0u64);
            if tail_bits != 0
                && let Some(last) = row.last_mut()
            {
                *last = (1u64 << tail_bits) - 1;
            }
        }
    }

    /// Flip every pixel, keeping padding bits clear.
    pub fn invert(&mut self) {
        let tail_bits = self.width % BITS_PER_WORD;
        for row in self.words.chunks_mut(self.words_per_row.max(1)) {
            for word in row.iter_mut() {
                *word = !*word;
            }
            if tail_bits != 0
                && let Some(last) = row.last_mut()
            {
                *last &= (1u64 << tail_bits) - 1;
            }
        }
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// In-place union with another mask of the same shape.
    pub fn union_with(&mut self, other: &Self) {
        assert_eq!(self.width, other.width, "width mismatch");
        assert_eq!(self.height, other.height, "height mismatch");
        for (dst, src) in self.words.iter_mut().zip(&other.words) {
            *dst |= *src;
        }
    }

    /// True when the two masks share at least one set pixel.
    pub fn intersects(&self, other: &Self) -> bool {
        assert_eq!(self.width, other.width, "width mismatch");
        assert_eq!(self.height, other.height, "height mismatch");
        self.words
            .iter()
            .zip(&other.words)
            .any(|(a, b)| a & b != 0)
    }

    /// Coordinates of every set pixel in row-major order.
    pub fn iter_ones(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let words_per_row = self.words_per_row;
        self.words
            .iter()
            .enumerate()
            .filter(|(_, word)| **word != 0)
            .flat_map(move |(word_idx, &word)| {
                let y = word_idx / words_per_row;
                let base_x = (word_idx % words_per_row) * BITS_PER_WORD;
                SetBits(word).map(move |bit| (base_x + bit, y))
            })
    }
}

/// Iterator over the indices of set bits in a word, lowest first.
struct SetBits(u64);

impl Iterator for SetBits {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_filled_true_leaves_padding_clear() {
        let buf = BitBuffer2::new_filled(70, 3, true);
        assert_eq!(buf.words_per_row(), 2);
        assert_eq!(buf.count_ones(), 210);
        assert_eq!(buf.words()[1], (1u64 << 6) - 1);
    }

    #[test]
    fn test_set_get_xy_across_word_boundary() {
        let mut buf = BitBuffer2::new_default(130, 2);
        buf.set_xy(63, 0, true);
        buf.set_xy(64, 0, true);
        buf.set_xy(129, 1, true);

        assert!(buf.get_xy(63, 0));
        assert!(buf.get_xy(64, 0));
        assert!(buf.get_xy(129, 1));
        assert!(!buf.get_xy(62, 0));
        assert!(!buf.get_xy(129, 0));

        buf.set_xy(64, 0, false);
        assert!(!buf.get_xy(64, 0));
        assert_eq!(buf.count_ones(), 2);
    }

    #[test]
    fn test_linear_get_matches_xy() {
        let buf = BitBuffer2::from_fn(7, 5, |x, y| (x + y) % 3 == 0);
        for y in 0..5 {
            for x in 0..7 {
                assert_eq!(buf.get(y * 7 + x), buf.get_xy(x, y));
            }
        }
    }

    #[test]
    fn test_from_slice() {
        let data = vec![true, false, true, false, false, true];
        let buf = BitBuffer2::from_slice(3, 2, &data);
        assert!(buf.get_xy(0, 0));
        assert!(!buf.get_xy(1, 0));
        assert!(buf.get_xy(2, 0));
        assert!(buf.get_xy(2, 1));
        assert_eq!(buf.count_ones(), 3);
    }

    #[test]
    #[should_panic(expected = "data length")]
    fn test_from_slice_wrong_length() {
        BitBuffer2::from_slice(2, 2, &[true, false, true]);
    }

    #[test]
    fn test_iter_ones_row_major() {
        let mut buf = BitBuffer2::new_default(100, 3);
        buf.set_xy(99, 0, true);
        buf.set_xy(5, 0, true);
        buf.set_xy(0, 2, true);
        buf.set_xy(70, 1, true);

        let ones: Vec<_> = buf.iter_ones().collect();
        assert_eq!(ones, vec![(5, 0), (99, 0), (70, 1), (0, 2)]);
    }

    #[test]
    fn test_union_and_intersects() {
        let a = BitBuffer2::from_fn(10, 10, |x, _| x == 2);
        let b = BitBuffer2::from_fn(10, 10, |_, y| y == 7);
        let c = BitBuffer2::from_fn(10, 10, |x, _| x == 9);

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));

        let mut merged = a.clone();
        merged.union_with(&c);
        assert_eq!(merged.count_ones(), 20);
    }

    #[test]
    fn test_invert_keeps_padding_clear() {
        let mut buf = BitBuffer2::from_fn(70, 2, |x, y| x == 3 && y == 1);
        buf.invert();
        assert_eq!(buf.count_ones(), 139);
        assert!(!buf.get_xy(3, 1));
        assert!(buf.get_xy(69, 0));
        assert_eq!(buf.words()[3] >> 6, 0);
    }

    #[test]
    fn test_fill_false_clears() {
        let mut buf = BitBuffer2::new_filled(10, 10, true);
        buf.fill(false);
        assert_eq!(buf.count_ones(), 0);
    }
}
