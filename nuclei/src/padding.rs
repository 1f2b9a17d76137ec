//! Zero margins around the input maps.
//!
//! Padding lets window extraction and dilation near the tile border run
//! without bounds checks; [`unpad`] strips the margin again.

use common::{BitBuffer2, Buffer2};

/// New grid of `(w + 2m) x (h + 2m)` with `array` copied into the center and
/// `T::default()` everywhere else.
pub fn pad<T: Copy + Default>(array: &Buffer2<T>, margin: usize) -> Buffer2<T> {
    let mut padded = Buffer2::new_default(
        array.width() + 2 * margin,
        array.height() + 2 * margin,
    );
    padded.blit(array, margin, margin);
    padded
}

/// Exact inverse of [`pad`].
pub fn unpad<T: Copy>(array: &Buffer2<T>, margin: usize) -> Buffer2<T> {
    assert!(
        array.width() >= 2 * margin && array.height() >= 2 * margin,
        "margin {} too large for {}x{} grid",
        margin,
        array.width(),
        array.height()
    );
    array.crop(
        margin,
        margin,
        array.width() - 2 * margin,
        array.height() - 2 * margin,
    )
}

/// [`pad`] for bit masks; the margin is cleared.
pub fn pad_mask(mask: &BitBuffer2, margin: usize) -> BitBuffer2 {
    let mut padded = BitBuffer2::new_default(mask.width() + 2 * margin, mask.height() + 2 * margin);
    for (x, y) in mask.iter_ones() {
        padded.set_xy(x + margin, y + margin, true);
    }
    padded
}
