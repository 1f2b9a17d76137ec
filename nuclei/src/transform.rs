//! Window-local to slide coordinate mapping.

use glam::{DVec2, IVec2};

/// Maps contour vertices from an extraction window to global slide
/// coordinates: `(p + translation) * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    /// Window origin in the padded working frame, minus the padding margin.
    pub translation: DVec2,
    /// `1 / resize_factor`.
    pub scale: f64,
    /// Tile position within the slide.
    pub offset: DVec2,
}

impl CoordinateTransform {
    /// Transform for the window whose top-left corner sits at
    /// `window_origin` in a frame padded by `margin`.
    pub fn for_window(
        window_origin: IVec2,
        margin: usize,
        resize_factor: u32,
        offset: DVec2,
    ) -> Self {
        debug_assert!(resize_factor >= 1, "resize_factor must be at least 1");
        Self {
            translation: (window_origin - IVec2::splat(margin as i32)).as_dvec2(),
            scale: 1.0 / resize_factor as f64,
            offset,
        }
    }

    #[inline]
    pub fn apply(&self, point: IVec2) -> DVec2 {
        (point.as_dvec2() + self.translation) * self.scale + self.offset
    }
}
