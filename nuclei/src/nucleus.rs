use glam::DVec2;

/// One accepted nucleus instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Nucleus {
    /// Closed exterior polygon in global slide coordinates.
    pub polygon: Vec<DVec2>,
    /// Filled area in working-resolution pixels.
    pub pixel_area: usize,
    /// `pixel_area / resize_factor^2`, truncated.
    pub native_area: usize,
}

impl Nucleus {
    pub fn new(polygon: Vec<DVec2>, pixel_area: usize, resize_factor: u32) -> Self {
        let rf = resize_factor as usize;
        Self {
            polygon,
            pixel_area,
            native_area: pixel_area / (rf * rf),
        }
    }
}
