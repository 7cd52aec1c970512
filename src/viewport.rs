//! Window sizes and render resolution.
//!
//! Keeps the camera aspect and the surface resolution in sync with the
//! window. The render resolution follows the logical window size times the
//! device scale factor, with the scale factor clamped to 2.

/// Maximum device scale factor the renderer will honour.
const MAX_PIXEL_RATIO: f64 = 2.0;

/// Tracks the physical window size and the device scale factor.
///
/// `resize` and `set_scale_factor` are idempotent and safe to call at any
/// time after creation; the derived values are recomputed on read.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    physical_width: u32,
    physical_height: u32,
    scale_factor: f64,
}

impl Viewport {
    pub fn new(physical_width: u32, physical_height: u32, scale_factor: f64) -> Self {
        Self {
            physical_width: physical_width.max(1),
            physical_height: physical_height.max(1),
            scale_factor: scale_factor.max(f64::MIN_POSITIVE),
        }
    }

    pub fn resize(&mut self, physical_width: u32, physical_height: u32) {
        self.physical_width = physical_width.max(1);
        self.physical_height = physical_height.max(1);
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        if scale_factor > 0.0 {
            self.scale_factor = scale_factor;
        }
    }

    /// Width over height, the value the camera projection tracks.
    pub fn aspect(&self) -> f32 {
        self.physical_width as f32 / self.physical_height as f32
    }

    /// The window size in physical pixels, unclamped.
    pub fn physical_size(&self) -> (u32, u32) {
        (self.physical_width, self.physical_height)
    }

    /// The effective pixel ratio: the device scale factor, clamped to 2.
    pub fn pixel_ratio(&self) -> f64 {
        self.scale_factor.min(MAX_PIXEL_RATIO)
    }

    /// Render-target size: logical window size times the clamped ratio.
    ///
    /// Below the clamp this is exactly the physical window size; above it
    /// the surface stays smaller and the compositor stretches the output.
    pub fn surface_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio() / self.scale_factor;
        let w = (self.physical_width as f64 * ratio).round() as u32;
        let h = (self.physical_height as f64 * ratio).round() as u32;
        (w.max(1), h.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_is_width_over_height() {
        let vp = Viewport::new(1920, 1080, 1.0);
        assert_eq!(vp.aspect(), 1920.0 / 1080.0);
    }

    #[test]
    fn pixel_ratio_clamps_at_two() {
        assert_eq!(Viewport::new(800, 600, 1.0).pixel_ratio(), 1.0);
        assert_eq!(Viewport::new(800, 600, 1.5).pixel_ratio(), 1.5);
        assert_eq!(Viewport::new(800, 600, 2.0).pixel_ratio(), 2.0);
        assert_eq!(Viewport::new(800, 600, 3.0).pixel_ratio(), 2.0);
    }

    #[test]
    fn surface_matches_window_below_the_clamp() {
        let vp = Viewport::new(2560, 1440, 2.0);
        assert_eq!(vp.surface_size(), (2560, 1440));
    }

    #[test]
    fn surface_shrinks_above_the_clamp() {
        // 3x display: the window is 3000 physical pixels wide but the
        // renderer only honours a ratio of 2, i.e. 2000.
        let vp = Viewport::new(3000, 1500, 3.0);
        assert_eq!(vp.surface_size(), (2000, 1000));
    }

    #[test]
    fn resize_is_idempotent() {
        let mut vp = Viewport::new(100, 100, 1.0);
        vp.resize(640, 480);
        let first = (vp.aspect(), vp.surface_size());
        vp.resize(640, 480);
        assert_eq!(first, (vp.aspect(), vp.surface_size()));
    }

    #[test]
    fn zero_sizes_are_clamped() {
        let mut vp = Viewport::new(0, 0, 1.0);
        assert_eq!(vp.surface_size(), (1, 1));
        vp.resize(0, 7);
        assert_eq!(vp.surface_size(), (1, 7));
    }
}
