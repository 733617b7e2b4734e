/// Power-of-two zoom, bounded by the source image size and the largest texture the device can
/// hold. The effective scale is always `2^mult`.
///
/// Out-of-bounds requests are ignored rather than reported. Hitting the limit is just the UI not
/// zooming any further.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoomController {
    mult: i32,
    orig_w: f32,
    orig_h: f32,
    max_w: u32,
    max_h: u32,
}
impl ZoomController {
    /// Unzoomed state for an image of the given size, with a square texture limit.
    #[must_use]
    pub fn new(orig_w: u32, orig_h: u32, max_dimension: u32) -> Self {
        Self::with_limits(orig_w, orig_h, max_dimension, max_dimension)
    }
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn with_limits(orig_w: u32, orig_h: u32, max_w: u32, max_h: u32) -> Self {
        Self {
            mult: 0,
            orig_w: orig_w as f32,
            orig_h: orig_h as f32,
            max_w,
            max_h,
        }
    }
    #[must_use]
    pub fn mult(&self) -> i32 {
        self.mult
    }
    /// `2^mult`
    #[must_use]
    pub fn scale(&self) -> f32 {
        2f32.powi(self.mult)
    }
    /// Size of the source image, unscaled.
    #[must_use]
    pub fn original_size(&self) -> (f32, f32) {
        (self.orig_w, self.orig_h)
    }
    fn dimension_at(orig: f32, mult: i32) -> f64 {
        f64::from(orig) * 2f64.powi(mult)
    }
    /// Width of the image at the current zoom.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn mult_w(&self) -> u32 {
        Self::dimension_at(self.orig_w, self.mult).round() as u32
    }
    /// Height of the image at the current zoom.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn mult_h(&self) -> u32 {
        Self::dimension_at(self.orig_h, self.mult).round() as u32
    }
    /// Double the scale. Returns whether it actually changed.
    pub fn zoom_in(&mut self) -> bool {
        let Some(next) = self.mult.checked_add(1) else {
            return false;
        };
        let too_wide = Self::dimension_at(self.orig_w, next) >= f64::from(self.max_w);
        let too_tall = Self::dimension_at(self.orig_h, next) >= f64::from(self.max_h);
        if too_wide || too_tall {
            log::trace!("zoom in rejected at {}x", self.scale());
            return false;
        }
        self.mult = next;
        true
    }
    /// Halve the scale. Returns whether it actually changed.
    pub fn zoom_out(&mut self) -> bool {
        let Some(next) = self.mult.checked_sub(1) else {
            return false;
        };
        let vanishes = |orig| Self::dimension_at(orig, next).round() <= 0.0;
        if vanishes(self.orig_w) || vanishes(self.orig_h) {
            log::trace!("zoom out rejected at {}x", self.scale());
            return false;
        }
        self.mult = next;
        true
    }
}

#[cfg(test)]
mod test {
    use super::ZoomController;
    #[test]
    fn ceiling() {
        let mut zoom = ZoomController::new(100, 50, 1000);
        // 200, 400, 800 fit. 1600 doesn't.
        assert!(zoom.zoom_in());
        assert!(zoom.zoom_in());
        assert!(zoom.zoom_in());
        assert_eq!(zoom.mult(), 3);
        assert_eq!((zoom.mult_w(), zoom.mult_h()), (800, 400));
        // Idempotent at the ceiling
        for _ in 0..5 {
            assert!(!zoom.zoom_in());
            assert_eq!(zoom.mult(), 3);
        }
        assert!(zoom.mult_w() < 1000);
    }
    #[test]
    fn ceiling_is_exclusive() {
        // 2 * 512 == 1024 is already too big.
        let mut zoom = ZoomController::new(512, 16, 1024);
        assert!(!zoom.zoom_in());
        assert_eq!(zoom.mult(), 0);
        // Taller than wide
        let mut zoom = ZoomController::with_limits(16, 300, 4096, 1000);
        assert!(zoom.zoom_in());
        assert!(!zoom.zoom_in());
        assert_eq!(zoom.mult_h(), 600);
    }
    #[test]
    fn floor() {
        let mut zoom = ZoomController::new(4, 12, 8192);
        let mut steps = 0;
        while zoom.zoom_out() {
            steps += 1;
            assert!(zoom.mult_w() > 0 && zoom.mult_h() > 0);
            assert!(steps < 64, "zoom out never stopped");
        }
        // 4 -> 2 -> 1 -> 0.5 (rounds to 1) -> 0.25 (rounds to 0, rejected)
        assert_eq!(zoom.mult(), -3);
        assert_eq!(zoom.mult_w(), 1);
        // Idempotent at the floor
        assert!(!zoom.zoom_out());
        assert_eq!(zoom.mult(), -3);
    }
    #[test]
    fn scale_is_power_of_two() {
        let mut zoom = ZoomController::new(10, 10, 8192);
        assert_eq!(zoom.scale(), 1.0);
        zoom.zoom_in();
        zoom.zoom_in();
        assert_eq!(zoom.scale(), 4.0);
        zoom.zoom_out();
        zoom.zoom_out();
        zoom.zoom_out();
        assert_eq!(zoom.scale(), 0.5);
        assert_eq!(zoom.mult_w(), 5);
    }
}
