//! Scroll-to-roll coordinate mapping.
//!
//! Pure conversions between the scroll container's pixel offsets and roll
//! positions in meters. Both directions are allocation-free so the read path
//! can run on every scroll event without throttling.

use anyhow::{bail, Result};

/// Pixel height of one meter of roll in the virtual surface
pub const PIXELS_PER_METER: f64 = 150.0;
/// Virtual pixels above the roll occupied by the print-head header
pub const HEADER_OFFSET_PX: f64 = 128.0;
/// Virtual pixels represented by one terminal row
pub const PIXELS_PER_ROW: f64 = 30.0;

/// Fixed layout geometry for the scrolling roll view
#[derive(Debug, Clone, Copy)]
pub struct ViewportMap {
    pixels_per_meter: f64,
    start_offset_px: f64,
}

impl Default for ViewportMap {
    fn default() -> Self {
        Self {
            pixels_per_meter: PIXELS_PER_METER,
            start_offset_px: HEADER_OFFSET_PX,
        }
    }
}

impl ViewportMap {
    /// Build a map from configured geometry. A non-positive pixels-per-meter
    /// is a configuration error and is rejected here rather than per call.
    pub fn new(pixels_per_meter: f64, start_offset_px: f64) -> Result<Self> {
        if pixels_per_meter <= 0.0 {
            bail!("pixels-per-meter must be positive, got {pixels_per_meter}");
        }
        Ok(Self {
            pixels_per_meter,
            start_offset_px,
        })
    }

    pub fn pixels_per_meter(&self) -> f64 {
        self.pixels_per_meter
    }

    pub fn start_offset_px(&self) -> f64 {
        self.start_offset_px
    }

    /// Absolute pixel position of a roll meter on the virtual surface
    pub fn meter_to_pixel(&self, meter: f64) -> f64 {
        self.start_offset_px + meter * self.pixels_per_meter
    }

    /// The roll meter currently centered in the visible viewport.
    /// Clamped to zero; scrolling above the start of the roll never goes
    /// negative.
    pub fn meter_at_center(&self, scroll_top_px: f64, viewport_px: f64) -> f64 {
        let center = scroll_top_px + viewport_px / 2.0 - self.start_offset_px;
        (center / self.pixels_per_meter).max(0.0)
    }

    /// The scroll offset that would center the given meter. Unclamped; the
    /// scroll state clamps to the scrollable range like any scroll container.
    pub fn scroll_target_for_meter(&self, meter: f64, viewport_px: f64) -> f64 {
        self.start_offset_px + meter * self.pixels_per_meter - viewport_px / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_pixels_per_meter() {
        assert!(ViewportMap::new(0.0, 128.0).is_err());
        assert!(ViewportMap::new(-150.0, 128.0).is_err());
        assert!(ViewportMap::new(150.0, 0.0).is_ok());
    }

    #[test]
    fn test_known_scroll_target() {
        // Defect at 22m, 600px viewport, 150 px/m, 128px header:
        // 128 + 3300 - 300 = 3128
        let map = ViewportMap::new(150.0, 128.0).unwrap();
        let target = map.scroll_target_for_meter(22.0, 600.0);
        assert!((target - 3128.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip() {
        let map = ViewportMap::new(150.0, 128.0).unwrap();
        for meter in [0.0, 0.5, 7.3, 22.0, 49.99, 80.0] {
            let scroll = map.scroll_target_for_meter(meter, 600.0);
            let back = map.meter_at_center(scroll, 600.0);
            assert!(
                (back - meter).abs() < 1e-9,
                "round trip failed for {meter}: got {back}"
            );
        }
    }

    #[test]
    fn test_center_meter_clamps_to_zero() {
        let map = ViewportMap::default();
        assert_eq!(map.meter_at_center(-500.0, 600.0), 0.0);
        assert_eq!(map.meter_at_center(0.0, 0.0), 0.0);
        // Viewport centered inside the header zone still reads 0
        assert_eq!(map.meter_at_center(0.0, 100.0), 0.0);
        assert!(map.meter_at_center(10_000.0, 600.0) > 0.0);
    }

    #[test]
    fn test_meter_to_pixel() {
        let map = ViewportMap::default();
        assert!((map.meter_to_pixel(0.0) - HEADER_OFFSET_PX).abs() < 1e-9);
        assert!((map.meter_to_pixel(2.0) - (HEADER_OFFSET_PX + 300.0)).abs() < 1e-9);
    }
}
