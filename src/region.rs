//! Watermark region geometry
//!
//! Pure ratio-to-rectangle math. The watermark is always anchored at the
//! bottom-right corner of the image; callers derive both the strict inference
//! region (base ratios) and the larger blend region (ratio override) from the
//! same function.

use serde::{Deserialize, Serialize};

/// Integer pixel rectangle derived from an image size and a pair of ratios.
///
/// For ratios in `[0, 1]` the rectangle is guaranteed to lie within
/// `[0, width] x [0, height]`. Ratios outside that range are a caller error
/// and produce undefined geometry; no validation is performed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Left edge in pixels
    pub x: u32,
    /// Top edge in pixels
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Region {
    /// Whether the region has no area
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Compute the watermark region for an image, anchored at the bottom-right corner.
///
/// `region_width = floor(width * ratio)` and `region_height = floor(height * ratio)`,
/// where each ratio is `ratio_override` when given, else the respective base ratio.
/// The override lets callers derive the extended blend region from the same base
/// configuration the inference mask uses.
#[must_use]
pub fn watermark_region(
    width: u32,
    height: u32,
    width_ratio: f32,
    height_ratio: f32,
    ratio_override: Option<f32>,
) -> Region {
    let w_ratio = ratio_override.unwrap_or(width_ratio);
    let h_ratio = ratio_override.unwrap_or(height_ratio);

    let region_width = (f64::from(width) * f64::from(w_ratio)).floor() as u32;
    let region_height = (f64::from(height) * f64::from(h_ratio)).floor() as u32;

    Region {
        x: width - region_width,
        y: height - region_height,
        width: region_width,
        height: region_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ratio_scenario() {
        // 1000x800 at 15% yields a 150x120 rectangle at (850, 680)
        let region = watermark_region(1000, 800, 0.15, 0.15, None);
        assert_eq!(
            region,
            Region {
                x: 850,
                y: 680,
                width: 150,
                height: 120,
            }
        );
    }

    #[test]
    fn test_ratio_override_takes_precedence() {
        let base = watermark_region(1000, 800, 0.15, 0.15, None);
        let extended = watermark_region(1000, 800, 0.15, 0.15, Some(0.16));
        assert_eq!(extended.width, 160);
        assert_eq!(extended.height, 128);
        assert!(extended.width > base.width);
        assert!(extended.height > base.height);
        // Extended region still contains the base region
        assert!(extended.x <= base.x);
        assert!(extended.y <= base.y);
    }

    #[test]
    fn test_zero_ratio_is_empty_region_at_far_corner() {
        let region = watermark_region(640, 480, 0.0, 0.0, None);
        assert!(region.is_empty());
        assert_eq!(region.x, 640);
        assert_eq!(region.y, 480);
    }

    #[test]
    fn test_full_ratio_covers_whole_image() {
        let region = watermark_region(640, 480, 1.0, 1.0, None);
        assert_eq!(
            region,
            Region {
                x: 0,
                y: 0,
                width: 640,
                height: 480,
            }
        );
    }

    #[test]
    fn test_floor_rounding() {
        // 0.15 * 333 = 49.95, floors to 49
        let region = watermark_region(333, 333, 0.15, 0.15, None);
        assert_eq!(region.width, 49);
        assert_eq!(region.height, 49);
        assert_eq!(region.x, 284);
        assert_eq!(region.y, 284);
    }

    #[test]
    fn test_region_stays_in_bounds_for_unit_ratios() {
        for &(w, h) in &[(1u32, 1u32), (7, 3), (512, 512), (1920, 1080), (999, 1)] {
            for &r in &[0.0f32, 0.05, 0.15, 0.33, 0.5, 0.99, 1.0] {
                let region = watermark_region(w, h, r, r, None);
                assert!(region.x + region.width <= w, "{w}x{h} at {r}");
                assert!(region.y + region.height <= h, "{w}x{h} at {r}");
            }
        }
    }

    #[test]
    fn test_asymmetric_ratios() {
        let region = watermark_region(1000, 1000, 0.2, 0.1, None);
        assert_eq!(region.width, 200);
        assert_eq!(region.height, 100);
        assert_eq!(region.x, 800);
        assert_eq!(region.y, 900);
    }
}
