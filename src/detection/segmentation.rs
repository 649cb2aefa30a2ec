use image::{GrayImage, Luma, RgbImage};

use crate::models::HsvColor;

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Inclusive per-channel HSV bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: HsvColor,
    pub upper: HsvColor,
}

impl HsvRange {
    pub fn new(lower: HsvColor, upper: HsvColor) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, h: u8, s: u8, v: u8) -> bool {
        (self.lower.h..=self.upper.h).contains(&h)
            && (self.lower.s..=self.upper.s).contains(&s)
            && (self.lower.v..=self.upper.v).contains(&v)
    }
}

/// Mark every pixel whose HSV value lies inside `range` as foreground
pub fn threshold_hsv(hsv: &RgbImage, range: &HsvRange) -> GrayImage {
    GrayImage::from_fn(hsv.width(), hsv.height(), |x, y| {
        let [h, s, v] = hsv.get_pixel(x, y).0;
        if range.contains(h, s, v) {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    })
}

/// Number of foreground pixels in a mask
pub fn foreground_count(mask: &GrayImage) -> u64 {
    mask.pixels().filter(|p| p[0] != BACKGROUND).count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_bounds_are_inclusive() {
        let range = HsvRange::new(HsvColor::new(10, 100, 100), HsvColor::new(20, 200, 200));
        let mut hsv = RgbImage::new(4, 1);
        hsv.put_pixel(0, 0, Rgb([10, 100, 100]));
        hsv.put_pixel(1, 0, Rgb([20, 200, 200]));
        hsv.put_pixel(2, 0, Rgb([21, 150, 150]));
        hsv.put_pixel(3, 0, Rgb([15, 99, 150]));

        let mask = threshold_hsv(&hsv, &range);
        let values: Vec<u8> = mask.pixels().map(|p| p[0]).collect();
        assert_eq!(values, vec![FOREGROUND, FOREGROUND, BACKGROUND, BACKGROUND]);
        assert_eq!(foreground_count(&mask), 2);
    }

    #[test]
    fn test_empty_image_gives_empty_mask() {
        let range = HsvRange::new(HsvColor::new(0, 0, 0), HsvColor::new(179, 255, 255));
        let mask = threshold_hsv(&RgbImage::new(0, 0), &range);
        assert_eq!(mask.dimensions(), (0, 0));
    }
}
