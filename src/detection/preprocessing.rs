use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};

use crate::models::HsvColor;

/// Scale the image down in `step` decrements until its height fits `max_height`.
/// Images too tall for the smallest step are scaled to exactly `max_height`.
pub fn resize_to_fit(img: &DynamicImage, max_height: u32, step: f32) -> DynamicImage {
    let height = img.height() as f32;
    let limit = max_height as f32;
    let mut scale = 1.0f32;
    while scale * height > limit && scale - step > 1e-6 {
        scale -= step;
    }
    if scale * height > limit {
        scale = limit / height;
    }
    if scale >= 1.0 {
        return img.clone();
    }

    let width = ((img.width() as f32 * scale).round() as u32).max(1);
    let height = ((height * scale).round() as u32).max(1);
    img.resize_exact(width, height, FilterType::Triangle)
}

/// Convert one RGB pixel to 8-bit HSV (hue halved to fit 0-179)
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> HsvColor {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let s = if max > 0.0 { delta * 255.0 / max } else { 0.0 };

    let mut h = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    let hue = ((h / 2.0).round() as u16 % 180) as u8;
    HsvColor::new(hue, s.round() as u8, max as u8)
}

/// Convert the image to HSV, stored channel-wise as H, S, V in an `RgbImage`
pub fn to_hsv(img: &DynamicImage) -> RgbImage {
    let rgb = img.to_rgb8();
    let mut hsv = RgbImage::new(rgb.width(), rgb.height());
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let c = rgb_to_hsv(r, g, b);
        hsv.put_pixel(x, y, Rgb([c.h, c.s, c.v]));
    }
    hsv
}
