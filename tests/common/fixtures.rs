#![allow(dead_code)]

use fruitscan::config::SegmentationConfig;
use fruitscan::{FeatureVector, TrainingRecord, TrainingStore};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_ellipse_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

/// Color constants for tests (RGB)
pub const ORANGE: Rgb<u8> = Rgb([255, 128, 0]);
pub const YELLOW: Rgb<u8> = Rgb([255, 220, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Creates a binary mask with one filled axis-aligned rectangle.
pub fn rect_mask(width: u32, height: u32, rect: Rect) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    draw_filled_rect_mut(&mut mask, rect, Luma([255u8]));
    mask
}

/// Creates a binary mask with one filled disk centered in the image.
pub fn disk_mask(radius: i32) -> GrayImage {
    let side = (radius * 2 + 20) as u32;
    let mut mask = GrayImage::new(side, side);
    let c = (side / 2) as i32;
    draw_filled_circle_mut(&mut mask, (c, c), radius, Luma([255u8]));
    mask
}

/// A white photograph with a round fruit of the given color.
pub fn round_fruit_photo(color: Rgb<u8>, radius: i32) -> DynamicImage {
    let mut img = RgbImage::from_pixel(200, 200, WHITE);
    draw_filled_circle_mut(&mut img, (100, 100), radius, color);
    DynamicImage::ImageRgb8(img)
}

/// A white photograph with an elongated fruit of the given color.
pub fn long_fruit_photo(color: Rgb<u8>, half_length: i32, half_width: i32) -> DynamicImage {
    let mut img = RgbImage::from_pixel(240, 200, WHITE);
    draw_filled_ellipse_mut(&mut img, (120, 100), half_length, half_width, color);
    DynamicImage::ImageRgb8(img)
}

/// Segmentation settings with a kernel small enough for test images.
pub fn test_segmentation() -> SegmentationConfig {
    SegmentationConfig {
        median_kernel: 5,
        ..SegmentationConfig::default()
    }
}

/// Creates a TrainingStore backed by a file in a fresh temporary directory.
/// Returns both the store and the directory (which must be kept alive).
pub fn temp_store() -> (TrainingStore, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let store = TrainingStore::new(dir.path().join("trainingImages.csv"));
    (store, dir)
}

pub fn record(source: &str, label: &str, h: f64, s: f64, v: f64, c: f64) -> TrainingRecord {
    TrainingRecord::new(source, label, FeatureVector::new(h, s, v, c))
}

pub fn candidates(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|l| l.to_string()).collect()
}
