//! Integration tests for contour selection and shape features.
//!
//! Tests cover:
//! - Area of a single filled rectangle
//! - Compactness of rendered disks (plateau near 0.90) versus squares
//! - Largest-perimeter selection among several blobs
//! - Empty masks failing before any averaging happens

mod common;

use fruitscan::detection::{contours, denoise, features};
use image::{GrayImage, Luma, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use common::*;

#[test]
fn test_single_rectangle_area() -> anyhow::Result<()> {
    let (w, h) = (40u32, 25u32);
    let mask = rect_mask(80, 60, Rect::at(10, 12).of_size(w, h));

    let region = contours::select_region(&mask)?;
    assert_eq!(region.contours_found, 1);
    assert_eq!(region.contours_discarded, 0);

    // The boundary runs through the outer pixel centers
    let expected = ((w - 1) * (h - 1)) as f64;
    assert!((region.area - expected).abs() < 1e-9, "area {}", region.area);
    assert!((region.perimeter - 2.0 * ((w - 1) + (h - 1)) as f64).abs() < 1e-9);
    assert!((region.area - (w * h) as f64).abs() <= region.perimeter / 2.0 + 1.0);
    Ok(())
}

#[test]
fn test_disk_compactness_plateaus_below_one() -> anyhow::Result<()> {
    // The 8-connected boundary through pixel centers settles near 0.90, not 1.0
    for radius in [80, 160, 320] {
        let region = contours::select_region(&disk_mask(radius))?;
        let c = features::compactness(region.area, region.perimeter);
        assert!((c - 0.90).abs() < 0.01, "radius {} compactness {}", radius, c);
        assert!(c < 1.0);
    }
    Ok(())
}

#[test]
fn test_disk_is_more_compact_than_square() -> anyhow::Result<()> {
    let disk = contours::select_region(&disk_mask(50))?;
    let square = contours::select_region(&rect_mask(120, 120, Rect::at(10, 10).of_size(100, 100)))?;
    let c_disk = features::compactness(disk.area, disk.perimeter);
    let c_square = features::compactness(square.area, square.perimeter);
    assert!((c_square - std::f64::consts::FRAC_PI_4).abs() < 1e-9);
    assert!(c_disk > c_square);
    Ok(())
}

#[test]
fn test_largest_blob_selected() -> anyhow::Result<()> {
    let mut mask = GrayImage::new(200, 120);
    draw_filled_rect_mut(&mut mask, Rect::at(5, 5).of_size(6, 6), Luma([255u8]));
    draw_filled_rect_mut(&mut mask, Rect::at(60, 20).of_size(90, 70), Luma([255u8]));
    draw_filled_rect_mut(&mut mask, Rect::at(170, 100).of_size(10, 10), Luma([255u8]));

    let region = contours::select_region(&mask)?;
    assert_eq!(region.contours_found, 3);
    assert_eq!(region.contours_discarded, 2);
    assert!((region.area - (89.0 * 69.0)).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_hole_does_not_count_as_region() -> anyhow::Result<()> {
    let mut mask = rect_mask(100, 100, Rect::at(10, 10).of_size(80, 80));
    draw_filled_rect_mut(&mut mask, Rect::at(40, 40).of_size(20, 20), Luma([0u8]));
    let region = contours::select_region(&mask)?;
    assert_eq!(region.contours_found, 1);
    Ok(())
}

#[test]
fn test_empty_mask_fails_before_averaging() {
    let mask = GrayImage::new(50, 50);
    let smooth = denoise::median_filter_binary(&mask, 21).unwrap();
    let err = contours::select_region(&smooth).unwrap_err();
    assert!(matches!(err, FruitError::NoRegion { .. }));
    assert_eq!(err.stage(), fruitscan::Stage::Segmentation);

    // Averaging on its own reports the same failure
    let hsv = RgbImage::new(50, 50);
    assert!(matches!(
        features::average_hsv(&hsv, &smooth),
        Err(FruitError::NoRegion { .. })
    ));
}

#[test]
fn test_denoise_is_stable_on_uniform_regions() -> anyhow::Result<()> {
    // Wide vertical band: straight edges, no isolated pixels
    let mask = rect_mask(120, 60, Rect::at(30, 0).of_size(50, 60));
    let once = denoise::median_filter_binary(&mask, 21)?;
    let twice = denoise::median_filter_binary(&once, 21)?;
    assert_eq!(once, twice);
    assert_eq!(once.dimensions(), mask.dimensions());
    Ok(())
}
