use image::{GrayImage, RgbImage};

use crate::detection::segmentation::{foreground_count, BACKGROUND};
use crate::error::{FruitError, Result};
use crate::models::{FeatureVector, Region};

/// 4πA / P², 1.0 for an ideal circle. Not clamped.
pub fn compactness(area: f64, perimeter: f64) -> f64 {
    4.0 * std::f64::consts::PI * area / (perimeter * perimeter)
}

/// Mean H, S and V over the pixels the mask marks as foreground
pub fn average_hsv(hsv: &RgbImage, mask: &GrayImage) -> Result<[f64; 3]> {
    if hsv.dimensions() != mask.dimensions() {
        return Err(FruitError::invalid_parameter(
            "mask",
            format!("{:?} does not match image {:?}", mask.dimensions(), hsv.dimensions()),
        ));
    }

    let mut sums = [0u64; 3];
    let mut count = 0u64;
    for (pixel, m) in hsv.pixels().zip(mask.pixels()) {
        if m[0] == BACKGROUND {
            continue;
        }
        for (sum, channel) in sums.iter_mut().zip(pixel.0) {
            *sum += channel as u64;
        }
        count += 1;
    }

    if count == 0 {
        return Err(FruitError::no_region("mask has no foreground pixels"));
    }

    Ok(sums.map(|s| s as f64 / count as f64))
}

/// Fraction of the mask covered by foreground
pub fn foreground_ratio(mask: &GrayImage) -> f64 {
    let total = mask.width() as u64 * mask.height() as u64;
    if total == 0 {
        return 0.0;
    }
    foreground_count(mask) as f64 / total as f64
}

/// Build the feature vector from the HSV image, the denoised mask and the selected region
pub fn compute_features(hsv: &RgbImage, mask: &GrayImage, region: &Region) -> Result<FeatureVector> {
    let [h, s, v] = average_hsv(hsv, mask)?;
    let compactness = compactness(region.area, region.perimeter);
    Ok(FeatureVector::new(h, s, v, compactness))
}
