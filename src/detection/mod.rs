pub mod preprocessing;
pub mod segmentation;
pub mod denoise;
pub mod contours;
pub mod features;
pub mod steps;

use std::path::PathBuf;
use std::sync::Arc;

use image::DynamicImage;

use crate::config::SegmentationConfig;
use crate::error::{FruitError, Result};
use crate::models::FeatureVector;
use crate::pipeline::Pipeline;
use segmentation::HsvRange;
use steps::*;

/// Everything measured on one photograph
#[derive(Debug, Clone)]
pub struct FeatureReport {
    pub features: FeatureVector,
    pub perimeter: f64,
    pub area: f64,
    pub contours_found: usize,
    pub contours_discarded: usize,
    /// Pixels inside the color range before denoising
    pub raw_foreground_pixels: u64,
    /// Foreground share of the denoised mask, 0.0-1.0
    pub fruit_area_ratio: f64,
}

/// Build the standard extraction pipeline from the segmentation settings
pub fn build_standard_pipeline(config: &SegmentationConfig, verbose: bool) -> Pipeline {
    let mut pipeline = Pipeline::new().with_verbose(verbose);

    if let Some(max_height) = config.max_height {
        pipeline = pipeline.add_step(Arc::new(ResizeStep {
            max_height,
            step: config.resize_step,
        }));
    }

    pipeline
        .add_step(Arc::new(HsvConversionStep))
        .add_step(Arc::new(ColorThresholdStep {
            range: HsvRange::new(config.lower, config.upper),
        }))
        .add_step(Arc::new(MedianDenoiseStep {
            kernel: config.median_kernel,
        }))
        .add_step(Arc::new(RegionSelectionStep))
        .add_step(Arc::new(FeatureExtractionStep))
}

/// Turns a photograph into a feature vector
pub struct FeatureExtractor {
    pipeline: Pipeline,
}

impl FeatureExtractor {
    pub fn new(config: &SegmentationConfig) -> Self {
        Self {
            pipeline: build_standard_pipeline(config, false),
        }
    }

    pub fn with_verbose(config: &SegmentationConfig, verbose: bool) -> Self {
        Self {
            pipeline: build_standard_pipeline(config, verbose),
        }
    }

    /// Save every intermediate image into `output_dir`
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        self.pipeline = self.pipeline.with_debug(output_dir)?;
        Ok(self)
    }

    pub fn extract(&self, img: &DynamicImage) -> Result<FeatureReport> {
        if img.width() == 0 || img.height() == 0 {
            return Err(FruitError::no_region("image is empty"));
        }

        let data = self.pipeline.run(img.clone())?;
        let fruit_area_ratio = data.get_float("fruit_area_ratio").unwrap_or(0.0);
        let raw_foreground_pixels = data
            .get_int("raw_foreground_pixels")
            .map_or(0, |n| n.max(0) as u64);
        let (features, region) = match (data.features, data.region) {
            (Some(f), Some(r)) => (f, r),
            _ => return Err(FruitError::no_region("pipeline produced no features")),
        };

        Ok(FeatureReport {
            features,
            perimeter: region.perimeter,
            area: region.area,
            contours_found: region.contours_found,
            contours_discarded: region.contours_discarded,
            raw_foreground_pixels,
            fruit_area_ratio,
        })
    }
}
