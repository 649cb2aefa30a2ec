use crate::detection::{contours, denoise, features, preprocessing, segmentation};
use crate::detection::segmentation::HsvRange;
use crate::error::Result;
use crate::pipeline::{MetadataValue, PipelineContext, PipelineData, PipelineStep};
use image::{DynamicImage, Luma};
use imageproc::drawing::draw_line_segment_mut;
use std::sync::Arc;

/// Shrink tall photographs before measuring them
pub struct ResizeStep {
    pub max_height: u32,
    pub step: f32,
}

impl PipelineStep for ResizeStep {
    fn process(&self, data: PipelineData, context: &PipelineContext) -> Result<PipelineData> {
        let resized = preprocessing::resize_to_fit(&data.source, self.max_height, self.step);
        if context.verbose {
            log::info!(
                "Resized {}x{} -> {}x{}",
                data.source.width(),
                data.source.height(),
                resized.width(),
                resized.height()
            );
        }
        let mut new_item = PipelineData::from_image(resized);
        new_item.metadata = data.metadata;
        Ok(new_item)
    }

    fn name(&self) -> &str {
        "Resize"
    }
}

/// Convert the photograph to HSV
pub struct HsvConversionStep;

impl PipelineStep for HsvConversionStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let hsv = Arc::new(preprocessing::to_hsv(&data.source));
        data.image = DynamicImage::ImageRgb8(hsv.as_ref().clone());
        data.hsv = Some(hsv);
        Ok(data)
    }

    fn name(&self) -> &str {
        "HSV Conversion"
    }
}

/// Keep pixels whose color falls in the fruit range
pub struct ColorThresholdStep {
    pub range: HsvRange,
}

impl PipelineStep for ColorThresholdStep {
    fn process(&self, mut data: PipelineData, context: &PipelineContext) -> Result<PipelineData> {
        let hsv = data.require_hsv(self.name())?;
        let mask = segmentation::threshold_hsv(&hsv, &self.range);
        let count = segmentation::foreground_count(&mask);
        if context.verbose {
            log::info!("{} pixels inside color range", count);
        }
        data.image = DynamicImage::ImageLuma8(mask.clone());
        data.mask = Some(mask);
        Ok(data.with_metadata("raw_foreground_pixels", MetadataValue::Int(count as i64)))
    }

    fn name(&self) -> &str {
        "Color Threshold"
    }
}

/// Median-filter the mask to drop speckles and fill pinholes
pub struct MedianDenoiseStep {
    pub kernel: u32,
}

impl PipelineStep for MedianDenoiseStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let smooth = denoise::median_filter_binary(data.require_mask(self.name())?, self.kernel)?;
        data.image = DynamicImage::ImageLuma8(smooth.clone());
        data.mask = Some(smooth);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Median Denoise"
    }
}

/// Select the largest-perimeter external contour; draws it onto the mask for debugging
pub struct RegionSelectionStep;

impl PipelineStep for RegionSelectionStep {
    fn process(&self, mut data: PipelineData, context: &PipelineContext) -> Result<PipelineData> {
        let mask = data.require_mask(self.name())?;
        let region = contours::select_region(mask)?;

        let mut overlay = mask.clone();
        let points = region.contour.points();
        for (i, p) in points.iter().enumerate() {
            let q = points[(i + 1) % points.len()];
            draw_line_segment_mut(
                &mut overlay,
                (p.x as f32, p.y as f32),
                (q.x as f32, q.y as f32),
                Luma([128u8]),
            );
        }

        if context.verbose {
            log::info!("Perimeter: {:.2}", region.perimeter);
            log::info!("Area: {:.2}", region.area);
        }

        data.image = DynamicImage::ImageLuma8(overlay);
        data.region = Some(region);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Region Selection"
    }
}

/// Measure compactness and average color of the fruit
pub struct FeatureExtractionStep;

impl PipelineStep for FeatureExtractionStep {
    fn process(&self, mut data: PipelineData, context: &PipelineContext) -> Result<PipelineData> {
        let hsv = data.require_hsv(self.name())?;
        let mask = data.require_mask(self.name())?;
        let region = data.region.as_ref().ok_or_else(|| {
            crate::error::FruitError::invalid_parameter(self.name(), "requires region selection first")
        })?;

        let fv = features::compute_features(&hsv, mask, region)?;
        let ratio = features::foreground_ratio(mask);
        if context.verbose {
            log::info!("Fruit area: {:.2}%", ratio * 100.0);
            log::info!("{}", fv);
        }

        // The measured region, background blacked out
        let mut measured = hsv.as_ref().clone();
        for (pixel, m) in measured.pixels_mut().zip(mask.pixels()) {
            if m[0] == segmentation::BACKGROUND {
                pixel.0 = [0, 0, 0];
            }
        }

        data.image = DynamicImage::ImageRgb8(measured);
        data.features = Some(fv);
        Ok(data.with_metadata("fruit_area_ratio", MetadataValue::Float(ratio)))
    }

    fn name(&self) -> &str {
        "Feature Extraction"
    }
}
