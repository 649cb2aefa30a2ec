//! End-to-end tests of feature extraction, training and classification
//! on synthetic photographs.

mod common;

use common::*;
use fruitscan::pipeline::DEBUG_IMAGE_NAME;

#[test]
fn test_orange_disk_features() -> anyhow::Result<()> {
    let extractor = FeatureExtractor::new(&test_segmentation());
    let report = extractor.extract(&round_fruit_photo(ORANGE, 60))?;

    // Orange 255,128,0 is hue 15 on the 0-179 scale, fully saturated
    let f = report.features;
    assert!((f.average_hue - 15.0).abs() < 1e-9, "hue {}", f.average_hue);
    assert!((f.average_saturation - 255.0).abs() < 1e-9);
    assert!((f.average_value - 255.0).abs() < 1e-9);
    assert!(f.compactness > 0.85 && f.compactness <= 1.0, "compactness {}", f.compactness);

    assert_eq!(report.contours_found, 1);
    assert_eq!(report.contours_discarded, 0);
    let expected_ratio = std::f64::consts::PI * 60.0 * 60.0 / (200.0 * 200.0);
    assert!((report.fruit_area_ratio - expected_ratio).abs() < 0.02);
    Ok(())
}

#[test]
fn test_elongated_fruit_is_less_compact() -> anyhow::Result<()> {
    let extractor = FeatureExtractor::new(&test_segmentation());
    let round = extractor.extract(&round_fruit_photo(YELLOW, 50))?;
    let long = extractor.extract(&long_fruit_photo(YELLOW, 90, 25))?;
    assert!(long.features.compactness < round.features.compactness);
    Ok(())
}

#[test]
fn test_photo_without_fruit() {
    let extractor = FeatureExtractor::new(&test_segmentation());
    let blank = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(120, 120, WHITE));
    let err = extractor.extract(&blank).unwrap_err();
    assert!(matches!(err, FruitError::NoRegion { .. }));
}

#[test]
fn test_speckles_are_ignored() -> anyhow::Result<()> {
    let mut img = round_fruit_photo(ORANGE, 50).to_rgb8();
    for (x, y) in [(5, 5), (190, 12), (15, 180), (188, 190)] {
        img.put_pixel(x, y, ORANGE);
    }
    let extractor = FeatureExtractor::new(&test_segmentation());
    let report = extractor.extract(&image::DynamicImage::ImageRgb8(img))?;
    assert_eq!(report.contours_found, 1);

    // The speckles pass the color threshold but not the median filter
    let clean = extractor.extract(&round_fruit_photo(ORANGE, 50))?;
    assert_eq!(report.raw_foreground_pixels, clean.raw_foreground_pixels + 4);
    assert_eq!(report.area, clean.area);
    Ok(())
}

#[test]
fn test_debug_output_written() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let out = dir.path().join("debug");
    let extractor = FeatureExtractor::new(&test_segmentation()).with_debug(out.clone())?;
    extractor.extract(&round_fruit_photo(ORANGE, 40))?;

    for step_dir in [
        "00_input",
        "01_resize",
        "02_hsv_conversion",
        "03_color_threshold",
        "04_median_denoise",
        "05_region_selection",
        "06_feature_extraction",
    ] {
        let path = out.join(step_dir).join(DEBUG_IMAGE_NAME);
        assert!(path.exists(), "missing {}", path.display());
    }
    assert_eq!(std::fs::read_dir(&out)?.count(), 7);
    Ok(())
}

#[test]
fn test_train_then_classify() -> anyhow::Result<()> {
    let (store, _dir) = temp_store();
    let extractor = FeatureExtractor::new(&test_segmentation());

    let examples = [
        ("orange_1.png", "orange", round_fruit_photo(ORANGE, 50)),
        ("orange_2.png", "orange", round_fruit_photo(ORANGE, 65)),
        ("banana_1.png", "banana", long_fruit_photo(YELLOW, 80, 25)),
        ("banana_2.png", "banana", long_fruit_photo(YELLOW, 95, 30)),
    ];
    for (source, label, photo) in &examples {
        let report = extractor.extract(photo)?;
        store.append(&TrainingRecord::new(*source, *label, report.features))?;
    }

    let records = store.load_all()?;
    assert_eq!(records.len(), 4);
    assert_eq!(records[2].label, "banana");

    let config = FruitConfig::default();
    let model = NaiveBayes::fit_with_floor(&records, config.classifier.variance_floor);

    let orange = extractor.extract(&round_fruit_photo(ORANGE, 57))?;
    assert_eq!(model.classify(&config.classifier.candidates, &orange.features)?, "orange");

    let banana = extractor.extract(&long_fruit_photo(YELLOW, 88, 27))?;
    assert_eq!(model.classify(&config.classifier.candidates, &banana.features)?, "banana");
    Ok(())
}
