//! Tunable parameters for segmentation, the training file and the classifier.
//!
//! Configuration can be loaded from a JSON file or taken from the defaults,
//! which reproduce the thresholds tuned for the self-checkout station:
//!
//! ```no_run
//! use fruitscan::FruitConfig;
//! use std::path::Path;
//!
//! let config = FruitConfig::from_json_file(Path::new("fruitscan.json"))?;
//! config.validate()?;
//! # Ok::<(), fruitscan::FruitError>(())
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FruitError, Result};
use crate::models::HsvColor;

/// Display height of the checkout station screen, minus window decorations
pub const DEFAULT_MAX_HEIGHT: u32 = 768 - 100;

pub const DEFAULT_TRAINING_DATA: &str = "trainingImages.csv";

pub const DEFAULT_CANDIDATES: [&str; 9] = [
    "braeburn apple",
    "granny smith apple",
    "gala apple",
    "pink lady apple",
    "banana",
    "dragon fruit",
    "orange",
    "mandarin orange",
    "mango",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FruitConfig {
    pub segmentation: SegmentationConfig,
    pub training: TrainingConfig,
    pub classifier: ClassifierConfig,
}

/// Parameters of the feature-extraction pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Inclusive lower HSV bound of fruit colors
    pub lower: HsvColor,

    /// Inclusive upper HSV bound of fruit colors
    pub upper: HsvColor,

    /// Median filter window width (odd, positive)
    pub median_kernel: u32,

    /// Images taller than this are scaled down before processing
    #[serde(default)]
    pub max_height: Option<u32>,

    /// Scale decrement used while shrinking to `max_height`
    #[serde(default = "default_resize_step")]
    pub resize_step: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub data_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Ordered candidate labels; order breaks ties
    pub candidates: Vec<String>,

    /// Smallest variance used in the Gaussian density
    #[serde(default = "default_variance_floor")]
    pub variance_floor: f64,
}

fn default_resize_step() -> f32 {
    0.1
}

fn default_variance_floor() -> f64 {
    1e-4
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            // Hue is on the 0-179 scale
            lower: HsvColor::new(7, 147, 93),
            upper: HsvColor::new(179, 255, 255),
            median_kernel: 21,
            max_height: Some(DEFAULT_MAX_HEIGHT),
            resize_step: default_resize_step(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_TRAINING_DATA),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_CANDIDATES.iter().map(|c| c.to_string()).collect(),
            variance_floor: default_variance_floor(),
        }
    }
}

impl Default for FruitConfig {
    fn default() -> Self {
        Self {
            segmentation: SegmentationConfig::default(),
            training: TrainingConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl FruitConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FruitError::input(format!("cannot read config {}", path.display()), e))?;
        serde_json::from_str(&content)
            .map_err(|e| FruitError::input(format!("cannot parse config {}", path.display()), e))
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| FruitError::input("cannot serialize config", e))?;
        std::fs::write(path, json)
            .map_err(|e| FruitError::persistence(format!("cannot write {}", path.display()), e))
    }

    pub fn validate(&self) -> Result<()> {
        let seg = &self.segmentation;
        if seg.median_kernel == 0 || seg.median_kernel % 2 == 0 {
            return Err(FruitError::invalid_parameter("median_kernel", seg.median_kernel));
        }
        if seg.lower.h > seg.upper.h || seg.lower.s > seg.upper.s || seg.lower.v > seg.upper.v {
            return Err(FruitError::invalid_parameter(
                "lower",
                format!("{:?} exceeds upper {:?}", seg.lower, seg.upper),
            ));
        }
        if seg.max_height == Some(0) {
            return Err(FruitError::invalid_parameter("max_height", 0));
        }
        if !(seg.resize_step > 0.0 && seg.resize_step < 1.0) {
            return Err(FruitError::invalid_parameter("resize_step", seg.resize_step));
        }
        if self.classifier.candidates.is_empty() {
            return Err(FruitError::invalid_parameter("candidates", "[]"));
        }
        if !(self.classifier.variance_floor > 0.0) {
            return Err(FruitError::invalid_parameter(
                "variance_floor",
                self.classifier.variance_floor,
            ));
        }
        Ok(())
    }
}
