use image::{DynamicImage, GrayImage, RgbImage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{FruitError, Result};
use crate::models::{FeatureVector, Region};

/// Data that flows through the pipeline.
/// Each step takes ownership of the previous step's output and hands its own on.
#[derive(Clone)]
pub struct PipelineData {
    /// The image produced by the last step (what debug mode saves)
    pub image: DynamicImage,

    /// The photograph being measured, after any resizing
    pub source: Arc<DynamicImage>,

    /// HSV rendition of `source`, channels stored as H, S, V
    pub hsv: Option<Arc<RgbImage>>,

    /// Current fruit mask
    pub mask: Option<GrayImage>,

    /// Selected fruit boundary
    pub region: Option<Region>,

    pub features: Option<FeatureVector>,

    /// Measurements that are reported but not needed downstream
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Float(f64),
    Int(i64),
}

impl PipelineData {
    /// Create PipelineData for a full image
    pub fn from_image(image: DynamicImage) -> Self {
        let source = Arc::new(image.clone());
        Self {
            image,
            source,
            hsv: None,
            mask: None,
            region: None,
            features: None,
            metadata: HashMap::new(),
        }
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Get metadata as float
    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get metadata as integer
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// HSV image, or an error naming the step that needed it
    pub fn require_hsv(&self, step: &str) -> Result<Arc<RgbImage>> {
        self.hsv
            .clone()
            .ok_or_else(|| FruitError::invalid_parameter(step, "requires HSV conversion first"))
    }

    /// Mask, or an error naming the step that needed it
    pub fn require_mask(&self, step: &str) -> Result<&GrayImage> {
        self.mask
            .as_ref()
            .ok_or_else(|| FruitError::invalid_parameter(step, "requires a mask first"))
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

impl PipelineContext {
    /// Save an intermediate image into its step directory if debug mode is enabled
    pub fn save_debug_image(&self, dir_name: &str, image: &DynamicImage) -> Result<()> {
        let Some(debug_config) = &self.debug else {
            return Ok(());
        };

        let step_dir = debug_config.output_dir.join(dir_name);
        std::fs::create_dir_all(&step_dir).map_err(|e| {
            FruitError::persistence(format!("cannot create {}", step_dir.display()), e)
        })?;

        let path = step_dir.join(DEBUG_IMAGE_NAME);
        image
            .save(&path)
            .map_err(|source| FruitError::DebugOutput { path: path.clone(), source })?;
        log::debug!("Debug: saved {}/{}", dir_name, DEBUG_IMAGE_NAME);
        Ok(())
    }
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Consume the previous step's output and produce this step's output
    fn process(&self, data: PipelineData, context: &PipelineContext) -> Result<PipelineData>;

    /// Human-readable name for this step (used in verbose output)
    fn name(&self) -> &str;
}

/// File written inside each debug step directory
pub const DEBUG_IMAGE_NAME: &str = "image.png";

/// Debug directory name for a step, e.g. "03_median_denoise"
pub fn step_dir_name(index: usize, name: &str) -> String {
    format!("{:02}_{}", index, name.to_lowercase().replace(' ', "_"))
}

/// Composable pipeline builder
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        ensure_empty_dir(&output_dir)?;
        self.context.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Helper method to add a step from a Box (for convenience)
    pub fn add_step_boxed(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    /// Run every step on the input image
    pub fn run(&self, input: DynamicImage) -> Result<PipelineData> {
        self.run_partial(input, self.steps.len())
    }

    /// Run the pipeline but stop after `num_steps` steps (useful for debugging)
    pub fn run_partial(&self, input: DynamicImage, num_steps: usize) -> Result<PipelineData> {
        self.context.save_debug_image("00_input", &input)?;

        let mut data = PipelineData::from_image(input);
        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            if self.context.verbose {
                log::info!("Running step {}: {}", step_idx + 1, step.name());
            }
            data = step.process(data, &self.context)?;
            self.context
                .save_debug_image(&step_dir_name(step_idx + 1, step.name()), &data.image)?;
        }

        Ok(data)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_empty_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        let mut entries = std::fs::read_dir(dir)
            .map_err(|e| FruitError::persistence(format!("cannot read {}", dir.display()), e))?;
        if entries.next().is_some() {
            return Err(FruitError::invalid_parameter(
                "debug_out",
                format!("directory is not empty: {}", dir.display()),
            ));
        }
    } else {
        std::fs::create_dir_all(dir)
            .map_err(|e| FruitError::persistence(format!("cannot create {}", dir.display()), e))?;
    }
    Ok(())
}
