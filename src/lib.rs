pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;

pub use crate::core::{NaiveBayes, Posteriors, TrainingStore};
pub use config::FruitConfig;
pub use detection::{FeatureExtractor, FeatureReport};
pub use error::{FruitError, Result, Stage};
pub use models::{Contour, FeatureVector, HsvColor, Region, TrainingRecord};
pub use pipeline::{
    DebugConfig, MetadataValue, Pipeline, PipelineContext, PipelineData, PipelineStep,
};
