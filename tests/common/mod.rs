mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from fruitscan for tests
pub use fruitscan::{
    FeatureExtractor, FeatureVector, FruitConfig, FruitError, NaiveBayes, TrainingRecord,
    TrainingStore,
};
