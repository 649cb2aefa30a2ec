pub mod classifier;
pub mod store;

pub use classifier::{ClassModel, ClassScore, GaussianStats, NaiveBayes, Posteriors};
pub use store::TrainingStore;
