//! Error types for fruitscan

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for fruitscan operations
pub type Result<T> = std::result::Result<T, FruitError>;

/// Processing stage an error belongs to, shown in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Input,
    Configuration,
    Segmentation,
    Persistence,
    Modeling,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Input => "input",
            Stage::Configuration => "configuration",
            Stage::Segmentation => "segmentation",
            Stage::Persistence => "persistence",
            Stage::Modeling => "modeling",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum FruitError {
    /// Image file missing, unreadable or undecodable
    #[error("Failed to load image: {message}")]
    Input {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid configuration value
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Nothing resembling a fruit survived segmentation
    #[error("No region detected: {reason}")]
    NoRegion { reason: String },

    /// Training file could not be opened, read or written
    #[error("Training data I/O failed: {message}")]
    Persistence {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// A line of the training file does not hold a valid record
    #[error("Malformed training record at {}:{line}: {reason}", .path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A record field cannot be written to the line format
    #[error("Invalid training record field {field} {value:?}: {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// Intermediate image could not be written to the debug directory
    #[error("Failed to save debug image {}", .path.display())]
    DebugOutput {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot classify: no training data available")]
    NoTrainingData,

    #[error("Cannot classify: none of the candidate classes has training data")]
    NoCandidateData,
}

impl FruitError {
    /// Create an input error with its underlying cause
    pub fn input<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Input {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn persistence(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Persistence {
            message: message.into(),
            source,
        }
    }

    pub fn no_region(reason: impl Into<String>) -> Self {
        Self::NoRegion {
            reason: reason.into(),
        }
    }

    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// The pipeline stage that failed
    pub fn stage(&self) -> Stage {
        match self {
            FruitError::Input { .. } => Stage::Input,
            FruitError::InvalidParameter { .. } => Stage::Configuration,
            FruitError::NoRegion { .. } => Stage::Segmentation,
            FruitError::Persistence { .. }
            | FruitError::MalformedRecord { .. }
            | FruitError::InvalidField { .. }
            | FruitError::DebugOutput { .. } => Stage::Persistence,
            FruitError::NoTrainingData | FruitError::NoCandidateData => Stage::Modeling,
        }
    }

    /// Get user-friendly error description for the operator
    pub fn user_message(&self) -> String {
        match self {
            FruitError::Input { .. } => {
                "Could not load the image. Check the path and file format.".to_string()
            }
            FruitError::NoRegion { .. } => {
                "No fruit found in the image. Make sure the fruit is in view and well lit."
                    .to_string()
            }
            FruitError::MalformedRecord { path, line, .. } => format!(
                "Training file {} is damaged at line {}. Fix or remove that line.",
                path.display(),
                line
            ),
            FruitError::NoTrainingData | FruitError::NoCandidateData => {
                "Cannot classify: no training data. Record some examples in train mode first."
                    .to_string()
            }
            _ => self.to_string(),
        }
    }
}
