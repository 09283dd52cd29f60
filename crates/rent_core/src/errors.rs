//! Error types for the RentWise core

use crate::encoders::CategoricalField;
use crate::features::NumericField;
use std::fmt;
use thiserror::Error;

/// Persisted artifact consumed at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Model,
    Encoders,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::Model => f.write_str("model"),
            Artifact::Encoders => f.write_str("encoder"),
        }
    }
}

/// Errors that can occur while loading artifacts or serving a prediction
#[derive(Error, Debug)]
pub enum RentError {
    /// Model or encoder artifact is missing or corrupt. Fatal at startup.
    #[error("Failed to load {artifact} artifact: {reason}")]
    StartupLoad { artifact: Artifact, reason: String },

    /// Categorical value outside the field's vocabulary
    #[error("Unknown {field} value: {value:?}")]
    UnknownCategory {
        field: CategoricalField,
        value: String,
    },

    /// Numeric input outside its declared bounds
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: NumericField,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Model invoked with a vector of the wrong shape
    #[error("Malformed feature vector: expected {expected} features, got {actual}")]
    MalformedFeatureVector { expected: usize, actual: usize },
}

impl RentError {
    pub(crate) fn startup_load(artifact: Artifact, reason: impl fmt::Display) -> Self {
        RentError::StartupLoad {
            artifact,
            reason: reason.to_string(),
        }
    }

    /// Whether the error was caused by the caller's input rather than the system
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            RentError::UnknownCategory { .. } | RentError::OutOfRange { .. }
        )
    }
}

/// Result type for RentWise core operations
pub type Result<T> = std::result::Result<T, RentError>;
