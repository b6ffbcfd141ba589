//! Result and error types for Cotejar.

use std::path::Path;
use thiserror::Error;

/// Result type for Cotejar operations
pub type CotejarResult<T> = Result<T, CotejarError>;

/// Errors that can occur while loading or reconciling a voice database
#[derive(Debug, Error)]
pub enum CotejarError {
    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed binary container
    #[error("Malformed container {path}: {message}")]
    Format {
        /// Path of the offending file
        path: String,
        /// What was wrong with it
        message: String,
    },

    /// Feature table rows are not stored in unit-index order
    #[error("Feature table out of order: unit index {unit_index} stored at position {position}")]
    UnorderedTable {
        /// Position of the offending row in the table
        position: usize,
        /// Unit index stored in that row
        unit_index: i32,
    },

    /// A feature vector does not match the feature definition
    #[error("Feature vector at position {position} does not match the definition: {message}")]
    InvalidVector {
        /// Position of the offending row in the table
        position: usize,
        /// What was wrong with it
        message: String,
    },

    /// The feature definition lacks a feature the reconciliation needs
    #[error("Feature definition has no feature named {name:?}")]
    MissingFeature {
        /// Name of the missing feature
        name: String,
    },
}

impl CotejarError {
    /// Create a format error for a container file
    #[must_use]
    pub fn format(path: &Path, message: impl Into<String>) -> Self {
        Self::Format {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Create an invalid-vector error
    #[must_use]
    pub fn invalid_vector(position: usize, message: impl Into<String>) -> Self {
        Self::InvalidVector {
            position,
            message: message.into(),
        }
    }

    /// Create a missing-feature error
    #[must_use]
    pub fn missing_feature(name: impl Into<String>) -> Self {
        Self::MissingFeature { name: name.into() }
    }
}
