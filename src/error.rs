//! Error types for training, persistence and scoring.
//!
//! Schema mismatches between a scoring record and a trained pipeline are not
//! errors (see [`crate::pipeline::align`]); everything else that can go wrong
//! surfaces as a [`ModelError`].

use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::ModelKind;

/// Errors raised by the model lifecycle.
#[derive(Error, Debug)]
pub enum ModelError {
    /// I/O failure while reading or writing a bundle or dataset
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bundle or record (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A training dataset was supplied but could not be used.
    ///
    /// Raised for malformed CSV files, null or non-numeric cells and
    /// tables that are too small to split. Never triggers a synthetic fallback.
    #[error("Invalid dataset {path}: {message}")]
    Dataset {
        /// Path of the offending dataset
        path: PathBuf,
        /// What was wrong with it
        message: String,
    },

    /// The label column required by a supervised model is absent
    #[error("Dataset {path} has no '{label}' column")]
    MissingLabel {
        /// Path of the offending dataset
        path: PathBuf,
        /// Expected label column name
        label: String,
    },

    /// An estimator failed to fit
    #[error("Training failed for {kind}: {message}")]
    Training {
        /// Model being trained
        kind: ModelKind,
        /// Failure detail
        message: String,
    },

    /// A persisted bundle exists but cannot be used
    #[error("Corrupt bundle for {kind} at {location}: {message}")]
    CorruptBundle {
        /// Model whose bundle is corrupt
        kind: ModelKind,
        /// Store location of the bundle
        location: String,
        /// Failure detail
        message: String,
    },

    /// A scoring call received no record at all
    #[error("No record provided")]
    EmptyRecord,
}

impl ModelError {
    /// Create a dataset error for `path`
    pub fn dataset(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ModelError::Dataset {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a training error for `kind`
    pub fn training(kind: ModelKind, message: impl Into<String>) -> Self {
        ModelError::Training {
            kind,
            message: message.into(),
        }
    }
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_error_display() {
        let err = ModelError::dataset("data/churn.csv", "column 'churn' contains 3 null value(s)");
        assert_eq!(
            err.to_string(),
            "Invalid dataset data/churn.csv: column 'churn' contains 3 null value(s)"
        );
    }

    #[test]
    fn test_missing_label_display() {
        let err = ModelError::MissingLabel {
            path: PathBuf::from("prices.csv"),
            label: "optimalPriceChange".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Dataset prices.csv has no 'optimalPriceChange' column"
        );
    }

    #[test]
    fn test_training_error_names_model() {
        let err = ModelError::training(ModelKind::Clustering, "too few rows");
        assert!(err.to_string().contains("clustering"));
    }
}
