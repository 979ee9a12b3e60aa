//! Feature schemas and record alignment
//!
//! A fitted scaler keeps positional statistics, so every scoring record must be
//! turned into a vector whose columns appear in exactly the order used at
//! training time. Missing keys become 0 and unknown keys are ignored.

use std::collections::HashMap;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Current schema format version stored in bundles
pub const SCHEMA_VERSION: u32 = 1;

/// A scoring request: feature name to value, possibly partial
pub type Record = HashMap<String, f64>;

/// Ordered list of feature names a trained pipeline expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: u32,
    pub features: Vec<String>,
}

impl FeatureSchema {
    pub fn new<S: Into<String>>(features: impl IntoIterator<Item = S>) -> Self {
        Self {
            version: SCHEMA_VERSION,
            features: features.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(String::as_str)
    }
}

/// Align a record to `schema`, defaulting absent features to 0.
pub fn align(record: &Record, schema: &FeatureSchema) -> Array1<f64> {
    schema
        .iter()
        .map(|name| record.get(name).copied().unwrap_or(0.0))
        .collect()
}

/// Names in `record` that the schema does not know about, sorted
pub fn unknown_keys(record: &Record, schema: &FeatureSchema) -> Vec<String> {
    let mut extra: Vec<String> = record
        .keys()
        .filter(|k| schema.position(k).is_none())
        .cloned()
        .collect();
    extra.sort();
    extra
}
