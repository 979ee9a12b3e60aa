//! The three model pipelines
//!
//! Each submodule defines a persisted bundle with a `train` constructor and a
//! pure `score` method. Training never falls back on its own; the caller picks
//! the table (see [`crate::pipeline::load_or_generate`]).

pub mod churn;
pub mod clustering;
pub mod pricing;

pub use churn::{ChurnBundle, ChurnScore, Importance, RiskFactor, RiskLevel};
pub use clustering::{ClusterBundle, ClusterScore, ClusterSegment};
pub use pricing::{PricingBundle, PricingScore};

use ndarray::Array1;

use crate::error::{ModelError, Result};
use crate::pipeline::{ModelKind, TrainingTable};

/// Share of rows held out for evaluation
pub const TEST_FRACTION: f64 = 0.2;

/// Seed of the train/test permutation
pub const SPLIT_SEED: u64 = 42;

/// Smallest table a model will train on
pub const MIN_TRAINING_ROWS: usize = 10;

/// Round to two decimals, as reported to callers
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn check_rows(table: &TrainingTable, kind: ModelKind) -> Result<()> {
    if table.n_rows() < MIN_TRAINING_ROWS {
        return Err(ModelError::training(
            kind,
            format!(
                "need at least {} rows, got {}",
                MIN_TRAINING_ROWS,
                table.n_rows()
            ),
        ));
    }
    if table.schema.is_empty() {
        return Err(ModelError::training(kind, "table has no feature columns"));
    }
    Ok(())
}

fn require_labels(table: &TrainingTable, kind: ModelKind) -> Result<&Array1<f64>> {
    table
        .labels
        .as_ref()
        .ok_or_else(|| ModelError::training(kind, "table has no label column"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_1), 1.24);
        assert_eq!(round2(-0.004), -0.0);
        assert_eq!(round2(12.0), 12.0);
    }
}
