//! In-memory training tables and the seeded train/test split

use std::path::PathBuf;

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::align::FeatureSchema;

/// Where a training table came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DataSource {
    Synthetic { samples: usize, seed: u64 },
    Csv { path: PathBuf },
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Synthetic { samples, seed } => {
                write!(f, "synthetic ({} rows, seed {})", samples, seed)
            }
            DataSource::Csv { path } => write!(f, "{}", path.display()),
        }
    }
}

/// Feature matrix plus optional label column.
///
/// Column `j` of `features` holds `schema.features[j]`.
#[derive(Debug, Clone)]
pub struct TrainingTable {
    pub schema: FeatureSchema,
    pub features: Array2<f64>,
    pub labels: Option<Array1<f64>>,
    pub source: DataSource,
}

impl TrainingTable {
    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    /// Value of `feature` in every row
    pub fn column(&self, feature: &str) -> Option<Array1<f64>> {
        let idx = self.schema.position(feature)?;
        Some(self.features.column(idx).to_owned())
    }
}

/// Result of [`train_test_split`]
#[derive(Debug, Clone)]
pub struct Split {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

/// Shuffle rows with a seeded permutation and hold out `test_fraction` of them.
///
/// The held-out count is rounded up, so any non-empty test fraction keeps at
/// least one test row.
pub fn train_test_split(
    features: &Array2<f64>,
    labels: &Array1<f64>,
    test_fraction: f64,
    seed: u64,
) -> Split {
    let n = features.nrows();
    let n_test = ((n as f64) * test_fraction).ceil() as usize;
    let n_test = n_test.min(n);

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);

    Split {
        x_train: features.select(Axis(0), train_idx),
        x_test: features.select(Axis(0), test_idx),
        y_train: labels.select(Axis(0), train_idx),
        y_test: labels.select(Axis(0), test_idx),
    }
}
