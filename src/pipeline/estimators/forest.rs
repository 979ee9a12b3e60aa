//! Random forest regression

use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::tree::{RegressionTree, TreeParams};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

/// Bagged ensemble of squared-error trees; predicts the mean of its trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    /// Fit `params.n_trees` trees on bootstrap samples of `(x, y)`.
    ///
    /// Trees are built in parallel. Tree `t` draws its bootstrap sample from a
    /// generator seeded with `seed + t`, so the fitted forest does not depend
    /// on thread scheduling.
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>, params: &ForestParams) -> Self {
        let n = x.nrows();
        if n == 0 {
            return Self { trees: Vec::new() };
        }
        let grad: Vec<f64> = y.iter().map(|v| -v).collect();
        let hess = vec![1.0; n];
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_leaf: params.min_samples_leaf,
            ..TreeParams::default()
        };

        let trees = (0..params.n_trees)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(t as u64));
                let rows: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(x, &grad, &hess, &rows, &tree_params)
            })
            .collect();

        Self { trees }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        sum / self.trees.len() as f64
    }

    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        x.outer_iter().map(|row| self.predict_row(row)).collect()
    }
}
