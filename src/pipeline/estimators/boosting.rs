//! Gradient-boosted trees for binary classification
//!
//! Logistic loss with Newton steps: every round fits a depth-limited tree to
//! the gradients `p - y` and hessians `p (1 - p)` of the current margins and
//! adds it, scaled by the learning rate.

use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::tree::{RegressionTree, TreeParams};

/// Smallest hessian used for a row, keeps leaf values finite on confident rows
const MIN_HESSIAN: f64 = 1e-16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostingParams {
    pub n_rounds: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub lambda: f64,
    pub min_child_weight: f64,
    /// Fraction of rows drawn (without replacement) for each round
    pub subsample: f64,
    pub seed: u64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_rounds: 100,
            learning_rate: 0.1,
            max_depth: 4,
            lambda: 1.0,
            min_child_weight: 1.0,
            subsample: 1.0,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedClassifier {
    base_margin: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl GradientBoostedClassifier {
    /// Fit on labels in {0, 1}.
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>, params: &BoostingParams) -> Self {
        let n = x.nrows();
        let positive_rate = if n == 0 {
            0.5
        } else {
            y.sum() / n as f64
        };
        let p0 = positive_rate.clamp(1e-6, 1.0 - 1e-6);
        let base_margin = (p0 / (1.0 - p0)).ln();

        let tree_params = TreeParams {
            max_depth: Some(params.max_depth),
            min_samples_split: 2,
            min_samples_leaf: 1,
            min_child_weight: params.min_child_weight,
            lambda: params.lambda,
            min_gain: 1e-12,
        };

        let mut rng = StdRng::seed_from_u64(params.seed);
        let n_rows = ((n as f64) * params.subsample.clamp(0.0, 1.0)).round() as usize;
        let mut margins = vec![base_margin; n];
        let mut trees = Vec::with_capacity(params.n_rounds);

        for _ in 0..params.n_rounds {
            if n == 0 {
                break;
            }
            let mut grad = Vec::with_capacity(n);
            let mut hess = Vec::with_capacity(n);
            for (m, &label) in margins.iter().zip(y.iter()) {
                let p = sigmoid(*m);
                grad.push(p - label);
                hess.push((p * (1.0 - p)).max(MIN_HESSIAN));
            }

            let rows: Vec<usize> = if n_rows >= n || n_rows == 0 {
                (0..n).collect()
            } else {
                let mut picked = sample(&mut rng, n, n_rows).into_vec();
                picked.sort_unstable();
                picked
            };

            let tree = RegressionTree::fit(x, &grad, &hess, &rows, &tree_params);
            for (m, row) in margins.iter_mut().zip(x.outer_iter()) {
                *m += params.learning_rate * tree.predict_row(row);
            }
            trees.push(tree);
        }

        Self {
            base_margin,
            learning_rate: params.learning_rate,
            trees,
        }
    }

    pub fn n_rounds(&self) -> usize {
        self.trees.len()
    }

    pub fn margin_row(&self, row: ArrayView1<f64>) -> f64 {
        self.base_margin
            + self
                .trees
                .iter()
                .map(|t| self.learning_rate * t.predict_row(row))
                .sum::<f64>()
    }

    /// Probability of the positive class for one row
    pub fn predict_proba_row(&self, row: ArrayView1<f64>) -> f64 {
        sigmoid(self.margin_row(row))
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Array1<f64> {
        x.outer_iter().map(|row| self.predict_proba_row(row)).collect()
    }
}
