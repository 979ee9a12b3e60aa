//! Second-order regression trees
//!
//! A single tree builder serves both ensembles. Each row carries a gradient
//! `g` and a hessian `h`; a leaf predicts `-G / (H + lambda)` and a split is
//! scored by
//!
//! ```text
//! gain = 1/2 * (GL^2 / (HL + lambda) + GR^2 / (HR + lambda) - G^2 / (H + lambda))
//! ```
//!
//! With `g = -y`, `h = 1` and `lambda = 0` this is exactly CART with squared
//! error (leaves hold the mean target), which is what the random forest uses.
//! The gradient-boosted classifier feeds logistic-loss gradients instead.

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    /// Maximum depth; `None` grows until leaves are pure or too small
    pub max_depth: Option<usize>,
    /// Rows required before a node may be split
    pub min_samples_split: usize,
    /// Rows required on each side of a split
    pub min_samples_leaf: usize,
    /// Hessian sum required on each side of a split
    pub min_child_weight: f64,
    /// L2 regularization on leaf values
    pub lambda: f64,
    /// Smallest gain worth splitting for
    pub min_gain: f64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            min_child_weight: 0.0,
            lambda: 0.0,
            min_gain: 1e-12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted tree stored as a flat node arena; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

/// Best split found for a node
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct Builder<'a> {
    x: &'a Array2<f64>,
    grad: &'a [f64],
    hess: &'a [f64],
    params: &'a TreeParams,
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Fit a tree on the rows listed in `rows`.
    ///
    /// `grad` and `hess` are indexed by row number of `x`; `rows` may repeat
    /// a row (bootstrap samples).
    pub fn fit(
        x: &Array2<f64>,
        grad: &[f64],
        hess: &[f64],
        rows: &[usize],
        params: &TreeParams,
    ) -> Self {
        let mut builder = Builder {
            x,
            grad,
            hess,
            params,
            nodes: Vec::new(),
        };
        builder.build(rows.to_vec(), 0);
        Self {
            nodes: builder.nodes,
        }
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        x.outer_iter().map(|row| self.predict_row(row)).collect()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }
}

impl<'a> Builder<'a> {
    fn sums(&self, rows: &[usize]) -> (f64, f64) {
        rows.iter()
            .fold((0.0, 0.0), |(g, h), &r| (g + self.grad[r], h + self.hess[r]))
    }

    fn leaf_value(&self, g: f64, h: f64) -> f64 {
        let denom = h + self.params.lambda;
        if denom <= 0.0 {
            0.0
        } else {
            -g / denom
        }
    }

    fn score(&self, g: f64, h: f64) -> f64 {
        let denom = h + self.params.lambda;
        if denom <= 0.0 {
            0.0
        } else {
            g * g / denom
        }
    }

    /// Build the subtree for `rows`, returning its node index
    fn build(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let (g, h) = self.sums(&rows);
        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: self.leaf_value(g, h),
        });

        let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);
        if depth_reached || rows.len() < self.params.min_samples_split.max(2) {
            return idx;
        }

        let Some(split) = self.find_best_split(&rows, g, h) else {
            return idx;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| self.x[[r, split.feature]] <= split.threshold);

        let left = self.build(left_rows, depth + 1);
        let right = self.build(right_rows, depth + 1);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        idx
    }

    fn find_best_split(&self, rows: &[usize], g_total: f64, h_total: f64) -> Option<SplitCandidate> {
        let n = rows.len();
        let parent_score = self.score(g_total, h_total);
        let min_leaf = self.params.min_samples_leaf.max(1);

        let mut best: Option<SplitCandidate> = None;
        let mut sorted = rows.to_vec();

        for feature in 0..self.x.ncols() {
            sorted.sort_by(|&a, &b| self.x[[a, feature]].total_cmp(&self.x[[b, feature]]));

            let mut g_left = 0.0;
            let mut h_left = 0.0;

            for i in 0..n - 1 {
                let r = sorted[i];
                g_left += self.grad[r];
                h_left += self.hess[r];

                let left_count = i + 1;
                if left_count < min_leaf || n - left_count < min_leaf {
                    continue;
                }

                let value = self.x[[r, feature]];
                let next_value = self.x[[sorted[i + 1], feature]];
                // never split between equal values
                if value == next_value {
                    continue;
                }

                let g_right = g_total - g_left;
                let h_right = h_total - h_left;
                if h_left < self.params.min_child_weight || h_right < self.params.min_child_weight {
                    continue;
                }

                let gain = 0.5
                    * (self.score(g_left, h_left) + self.score(g_right, h_right) - parent_score);

                let improves = match &best {
                    Some(b) => gain > b.gain,
                    None => gain > self.params.min_gain,
                };
                if improves {
                    let mut threshold = value + (next_value - value) / 2.0;
                    if threshold >= next_value {
                        threshold = value;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }
}
