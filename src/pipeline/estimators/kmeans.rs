//! K-means clustering
//!
//! Centroids are fitted with linfa; assignment of new points is a plain
//! nearest-centroid lookup so scoring only needs the stored centroids.

use linfa::prelude::*;
use linfa::Dataset;
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansParams {
    pub n_clusters: usize,
    /// Independent initializations; the lowest-inertia run wins
    pub n_runs: usize,
    pub max_iterations: u64,
    pub tolerance: f64,
    pub seed: u64,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            n_clusters: 5,
            n_runs: 10,
            max_iterations: 300,
            tolerance: 1e-4,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KMeansFit {
    /// One centroid per row
    pub centroids: Array2<f64>,
    pub labels: Array1<usize>,
    /// Within-cluster sum of squared distances
    pub inertia: f64,
}

pub fn fit_kmeans(x: &Array2<f64>, params: &KMeansParams) -> Result<KMeansFit, String> {
    let n_samples = x.nrows();
    if params.n_clusters == 0 {
        return Err("number of clusters must be positive".to_string());
    }
    if n_samples < params.n_clusters {
        return Err(format!(
            "number of data points ({}) must be at least equal to number of clusters ({})",
            n_samples, params.n_clusters
        ));
    }

    let targets: Array1<usize> = Array1::zeros(n_samples);
    let dataset = Dataset::new(x.clone(), targets);

    let rng = StdRng::seed_from_u64(params.seed);
    let model = KMeans::params_with_rng(params.n_clusters, rng)
        .n_runs(params.n_runs.max(1))
        .max_n_iterations(params.max_iterations)
        .tolerance(params.tolerance)
        .fit(&dataset)
        .map_err(|e| e.to_string())?;

    let centroids = model.centroids().clone();
    let labels: Array1<usize> = x
        .outer_iter()
        .map(|row| nearest_centroid(&centroids, row))
        .collect();
    let inertia = compute_inertia(x, &labels, &centroids);

    Ok(KMeansFit {
        centroids,
        labels,
        inertia,
    })
}

/// Euclidean distance from `point` to every centroid
pub fn centroid_distances(centroids: &Array2<f64>, point: ArrayView1<f64>) -> Array1<f64> {
    centroids
        .outer_iter()
        .map(|c| euclidean_distance(c, point))
        .collect()
}

/// Index of the closest centroid; ties go to the lowest index
pub fn nearest_centroid(centroids: &Array2<f64>, point: ArrayView1<f64>) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (k, c) in centroids.outer_iter().enumerate() {
        let d = squared_distance(c, point);
        if d < best_dist {
            best = k;
            best_dist = d;
        }
    }
    best
}

fn compute_inertia(features: &Array2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    labels
        .iter()
        .zip(features.outer_iter())
        .map(|(&k, row)| squared_distance(centroids.row(k), row))
        .sum()
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

fn euclidean_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    squared_distance(a, b).sqrt()
}
