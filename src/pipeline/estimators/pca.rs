//! Principal component analysis
//!
//! Components are the leading eigenvectors of the sample covariance matrix.
//! Each component's sign is fixed so that its largest-magnitude loading is
//! positive, which keeps projections stable across refits.

use faer::{Mat, Side};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pca {
    /// Per-feature mean removed before projection
    pub mean: Array1<f64>,
    /// One component per row, shape (n_components, n_features)
    pub components: Array2<f64>,
    /// Variance captured by each component
    pub explained_variance: Array1<f64>,
}

impl Pca {
    /// Fit `n_components` principal components of `x`.
    pub fn fit(x: &Array2<f64>, n_components: usize) -> Result<Self, String> {
        let (n_rows, n_features) = x.dim();
        if n_components == 0 || n_components > n_features {
            return Err(format!(
                "cannot extract {} components from {} features",
                n_components, n_features
            ));
        }
        if n_rows < 2 {
            return Err(format!("PCA needs at least 2 rows, got {}", n_rows));
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| "empty input".to_string())?;

        let mut z = Mat::<f64>::zeros(n_rows, n_features);
        for (i, row) in x.outer_iter().enumerate() {
            for j in 0..n_features {
                z[(i, j)] = row[j] - mean[j];
            }
        }

        // Covariance: C = Z^T * Z / (n - 1)
        let gram = z.transpose() * &z;
        let denom = (n_rows - 1) as f64;
        let mut cov = Mat::<f64>::zeros(n_features, n_features);
        for i in 0..n_features {
            for j in 0..n_features {
                cov[(i, j)] = gram[(i, j)] / denom;
            }
        }

        // Eigenvalues come back in nondecreasing order
        let evd = cov.selfadjoint_eigendecomposition(Side::Lower);
        let eigenvalues = evd.s().column_vector();
        let eigenvectors = evd.u();

        let mut components = Array2::<f64>::zeros((n_components, n_features));
        let mut explained_variance = Array1::<f64>::zeros(n_components);

        for c in 0..n_components {
            let src = n_features - 1 - c;
            explained_variance[c] = eigenvalues.read(src).max(0.0);

            let mut pivot = 0.0f64;
            for j in 0..n_features {
                let v = eigenvectors.read(j, src);
                components[[c, j]] = v;
                if v.abs() > pivot.abs() {
                    pivot = v;
                }
            }
            if pivot < 0.0 {
                components.row_mut(c).mapv_inplace(|v| -v);
            }
        }

        Ok(Self {
            mean,
            components,
            explained_variance,
        })
    }

    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    /// Project rows of `x` onto the components
    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        (x - &self.mean).dot(&self.components.t())
    }

    pub fn transform_row(&self, row: ArrayView1<f64>) -> Array1<f64> {
        self.components.dot(&(&row - &self.mean))
    }

    /// Map component-space points back to feature space
    pub fn inverse_transform(&self, z: &Array2<f64>) -> Array2<f64> {
        z.dot(&self.components) + &self.mean
    }

    /// Share of the total variance captured by each component
    pub fn explained_variance_ratio(&self, total_variance: f64) -> Array1<f64> {
        if total_variance <= 0.0 {
            return Array1::zeros(self.n_components());
        }
        &self.explained_variance / total_variance
    }
}
