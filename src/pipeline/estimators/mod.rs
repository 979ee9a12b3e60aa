//! Estimators used by the three models

pub mod boosting;
pub mod forest;
pub mod kmeans;
pub mod pca;
pub mod tree;

pub use boosting::{sigmoid, BoostingParams, GradientBoostedClassifier};
pub use forest::{ForestParams, RandomForestRegressor};
pub use kmeans::{centroid_distances, fit_kmeans, nearest_centroid, KMeansFit, KMeansParams};
pub use pca::Pca;
pub use tree::{RegressionTree, TreeParams};
