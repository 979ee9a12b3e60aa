//! User segmentation: standardize, reduce to five principal components, then
//! assign one of five k-means segments.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use super::check_rows;
use crate::error::{ModelError, Result};
use crate::pipeline::estimators::{
    centroid_distances, fit_kmeans, nearest_centroid, KMeansParams, Pca,
};
use crate::pipeline::{align, FeatureSchema, ModelKind, Record, StandardScaler, TrainingTable};
use crate::report::{ClusterPopulation, TrainingMetrics, TrainingReport};
use crate::store::Bundle;

pub const N_COMPONENTS: usize = 5;
pub const N_CLUSTERS: usize = 5;

/// Relative deviation from the centroid that makes a feature distinctive
const DISTINCTIVE_RATIO: f64 = 0.5;

/// Distinctive features reported per user
const MAX_DISTINCTIVE_FEATURES: usize = 3;

/// Segment names and traits, indexed by cluster id
const SEGMENTS: [(&str, [&str; 3]); N_CLUSTERS] = [
    (
        "Active owners",
        [
            "lists properties regularly",
            "replies to messages quickly",
            "uses the platform often",
        ],
    ),
    (
        "Occasional searchers",
        [
            "searches for properties occasionally",
            "views many listing details",
            "sends few messages",
        ],
    ),
    (
        "Premium users",
        [
            "premium subscription",
            "high transaction completion rate",
            "high platform engagement",
        ],
    ),
    (
        "New members",
        [
            "recently created account",
            "still exploring",
            "incomplete profile",
        ],
    ),
    (
        "Inactive users",
        [
            "infrequent logins",
            "short sessions",
            "no recent transactions",
        ],
    ),
];

/// Name, traits and original-unit centroid of one cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSegment {
    pub name: String,
    pub traits: Vec<String>,
    /// Centroid in original feature units, in schema order
    pub center: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterBundle {
    pub schema: FeatureSchema,
    pub scaler: StandardScaler,
    pub pca: Pca,
    /// Centroids in component space, one per row
    pub centroids: Array2<f64>,
    pub segments: Vec<ClusterSegment>,
    pub report: TrainingReport,
    pub trained_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterScore {
    pub cluster_id: usize,
    pub cluster_name: String,
    pub confidence: f64,
    pub cluster_traits: Vec<String>,
    pub distinctive_features: Vec<String>,
    /// Belongingness to every cluster, keyed by cluster id
    pub cluster_distribution: BTreeMap<usize, f64>,
}

/// Turn centroid distances into belongingness scores.
///
/// Distances are normalized by their sum and mapped to `1 - d / max(d)`, so
/// the farthest cluster scores 0. These are not probabilities. When every
/// distance is 0 all clusters score 1.
pub fn belongingness(distances: &Array1<f64>) -> Array1<f64> {
    let total: f64 = distances.sum();
    if total <= 0.0 || !total.is_finite() {
        return Array1::ones(distances.len());
    }
    let normalized = distances / total;
    let max = normalized.fold(0.0f64, |m, &v| m.max(v));
    if max <= 0.0 {
        return Array1::ones(distances.len());
    }
    normalized.mapv(|d| 1.0 - d / max)
}

/// Features where the user differs from the centroid by more than half the
/// centroid value, as `"{feature}: high"` or `"{feature}: low"`.
///
/// Features are visited in schema order and at most three are returned. A
/// centroid value of 0 (or below) flags any differing user value.
pub fn distinctive_features(
    schema: &FeatureSchema,
    user: ArrayView1<f64>,
    center: &[f64],
) -> Vec<String> {
    schema
        .iter()
        .zip(user.iter().zip(center.iter()))
        .filter(|&(_, (&u, &c))| (u - c).abs() > DISTINCTIVE_RATIO * c)
        .map(|(name, (&u, &c))| {
            let direction = if u > c { "high" } else { "low" };
            format!("{}: {}", name, direction)
        })
        .take(MAX_DISTINCTIVE_FEATURES)
        .collect()
}

impl ClusterBundle {
    pub fn train(table: &TrainingTable) -> Result<Self> {
        Self::train_with(table, &KMeansParams::default())
    }

    pub fn train_with(table: &TrainingTable, params: &KMeansParams) -> Result<Self> {
        let start = Instant::now();
        let kind = ModelKind::Clustering;
        check_rows(table, kind)?;

        let n_components = N_COMPONENTS.min(table.schema.len());
        let params = KMeansParams {
            n_clusters: N_CLUSTERS,
            ..*params
        };

        let scaler = StandardScaler::fit(&table.features);
        let scaled = scaler.transform(&table.features);
        let pca = Pca::fit(&scaled, n_components).map_err(|e| ModelError::training(kind, e))?;
        let projected = pca.transform(&scaled);

        let fit = fit_kmeans(&projected, &params).map_err(|e| ModelError::training(kind, e))?;

        let centers = scaler.inverse_transform(&pca.inverse_transform(&fit.centroids));
        let segments: Vec<ClusterSegment> = SEGMENTS
            .iter()
            .zip(centers.outer_iter())
            .map(|((name, traits), center)| ClusterSegment {
                name: name.to_string(),
                traits: traits.iter().map(|t| t.to_string()).collect(),
                center: center.to_vec(),
            })
            .collect();

        let n_rows = table.n_rows();
        let mut counts = vec![0usize; N_CLUSTERS];
        for &label in fit.labels.iter() {
            counts[label] += 1;
        }
        let populations = segments
            .iter()
            .zip(counts)
            .enumerate()
            .map(|(cluster_id, (segment, count))| ClusterPopulation {
                cluster_id,
                name: segment.name.clone(),
                count,
                percentage: count as f64 / n_rows as f64 * 100.0,
            })
            .collect();

        // total variance of standardized data is the sum of per-feature sample variances
        let total_variance: f64 = scaled
            .columns()
            .into_iter()
            .map(|c| c.var(1.0))
            .sum();
        let explained_variance_ratio = pca.explained_variance_ratio(total_variance).to_vec();

        let report = TrainingReport {
            kind,
            source: table.source.clone(),
            rows: n_rows,
            features: table.schema.len(),
            train_rows: n_rows,
            test_rows: 0,
            metrics: TrainingMetrics::Clustering {
                inertia: fit.inertia,
                explained_variance_ratio,
                populations,
            },
            duration_ms: start.elapsed().as_millis() as u64,
        };

        Ok(Self {
            schema: table.schema.clone(),
            scaler,
            pca,
            centroids: fit.centroids,
            segments,
            report,
            trained_at: Utc::now(),
        })
    }

    pub fn n_clusters(&self) -> usize {
        self.centroids.nrows()
    }

    pub fn score(&self, record: &Record) -> ClusterScore {
        let x = align(record, &self.schema);
        let z = self.pca.transform_row(self.scaler.transform_row(x.view()).view());

        let cluster_id = nearest_centroid(&self.centroids, z.view());
        let belonging = belongingness(&centroid_distances(&self.centroids, z.view()));

        let segment = &self.segments[cluster_id];
        ClusterScore {
            cluster_id,
            cluster_name: segment.name.clone(),
            confidence: belonging[cluster_id],
            cluster_traits: segment.traits.clone(),
            distinctive_features: distinctive_features(&self.schema, x.view(), &segment.center),
            cluster_distribution: belonging.iter().copied().enumerate().collect(),
        }
    }
}

impl Bundle for ClusterBundle {
    const KIND: ModelKind = ModelKind::Clustering;

    fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    fn report(&self) -> &TrainingReport {
        &self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_belongingness_formula() {
        let d = array![1.0, 2.0, 4.0];
        let b = belongingness(&d);
        // normalized: 1/7, 2/7, 4/7; divided by max 4/7
        assert!((b[0] - 0.75).abs() < 1e-12);
        assert!((b[1] - 0.5).abs() < 1e-12);
        assert_eq!(b[2], 0.0);
    }

    #[test]
    fn test_belongingness_degenerate_distances() {
        let b = belongingness(&array![0.0, 0.0, 0.0]);
        assert!(b.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_distinctive_features_capped_in_schema_order() {
        let schema = FeatureSchema::new(["a", "b", "c", "d", "e", "f"]);
        let center = [10.0, 10.0, 10.0, 10.0, 10.0, 10.0];
        // a, c, d, e, f deviate by more than 50%
        let user = array![20.0, 12.0, 1.0, 30.0, 0.0, 16.0];

        let found = distinctive_features(&schema, user.view(), &center);
        assert_eq!(found, vec!["a: high", "c: low", "d: high"]);
    }

    #[test]
    fn test_distinctive_features_zero_centroid() {
        let schema = FeatureSchema::new(["a", "b"]);
        let found = distinctive_features(&schema, array![0.1, 0.0].view(), &[0.0, 0.0]);
        assert_eq!(found, vec!["a: high"]);
    }

    #[test]
    fn test_segments_table() {
        assert_eq!(SEGMENTS[0].0, "Active owners");
        assert_eq!(SEGMENTS[4].0, "Inactive users");
        assert!(SEGMENTS.iter().all(|(_, traits)| traits.len() == 3));
    }
}
