//! Per-model training reports
//!
//! A report is produced by every training run and stored inside the bundle, so
//! `casaml status` can show headline metrics without retraining.

use serde::{Deserialize, Serialize};

use crate::pipeline::{DataSource, ModelKind};

/// Population of one cluster in the training data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterPopulation {
    pub cluster_id: usize,
    pub name: String,
    pub count: usize,
    /// Share of training rows, 0-100
    pub percentage: f64,
}

/// Evaluation metrics, one shape per model family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TrainingMetrics {
    #[serde(rename_all = "camelCase")]
    Regression { r2_train: f64, r2_test: f64 },
    #[serde(rename_all = "camelCase")]
    Classification {
        auc: f64,
        accuracy: f64,
        /// Share of positive labels in the whole table
        positive_rate: f64,
    },
    #[serde(rename_all = "camelCase")]
    Clustering {
        inertia: f64,
        /// Variance share captured by each retained component
        explained_variance_ratio: Vec<f64>,
        populations: Vec<ClusterPopulation>,
    },
}

impl TrainingMetrics {
    /// One-line summary used in status output and summary tables
    pub fn headline(&self) -> String {
        match self {
            TrainingMetrics::Regression { r2_train, r2_test } => {
                format!("R² train {:.4} / test {:.4}", r2_train, r2_test)
            }
            TrainingMetrics::Classification { auc, accuracy, .. } => {
                format!("AUC {:.4} / accuracy {:.4}", auc, accuracy)
            }
            TrainingMetrics::Clustering {
                explained_variance_ratio,
                populations,
                ..
            } => {
                let explained: f64 = explained_variance_ratio.iter().sum();
                format!(
                    "{} clusters / {:.1}% variance kept",
                    populations.len(),
                    explained * 100.0
                )
            }
        }
    }
}

/// Outcome of one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
    pub kind: ModelKind,
    pub source: DataSource,
    pub rows: usize,
    pub features: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub metrics: TrainingMetrics,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regression_report() -> TrainingReport {
        TrainingReport {
            kind: ModelKind::Pricing,
            source: DataSource::Synthetic {
                samples: 1000,
                seed: 42,
            },
            rows: 1000,
            features: 9,
            train_rows: 800,
            test_rows: 200,
            metrics: TrainingMetrics::Regression {
                r2_train: 0.99,
                r2_test: 0.95,
            },
            duration_ms: 12,
        }
    }

    #[test]
    fn test_report_json_is_camel_case() {
        let json = serde_json::to_value(regression_report()).unwrap();
        assert_eq!(json["kind"], "pricing");
        assert_eq!(json["trainRows"], 800);
        assert_eq!(json["metrics"]["type"], "regression");
        assert_eq!(json["metrics"]["r2Test"], 0.95);
        assert_eq!(json["source"]["type"], "synthetic");
    }

    #[test]
    fn test_report_round_trips() {
        let report = regression_report();
        let json = serde_json::to_string(&report).unwrap();
        let back: TrainingReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_headlines() {
        assert_eq!(
            regression_report().metrics.headline(),
            "R² train 0.9900 / test 0.9500"
        );

        let clustering = TrainingMetrics::Clustering {
            inertia: 10.0,
            explained_variance_ratio: vec![0.3, 0.2],
            populations: vec![],
        };
        assert_eq!(clustering.headline(), "0 clusters / 50.0% variance kept");
    }
}
