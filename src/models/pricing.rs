//! Dynamic pricing: standardize, then random-forest regression of the
//! recommended price change in percent.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{check_rows, require_labels, round2, SPLIT_SEED, TEST_FRACTION};
use crate::error::Result;
use crate::pipeline::estimators::{ForestParams, RandomForestRegressor};
use crate::pipeline::{
    align, r2_score, train_test_split, FeatureSchema, ModelKind, Record, StandardScaler,
    TrainingTable,
};
use crate::report::{TrainingMetrics, TrainingReport};
use crate::store::Bundle;

/// Confidence reported with every price recommendation.
///
/// The forest does not produce a calibrated interval, so this is a constant.
pub const PRICING_CONFIDENCE: f64 = 0.85;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBundle {
    pub schema: FeatureSchema,
    pub scaler: StandardScaler,
    pub forest: RandomForestRegressor,
    pub report: TrainingReport,
    pub trained_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingScore {
    pub recommended_price_change_percent: f64,
    pub confidence: f64,
}

impl PricingBundle {
    pub fn train(table: &TrainingTable) -> Result<Self> {
        Self::train_with(table, &ForestParams::default())
    }

    pub fn train_with(table: &TrainingTable, params: &ForestParams) -> Result<Self> {
        let start = Instant::now();
        let kind = ModelKind::Pricing;
        check_rows(table, kind)?;
        let labels = require_labels(table, kind)?;

        let split = train_test_split(&table.features, labels, TEST_FRACTION, SPLIT_SEED);
        let scaler = StandardScaler::fit(&split.x_train);
        let x_train = scaler.transform(&split.x_train);
        let x_test = scaler.transform(&split.x_test);

        let forest = RandomForestRegressor::fit(&x_train, &split.y_train, params);

        let r2_train = r2_score(&split.y_train, &forest.predict(&x_train));
        let r2_test = r2_score(&split.y_test, &forest.predict(&x_test));

        let report = TrainingReport {
            kind,
            source: table.source.clone(),
            rows: table.n_rows(),
            features: table.schema.len(),
            train_rows: split.x_train.nrows(),
            test_rows: split.x_test.nrows(),
            metrics: TrainingMetrics::Regression { r2_train, r2_test },
            duration_ms: start.elapsed().as_millis() as u64,
        };

        Ok(Self {
            schema: table.schema.clone(),
            scaler,
            forest,
            report,
            trained_at: Utc::now(),
        })
    }

    /// Recommended price change for one listing
    pub fn score(&self, record: &Record) -> PricingScore {
        let x = align(record, &self.schema);
        let z = self.scaler.transform_row(x.view());
        let change = self.forest.predict_row(z.view());

        PricingScore {
            recommended_price_change_percent: round2(change),
            confidence: PRICING_CONFIDENCE,
        }
    }
}

impl Bundle for PricingBundle {
    const KIND: ModelKind = ModelKind::Pricing;

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
    use crate::pipeline::synthetic;

    fn small_bundle() -> PricingBundle {
        let table = synthetic::generate(ModelKind::Pricing, 200, 42).unwrap();
        let params = ForestParams {
            n_trees: 10,
            ..ForestParams::default()
        };
        PricingBundle::train_with(&table, &params).unwrap()
    }

    #[test]
    fn test_train_reports_split_and_fit() {
        let bundle = small_bundle();
        assert_eq!(bundle.report.train_rows, 160);
        assert_eq!(bundle.report.test_rows, 40);
        assert_eq!(bundle.schema.len(), 9);
        match bundle.report.metrics {
            TrainingMetrics::Regression { r2_train, r2_test } => {
                assert!(r2_train > 0.8);
                assert!(r2_test > 0.5);
            }
            ref other => panic!("unexpected metrics {:?}", other),
        }
    }

    #[test]
    fn test_empty_record_still_scores() {
        let bundle = small_bundle();
        let score = bundle.score(&Record::new());
        assert!(score.recommended_price_change_percent.is_finite());
        assert_eq!(score.confidence, PRICING_CONFIDENCE);
    }

    #[test]
    fn test_high_demand_recommends_more_than_low_demand() {
        let bundle = small_bundle();
        let mut record: Record = [("season", 4.0), ("demandScore", 9.5)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let high = bundle.score(&record).recommended_price_change_percent;
        record.insert("demandScore".to_string(), 1.5);
        let low = bundle.score(&record).recommended_price_change_percent;
        assert!(high > low);
    }

    #[test]
    fn test_score_is_rounded() {
        let bundle = small_bundle();
        let record: Record = [("demandScore".to_string(), 6.3)].into_iter().collect();
        let value = bundle.score(&record).recommended_price_change_percent;
        assert!((value * 100.0 - (value * 100.0).round()).abs() < 1e-9);
    }

    #[test]
    fn test_unlabeled_table_is_rejected() {
        let mut table = synthetic::generate(ModelKind::Pricing, 50, 1).unwrap();
        table.labels = None;
        assert!(PricingBundle::train(&table).is_err());
    }
}
