//! Churn prediction: standardize, then gradient-boosted trees for the
//! probability that a user abandons the platform. Rule-based risk factors are
//! reported next to the probability.

use std::borrow::Cow;
use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{check_rows, require_labels, round2, SPLIT_SEED, TEST_FRACTION};
use crate::error::{ModelError, Result};
use crate::pipeline::estimators::{BoostingParams, GradientBoostedClassifier};
use crate::pipeline::{
    accuracy, align, roc_auc, train_test_split, FeatureSchema, ModelKind, Record, StandardScaler,
    TrainingTable,
};
use crate::report::{TrainingMetrics, TrainingReport};
use crate::store::Bundle;

/// Probabilities above this are high risk
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Probabilities above this (and not high) are medium risk
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.4;

/// Decision threshold for the reported accuracy
const CLASSIFICATION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Bucket an unrounded probability; both thresholds are exclusive
    pub fn from_probability(p: f64) -> Self {
        if p > HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else if p > MEDIUM_RISK_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub factor: String,
    pub message: String,
    pub importance: Importance,
}

impl RiskFactor {
    fn new(factor: &str, message: &str, importance: Importance) -> Self {
        Self {
            factor: factor.to_string(),
            message: message.to_string(),
            importance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnScore {
    pub churn_probability: f64,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<RiskFactor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnBundle {
    pub schema: FeatureSchema,
    pub scaler: StandardScaler,
    pub classifier: GradientBoostedClassifier,
    pub report: TrainingReport,
    pub trained_at: DateTime<Utc>,
}

/// Fill in `avgDailyActivity` when the record has its two inputs but not the value itself
pub fn with_derived_activity(record: &Record) -> Cow<'_, Record> {
    if record.contains_key("avgDailyActivity") {
        return Cow::Borrowed(record);
    }
    match (
        record.get("totalPropertiesViewed"),
        record.get("daysActiveLastMonth"),
    ) {
        (Some(&viewed), Some(&active)) => {
            let mut derived = record.clone();
            derived.insert("avgDailyActivity".to_string(), viewed / active.max(1.0));
            Cow::Owned(derived)
        }
        _ => Cow::Borrowed(record),
    }
}

/// Rule-based explanations, evaluated on the raw record with absent keys read as 0
pub fn risk_factors(record: &Record) -> Vec<RiskFactor> {
    let get = |name: &str| record.get(name).copied().unwrap_or(0.0);
    let mut factors = Vec::new();

    if get("daysSinceLastLogin") > 14.0 {
        factors.push(RiskFactor::new(
            "inactivity",
            "User has not logged in for more than 2 weeks",
            Importance::High,
        ));
    }
    if get("daysActiveLastMonth") < 5.0 {
        factors.push(RiskFactor::new(
            "low engagement",
            "User was active on fewer than 5 days last month",
            Importance::High,
        ));
    }
    if get("messagesSent") < 3.0 {
        factors.push(RiskFactor::new(
            "low communication",
            "User has sent very few messages",
            Importance::Medium,
        ));
    }
    if get("propertiesListed") == 0.0 {
        factors.push(RiskFactor::new(
            "no listings",
            "User has not published any listing",
            Importance::Medium,
        ));
    }
    if get("subscriptionMonths") < 2.0 {
        factors.push(RiskFactor::new(
            "new subscriber",
            "User has been subscribed for less than 2 months",
            Importance::Low,
        ));
    }

    factors
}

impl ChurnBundle {
    pub fn train(table: &TrainingTable) -> Result<Self> {
        Self::train_with(table, &BoostingParams::default())
    }

    pub fn train_with(table: &TrainingTable, params: &BoostingParams) -> Result<Self> {
        let start = Instant::now();
        let kind = ModelKind::Churn;
        check_rows(table, kind)?;
        let labels = require_labels(table, kind)?;

        if labels.iter().any(|&y| y != 0.0 && y != 1.0) {
            return Err(ModelError::training(kind, "churn labels must be 0 or 1"));
        }

        let split = train_test_split(&table.features, labels, TEST_FRACTION, SPLIT_SEED);
        let scaler = StandardScaler::fit(&split.x_train);
        let x_train = scaler.transform(&split.x_train);
        let x_test = scaler.transform(&split.x_test);

        let classifier = GradientBoostedClassifier::fit(&x_train, &split.y_train, params);

        let proba = classifier.predict_proba(&x_test);
        let auc = roc_auc(&split.y_test, &proba);
        let acc = accuracy(&split.y_test, &proba, CLASSIFICATION_THRESHOLD);
        let positive_rate = labels.mean().unwrap_or(0.0);

        let report = TrainingReport {
            kind,
            source: table.source.clone(),
            rows: table.n_rows(),
            features: table.schema.len(),
            train_rows: split.x_train.nrows(),
            test_rows: split.x_test.nrows(),
            metrics: TrainingMetrics::Classification {
                auc,
                accuracy: acc,
                positive_rate,
            },
            duration_ms: start.elapsed().as_millis() as u64,
        };

        Ok(Self {
            schema: table.schema.clone(),
            scaler,
            classifier,
            report,
            trained_at: Utc::now(),
        })
    }

    /// Unrounded churn probability for one user
    pub fn probability(&self, record: &Record) -> f64 {
        let record = with_derived_activity(record);
        let x = align(&record, &self.schema);
        let z = self.scaler.transform_row(x.view());
        self.classifier.predict_proba_row(z.view())
    }

    pub fn score(&self, record: &Record) -> ChurnScore {
        let p = self.probability(record);
        ChurnScore {
            churn_probability: round2(p),
            risk_level: RiskLevel::from_probability(p),
            risk_factors: risk_factors(record),
        }
    }
}

impl Bundle for ChurnBundle {
    const KIND: ModelKind = ModelKind::Churn;

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

    fn record(pairs: &[(&str, f64)]) -> Record {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_risk_level_boundaries() {
        assert_eq!(RiskLevel::from_probability(0.70), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.71), RiskLevel::High);
        assert_eq!(RiskLevel::from_probability(0.40), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.41), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(1.0), RiskLevel::High);
    }

    #[test]
    fn test_derived_activity() {
        let r = record(&[("totalPropertiesViewed", 20.0), ("daysActiveLastMonth", 10.0)]);
        assert_eq!(with_derived_activity(&r)["avgDailyActivity"], 2.0);

        let zero_days = record(&[("totalPropertiesViewed", 20.0), ("daysActiveLastMonth", 0.0)]);
        assert_eq!(with_derived_activity(&zero_days)["avgDailyActivity"], 20.0);
    }

    #[test]
    fn test_derived_activity_keeps_explicit_value_and_needs_both_inputs() {
        let explicit = record(&[
            ("avgDailyActivity", 7.0),
            ("totalPropertiesViewed", 20.0),
            ("daysActiveLastMonth", 10.0),
        ]);
        assert_eq!(with_derived_activity(&explicit)["avgDailyActivity"], 7.0);

        let partial = record(&[("totalPropertiesViewed", 20.0)]);
        assert!(!with_derived_activity(&partial).contains_key("avgDailyActivity"));
    }

    #[test]
    fn test_all_risk_factors_in_order() {
        let factors = risk_factors(&Record::new());
        let names: Vec<&str> = factors.iter().map(|f| f.factor.as_str()).collect();
        // absent keys read as 0: everything but inactivity fires
        assert_eq!(
            names,
            vec!["low engagement", "low communication", "no listings", "new subscriber"]
        );

        let inactive = risk_factors(&record(&[("daysSinceLastLogin", 15.0)]));
        assert_eq!(inactive[0].factor, "inactivity");
        assert_eq!(inactive[0].importance, Importance::High);
    }

    #[test]
    fn test_risk_factor_thresholds_are_strict() {
        let r = record(&[
            ("daysSinceLastLogin", 14.0),
            ("daysActiveLastMonth", 5.0),
            ("messagesSent", 3.0),
            ("propertiesListed", 1.0),
            ("subscriptionMonths", 2.0),
        ]);
        assert!(risk_factors(&r).is_empty());
    }

    #[test]
    fn test_score_serializes_lowercase_levels() {
        let score = ChurnScore {
            churn_probability: 0.12,
            risk_level: RiskLevel::Low,
            risk_factors: vec![RiskFactor::new("no listings", "msg", Importance::Medium)],
        };
        let json = serde_json::to_value(&score).unwrap();
        assert_eq!(json["churnProbability"], 0.12);
        assert_eq!(json["riskLevel"], "low");
        assert_eq!(json["riskFactors"][0]["importance"], "medium");
    }
}
