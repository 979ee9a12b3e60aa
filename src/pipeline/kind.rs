//! The three model families served by casaml

use serde::{Deserialize, Serialize};

/// Which model a dataset, bundle or request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Price-adjustment regression
    Pricing,
    /// Churn-risk classification
    Churn,
    /// User-segment clustering
    Clustering,
}

impl ModelKind {
    /// All kinds, in training order
    pub const ALL: [ModelKind; 3] = [ModelKind::Pricing, ModelKind::Churn, ModelKind::Clustering];

    /// Label column expected in a training CSV, if the model is supervised
    pub fn label_column(&self) -> Option<&'static str> {
        match self {
            ModelKind::Pricing => Some("optimalPriceChange"),
            ModelKind::Churn => Some("churn"),
            ModelKind::Clustering => None,
        }
    }

    /// Fixed file name of the persisted bundle
    pub fn bundle_file_name(&self) -> &'static str {
        match self {
            ModelKind::Pricing => "dynamic_pricing_model.json",
            ModelKind::Churn => "churn_model.json",
            ModelKind::Clustering => "user_clustering_model.json",
        }
    }

    /// Feature columns produced by the synthetic generator
    pub fn default_features(&self) -> &'static [&'static str] {
        match self {
            ModelKind::Pricing => &PRICING_FEATURES,
            ModelKind::Churn => &CHURN_FEATURES,
            ModelKind::Clustering => &CLUSTERING_FEATURES,
        }
    }
}

pub const PRICING_FEATURES: [&str; 9] = [
    "locationScore",
    "squareMeters",
    "roomCount",
    "hasBalcony",
    "floor",
    "buildingAge",
    "demandScore",
    "season",
    "currentPrice",
];

pub const CHURN_FEATURES: [&str; 7] = [
    "daysSinceLastLogin",
    "daysActiveLastMonth",
    "totalPropertiesViewed",
    "avgDailyActivity",
    "messagesSent",
    "propertiesListed",
    "subscriptionMonths",
];

pub const CLUSTERING_FEATURES: [&str; 14] = [
    "propertiesViewedMonthly",
    "avgViewDurationSec",
    "searchCountMonthly",
    "msgSentMonthly",
    "msgResponseRate",
    "avgResponseTimeHrs",
    "propertiesListed",
    "listingCompleteness",
    "listingUpdatesMonthly",
    "loginFrequencyWeekly",
    "sessionDurationMin",
    "completedProfile",
    "subscriptionTier",
    "daysSinceRegistration",
];

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::Pricing => write!(f, "pricing"),
            ModelKind::Churn => write!(f, "churn"),
            ModelKind::Clustering => write!(f, "clustering"),
        }
    }
}

impl std::str::FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pricing" | "dynamic_pricing" | "dynamic-pricing" => Ok(ModelKind::Pricing),
            "churn" | "predictive_churn" | "predictive-churn" => Ok(ModelKind::Churn),
            "clustering" | "cluster" | "user_clustering" | "user-clustering" => {
                Ok(ModelKind::Clustering)
            }
            _ => Err(format!(
                "Unknown model: '{}'. Use 'pricing', 'churn' or 'clustering'.",
                s
            )),
        }
    }
}
