//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

use casaml::{FsModelStore, MemoryModelStore, ModelService, Record, TrainConfig};
use tempfile::TempDir;

/// Build a record from name/value pairs
pub fn record(pairs: &[(&str, f64)]) -> Record {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Three-room flat in a good location during high season
pub fn reference_pricing_record() -> Record {
    record(&[
        ("locationScore", 7.5),
        ("squareMeters", 85.0),
        ("roomCount", 3.0),
        ("hasBalcony", 1.0),
        ("floor", 3.0),
        ("buildingAge", 15.0),
        ("demandScore", 8.0),
        ("season", 1.0),
        ("currentPrice", 850.0),
    ])
}

/// Engaged long-term subscriber
pub fn low_risk_churn_record() -> Record {
    record(&[
        ("daysSinceLastLogin", 2.0),
        ("daysActiveLastMonth", 25.0),
        ("totalPropertiesViewed", 50.0),
        ("messagesSent", 15.0),
        ("propertiesListed", 3.0),
        ("subscriptionMonths", 8.0),
    ])
}

/// Dormant new subscriber with no activity
pub fn high_risk_churn_record() -> Record {
    record(&[
        ("daysSinceLastLogin", 45.0),
        ("daysActiveLastMonth", 1.0),
        ("totalPropertiesViewed", 2.0),
        ("messagesSent", 0.0),
        ("propertiesListed", 0.0),
        ("subscriptionMonths", 1.0),
    ])
}

/// Heavy user with a listing-oriented profile
pub fn active_user_record() -> Record {
    record(&[
        ("propertiesViewedMonthly", 45.0),
        ("avgViewDurationSec", 150.0),
        ("searchCountMonthly", 30.0),
        ("msgSentMonthly", 25.0),
        ("msgResponseRate", 0.9),
        ("avgResponseTimeHrs", 1.0),
        ("propertiesListed", 6.0),
        ("listingCompleteness", 0.95),
        ("listingUpdatesMonthly", 8.0),
        ("loginFrequencyWeekly", 6.0),
        ("sessionDurationMin", 25.0),
        ("completedProfile", 1.0),
        ("subscriptionTier", 2.0),
        ("daysSinceRegistration", 400.0),
    ])
}

/// Service over an in-memory store with a small synthetic sample count
pub fn memory_service(samples: usize) -> ModelService<MemoryModelStore> {
    let config = TrainConfig {
        samples,
        ..TrainConfig::default()
    };
    ModelService::new(MemoryModelStore::new(), config)
}

/// Service over a fresh temporary model directory
pub fn temp_service(config: TrainConfig) -> (TempDir, ModelService<FsModelStore>) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = FsModelStore::new(dir.path().join("models"));
    (dir, ModelService::new(store, config))
}

/// Write `content` to `name` inside `dir`
pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("Failed to create file");
    write!(file, "{}", content).expect("Failed to write file");
    path
}
