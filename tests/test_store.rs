//! Tests for bundle persistence

mod common;

use casaml::models::ChurnBundle;
use casaml::pipeline::synthetic::generate;
use casaml::store::{load_or_none, store_bundle};
use casaml::{FsModelStore, ModelError, ModelKind, ModelStore, TrainConfig};
use common::{low_risk_churn_record, temp_service};
use tempfile::TempDir;

#[test]
fn test_bundle_survives_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = FsModelStore::new(dir.path());
    let table = generate(ModelKind::Churn, 200, 42).unwrap();
    let bundle = ChurnBundle::train(&table).unwrap();

    assert!(load_or_none::<ChurnBundle>(&store).unwrap().is_none());
    store_bundle(&store, &bundle).unwrap();
    assert!(dir.path().join("churn_model.json").is_file());

    let loaded = load_or_none::<ChurnBundle>(&store).unwrap().unwrap();
    assert_eq!(loaded.schema, bundle.schema);
    assert_eq!(loaded.report, bundle.report);
    assert_eq!(loaded.trained_at, bundle.trained_at);
    let record = low_risk_churn_record();
    assert_eq!(loaded.score(&record), bundle.score(&record));
}

#[test]
fn test_retraining_replaces_bundle() {
    let (_dir, service) = temp_service(TrainConfig {
        samples: 100,
        ..TrainConfig::default()
    });

    let first = service.train_churn().unwrap();
    let second = service.train_churn().unwrap();
    let stored = load_or_none::<ChurnBundle>(service.store()).unwrap().unwrap();

    assert!(second.trained_at >= first.trained_at);
    assert_eq!(stored.trained_at, second.trained_at);
}

#[test]
fn test_corrupt_bundle_is_reported_not_retrained() {
    let (_dir, service) = temp_service(TrainConfig {
        samples: 100,
        ..TrainConfig::default()
    });
    let path = service.store().path_for(ModelKind::Churn);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ truncated").unwrap();

    let err = service.score_churn(&low_risk_churn_record()).unwrap_err();
    assert!(matches!(err, ModelError::CorruptBundle { kind: ModelKind::Churn, .. }));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ truncated");
}

#[test]
fn test_fixed_file_names() {
    let store = FsModelStore::new("models");
    assert!(store.location(ModelKind::Pricing).ends_with("dynamic_pricing_model.json"));
    assert!(store.location(ModelKind::Churn).ends_with("churn_model.json"));
    assert!(store
        .location(ModelKind::Clustering)
        .ends_with("user_clustering_model.json"));
}
