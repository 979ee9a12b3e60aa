//! End-to-end tests for the pricing model

mod common;

use casaml::models::pricing::PRICING_CONFIDENCE;
use casaml::models::PricingBundle;
use casaml::pipeline::synthetic::generate;
use casaml::{ModelKind, Record, TrainConfig};
use common::{reference_pricing_record, temp_service};

#[test]
fn test_reference_record_end_to_end() {
    let (_dir, service) = temp_service(TrainConfig::default());

    let score = service.score_pricing(&reference_pricing_record()).unwrap();

    assert!(score.recommended_price_change_percent.is_finite());
    assert_eq!(score.confidence, 0.85);
    assert_eq!(score.confidence, PRICING_CONFIDENCE);
    // demand 8 in season 1 is a clear price increase in the training rule
    assert!(score.recommended_price_change_percent > 0.0);
}

#[test]
fn test_scoring_is_idempotent() {
    let table = generate(ModelKind::Pricing, 300, 42).unwrap();
    let bundle = PricingBundle::train(&table).unwrap();
    let record = reference_pricing_record();

    assert_eq!(bundle.score(&record), bundle.score(&record));
}

#[test]
fn test_training_is_reproducible() {
    let table = generate(ModelKind::Pricing, 300, 42).unwrap();
    let a = PricingBundle::train(&table).unwrap();
    let b = PricingBundle::train(&table).unwrap();

    let record = reference_pricing_record();
    assert_eq!(a.score(&record), b.score(&record));
    assert_eq!(a.report.metrics, b.report.metrics);
}

#[test]
fn test_extra_and_missing_keys_are_tolerated() {
    let table = generate(ModelKind::Pricing, 200, 42).unwrap();
    let bundle = PricingBundle::train(&table).unwrap();

    let mut record = reference_pricing_record();
    record.remove("floor");
    record.insert("unknownFeature".to_string(), 123.0);

    assert!(bundle.score(&record).recommended_price_change_percent.is_finite());
    assert!(bundle.score(&Record::new()).recommended_price_change_percent.is_finite());
}

#[test]
fn test_score_json_shape() {
    let table = generate(ModelKind::Pricing, 100, 42).unwrap();
    let bundle = PricingBundle::train(&table).unwrap();
    let json = serde_json::to_value(bundle.score(&reference_pricing_record())).unwrap();

    assert!(json["recommendedPriceChangePercent"].is_number());
    assert_eq!(json["confidence"], 0.85);
}
