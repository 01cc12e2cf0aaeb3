use std::sync::Arc;

use approx::assert_relative_eq;
use async_trait::async_trait;

use super::common::*;
use crate::advisory::{
    AdvisoryEngine, AdvisoryError, Catalog, Confidence, CropInference, FeatureNormalizer,
    FeatureVector, FertilizerInference, FertilizerRules, FixedSampler, Inference, InferenceError,
    InferenceKind, InferenceResult, InputValidator, Label, Prediction, RawRequest, SeededSampler,
    StrategySet, YieldInference,
};

fn features(request: &RawRequest, kind: InferenceKind) -> FeatureVector {
    let input = InputValidator::default()
        .validate(request, kind)
        .expect("valid request");
    FeatureNormalizer::default().normalize(&input)
}

#[tokio::test]
async fn nitrogen_deficiency_wins_regardless_of_other_nutrients() {
    let strategy = FertilizerInference::new(Arc::new(FixedSampler::new(0.5)));
    let result = strategy
        .infer(&features(&fertilizer_request(), InferenceKind::Fertilizer))
        .await
        .expect("fertilizer inference");

    assert_eq!(result.label, Label::Category("Urea".to_string()));
    match result.prediction {
        Prediction::Fertilizer {
            dosage_kg_per_hectare,
            ..
        } => assert_eq!(dosage_kg_per_hectare, 125),
        other => panic!("expected fertilizer prediction, got {other:?}"),
    }
}

#[tokio::test]
async fn balanced_soil_gets_the_balanced_blend() {
    let request = fertilizer_request().with("nitrogen", "55");
    let strategy = FertilizerInference::new(Arc::new(FixedSampler::new(0.0)));

    let result = strategy
        .infer(&features(&request, InferenceKind::Fertilizer))
        .await
        .expect("fertilizer inference");
    assert_eq!(result.catalog_key(), "NPK");
}

#[tokio::test]
async fn thresholds_are_configurable_but_order_is_not() {
    let request = fertilizer_request()
        .with("nitrogen", "55")
        .with("phosphorus", "55")
        .with("potassium", "20");
    let strategy = FertilizerInference::new(Arc::new(FixedSampler::new(0.0))).with_rules(
        FertilizerRules {
            nitrogen_threshold: 60.0,
            phosphorus_threshold: 60.0,
            potassium_threshold: 40.0,
        },
    );

    let result = strategy
        .infer(&features(&request, InferenceKind::Fertilizer))
        .await
        .expect("fertilizer inference");
    assert_eq!(result.catalog_key(), "Urea");
}

#[tokio::test]
async fn sugarcane_yield_scales_fixed_base_by_multiplier_and_area() {
    let strategy =
        YieldInference::new(Arc::new(FixedSampler::new(0.5))).with_fixed_base_yield(3.0);

    let result = strategy
        .infer(&features(&yield_request(), InferenceKind::Yield))
        .await
        .expect("yield inference");

    match &result.prediction {
        Prediction::Yield(estimate) => {
            assert_relative_eq!(estimate.yield_per_hectare, 45.0);
            assert_relative_eq!(estimate.total_production, 90.0);
            assert_relative_eq!(estimate.multiplier, 15.0);
            assert_relative_eq!(estimate.previous_production, 80.0);
            assert_relative_eq!(estimate.production_change_pct().unwrap_or_default(), 12.5);
        }
        other => panic!("expected yield prediction, got {other:?}"),
    }
    assert_eq!(result.label, Label::Quantity(45.0));
}

#[tokio::test]
async fn sampled_base_yield_stays_in_band() {
    let strategy = YieldInference::new(Arc::new(SeededSampler::new(11)));
    let request = yield_request().with("crop", "Wheat").with("area", "1");
    let features = features(&request, InferenceKind::Yield);

    for _ in 0..32 {
        let result = strategy.infer(&features).await.expect("yield inference");
        let Prediction::Yield(estimate) = result.prediction else {
            panic!("expected yield prediction");
        };
        assert!((2.0..=5.0).contains(&estimate.base_yield));
        assert_relative_eq!(estimate.yield_per_hectare, estimate.base_yield);
    }
}

#[tokio::test]
async fn crop_matcher_prefers_closest_envelope() {
    let result = CropInference::default()
        .infer(&features(&crop_request(), InferenceKind::Crop))
        .await
        .expect("crop inference");

    assert_eq!(result.catalog_key(), "rice");
    assert!(result.confidence.value() >= 0.9);
}

#[test]
fn typical_readings_score_perfectly() {
    let catalog = Catalog::standard();
    let wheat = catalog.crop("wheat").expect("wheat profile");
    let readings: Vec<_> = wheat
        .envelopes
        .iter()
        .map(|(field, envelope)| (*field, envelope.typical))
        .collect();

    assert_relative_eq!(CropInference::suitability(wheat, &readings), 1.0);
}

#[tokio::test]
async fn confidence_stays_within_unit_interval_for_every_strategy() {
    let requests = [
        (crop_request(), InferenceKind::Crop),
        (fertilizer_request(), InferenceKind::Fertilizer),
        (yield_request(), InferenceKind::Yield),
        (
            crop_request().with("rainfall", "5000").with("ph", "0.5"),
            InferenceKind::Crop,
        ),
    ];

    for seed in 0..8 {
        let strategies = StrategySet::reference(Arc::new(SeededSampler::new(seed)));
        for (request, kind) in &requests {
            let result = strategies
                .for_kind(*kind)
                .infer(&features(request, *kind))
                .await
                .expect("inference succeeds");
            let confidence = result.confidence.value();
            assert!(
                (0.0..=1.0).contains(&confidence),
                "{kind} confidence {confidence} out of range"
            );
        }
    }
}

#[test]
fn confidence_rejects_values_outside_unit_interval() {
    assert!(Confidence::new(1.01).is_err());
    assert!(Confidence::new(-0.1).is_err());
    assert!(Confidence::new(f64::NAN).is_err());
    assert_eq!(Confidence::new(0.875).expect("valid").to_string(), "87.5%");
}

#[tokio::test]
async fn missing_feature_is_an_inference_error() {
    let empty = FeatureVector::new(InferenceKind::Yield, Vec::new(), Vec::new());
    let err = YieldInference::new(Arc::new(FixedSampler::new(0.5)))
        .infer(&empty)
        .await
        .expect_err("no crop feature");
    assert!(err.reason.contains("crop"));
}

#[tokio::test]
async fn engine_rejects_prediction_of_the_wrong_kind() {
    let engine = AdvisoryEngine::new(fixed_strategies().with_strategy(Arc::new(Mislabeled)));

    let err = engine
        .advise(&crop_request(), InferenceKind::Crop)
        .await
        .map(|_| ())
        .expect_err("crop flow answered with a fertilizer");
    assert!(matches!(err, AdvisoryError::Inference(_)));
    assert!(err.to_string().contains("fertilizer prediction"));
}

/// Registers for the crop flow but answers with a fertilizer.
struct Mislabeled;

#[async_trait]
impl Inference for Mislabeled {
    fn kind(&self) -> InferenceKind {
        InferenceKind::Crop
    }

    async fn infer(&self, _features: &FeatureVector) -> Result<InferenceResult, InferenceError> {
        Ok(InferenceResult::new(
            Prediction::Fertilizer {
                fertilizer: "Urea".to_string(),
                dosage_kg_per_hectare: 120,
            },
            Confidence::new(0.9)?,
        ))
    }
}
