use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Band, Confidence, Inference, InferenceResult, Prediction, Sampler};
use crate::advisory::catalog::{Catalog, Nutrient};
use crate::advisory::domain::{Field, InferenceKind};
use crate::advisory::errors::InferenceError;
use crate::advisory::features::FeatureVector;

/// Deficiency thresholds checked in fixed order: nitrogen, phosphorus, potassium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FertilizerRules {
    pub nitrogen_threshold: f64,
    pub phosphorus_threshold: f64,
    pub potassium_threshold: f64,
}

impl Default for FertilizerRules {
    fn default() -> Self {
        Self {
            nitrogen_threshold: 40.0,
            phosphorus_threshold: 40.0,
            potassium_threshold: 40.0,
        }
    }
}

impl FertilizerRules {
    /// First deficient nutrient, or `None` when every reading clears its threshold.
    pub fn deficiency(&self, nitrogen: f64, phosphorus: f64, potassium: f64) -> Option<Nutrient> {
        if nitrogen < self.nitrogen_threshold {
            return Some(Nutrient::Nitrogen);
        }

        if phosphorus < self.phosphorus_threshold {
            return Some(Nutrient::Phosphorus);
        }

        if potassium < self.potassium_threshold {
            return Some(Nutrient::Potassium);
        }

        None
    }
}

/// Rule-first classifier recommending a fertilizer for the most pressing deficiency.
pub struct FertilizerInference {
    catalog: &'static Catalog,
    rules: FertilizerRules,
    sampler: Arc<dyn Sampler>,
    confidence_band: Band,
    dosage_band: Band,
}

impl FertilizerInference {
    pub fn new(sampler: Arc<dyn Sampler>) -> Self {
        Self {
            catalog: Catalog::standard(),
            rules: FertilizerRules::default(),
            sampler,
            confidence_band: Band::new(0.80, 1.0),
            dosage_band: Band::new(100.0, 150.0),
        }
    }

    pub fn with_rules(mut self, rules: FertilizerRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &FertilizerRules {
        &self.rules
    }

    fn dosage(&self) -> u32 {
        // Whole kilograms; the top of the band is only reached on a draw of exactly 1.0.
        let dosage = self.dosage_band.sample(self.sampler.as_ref()).floor();
        dosage.clamp(self.dosage_band.low, self.dosage_band.high) as u32
    }
}

#[async_trait]
impl Inference for FertilizerInference {
    fn kind(&self) -> InferenceKind {
        InferenceKind::Fertilizer
    }

    async fn infer(&self, features: &FeatureVector) -> Result<InferenceResult, InferenceError> {
        let nitrogen = features.require_numeric(Field::Nitrogen)?;
        let phosphorus = features.require_numeric(Field::Phosphorus)?;
        let potassium = features.require_numeric(Field::Potassium)?;

        let deficiency = self.rules.deficiency(nitrogen, phosphorus, potassium);
        let profile = self.catalog.fertilizer_for(deficiency).ok_or_else(|| {
            InferenceError::new(format!("no fertilizer remedies {deficiency:?}"))
        })?;

        let confidence = Confidence::new(self.confidence_band.sample(self.sampler.as_ref()))?;

        Ok(InferenceResult::new(
            Prediction::Fertilizer {
                fertilizer: profile.name.to_string(),
                dosage_kg_per_hectare: self.dosage(),
            },
            confidence,
        ))
    }
}
