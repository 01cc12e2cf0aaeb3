use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use super::{Band, Confidence, Inference, InferenceResult, Prediction, Sampler};
use crate::advisory::catalog::Catalog;
use crate::advisory::domain::{Field, InferenceKind};
use crate::advisory::errors::InferenceError;
use crate::advisory::features::FeatureVector;

/// Where the per-hectare base figure comes from before the crop multiplier is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BaseYield {
    /// Drawn from the band on every request, in tons per hectare.
    Sampled(Band),
    Fixed(f64),
}

impl Default for BaseYield {
    fn default() -> Self {
        BaseYield::Sampled(Band::new(2.0, 5.0))
    }
}

/// Projected harvest for a cultivated area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldEstimate {
    pub crop: String,
    pub base_yield: f64,
    pub multiplier: f64,
    pub yield_per_hectare: f64,
    pub area_hectares: f64,
    pub total_production: f64,
    /// Production reported for the previous season.
    pub previous_production: f64,
}

impl YieldEstimate {
    /// Relative change against the previous season, `None` without a baseline.
    pub fn production_change_pct(&self) -> Option<f64> {
        if self.previous_production > 0.0 {
            Some((self.total_production - self.previous_production) / self.previous_production * 100.0)
        } else {
            None
        }
    }
}

/// Base yield scaled by a crop multiplier, then by cultivated area.
pub struct YieldInference {
    catalog: &'static Catalog,
    sampler: Arc<dyn Sampler>,
    base_yield: BaseYield,
    confidence_band: Band,
}

impl YieldInference {
    pub fn new(sampler: Arc<dyn Sampler>) -> Self {
        Self {
            catalog: Catalog::standard(),
            sampler,
            base_yield: BaseYield::default(),
            confidence_band: Band::new(0.75, 1.0),
        }
    }

    pub fn with_base_yield(mut self, base_yield: BaseYield) -> Self {
        self.base_yield = base_yield;
        self
    }

    pub fn with_fixed_base_yield(self, tons_per_hectare: f64) -> Self {
        self.with_base_yield(BaseYield::Fixed(tons_per_hectare))
    }

    fn base_yield(&self) -> f64 {
        match self.base_yield {
            BaseYield::Sampled(band) => band.sample(self.sampler.as_ref()),
            BaseYield::Fixed(value) => value,
        }
    }
}

#[async_trait]
impl Inference for YieldInference {
    fn kind(&self) -> InferenceKind {
        InferenceKind::Yield
    }

    async fn infer(&self, features: &FeatureVector) -> Result<InferenceResult, InferenceError> {
        let crop = &features.require_category(Field::Crop)?.value;
        let area = features.require_numeric(Field::Area)?;
        let previous_production = features.require_numeric(Field::Production)?;

        let profile = self
            .catalog
            .yield_crop(crop)
            .ok_or_else(|| InferenceError::new(format!("no yield multiplier for crop '{crop}'")))?;

        let base_yield = self.base_yield();
        let yield_per_hectare = base_yield * profile.multiplier;
        let estimate = YieldEstimate {
            crop: profile.name.to_string(),
            base_yield,
            multiplier: profile.multiplier,
            yield_per_hectare,
            area_hectares: area,
            total_production: yield_per_hectare * area,
            previous_production,
        };

        let confidence = Confidence::new(self.confidence_band.sample(self.sampler.as_ref()))?;
        Ok(InferenceResult::new(Prediction::Yield(estimate), confidence))
    }
}
