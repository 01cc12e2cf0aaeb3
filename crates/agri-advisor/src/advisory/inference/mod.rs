//! Interchangeable prediction strategies.
//!
//! Every strategy maps a [`FeatureVector`] to an [`InferenceResult`]. The session picks one
//! by request kind and never looks inside, so a trained model or a remote scoring service
//! can replace a reference strategy without touching callers.

mod crop;
mod fertilizer;
mod sampler;
mod yield_estimate;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, Serializer};

use super::domain::InferenceKind;
use super::errors::InferenceError;
use super::features::FeatureVector;

pub use crop::CropInference;
pub use fertilizer::{FertilizerInference, FertilizerRules};
pub use sampler::{Band, FixedSampler, Sampler, SeededSampler};
pub use yield_estimate::{BaseYield, YieldEstimate, YieldInference};

#[async_trait]
pub trait Inference: Send + Sync {
    fn kind(&self) -> InferenceKind;

    async fn infer(&self, features: &FeatureVector) -> Result<InferenceResult, InferenceError>;
}

/// Certainty of a prediction, always within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Confidence(f64);

impl Confidence {
    pub fn new(value: f64) -> Result<Self, InferenceError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InferenceError::new(format!(
                "confidence {value} is outside [0, 1]"
            )))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn percent(self) -> f64 {
        self.0 * 100.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.percent())
    }
}

impl Serialize for Confidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

/// Typed payload of a prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Prediction {
    Crop {
        crop: String,
    },
    Fertilizer {
        fertilizer: String,
        dosage_kg_per_hectare: u32,
    },
    Yield(YieldEstimate),
}

impl Prediction {
    pub fn kind(&self) -> InferenceKind {
        match self {
            Prediction::Crop { .. } => InferenceKind::Crop,
            Prediction::Fertilizer { .. } => InferenceKind::Fertilizer,
            Prediction::Yield(_) => InferenceKind::Yield,
        }
    }
}

/// Headline value of a prediction: a category name or a quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Label {
    Category(String),
    Quantity(f64),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Category(name) => f.write_str(name),
            Label::Quantity(value) => write!(f, "{value:.2}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceResult {
    pub label: Label,
    pub confidence: Confidence,
    pub prediction: Prediction,
}

impl InferenceResult {
    pub fn new(prediction: Prediction, confidence: Confidence) -> Self {
        let label = match &prediction {
            Prediction::Crop { crop } => Label::Category(crop.clone()),
            Prediction::Fertilizer { fertilizer, .. } => Label::Category(fertilizer.clone()),
            Prediction::Yield(estimate) => Label::Quantity(estimate.yield_per_hectare),
        };

        Self {
            label,
            confidence,
            prediction,
        }
    }

    pub fn kind(&self) -> InferenceKind {
        self.prediction.kind()
    }

    /// Catalog key used to enrich the result with tips and display metadata.
    pub fn catalog_key(&self) -> &str {
        match &self.prediction {
            Prediction::Crop { crop } => crop,
            Prediction::Fertilizer { fertilizer, .. } => fertilizer,
            Prediction::Yield(estimate) => &estimate.crop,
        }
    }
}

/// One strategy per flow.
#[derive(Clone)]
pub struct StrategySet {
    crop: Arc<dyn Inference>,
    fertilizer: Arc<dyn Inference>,
    yield_model: Arc<dyn Inference>,
}

impl StrategySet {
    pub fn new(
        crop: Arc<dyn Inference>,
        fertilizer: Arc<dyn Inference>,
        yield_model: Arc<dyn Inference>,
    ) -> Self {
        Self {
            crop,
            fertilizer,
            yield_model,
        }
    }

    /// Reference strategies drawing randomness from `sampler`.
    pub fn reference(sampler: Arc<dyn Sampler>) -> Self {
        Self::new(
            Arc::new(CropInference::default()),
            Arc::new(FertilizerInference::new(sampler.clone())),
            Arc::new(YieldInference::new(sampler)),
        )
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn Inference>) -> Self {
        match strategy.kind() {
            InferenceKind::Crop => self.crop = strategy,
            InferenceKind::Fertilizer => self.fertilizer = strategy,
            InferenceKind::Yield => self.yield_model = strategy,
        }
        self
    }

    pub fn for_kind(&self, kind: InferenceKind) -> &Arc<dyn Inference> {
        match kind {
            InferenceKind::Crop => &self.crop,
            InferenceKind::Fertilizer => &self.fertilizer,
            InferenceKind::Yield => &self.yield_model,
        }
    }
}

impl fmt::Debug for StrategySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategySet").finish_non_exhaustive()
    }
}
