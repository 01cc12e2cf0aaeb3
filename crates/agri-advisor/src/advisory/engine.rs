use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::catalog::Catalog;
use super::composer::{Recommendation, RecommendationComposer};
use super::domain::{InferenceKind, RangeWarning, RawRequest, ValidatedInput};
use super::errors::{AdvisoryError, InferenceError, ValidationError};
use super::features::{FeatureNormalizer, FeatureVector};
use super::inference::{InferenceResult, Sampler, SeededSampler, StrategySet};
use super::validation::InputValidator;
use crate::config::EngineConfig;

/// A request that passed validation, ready for a strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub input: ValidatedInput,
    pub features: FeatureVector,
}

impl PreparedRequest {
    pub fn kind(&self) -> InferenceKind {
        self.input.kind()
    }

    pub fn warnings(&self) -> &[RangeWarning] {
        self.input.warnings()
    }
}

/// Validator, normalizer, strategies and composer wired together. Holds no per-request
/// state, so one engine is shared by every session.
#[derive(Debug)]
pub struct AdvisoryEngine {
    catalog: &'static Catalog,
    validator: InputValidator,
    normalizer: FeatureNormalizer,
    strategies: StrategySet,
    composer: RecommendationComposer,
    latency: Duration,
}

impl AdvisoryEngine {
    pub fn new(strategies: StrategySet) -> Self {
        let catalog = Catalog::standard();
        Self {
            catalog,
            validator: InputValidator::new(catalog),
            normalizer: FeatureNormalizer::new(catalog),
            strategies,
            composer: RecommendationComposer::new(catalog),
            latency: Duration::ZERO,
        }
    }

    /// Reference strategies seeded from the configuration, or from entropy when no seed is set.
    pub fn from_config(config: &EngineConfig) -> Self {
        let sampler: Arc<dyn Sampler> = match config.model_seed {
            Some(seed) => Arc::new(SeededSampler::new(seed)),
            None => Arc::new(SeededSampler::from_entropy()),
        };
        Self::new(StrategySet::reference(sampler)).with_latency(config.inference_latency)
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    pub fn strategies(&self) -> &StrategySet {
        &self.strategies
    }

    pub fn prepare(
        &self,
        request: &RawRequest,
        kind: InferenceKind,
    ) -> Result<PreparedRequest, ValidationError> {
        let input = self.validator.validate(request, kind)?;
        let features = self.normalizer.normalize(&input);
        Ok(PreparedRequest { input, features })
    }

    pub async fn infer(&self, features: &FeatureVector) -> Result<InferenceResult, InferenceError> {
        if !self.latency.is_zero() {
            debug!(latency_ms = self.latency.as_millis() as u64, "simulating model latency");
            tokio::time::sleep(self.latency).await;
        }

        let kind = features.kind();
        let result = self.strategies.for_kind(kind).infer(features).await?;
        if result.kind() != kind {
            return Err(InferenceError::new(format!(
                "{kind} strategy returned a {} prediction",
                result.kind()
            )));
        }
        Ok(result)
    }

    pub fn compose(&self, result: InferenceResult, prepared: &PreparedRequest) -> Recommendation {
        self.composer
            .compose(result, prepared.kind(), prepared.warnings())
    }

    /// Validate, infer and compose in one call, outside any session.
    pub async fn advise(
        &self,
        request: &RawRequest,
        kind: InferenceKind,
    ) -> Result<Recommendation, AdvisoryError> {
        let prepared = self.prepare(request, kind)?;
        let result = self.infer(&prepared.features).await?;
        Ok(self.compose(result, &prepared))
    }
}
