use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::advisory::{
    AdvisoryEngine, AdvisorySession, ConcurrencyPolicy, FeatureVector, FixedSampler, Inference,
    InferenceError, InferenceKind, InferenceResult, RawRequest, SessionId, StatusReporter,
    StatusUpdate, StrategySet, YieldInference,
};

pub(super) fn crop_request() -> RawRequest {
    RawRequest::new()
        .with("nitrogen", 90.0)
        .with("phosphorus", 42.0)
        .with("potassium", 43.0)
        .with("temperature", "20.88")
        .with("humidity", "82")
        .with("ph", "6.5")
        .with("rainfall", "202.9")
}

pub(super) fn fertilizer_request() -> RawRequest {
    RawRequest::new()
        .with("soil_type", "Loamy")
        .with("crop_type", "Wheat")
        .with("temperature", "26")
        .with("humidity", "52")
        .with("moisture", "38")
        .with("nitrogen", "30")
        .with("phosphorus", "90")
        .with("potassium", "90")
}

pub(super) fn yield_request() -> RawRequest {
    RawRequest::new()
        .with("state", "Punjab")
        .with("district", "Ludhiana")
        .with("season", "Rabi")
        .with("crop", "Sugarcane")
        .with("area", "2.0")
        .with("production", "80")
}

/// Reference strategies with every random draw pinned to the middle of its band and a
/// base yield of 3 t/ha.
pub(super) fn fixed_strategies() -> StrategySet {
    let sampler = Arc::new(FixedSampler::new(0.5));
    StrategySet::reference(sampler.clone())
        .with_strategy(Arc::new(YieldInference::new(sampler).with_fixed_base_yield(3.0)))
}

pub(super) fn fixed_engine() -> Arc<AdvisoryEngine> {
    Arc::new(AdvisoryEngine::new(fixed_strategies()))
}

pub(super) fn session_with(
    engine: Arc<AdvisoryEngine>,
    policy: ConcurrencyPolicy,
) -> (AdvisorySession, Arc<RecordingReporter>) {
    let reporter = Arc::new(RecordingReporter::default());
    let session = AdvisorySession::new(
        SessionId("session-test".to_string()),
        engine,
        reporter.clone(),
        policy,
    );
    (session, reporter)
}

#[derive(Default)]
pub(super) struct RecordingReporter {
    updates: Mutex<Vec<StatusUpdate>>,
}

impl RecordingReporter {
    pub(super) fn updates(&self) -> Vec<StatusUpdate> {
        self.updates.lock().expect("reporter mutex poisoned").clone()
    }

    pub(super) fn messages(&self) -> Vec<(String, bool)> {
        self.updates()
            .into_iter()
            .map(|update| (update.message, update.busy))
            .collect()
    }
}

impl StatusReporter for RecordingReporter {
    fn report(&self, update: StatusUpdate) {
        self.updates
            .lock()
            .expect("reporter mutex poisoned")
            .push(update);
    }
}

/// Holds every inference until a permit is released on the gate.
pub(super) struct GatedInference {
    inner: Arc<dyn Inference>,
    gate: Arc<Semaphore>,
}

impl GatedInference {
    pub(super) fn wrap(inner: Arc<dyn Inference>) -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let gated = Arc::new(Self {
            inner,
            gate: gate.clone(),
        });
        (gated, gate)
    }
}

#[async_trait]
impl Inference for GatedInference {
    fn kind(&self) -> InferenceKind {
        self.inner.kind()
    }

    async fn infer(&self, features: &FeatureVector) -> Result<InferenceResult, InferenceError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| InferenceError::new("gate closed"))?;
        self.inner.infer(features).await
    }
}

/// Engine whose crop strategy waits on the returned gate.
pub(super) fn gated_crop_engine() -> (Arc<AdvisoryEngine>, Arc<Semaphore>) {
    let strategies = fixed_strategies();
    let (gated, gate) = GatedInference::wrap(strategies.for_kind(InferenceKind::Crop).clone());
    let engine = AdvisoryEngine::new(strategies.with_strategy(gated));
    (Arc::new(engine), gate)
}

pub(super) struct FailingInference(pub(super) InferenceKind);

#[async_trait]
impl Inference for FailingInference {
    fn kind(&self) -> InferenceKind {
        self.0
    }

    async fn infer(&self, _features: &FeatureVector) -> Result<InferenceResult, InferenceError> {
        Err(InferenceError::new("model offline"))
    }
}

/// Strategy that panics mid-inference.
pub(super) struct PanickingInference(pub(super) InferenceKind);

#[async_trait]
impl Inference for PanickingInference {
    fn kind(&self) -> InferenceKind {
        self.0
    }

    async fn infer(&self, _features: &FeatureVector) -> Result<InferenceResult, InferenceError> {
        panic!("model weights corrupted");
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
