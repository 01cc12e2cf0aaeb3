//! Crop, fertilizer and yield advisory engine.
//!
//! A raw form is validated against the catalog, normalized into a feature vector, scored by a
//! pluggable inference strategy and composed into a [`Recommendation`] with tips. Sessions
//! sequence these steps per user and report progress to a [`StatusReporter`].

pub mod catalog;
pub mod composer;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod features;
pub mod inference;
pub mod router;
pub mod service;
pub mod session;
pub mod status;
pub mod validation;

#[cfg(test)]
mod tests;

pub use catalog::{Catalog, CatalogView, Category, DisplayStyle, Nutrient};
pub use composer::{Metadata, Recommendation, RecommendationComposer};
pub use domain::{
    Field, FieldValue, InferenceKind, RangeWarning, RawRequest, RawValue, RequestId, SessionId,
    ValidatedField, ValidatedInput,
};
pub use engine::{AdvisoryEngine, PreparedRequest};
pub use errors::{
    AdvisoryError, BusyError, ErrorKind, FieldIssue, InferenceError, IssueReason,
    ValidationError,
};
pub use features::{CategoricalFeature, FeatureNormalizer, FeatureVector, NumericFeature};
pub use inference::{
    Band, BaseYield, Confidence, CropInference, FertilizerInference, FertilizerRules,
    FixedSampler, Inference, InferenceResult, Label, Prediction, Sampler, SeededSampler,
    StrategySet, YieldEstimate, YieldInference,
};
pub use router::advisory_router;
pub use service::{AdvisoryService, SessionView, StatsSnapshot};
pub use session::{
    AdvisorySession, ConcurrencyPolicy, RequestHandle, RequestState, SessionSnapshot,
};
pub use status::{Settlement, StatusBoard, StatusReporter, StatusUpdate, TracingStatusReporter};
pub use validation::{field_specs, AdvisoryRange, FieldRule, FieldSpec, InputValidator};
