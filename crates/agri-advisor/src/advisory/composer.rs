use chrono::{DateTime, Utc};
use serde::Serialize;

use super::catalog::{Catalog, DisplayStyle};
use super::domain::{InferenceKind, RangeWarning};
use super::inference::{InferenceResult, Prediction};

/// Per-flow figures shown beside the headline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Metadata {
    Crop {
        suitability_score: u32,
    },
    Fertilizer {
        composition: Option<String>,
        benefits: Option<String>,
        application: Option<String>,
        dosage_kg_per_hectare: u32,
    },
    Yield {
        yield_per_hectare: f64,
        total_production: f64,
        previous_production: f64,
        production_change_pct: Option<f64>,
    },
}

/// Final, user-facing answer of a flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub kind: InferenceKind,
    pub headline: String,
    pub result: InferenceResult,
    pub tips: Vec<String>,
    pub guidance: Vec<String>,
    pub style: DisplayStyle,
    pub metadata: Metadata,
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl Recommendation {
    pub fn label(&self) -> String {
        self.result.label.to_string()
    }

    pub fn confidence_percent(&self) -> f64 {
        self.result.confidence.percent()
    }
}

/// Attaches catalog tips and display metadata to an inference result.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationComposer {
    catalog: &'static Catalog,
}

impl Default for RecommendationComposer {
    fn default() -> Self {
        Self::new(Catalog::standard())
    }
}

impl RecommendationComposer {
    pub fn new(catalog: &'static Catalog) -> Self {
        Self { catalog }
    }

    pub fn compose(
        &self,
        result: InferenceResult,
        kind: InferenceKind,
        warnings: &[RangeWarning],
    ) -> Recommendation {
        let key = result.catalog_key().to_string();
        let tips = self.catalog.tips_for(kind, &key);
        let style = self.catalog.style_for(kind, &key);
        let metadata = self.metadata(&result);

        Recommendation {
            kind,
            headline: headline(kind, &result),
            tips,
            guidance: self
                .catalog
                .guidance(kind)
                .iter()
                .map(|line| line.to_string())
                .collect(),
            style,
            metadata,
            warnings: warnings.iter().map(RangeWarning::message).collect(),
            generated_at: Utc::now(),
            result,
        }
    }

    fn metadata(&self, result: &InferenceResult) -> Metadata {
        match &result.prediction {
            Prediction::Crop { .. } => Metadata::Crop {
                suitability_score: result.confidence.percent().floor() as u32,
            },
            Prediction::Fertilizer {
                fertilizer,
                dosage_kg_per_hectare,
            } => {
                let profile = self.catalog.fertilizer(fertilizer);
                Metadata::Fertilizer {
                    composition: profile.map(|p| p.composition.to_string()),
                    benefits: profile.map(|p| p.benefits.to_string()),
                    application: profile.map(|p| p.application.to_string()),
                    dosage_kg_per_hectare: *dosage_kg_per_hectare,
                }
            }
            Prediction::Yield(estimate) => Metadata::Yield {
                yield_per_hectare: estimate.yield_per_hectare,
                total_production: estimate.total_production,
                previous_production: estimate.previous_production,
                production_change_pct: estimate.production_change_pct(),
            },
        }
    }
}

fn headline(kind: InferenceKind, result: &InferenceResult) -> String {
    match &result.prediction {
        Prediction::Yield(estimate) => format!(
            "{} completed: {:.2} tons/hectare",
            kind.label(),
            estimate.yield_per_hectare
        ),
        _ => format!("{} completed: {}", kind.label(), display_name(&result.label.to_string())),
    }
}

/// Capitalizes catalog keys such as `rice` for display.
fn display_name(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::inference::Confidence;

    fn crop_result(crop: &str, confidence: f64) -> InferenceResult {
        InferenceResult::new(
            Prediction::Crop {
                crop: crop.to_string(),
            },
            Confidence::new(confidence).expect("valid confidence"),
        )
    }

    #[test]
    fn crop_recommendation_carries_tips_and_score() {
        let recommendation = RecommendationComposer::default().compose(
            crop_result("rice", 0.876),
            InferenceKind::Crop,
            &[],
        );

        assert_eq!(recommendation.headline, "Crop recommendation completed: Rice");
        assert_eq!(recommendation.tips.len(), 4);
        assert_eq!(
            recommendation.metadata,
            Metadata::Crop {
                suitability_score: 87
            }
        );
        assert_eq!(recommendation.guidance.len(), 4);
    }

    #[test]
    fn unknown_label_degrades_to_neutral_presentation() {
        let recommendation = RecommendationComposer::default().compose(
            crop_result("quinoa", 0.9),
            InferenceKind::Crop,
            &[],
        );

        assert!(recommendation.tips.is_empty());
        assert_eq!(recommendation.style, DisplayStyle::NEUTRAL);
        assert_eq!(recommendation.headline, "Crop recommendation completed: Quinoa");
    }
}
