use serde::Serialize;

use super::catalog::{Catalog, Category};
use super::domain::{Field, FieldValue, InferenceKind, ValidatedInput};
use super::errors::InferenceError;
use super::validation::{field_specs, FieldRule};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericFeature {
    pub field: Field,
    pub value: f64,
}

/// Categorical value encoded by its catalog declaration index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalFeature {
    pub field: Field,
    pub value: String,
    pub index: usize,
    pub cardinality: usize,
}

/// Model-ready encoding of a validated request. Feature positions depend only on the
/// catalog, never on the order fields were entered in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    kind: InferenceKind,
    numeric: Vec<NumericFeature>,
    categorical: Vec<CategoricalFeature>,
}

impl FeatureVector {
    pub fn new(
        kind: InferenceKind,
        numeric: Vec<NumericFeature>,
        categorical: Vec<CategoricalFeature>,
    ) -> Self {
        Self {
            kind,
            numeric,
            categorical,
        }
    }

    pub fn kind(&self) -> InferenceKind {
        self.kind
    }

    pub fn numeric_features(&self) -> &[NumericFeature] {
        &self.numeric
    }

    pub fn categorical_features(&self) -> &[CategoricalFeature] {
        &self.categorical
    }

    pub fn numeric(&self, field: Field) -> Option<f64> {
        self.numeric
            .iter()
            .find(|feature| feature.field == field)
            .map(|feature| feature.value)
    }

    pub fn category(&self, field: Field) -> Option<&CategoricalFeature> {
        self.categorical
            .iter()
            .find(|feature| feature.field == field)
    }

    pub fn require_numeric(&self, field: Field) -> Result<f64, InferenceError> {
        self.numeric(field)
            .ok_or_else(|| InferenceError::missing_feature(field))
    }

    pub fn require_category(&self, field: Field) -> Result<&CategoricalFeature, InferenceError> {
        self.category(field)
            .ok_or_else(|| InferenceError::missing_feature(field))
    }

    /// Numeric values followed by one one-hot block per categorical feature.
    pub fn dense(&self) -> Vec<f64> {
        let mut dense: Vec<f64> = self.numeric.iter().map(|feature| feature.value).collect();
        for feature in &self.categorical {
            let start = dense.len();
            dense.resize(start + feature.cardinality, 0.0);
            if feature.index < feature.cardinality {
                dense[start + feature.index] = 1.0;
            }
        }
        dense
    }
}

/// Converts validated input into a [`FeatureVector`] using catalog ordering.
#[derive(Debug, Clone, Copy)]
pub struct FeatureNormalizer {
    catalog: &'static Catalog,
}

impl Default for FeatureNormalizer {
    fn default() -> Self {
        Self::new(Catalog::standard())
    }
}

impl FeatureNormalizer {
    pub fn new(catalog: &'static Catalog) -> Self {
        Self { catalog }
    }

    pub fn normalize(&self, input: &ValidatedInput) -> FeatureVector {
        let mut numeric = Vec::new();
        let mut categorical = Vec::new();

        for spec in field_specs(input.kind()) {
            let Some(entry) = input
                .fields()
                .iter()
                .find(|entry| entry.field == spec.field)
            else {
                continue;
            };

            match (&entry.value, spec.rule) {
                (FieldValue::Number(value), _) => numeric.push(NumericFeature {
                    field: spec.field,
                    value: *value,
                }),
                (FieldValue::Choice(value), FieldRule::Choice(category)) => {
                    categorical.push(self.encode(spec.field, category, value));
                }
                (FieldValue::Choice(value), FieldRule::DistrictOf(_)) => {
                    categorical.push(self.encode(spec.field, Category::District, value));
                }
                (FieldValue::Choice(_), FieldRule::Numeric { .. }) => {}
            }
        }

        FeatureVector::new(input.kind(), numeric, categorical)
    }

    fn encode(&self, field: Field, category: Category, value: &str) -> CategoricalFeature {
        let options = self.catalog.options(category);
        CategoricalFeature {
            field,
            value: value.to_string(),
            index: options
                .iter()
                .position(|option| *option == value)
                .unwrap_or(options.len()),
            cardinality: options.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::domain::RawRequest;
    use crate::advisory::validation::InputValidator;

    fn yield_input(state: &str, district: &str) -> ValidatedInput {
        let request = RawRequest::new()
            .with("production", "40")
            .with("area", "2.5")
            .with("crop", "Wheat")
            .with("season", "Rabi")
            .with("state", state)
            .with("district", district);
        InputValidator::default()
            .validate(&request, InferenceKind::Yield)
            .expect("valid yield input")
    }

    #[test]
    fn categorical_positions_follow_catalog_order() {
        let features = FeatureNormalizer::default().normalize(&yield_input("Haryana", "Hisar"));

        let state = features.category(Field::State).expect("state encoded");
        assert_eq!((state.index, state.cardinality), (1, 5));
        let district = features.category(Field::District).expect("district encoded");
        assert_eq!((district.index, district.cardinality), (6, 20));
        let crop = features.category(Field::Crop).expect("crop encoded");
        assert_eq!(crop.index, 1);
        assert_eq!(features.numeric(Field::Area), Some(2.5));
    }

    #[test]
    fn dense_encoding_has_stable_width() {
        let normalizer = FeatureNormalizer::default();
        let first = normalizer.normalize(&yield_input("Punjab", "Amritsar")).dense();
        let second = normalizer.normalize(&yield_input("Bihar", "Gaya")).dense();

        assert_eq!(first.len(), 2 + 5 + 20 + 3 + 4);
        assert_eq!(first.len(), second.len());
        assert_eq!(first.iter().filter(|value| **value == 1.0).count(), 4);
        assert_eq!(first[..2], [2.5, 40.0]);
    }

    #[test]
    fn missing_feature_surfaces_as_inference_error() {
        let features = FeatureVector::new(InferenceKind::Crop, Vec::new(), Vec::new());
        let err = features
            .require_numeric(Field::Nitrogen)
            .expect_err("nitrogen absent");
        assert!(err.reason.contains("nitrogen"));
    }
}
