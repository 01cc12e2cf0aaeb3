use super::catalog::{Catalog, Category};
use super::domain::{
    Field, FieldValue, InferenceKind, RangeWarning, RawRequest, RawValue, ValidatedField,
    ValidatedInput,
};
use super::errors::{FieldIssue, IssueReason, ValidationError};

/// Textbook range for a reading. Values outside it are accepted with a warning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvisoryRange {
    pub min: f64,
    pub max: f64,
}

impl AdvisoryRange {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRule {
    Numeric {
        advisory: Option<AdvisoryRange>,
        /// Hard lower bound; readings below it are rejected.
        floor: Option<f64>,
    },
    Choice(Category),
    /// District of the state entered in the referenced field.
    DistrictOf(Field),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub field: Field,
    pub rule: FieldRule,
}

const fn reading(field: Field, min: f64, max: f64) -> FieldSpec {
    FieldSpec {
        field,
        rule: FieldRule::Numeric {
            advisory: Some(AdvisoryRange::new(min, max)),
            floor: None,
        },
    }
}

const fn quantity(field: Field) -> FieldSpec {
    FieldSpec {
        field,
        rule: FieldRule::Numeric {
            advisory: None,
            floor: Some(0.0),
        },
    }
}

const fn choice(field: Field, category: Category) -> FieldSpec {
    FieldSpec {
        field,
        rule: FieldRule::Choice(category),
    }
}

const CROP_FIELDS: &[FieldSpec] = &[
    reading(Field::Nitrogen, 0.0, 140.0),
    reading(Field::Phosphorus, 5.0, 145.0),
    reading(Field::Potassium, 5.0, 205.0),
    reading(Field::Temperature, 8.0, 44.0),
    reading(Field::Humidity, 14.0, 100.0),
    reading(Field::Ph, 3.5, 9.9),
    reading(Field::Rainfall, 20.0, 300.0),
];

const FERTILIZER_FIELDS: &[FieldSpec] = &[
    choice(Field::SoilType, Category::SoilType),
    choice(Field::CropType, Category::FertilizerCrop),
    reading(Field::Temperature, 15.0, 40.0),
    reading(Field::Humidity, 20.0, 90.0),
    reading(Field::Moisture, 10.0, 80.0),
    reading(Field::Nitrogen, 0.0, 100.0),
    reading(Field::Phosphorus, 0.0, 100.0),
    reading(Field::Potassium, 0.0, 100.0),
];

const YIELD_FIELDS: &[FieldSpec] = &[
    choice(Field::State, Category::State),
    FieldSpec {
        field: Field::District,
        rule: FieldRule::DistrictOf(Field::State),
    },
    choice(Field::Season, Category::Season),
    choice(Field::Crop, Category::YieldCrop),
    quantity(Field::Area),
    quantity(Field::Production),
];

/// Required fields of a flow with their rules, in declaration order.
pub fn field_specs(kind: InferenceKind) -> &'static [FieldSpec] {
    match kind {
        InferenceKind::Crop => CROP_FIELDS,
        InferenceKind::Fertilizer => FERTILIZER_FIELDS,
        InferenceKind::Yield => YIELD_FIELDS,
    }
}

/// Pure checker turning a raw form into a [`ValidatedInput`].
#[derive(Debug, Clone, Copy)]
pub struct InputValidator {
    catalog: &'static Catalog,
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new(Catalog::standard())
    }
}

impl InputValidator {
    pub fn new(catalog: &'static Catalog) -> Self {
        Self { catalog }
    }

    /// Check every field of `kind`, collecting all problems before failing. Fields that do
    /// not belong to the flow are ignored.
    pub fn validate(
        &self,
        request: &RawRequest,
        kind: InferenceKind,
    ) -> Result<ValidatedInput, ValidationError> {
        let mut missing_fields = Vec::new();
        let mut out_of_range_fields = Vec::new();
        let mut accepted = Vec::new();
        let mut warnings = Vec::new();

        for spec in field_specs(kind) {
            let raw = match request.get(spec.field.as_str()) {
                Some(value) if !value.is_blank() => value,
                _ => {
                    missing_fields.push(spec.field);
                    continue;
                }
            };

            match self.check(spec, raw, &accepted) {
                Ok((value, warning)) => {
                    accepted.push(ValidatedField {
                        field: spec.field,
                        value,
                    });
                    warnings.extend(warning);
                }
                Err(reason) => out_of_range_fields.push(FieldIssue {
                    field: spec.field,
                    value: raw.to_string(),
                    reason,
                }),
            }
        }

        if !missing_fields.is_empty() || !out_of_range_fields.is_empty() {
            return Err(ValidationError {
                kind,
                missing_fields,
                out_of_range_fields,
            });
        }

        Ok(ValidatedInput::new(kind, accepted, warnings))
    }

    fn check(
        &self,
        spec: &FieldSpec,
        raw: &RawValue,
        accepted: &[ValidatedField],
    ) -> Result<(FieldValue, Option<RangeWarning>), IssueReason> {
        match spec.rule {
            FieldRule::Numeric { advisory, floor } => {
                let value = raw.to_number().ok_or(IssueReason::NotNumeric)?;

                if let Some(min) = floor {
                    if value < min {
                        return Err(IssueReason::BelowMinimum { min });
                    }
                }

                let warning = advisory
                    .filter(|range| !range.contains(value))
                    .map(|range| RangeWarning {
                        field: spec.field,
                        value,
                        min: range.min,
                        max: range.max,
                    });

                Ok((FieldValue::Number(value), warning))
            }
            FieldRule::Choice(category) => {
                let value = raw.to_string();
                if self.catalog.contains(category, &value) {
                    Ok((FieldValue::Choice(value), None))
                } else {
                    Err(IssueReason::UnknownOption {
                        allowed: self
                            .catalog
                            .options(category)
                            .into_iter()
                            .map(str::to_string)
                            .collect(),
                    })
                }
            }
            FieldRule::DistrictOf(state_field) => {
                let state = accepted.iter().find_map(|entry| match &entry.value {
                    FieldValue::Choice(state) if entry.field == state_field => Some(state),
                    _ => None,
                });
                let Some(state) = state else {
                    return Err(IssueReason::UnresolvedState);
                };

                let value = raw.to_string();
                let districts = self.catalog.districts(state).unwrap_or_default();
                if districts.contains(&value.as_str()) {
                    Ok((FieldValue::Choice(value), None))
                } else {
                    Err(IssueReason::NotInState {
                        state: state.clone(),
                    })
                }
            }
        }
    }
}
