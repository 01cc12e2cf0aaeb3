use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The three advisory flows served by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceKind {
    Crop,
    Fertilizer,
    Yield,
}

impl InferenceKind {
    pub const fn ordered() -> [Self; 3] {
        [Self::Crop, Self::Fertilizer, Self::Yield]
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Crop => "crop",
            Self::Fertilizer => "fertilizer",
            Self::Yield => "yield",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Crop => "Crop recommendation",
            Self::Fertilizer => "Fertilizer recommendation",
            Self::Yield => "Yield prediction",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "crop" => Some(Self::Crop),
            "fertilizer" | "fertiliser" => Some(Self::Fertilizer),
            "yield" => Some(Self::Yield),
            _ => None,
        }
    }

    /// Status line shown while the request is being validated.
    pub const fn validating_message(self) -> &'static str {
        match self {
            Self::Crop => "Checking soil and weather parameters...",
            Self::Fertilizer => "Checking soil and crop details...",
            Self::Yield => "Checking location and cultivation details...",
        }
    }

    /// Status line shown while the model is running.
    pub const fn progress_message(self) -> &'static str {
        match self {
            Self::Crop => "Analyzing soil and weather parameters...",
            Self::Fertilizer => "Analyzing soil conditions and crop requirements...",
            Self::Yield => "Analyzing agricultural data and predicting yield...",
        }
    }
}

impl fmt::Display for InferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Every input field understood by at least one flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Nitrogen,
    Phosphorus,
    Potassium,
    Temperature,
    Humidity,
    Ph,
    Rainfall,
    Moisture,
    SoilType,
    CropType,
    State,
    District,
    Season,
    Crop,
    Area,
    Production,
}

impl Field {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nitrogen => "nitrogen",
            Self::Phosphorus => "phosphorus",
            Self::Potassium => "potassium",
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Ph => "ph",
            Self::Rainfall => "rainfall",
            Self::Moisture => "moisture",
            Self::SoilType => "soil_type",
            Self::CropType => "crop_type",
            Self::State => "state",
            Self::District => "district",
            Self::Season => "season",
            Self::Crop => "crop",
            Self::Area => "area",
            Self::Production => "production",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Nitrogen => "Nitrogen (N)",
            Self::Phosphorus => "Phosphorus (P)",
            Self::Potassium => "Potassium (K)",
            Self::Temperature => "Temperature",
            Self::Humidity => "Humidity",
            Self::Ph => "pH Level",
            Self::Rainfall => "Rainfall",
            Self::Moisture => "Soil Moisture",
            Self::SoilType => "Soil Type",
            Self::CropType => "Crop Type",
            Self::State => "State",
            Self::District => "District",
            Self::Season => "Season",
            Self::Crop => "Crop",
            Self::Area => "Area",
            Self::Production => "Previous Production",
        }
    }

    /// Canonical unit for numeric fields; categorical fields have none.
    pub const fn unit(self) -> Option<&'static str> {
        match self {
            Self::Nitrogen | Self::Phosphorus | Self::Potassium => Some("ppm"),
            Self::Temperature => Some("°C"),
            Self::Humidity | Self::Moisture => Some("%"),
            Self::Ph => Some("pH"),
            Self::Rainfall => Some("mm"),
            Self::Area => Some("hectares"),
            Self::Production => Some("tons"),
            Self::SoilType
            | Self::CropType
            | Self::State
            | Self::District
            | Self::Season
            | Self::Crop => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value exactly as the user entered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Number(_) => false,
            RawValue::Text(text) => text.trim().is_empty(),
        }
    }

    pub fn to_number(&self) -> Option<f64> {
        let number = match self {
            RawValue::Number(value) => *value,
            RawValue::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        number.is_finite().then_some(number)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(text) => Some(text.as_str()),
            RawValue::Number(_) => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(value) => write!(f, "{value}"),
            RawValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

/// Form contents keyed by field name, before any typing or range checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRequest {
    fields: BTreeMap<String, RawValue>,
}

impl RawRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Record a field edit. Choosing a different state drops the district picked for the
    /// previous one.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<RawValue>) {
        let field = field.into();
        let value = value.into();

        if field == Field::State.as_str() && self.fields.get(&field) != Some(&value) {
            self.fields.remove(Field::District.as_str());
        }

        self.fields.insert(field, value);
    }

    pub fn remove(&mut self, field: &str) -> Option<RawValue> {
        self.fields.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&RawValue> {
        self.fields.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawRequest
where
    K: Into<String>,
    V: Into<RawValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let fields = iter
            .into_iter()
            .map(|(field, value)| (field.into(), value.into()))
            .collect();
        RawRequest { fields }
    }
}

/// A field value that passed its rule, in its canonical unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Choice(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedField {
    pub field: Field,
    pub value: FieldValue,
}

/// Reading accepted by validation but outside the documented advisory range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeWarning {
    pub field: Field,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl RangeWarning {
    pub fn message(&self) -> String {
        let unit = self.field.unit().unwrap_or_default();
        format!(
            "{} of {}{} is outside the typical range {}-{}{}",
            self.field.label(),
            self.value,
            unit_suffix(unit),
            self.min,
            self.max,
            unit_suffix(unit)
        )
    }
}

fn unit_suffix(unit: &str) -> String {
    if unit.is_empty() {
        String::new()
    } else {
        format!(" {unit}")
    }
}

/// Request contents after every field passed validation. Only the validator builds these.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedInput {
    kind: InferenceKind,
    fields: Vec<ValidatedField>,
    warnings: Vec<RangeWarning>,
}

impl ValidatedInput {
    pub(crate) fn new(
        kind: InferenceKind,
        fields: Vec<ValidatedField>,
        warnings: Vec<RangeWarning>,
    ) -> Self {
        Self {
            kind,
            fields,
            warnings,
        }
    }

    pub fn kind(&self) -> InferenceKind {
        self.kind
    }

    pub fn fields(&self) -> &[ValidatedField] {
        &self.fields
    }

    pub fn warnings(&self) -> &[RangeWarning] {
        &self.warnings
    }

    pub fn number(&self, field: Field) -> Option<f64> {
        self.fields.iter().find_map(|entry| match &entry.value {
            FieldValue::Number(value) if entry.field == field => Some(*value),
            _ => None,
        })
    }

    pub fn choice(&self, field: Field) -> Option<&str> {
        self.fields.iter().find_map(|entry| match &entry.value {
            FieldValue::Choice(value) if entry.field == field => Some(value.as_str()),
            _ => None,
        })
    }
}

/// Identifier wrapper for advisory sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A submit within a session; the sequence grows with every accepted submit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId {
    pub session: SessionId,
    pub sequence: u64,
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.session, self.sequence)
    }
}
