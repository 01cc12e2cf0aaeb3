use async_trait::async_trait;

use super::{Band, Confidence, Inference, InferenceResult, Prediction};
use crate::advisory::catalog::{Catalog, CropProfile, Envelope};
use crate::advisory::domain::{Field, InferenceKind};
use crate::advisory::errors::InferenceError;
use crate::advisory::features::FeatureVector;

const READINGS: [Field; 7] = [
    Field::Nitrogen,
    Field::Phosphorus,
    Field::Potassium,
    Field::Temperature,
    Field::Humidity,
    Field::Ph,
    Field::Rainfall,
];

/// Fit at the edge of an envelope; the typical value scores 1.0.
const EDGE_FIT: f64 = 0.8;

/// Envelope matcher: scores every catalog crop by how well the readings sit inside its
/// observed growing ranges and recommends the best fit.
#[derive(Debug, Clone)]
pub struct CropInference {
    catalog: &'static Catalog,
    confidence_band: Band,
}

impl Default for CropInference {
    fn default() -> Self {
        Self::new(Catalog::standard())
    }
}

impl CropInference {
    pub fn new(catalog: &'static Catalog) -> Self {
        Self {
            catalog,
            confidence_band: Band::new(0.70, 1.0),
        }
    }

    /// Mean fit of `readings` against one crop, in `[0, 1]`.
    pub fn suitability(profile: &CropProfile, readings: &[(Field, f64)]) -> f64 {
        let fits: Vec<f64> = readings
            .iter()
            .filter_map(|(field, value)| {
                profile
                    .envelope(*field)
                    .map(|envelope| envelope_fit(*value, envelope))
            })
            .collect();

        if fits.is_empty() {
            return 0.0;
        }
        fits.iter().sum::<f64>() / fits.len() as f64
    }
}

#[async_trait]
impl Inference for CropInference {
    fn kind(&self) -> InferenceKind {
        InferenceKind::Crop
    }

    async fn infer(&self, features: &FeatureVector) -> Result<InferenceResult, InferenceError> {
        let readings = READINGS
            .iter()
            .map(|field| features.require_numeric(*field).map(|value| (*field, value)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut best: Option<(&CropProfile, f64)> = None;
        for profile in self.catalog.crops() {
            let score = Self::suitability(profile, &readings);
            // Strict comparison keeps the earlier catalog entry on ties.
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((profile, score));
            }
        }

        let (profile, score) =
            best.ok_or_else(|| InferenceError::new("catalog declares no crops"))?;
        let confidence = Confidence::new(self.confidence_band.at(score))?;

        Ok(InferenceResult::new(
            Prediction::Crop {
                crop: profile.name.to_string(),
            },
            confidence,
        ))
    }
}

fn envelope_fit(value: f64, envelope: Envelope) -> f64 {
    if value < envelope.low || value > envelope.high {
        let width = (envelope.high - envelope.low).max(0.001);
        let distance = if value < envelope.low {
            envelope.low - value
        } else {
            value - envelope.high
        };
        return EDGE_FIT * (1.0 - distance / width).max(0.0);
    }

    let half_width = if value <= envelope.typical {
        envelope.typical - envelope.low
    } else {
        envelope.high - envelope.typical
    };
    let deviation = if half_width > 0.0 {
        ((value - envelope.typical).abs() / half_width).min(1.0)
    } else {
        0.0
    };
    1.0 - (1.0 - EDGE_FIT) * deviation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_fit_peaks_at_typical_value() {
        let envelope = Envelope {
            low: 10.0,
            typical: 20.0,
            high: 40.0,
        };
        assert_eq!(envelope_fit(20.0, envelope), 1.0);
        assert!((envelope_fit(10.0, envelope) - EDGE_FIT).abs() < 1e-9);
        assert!((envelope_fit(40.0, envelope) - EDGE_FIT).abs() < 1e-9);
        assert!(envelope_fit(45.0, envelope) < EDGE_FIT);
        assert_eq!(envelope_fit(100.0, envelope), 0.0);
    }
}
