//! Static reference tables: option lists, state/district mapping, crop envelopes, fertilizer
//! compositions and the cultivation tips attached to recommendations.
//!
//! The catalog is built once per process and only ever handed out as `&'static Catalog`.
//! Declaration order is significant: feature indices and classifier tie-breaks follow it.

use std::sync::OnceLock;

use serde::Serialize;

use super::domain::{Field, InferenceKind};

/// Presentation hint forwarded to the UI untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayStyle {
    pub color: &'static str,
    pub background: &'static str,
}

impl DisplayStyle {
    pub const NEUTRAL: Self = Self {
        color: "text-gray-900",
        background: "bg-gray-50 border-gray-200",
    };
}

/// Observed growing range of a crop for one reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Envelope {
    pub low: f64,
    pub typical: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CropProfile {
    pub name: &'static str,
    pub tips: &'static [&'static str],
    pub style: DisplayStyle,
    #[serde(skip)]
    pub envelopes: &'static [(Field, Envelope)],
}

impl CropProfile {
    pub fn envelope(&self, field: Field) -> Option<Envelope> {
        self.envelopes
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, envelope)| *envelope)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Nitrogen,
    Phosphorus,
    Potassium,
}

impl Nutrient {
    pub const fn field(self) -> Field {
        match self {
            Self::Nitrogen => Field::Nitrogen,
            Self::Phosphorus => Field::Phosphorus,
            Self::Potassium => Field::Potassium,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FertilizerProfile {
    pub name: &'static str,
    pub composition: &'static str,
    pub benefits: &'static str,
    pub application: &'static str,
    pub style: DisplayStyle,
    /// Deficiency this product corrects; `None` marks the balanced blend.
    pub remedies: Option<Nutrient>,
}

impl FertilizerProfile {
    pub fn tips(&self) -> Vec<String> {
        vec![self.benefits.to_string(), self.application.to_string()]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Region {
    pub state: &'static str,
    pub districts: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct YieldCropProfile {
    pub name: &'static str,
    /// Scales the base per-hectare yield; sugarcane's biomass dwarfs the grains.
    pub multiplier: f64,
    pub tips: &'static [&'static str],
}

/// Option lists that enum-typed fields are checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    SoilType,
    FertilizerCrop,
    State,
    District,
    Season,
    YieldCrop,
}

#[derive(Debug)]
pub struct Catalog {
    crops: Vec<CropProfile>,
    soil_types: Vec<&'static str>,
    fertilizer_crops: Vec<&'static str>,
    fertilizers: Vec<FertilizerProfile>,
    regions: Vec<Region>,
    seasons: Vec<&'static str>,
    yield_crops: Vec<YieldCropProfile>,
}

static STANDARD_CATALOG: OnceLock<Catalog> = OnceLock::new();

impl Catalog {
    pub fn standard() -> &'static Catalog {
        STANDARD_CATALOG.get_or_init(build_standard)
    }

    pub fn crops(&self) -> &[CropProfile] {
        &self.crops
    }

    pub fn crop(&self, name: &str) -> Option<&CropProfile> {
        self.crops.iter().find(|profile| profile.name == name)
    }

    pub fn fertilizers(&self) -> &[FertilizerProfile] {
        &self.fertilizers
    }

    pub fn fertilizer(&self, name: &str) -> Option<&FertilizerProfile> {
        self.fertilizers.iter().find(|profile| profile.name == name)
    }

    pub fn fertilizer_for(&self, deficiency: Option<Nutrient>) -> Option<&FertilizerProfile> {
        self.fertilizers
            .iter()
            .find(|profile| profile.remedies == deficiency)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn districts(&self, state: &str) -> Option<&'static [&'static str]> {
        self.regions
            .iter()
            .find(|region| region.state == state)
            .map(|region| region.districts)
    }

    pub fn yield_crop(&self, name: &str) -> Option<&YieldCropProfile> {
        self.yield_crops.iter().find(|profile| profile.name == name)
    }

    /// Every accepted value of a category in declaration order. Districts are flattened
    /// across states in state order.
    pub fn options(&self, category: Category) -> Vec<&'static str> {
        match category {
            Category::SoilType => self.soil_types.clone(),
            Category::FertilizerCrop => self.fertilizer_crops.clone(),
            Category::State => self.regions.iter().map(|region| region.state).collect(),
            Category::District => self
                .regions
                .iter()
                .flat_map(|region| region.districts.iter().copied())
                .collect(),
            Category::Season => self.seasons.clone(),
            Category::YieldCrop => self.yield_crops.iter().map(|profile| profile.name).collect(),
        }
    }

    pub fn position(&self, category: Category, value: &str) -> Option<usize> {
        self.options(category)
            .iter()
            .position(|candidate| *candidate == value)
    }

    pub fn contains(&self, category: Category, value: &str) -> bool {
        self.position(category, value).is_some()
    }

    /// General advice shown alongside every result of a flow.
    pub fn guidance(&self, kind: InferenceKind) -> &'static [&'static str] {
        match kind {
            InferenceKind::Crop => CROP_GUIDANCE,
            InferenceKind::Fertilizer => FERTILIZER_GUIDANCE,
            InferenceKind::Yield => YIELD_GUIDANCE,
        }
    }

    /// Tips for a predicted label; unknown labels degrade to an empty list.
    pub fn tips_for(&self, kind: InferenceKind, label: &str) -> Vec<String> {
        match kind {
            InferenceKind::Crop => self
                .crop(label)
                .map(|profile| to_owned(profile.tips))
                .unwrap_or_default(),
            InferenceKind::Fertilizer => self
                .fertilizer(label)
                .map(FertilizerProfile::tips)
                .unwrap_or_default(),
            InferenceKind::Yield => self
                .yield_crop(label)
                .map(|profile| to_owned(profile.tips))
                .unwrap_or_default(),
        }
    }

    pub fn style_for(&self, kind: InferenceKind, label: &str) -> DisplayStyle {
        let style = match kind {
            InferenceKind::Crop => self.crop(label).map(|profile| profile.style),
            InferenceKind::Fertilizer => self.fertilizer(label).map(|profile| profile.style),
            InferenceKind::Yield => self.yield_crop(label).map(|_| YIELD_STYLE),
        };
        style.unwrap_or(DisplayStyle::NEUTRAL)
    }

    pub fn view(&self) -> CatalogView {
        CatalogView {
            crops: self.crops.clone(),
            soil_types: self.soil_types.clone(),
            fertilizer_crops: self.fertilizer_crops.clone(),
            fertilizers: self.fertilizers.clone(),
            regions: self.regions.clone(),
            seasons: self.seasons.clone(),
            yield_crops: self.yield_crops.clone(),
        }
    }
}

/// Serializable snapshot used to populate dropdowns.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    pub crops: Vec<CropProfile>,
    pub soil_types: Vec<&'static str>,
    pub fertilizer_crops: Vec<&'static str>,
    pub fertilizers: Vec<FertilizerProfile>,
    pub regions: Vec<Region>,
    pub seasons: Vec<&'static str>,
    pub yield_crops: Vec<YieldCropProfile>,
}

fn to_owned(tips: &[&str]) -> Vec<String> {
    tips.iter().map(|tip| tip.to_string()).collect()
}

const YIELD_STYLE: DisplayStyle = DisplayStyle {
    color: "text-orange-600",
    background: "bg-orange-50 border-orange-200",
};

const CROP_GUIDANCE: &[&str] = &[
    "Use recent soil test results for NPK values",
    "Consider seasonal weather patterns",
    "Account for local farming conditions",
    "Consult with local agricultural experts",
];

const FERTILIZER_GUIDANCE: &[&str] = &[
    "Test soil nutrients before every season",
    "Split nitrogen doses to limit leaching",
    "Match dosage to the crop's growth stage",
    "Follow local agricultural extension advice",
];

const YIELD_GUIDANCE: &[&str] = &[
    "Historical yield data for the region",
    "Climate patterns and seasonal variations",
    "Soil conditions and crop suitability",
    "Agricultural practices and technology adoption",
    "Market trends and farmer behavior",
];

fn build_standard() -> Catalog {
    Catalog {
        crops: vec![
            CropProfile {
                name: "rice",
                tips: &[
                    "Ensure adequate water supply",
                    "Monitor for pests regularly",
                    "Apply nitrogen in split doses",
                    "Maintain proper field drainage",
                ],
                style: DisplayStyle {
                    color: "text-blue-600",
                    background: "bg-blue-50 border-blue-200",
                },
                envelopes: &[
                    (Field::Nitrogen, Envelope { low: 60.0, typical: 80.0, high: 99.0 }),
                    (Field::Phosphorus, Envelope { low: 35.0, typical: 48.0, high: 60.0 }),
                    (Field::Potassium, Envelope { low: 35.0, typical: 40.0, high: 45.0 }),
                    (Field::Temperature, Envelope { low: 20.0, typical: 23.7, high: 27.0 }),
                    (Field::Humidity, Envelope { low: 80.0, typical: 82.0, high: 85.0 }),
                    (Field::Ph, Envelope { low: 5.0, typical: 6.4, high: 7.9 }),
                    (Field::Rainfall, Envelope { low: 180.0, typical: 236.0, high: 300.0 }),
                ],
            },
            CropProfile {
                name: "wheat",
                tips: &[
                    "Ensure good drainage",
                    "Apply phosphorus at sowing",
                    "Monitor for rust diseases",
                    "Optimal sowing time is crucial",
                ],
                style: DisplayStyle {
                    color: "text-yellow-600",
                    background: "bg-yellow-50 border-yellow-200",
                },
                envelopes: &[
                    (Field::Nitrogen, Envelope { low: 80.0, typical: 100.0, high: 120.0 }),
                    (Field::Phosphorus, Envelope { low: 40.0, typical: 50.0, high: 60.0 }),
                    (Field::Potassium, Envelope { low: 30.0, typical: 40.0, high: 50.0 }),
                    (Field::Temperature, Envelope { low: 12.0, typical: 18.0, high: 25.0 }),
                    (Field::Humidity, Envelope { low: 40.0, typical: 55.0, high: 70.0 }),
                    (Field::Ph, Envelope { low: 6.0, typical: 6.8, high: 7.5 }),
                    (Field::Rainfall, Envelope { low: 50.0, typical: 75.0, high: 100.0 }),
                ],
            },
            CropProfile {
                name: "cotton",
                tips: &[
                    "Maintain proper spacing",
                    "Regular pest monitoring",
                    "Adequate potash application",
                    "Deep plowing recommended",
                ],
                style: DisplayStyle {
                    color: "text-pink-600",
                    background: "bg-pink-50 border-pink-200",
                },
                envelopes: &[
                    (Field::Nitrogen, Envelope { low: 100.0, typical: 118.0, high: 140.0 }),
                    (Field::Phosphorus, Envelope { low: 35.0, typical: 46.0, high: 60.0 }),
                    (Field::Potassium, Envelope { low: 15.0, typical: 20.0, high: 25.0 }),
                    (Field::Temperature, Envelope { low: 22.0, typical: 24.0, high: 26.0 }),
                    (Field::Humidity, Envelope { low: 75.0, typical: 80.0, high: 85.0 }),
                    (Field::Ph, Envelope { low: 5.8, typical: 6.9, high: 8.0 }),
                    (Field::Rainfall, Envelope { low: 60.0, typical: 80.0, high: 100.0 }),
                ],
            },
            CropProfile {
                name: "maize",
                tips: &[
                    "Ensure adequate nitrogen",
                    "Maintain soil moisture",
                    "Monitor for stem borers",
                    "Ridge planting preferred",
                ],
                style: DisplayStyle {
                    color: "text-orange-600",
                    background: "bg-orange-50 border-orange-200",
                },
                envelopes: &[
                    (Field::Nitrogen, Envelope { low: 60.0, typical: 78.0, high: 100.0 }),
                    (Field::Phosphorus, Envelope { low: 35.0, typical: 48.0, high: 60.0 }),
                    (Field::Potassium, Envelope { low: 15.0, typical: 20.0, high: 25.0 }),
                    (Field::Temperature, Envelope { low: 18.0, typical: 22.4, high: 27.0 }),
                    (Field::Humidity, Envelope { low: 55.0, typical: 65.0, high: 75.0 }),
                    (Field::Ph, Envelope { low: 5.5, typical: 6.2, high: 7.0 }),
                    (Field::Rainfall, Envelope { low: 60.0, typical: 84.0, high: 110.0 }),
                ],
            },
            CropProfile {
                name: "coffee",
                tips: &[
                    "Provide adequate shade",
                    "Maintain acidic soil pH",
                    "Regular pruning required",
                    "Proper drainage essential",
                ],
                style: DisplayStyle {
                    color: "text-brown-600",
                    background: "bg-amber-50 border-amber-200",
                },
                envelopes: &[
                    (Field::Nitrogen, Envelope { low: 80.0, typical: 101.0, high: 120.0 }),
                    (Field::Phosphorus, Envelope { low: 15.0, typical: 29.0, high: 40.0 }),
                    (Field::Potassium, Envelope { low: 25.0, typical: 30.0, high: 35.0 }),
                    (Field::Temperature, Envelope { low: 23.0, typical: 25.5, high: 28.0 }),
                    (Field::Humidity, Envelope { low: 50.0, typical: 59.0, high: 70.0 }),
                    (Field::Ph, Envelope { low: 6.0, typical: 6.8, high: 7.5 }),
                    (Field::Rainfall, Envelope { low: 115.0, typical: 158.0, high: 200.0 }),
                ],
            },
        ],
        soil_types: vec!["Sandy", "Loamy", "Black", "Red", "Clayey"],
        fertilizer_crops: vec!["Maize", "Sugarcane", "Cotton", "Tobacco", "Paddy", "Wheat"],
        fertilizers: vec![
            FertilizerProfile {
                name: "Urea",
                composition: "Nitrogen (46%)",
                benefits: "Promotes leaf growth and green color",
                application: "Apply in split doses during growing season",
                style: DisplayStyle {
                    color: "text-blue-600",
                    background: "bg-blue-50 border-blue-200",
                },
                remedies: Some(Nutrient::Nitrogen),
            },
            FertilizerProfile {
                name: "DAP",
                composition: "Nitrogen (18%) + Phosphorus (46%)",
                benefits: "Promotes root development and flowering",
                application: "Apply at the time of sowing",
                style: DisplayStyle {
                    color: "text-purple-600",
                    background: "bg-purple-50 border-purple-200",
                },
                remedies: Some(Nutrient::Phosphorus),
            },
            FertilizerProfile {
                name: "MOP",
                composition: "Potassium (60%)",
                benefits: "Improves disease resistance and fruit quality",
                application: "Apply before flowering stage",
                style: DisplayStyle {
                    color: "text-orange-600",
                    background: "bg-orange-50 border-orange-200",
                },
                remedies: Some(Nutrient::Potassium),
            },
            FertilizerProfile {
                name: "NPK",
                composition: "Balanced N-P-K nutrients",
                benefits: "Complete nutrition for overall plant growth",
                application: "Apply as per soil test recommendations",
                style: DisplayStyle {
                    color: "text-green-600",
                    background: "bg-green-50 border-green-200",
                },
                remedies: None,
            },
        ],
        regions: vec![
            Region {
                state: "Punjab",
                districts: &["Amritsar", "Ludhiana", "Jalandhar", "Patiala"],
            },
            Region {
                state: "Haryana",
                districts: &["Gurgaon", "Faridabad", "Hisar", "Rohtak"],
            },
            Region {
                state: "UP",
                districts: &["Lucknow", "Kanpur", "Varanasi", "Agra"],
            },
            Region {
                state: "Bihar",
                districts: &["Patna", "Gaya", "Bhagalpur", "Muzaffarpur"],
            },
            Region {
                state: "West Bengal",
                districts: &["Kolkata", "Howrah", "Burdwan", "Murshidabad"],
            },
        ],
        seasons: vec!["Kharif", "Rabi", "Whole Year"],
        yield_crops: vec![
            YieldCropProfile {
                name: "Rice",
                multiplier: 1.2,
                tips: &[
                    "Maintain optimal water levels throughout growing period",
                    "Apply fertilizers in split doses for better efficiency",
                    "Monitor for pest attacks, especially stem borers",
                    "Ensure proper spacing for maximum yield potential",
                ],
            },
            YieldCropProfile {
                name: "Wheat",
                multiplier: 1.0,
                tips: &[
                    "Ensure adequate drainage to prevent waterlogging",
                    "Apply phosphorus at sowing time for root development",
                    "Monitor for rust diseases and apply fungicides if needed",
                    "Harvest at right moisture content (12-14%)",
                ],
            },
            YieldCropProfile {
                name: "Cotton",
                multiplier: 0.8,
                tips: &[
                    "Regular pest monitoring required, especially bollworm",
                    "Maintain proper plant spacing for optimal growth",
                    "Apply potash adequately for fiber quality",
                    "Ensure good drainage and avoid waterlogging",
                ],
            },
            YieldCropProfile {
                name: "Sugarcane",
                multiplier: 15.0,
                tips: &[
                    "Maintain consistent soil moisture throughout season",
                    "Apply nitrogen in multiple doses for sustained growth",
                    "Control weeds effectively in early growth stages",
                    "Monitor for red rot disease and take preventive measures",
                ],
            },
        ],
    }
}
