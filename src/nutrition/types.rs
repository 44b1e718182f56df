use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Provenance of an item's nutrition values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// One ingredient of a meal. Nutrition values are absolute for `amount`,
/// never per 100 g.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodItem {
    pub name: String,
    pub amount: String,
    #[serde(serialize_with = "whole_number", deserialize_with = "lenient_number", default)]
    pub calories: f64,
    #[serde(serialize_with = "whole_number", deserialize_with = "lenient_number", default)]
    pub protein: f64,
    #[serde(serialize_with = "whole_number", deserialize_with = "lenient_number", default)]
    pub carbs: f64,
    #[serde(serialize_with = "whole_number", deserialize_with = "lenient_number", default)]
    pub fat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

/// Per-100 g nutrition template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct NutritionReference {
    #[serde(serialize_with = "whole_number")]
    pub calories: f64,
    #[serde(serialize_with = "whole_number")]
    pub protein: f64,
    #[serde(serialize_with = "whole_number")]
    pub carbs: f64,
    #[serde(serialize_with = "whole_number")]
    pub fat: f64,
}

impl NutritionReference {
    pub const fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }
}

/// A reference scaled to a concrete serving: integral calories, macros with
/// one decimal.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ScaledNutrition {
    pub calories: i64,
    #[serde(serialize_with = "whole_number")]
    pub protein: f64,
    #[serde(serialize_with = "whole_number")]
    pub carbs: f64,
    #[serde(serialize_with = "whole_number")]
    pub fat: f64,
}

impl ScaledNutrition {
    pub fn into_item(
        self,
        name: String,
        amount: String,
        confidence: Option<Confidence>,
    ) -> FoodItem {
        FoodItem {
            name,
            amount,
            calories: self.calories as f64,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            confidence,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Macros {
    #[serde(serialize_with = "whole_number", deserialize_with = "lenient_number", default)]
    pub protein: f64,
    #[serde(serialize_with = "whole_number", deserialize_with = "lenient_number", default)]
    pub carbs: f64,
    #[serde(serialize_with = "whole_number", deserialize_with = "lenient_number", default)]
    pub fat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
}

/// Rounds to one decimal place. Values too large to scale are returned as-is.
pub fn round1(value: f64) -> f64 {
    let scaled = value * 10.0;
    if scaled.is_finite() {
        scaled.round() / 10.0
    } else {
        value
    }
}

pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

// Persisted records carry `50`, not `50.0`, for whole values. Non-finite
// values are written as 0; JSON would turn them into `null`.
fn whole_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    let value = finite_or_zero(*value);
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        serializer.serialize_i64(value as i64)
    } else {
        serializer.serialize_f64(value)
    }
}

// `null` reads as 0 so one bad field cannot make a stored record unreadable.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.map_or(0.0, finite_or_zero))
}
