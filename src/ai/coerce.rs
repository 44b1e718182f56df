//! Validation of AI payloads. The model is asked for a schema but nothing
//! guarantees it; every field is read leniently and missing or malformed
//! values fall back to safe defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::AiError;
use crate::nutrition::{Confidence, FoodItem, Macros, NutritionReference};

const DEFAULT_MEAL_NAME: &str = "Meal";
const DEFAULT_AMOUNT: &str = "100g";

/// A validated meal analysis. The AI's own health score is not kept; the
/// engine recomputes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealEstimate {
    pub name: String,
    pub items: Vec<FoodItem>,
    pub ingredients: Vec<String>,
    pub observation: String,
    /// As reported by the AI, before local recalculation.
    pub calories: i64,
    pub macros: Macros,
}

pub fn meal_estimate_from(raw: &Value) -> Result<MealEstimate, AiError> {
    let obj = as_object(raw)?;

    let items: Vec<FoodItem> = obj
        .get("items")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(food_item_from).collect())
        .unwrap_or_default();

    let ingredients = obj
        .get("ingredients")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(non_blank).collect())
        .unwrap_or_default();

    Ok(MealEstimate {
        name: obj
            .get("name")
            .and_then(non_blank)
            .unwrap_or_else(|| DEFAULT_MEAL_NAME.to_owned()),
        items,
        ingredients,
        observation: obj
            .get("observation")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_owned())
            .unwrap_or_default(),
        calories: number(obj.get("calories")).round() as i64,
        macros: Macros {
            protein: number(obj.get("protein")),
            carbs: number(obj.get("carbs")),
            fat: number(obj.get("fat")),
            fiber: obj.get("fiber").map(|v| number(Some(v))),
        },
    })
}

/// Per-100 g reference from an ingredient estimate.
pub fn reference_from(raw: &Value) -> Result<NutritionReference, AiError> {
    let obj = as_object(raw)?;
    Ok(NutritionReference::new(
        number(obj.get("calories")),
        number(obj.get("protein")),
        number(obj.get("carbs")),
        number(obj.get("fat")),
    ))
}

fn as_object(raw: &Value) -> Result<&Map<String, Value>, AiError> {
    raw.as_object()
        .ok_or_else(|| AiError::InvalidResponse(format!("expected a JSON object, got {}", kind(raw))))
}

fn food_item_from(raw: &Value) -> Option<FoodItem> {
    let obj = raw.as_object()?;
    let name = obj.get("name").and_then(non_blank)?;
    let amount = match obj.get("amount") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_owned(),
        Some(Value::Number(n)) => format!("{n}g"),
        _ => DEFAULT_AMOUNT.to_owned(),
    };
    Some(FoodItem {
        name,
        amount,
        calories: number(obj.get("calories")),
        protein: number(obj.get("protein")),
        carbs: number(obj.get("carbs")),
        fat: number(obj.get("fat")),
        confidence: obj
            .get("confidence")
            .and_then(Value::as_str)
            .and_then(Confidence::parse),
    })
}

/// JSON numbers as-is, numeric strings parsed; anything else, negative or
/// non-finite is 0.
fn number(raw: Option<&Value>) -> f64 {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

fn non_blank(raw: &Value) -> Option<String> {
    raw.as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn kind(raw: &Value) -> &'static str {
    match raw {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
