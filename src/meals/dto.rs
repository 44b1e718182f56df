use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::ai::{Language, MealEstimate};
use crate::meals::repo_types::MealAnalysis;
use crate::nutrition::{
    recalculate_meal, total_grams, FoodItem, HealthBand, ItemsOrigin, Macros, NutritionReference,
};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Base64 or data URL.
    pub image: String,
    #[serde(default)]
    pub language: Option<Language>,
}

/// An AI estimate with totals recomputed locally. Nothing is persisted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDraft {
    pub name: String,
    pub items: Vec<FoodItem>,
    pub ingredients: Vec<String>,
    pub observation: String,
    pub calories: i64,
    pub macros: Macros,
    pub health_score: u8,
    pub health_band: HealthBand,
    pub total_grams: u64,
    pub cached: bool,
}

impl AnalysisDraft {
    /// Totals and score come from the engine; only fiber, which items do
    /// not carry, is taken from the AI.
    pub fn new(estimate: MealEstimate, cached: bool) -> Self {
        let update = recalculate_meal(estimate.items, ItemsOrigin::AiOriginal);
        let macros = Macros {
            fiber: estimate.macros.fiber,
            ..update.macros()
        };
        Self {
            name: estimate.name,
            ingredients: estimate.ingredients,
            observation: estimate.observation,
            calories: update.calories(),
            macros,
            health_score: update.health_score(),
            health_band: HealthBand::from_score(update.health_score()),
            total_grams: total_grams(update.items()),
            items: update.into_items(),
            cached,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmMealRequest {
    pub image: String,
    /// Reviewed items; the AI's list is used when absent.
    #[serde(default)]
    pub items: Option<Vec<FoodItem>>,
    #[serde(default)]
    pub user_label: Option<String>,
    #[serde(default)]
    pub language: Option<Language>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealDetails {
    #[serde(flatten)]
    pub meal: MealAnalysis,
    pub display_name: String,
    pub total_grams: u64,
    pub health_band: HealthBand,
}

impl From<MealAnalysis> for MealDetails {
    fn from(meal: MealAnalysis) -> Self {
        Self {
            display_name: meal.display_name().to_owned(),
            total_grams: total_grams(meal.items()),
            health_band: HealthBand::from_score(meal.health_score()),
            meal,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealListItem {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub display_name: String,
    pub calories: i64,
    pub macros: Macros,
    pub health_score: u8,
    pub health_band: HealthBand,
    pub is_adjusted: bool,
    pub item_count: usize,
}

impl From<&MealAnalysis> for MealListItem {
    fn from(meal: &MealAnalysis) -> Self {
        Self {
            id: meal.id,
            timestamp: meal.created_at,
            display_name: meal.display_name().to_owned(),
            calories: meal.calories(),
            macros: meal.macros(),
            health_score: meal.health_score(),
            health_band: HealthBand::from_score(meal.health_score()),
            is_adjusted: meal.is_adjusted(),
            item_count: meal.items().len(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRequest {
    #[serde(default)]
    pub user_label: Option<String>,
}

fn default_grams() -> u32 {
    100
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub name: String,
    #[serde(default = "default_grams")]
    pub grams: u32,
    /// Per-100 g values picked by the client, e.g. from ingredient search.
    #[serde(default)]
    pub reference: Option<NutritionReference>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub grams: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub reference: Option<NutritionReference>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearScope {
    Today,
    Week,
    All,
}

#[derive(Debug, Deserialize)]
pub struct ClearQuery {
    pub scope: ClearScope,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub removed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub meal_count: usize,
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub average_health_score: u8,
    pub goal: u32,
    pub progress_percent: f64,
}
