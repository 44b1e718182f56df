use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::ai::MealEstimate;
use crate::nutrition::{recalculate_meal, FoodItem, ItemsOrigin, Macros, MealUpdate};

/// A confirmed meal as persisted in the history.
///
/// `items`, `calories`, `macros`, `health_score` and `is_adjusted` are
/// private: they only change together, through [`MealAnalysis::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealAnalysis {
    pub id: Uuid,
    #[serde(rename = "timestamp", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Object-store key of the photo.
    pub image: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_label: Option<String>,
    items: Vec<FoodItem>,
    #[serde(default)]
    ai_original_items: Vec<FoodItem>,
    calories: i64,
    macros: Macros,
    health_score: u8,
    #[serde(default)]
    is_adjusted: bool,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub observation: String,
}

impl MealAnalysis {
    /// Builds a meal from an AI estimate. `items` is what the user confirmed;
    /// it counts as adjusted only when it differs from the AI's list.
    pub fn new(
        id: Uuid,
        created_at: OffsetDateTime,
        image: String,
        estimate: MealEstimate,
        items: Vec<FoodItem>,
        user_label: Option<String>,
    ) -> Self {
        let origin = if items == estimate.items {
            ItemsOrigin::AiOriginal
        } else {
            ItemsOrigin::UserEdited
        };
        let update = recalculate_meal(items, origin);
        let mut meal = Self {
            id,
            created_at,
            image,
            name: estimate.name,
            user_label,
            items: Vec::new(),
            ai_original_items: estimate.items,
            calories: 0,
            macros: Macros::default(),
            health_score: 0,
            is_adjusted: false,
            ingredients: estimate.ingredients,
            observation: estimate.observation,
        };
        meal.apply(update);
        meal
    }

    pub fn apply(&mut self, update: MealUpdate) {
        self.calories = update.calories();
        self.macros = update.macros();
        self.health_score = update.health_score();
        self.is_adjusted = update.is_adjusted();
        self.items = update.into_items();
    }

    /// Recalculation over a fresh copy of the AI's original items.
    pub fn restore_update(&self) -> MealUpdate {
        recalculate_meal(self.ai_original_items.clone(), ItemsOrigin::AiOriginal)
    }

    pub fn items(&self) -> &[FoodItem] {
        &self.items
    }

    pub fn ai_original_items(&self) -> &[FoodItem] {
        &self.ai_original_items
    }

    pub fn calories(&self) -> i64 {
        self.calories
    }

    pub fn macros(&self) -> Macros {
        self.macros
    }

    pub fn health_score(&self) -> u8 {
        self.health_score
    }

    pub fn is_adjusted(&self) -> bool {
        self.is_adjusted
    }

    pub fn display_name(&self) -> &str {
        self.user_label.as_deref().unwrap_or(&self.name)
    }
}
