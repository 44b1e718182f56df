use serde::Serialize;

use super::aggregate::aggregate;
use super::health_score::estimate_health_score;
use super::types::{FoodItem, Macros};

/// Where a recalculated item list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemsOrigin {
    /// The user added, removed, resized or replaced something.
    UserEdited,
    /// A copy of the AI's own item list (first save or restore).
    AiOriginal,
}

/// The five meal fields that always change together. Only
/// [`recalculate_meal`] builds one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealUpdate {
    items: Vec<FoodItem>,
    calories: i64,
    macros: Macros,
    health_score: u8,
    is_adjusted: bool,
}

impl MealUpdate {
    pub fn items(&self) -> &[FoodItem] {
        &self.items
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

    pub fn into_items(self) -> Vec<FoodItem> {
        self.items
    }
}

pub fn recalculate_meal(items: Vec<FoodItem>, origin: ItemsOrigin) -> MealUpdate {
    let totals = aggregate(&items);
    let health_score = estimate_health_score(&items);
    MealUpdate {
        calories: totals.calories,
        macros: totals.macros(),
        health_score,
        is_adjusted: origin == ItemsOrigin::UserEdited,
        items,
    }
}
