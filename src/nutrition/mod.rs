//! Deterministic nutrition engine: quantity normalization, aggregation,
//! health scoring and the recalculation entry point. Everything here is
//! synchronous and free of I/O.

mod aggregate;
pub mod handlers;
mod health_score;
mod quantity;
mod recalc;
pub mod reference;
mod text;
mod types;

pub use aggregate::total_grams;
pub use health_score::HealthBand;
pub use quantity::{item_from_reference, rescale_item, scale_reference};
pub use recalc::{recalculate_meal, ItemsOrigin, MealUpdate};
pub use types::{round1, Confidence, FoodItem, Macros, NutritionReference, ScaledNutrition};

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
