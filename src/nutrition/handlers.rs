//! Stateless engine endpoints. They let a client preview a recalculation
//! before committing an edit.

use axum::{routing::post, Json, Router};
use serde::Deserialize;
use tracing::instrument;

use super::{
    recalculate_meal, rescale_item, scale_reference, FoodItem, ItemsOrigin, MealUpdate,
    NutritionReference, ScaledNutrition,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/nutrition/recalculate", post(recalculate))
        .route("/nutrition/scale", post(scale))
        .route("/nutrition/rescale", post(rescale))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculateRequest {
    pub items: Vec<FoodItem>,
    #[serde(default)]
    pub restored_original: bool,
}

#[derive(Debug, Deserialize)]
pub struct ScaleRequest {
    pub reference: NutritionReference,
    pub grams: u32,
}

#[derive(Debug, Deserialize)]
pub struct RescaleRequest {
    pub item: FoodItem,
    pub grams: u32,
}

#[instrument(skip(body), fields(items = body.items.len()))]
pub async fn recalculate(Json(body): Json<RecalculateRequest>) -> Json<MealUpdate> {
    let origin = if body.restored_original {
        ItemsOrigin::AiOriginal
    } else {
        ItemsOrigin::UserEdited
    };
    Json(recalculate_meal(body.items, origin))
}

#[instrument]
pub async fn scale(Json(body): Json<ScaleRequest>) -> Json<ScaledNutrition> {
    Json(scale_reference(&body.reference, body.grams))
}

#[instrument]
pub async fn rescale(Json(body): Json<RescaleRequest>) -> Json<FoodItem> {
    Json(rescale_item(&body.item, body.grams))
}
