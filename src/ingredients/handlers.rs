use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, instrument};

use super::dto::{EstimateRequest, IngredientEstimate, ReferenceSource, SearchQuery};
use crate::ai::reference_from;
use crate::errors::AppError;
use crate::nutrition::reference::{self, FoodReference};
use crate::state::AppState;

const MAX_LIMIT: usize = 50;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ingredients/search", get(search))
        .route("/ingredients/estimate", post(estimate))
}

#[instrument]
pub async fn search(Query(q): Query<SearchQuery>) -> Json<Vec<&'static FoodReference>> {
    Json(reference::search(&q.q, q.limit.min(MAX_LIMIT)))
}

/// Table entry when the name is known, AI estimate otherwise.
#[instrument(skip(state))]
pub async fn estimate(
    State(state): State<AppState>,
    Json(body): Json<EstimateRequest>,
) -> Result<Json<IngredientEstimate>, AppError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be blank".into()));
    }

    if let Some(food) = reference::find(name) {
        return Ok(Json(IngredientEstimate {
            name: food.name.to_owned(),
            per_100g: food.per_100g,
            source: ReferenceSource::Table,
        }));
    }

    let raw = state.ai.estimate_ingredient(name).await?;
    let per_100g = reference_from(&raw)?;
    debug!(calories = per_100g.calories, "ingredient estimated");
    Ok(Json(IngredientEstimate {
        name: name.to_owned(),
        per_100g,
        source: ReferenceSource::Ai,
    }))
}
