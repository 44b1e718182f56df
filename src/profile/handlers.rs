use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::dto::{ProfileUpdate, UserProfile};
use super::services;
use crate::errors::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(put_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(State(state): State<AppState>) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(services::get_profile(&state).await?))
}

#[instrument(skip(state))]
pub async fn put_profile(
    State(state): State<AppState>,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(services::update_profile(&state, body).await?))
}
