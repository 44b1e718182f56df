use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Redirect,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{
    AddItemRequest, AnalysisDraft, AnalyzeRequest, ClearQuery, ClearResponse, ConfirmMealRequest,
    DailySummary, LabelRequest, MealDetails, MealListItem, UpdateItemRequest,
};
use super::services;
use crate::errors::AppError;
use crate::images::services::photo_url;
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals))
        .route("/meals/:id", get(get_meal))
        .route("/meals/:id/photo", get(get_presigned_photo))
        .route("/summary/today", get(today_summary))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/analyses", post(analyze_meal))
        .route("/meals", post(confirm_meal).delete(clear_meals))
        .route("/meals/:id", axum::routing::delete(delete_meal))
        .route("/meals/:id/label", put(set_label))
        .route("/meals/:id/items", post(add_item))
        .route("/meals/:id/items/:index", put(update_item).delete(remove_item))
        .route("/meals/:id/restore", post(restore_meal))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

#[instrument(skip(state))]
pub async fn list_meals(State(state): State<AppState>) -> Result<Json<Vec<MealListItem>>, AppError> {
    let meals = services::list_meals(&state).await?;
    Ok(Json(meals.iter().map(MealListItem::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MealDetails>, AppError> {
    Ok(Json(services::get_meal(&state, id).await?.into()))
}

/// 307 to a presigned URL of the meal photo.
#[instrument(skip(state))]
pub async fn get_presigned_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    let meal = services::get_meal(&state, id).await?;
    let url = photo_url(&state, &meal.image).await?;
    Ok(Redirect::temporary(&url))
}

#[instrument(skip(state))]
pub async fn today_summary(State(state): State<AppState>) -> Result<Json<DailySummary>, AppError> {
    Ok(Json(services::daily_summary(&state).await?))
}

#[instrument(skip(state, body))]
pub async fn analyze_meal(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisDraft>, AppError> {
    Ok(Json(services::analyze(&state, &body.image, body.language).await?))
}

#[instrument(skip(state, body))]
pub async fn confirm_meal(
    State(state): State<AppState>,
    Json(body): Json<ConfirmMealRequest>,
) -> Result<(StatusCode, HeaderMap, Json<MealDetails>), AppError> {
    let meal = services::confirm_meal(&state, body).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/v1/meals/{}", meal.id)) {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(meal.into())))
}

#[instrument(skip(state))]
pub async fn clear_meals(
    State(state): State<AppState>,
    Query(q): Query<ClearQuery>,
) -> Result<Json<ClearResponse>, AppError> {
    let removed = services::clear_history(&state, q.scope).await?;
    Ok(Json(ClearResponse { removed }))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete_meal(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn set_label(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<LabelRequest>,
) -> Result<Json<MealDetails>, AppError> {
    Ok(Json(services::set_label(&state, id, body.user_label).await?.into()))
}

#[instrument(skip(state))]
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<MealDetails>, AppError> {
    Ok(Json(services::add_item(&state, id, body).await?.into()))
}

#[instrument(skip(state))]
pub async fn update_item(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<MealDetails>, AppError> {
    Ok(Json(services::update_item(&state, id, index, body).await?.into()))
}

#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<MealDetails>, AppError> {
    Ok(Json(services::remove_item(&state, id, index).await?.into()))
}

#[instrument(skip(state))]
pub async fn restore_meal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MealDetails>, AppError> {
    Ok(Json(services::restore_meal(&state, id).await?.into()))
}
