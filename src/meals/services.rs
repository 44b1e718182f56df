use time::{Duration, OffsetDateTime, Time};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    AddItemRequest, AnalysisDraft, ClearScope, ConfirmMealRequest, DailySummary, UpdateItemRequest,
};
use super::repo;
use super::repo_types::MealAnalysis;
use crate::ai::{meal_estimate_from, reference_from, Language, MealEstimate};
use crate::errors::AppError;
use crate::images::services::{decode_image, delete_photo, upload_meal_photo, DecodedImage};
use crate::nutrition::{
    item_from_reference, recalculate_meal, reference, rescale_item, round1, Confidence, FoodItem,
    ItemsOrigin, NutritionReference,
};
use crate::profile::services::get_profile;
use crate::state::AppState;

/// Upper bound for a single ingredient portion.
pub const MAX_ITEM_GRAMS: u32 = 5000;
/// Upper bound for any per-100 g value (pure fat is 900 kcal).
const MAX_PER_100G: f64 = 1000.0;
/// Upper bound for any absolute item value, enough for 5 kg of pure fat.
const MAX_ITEM_VALUE: f64 = 50_000.0;
const HISTORY_CONTEXT_MEALS: usize = 3;

/// Items of the most recent meals, as prompt context for the AI.
pub fn history_context(meals: &[MealAnalysis]) -> String {
    meals
        .iter()
        .take(HISTORY_CONTEXT_MEALS)
        .map(|m| {
            m.items()
                .iter()
                .map(|i| format!("{}: {}", i.name, i.amount))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Cached or fresh AI estimate for an image. The bool is true on a cache hit.
#[instrument(skip(st, image), fields(content_type = %image.content_type))]
pub async fn analyze_image(
    st: &AppState,
    image: &DecodedImage,
    language: Option<Language>,
) -> Result<(MealEstimate, bool), AppError> {
    let hash = image.content_hash();
    match repo::cached_analysis(st.kv.as_ref(), &hash).await {
        Ok(Some(raw)) => match meal_estimate_from(&raw) {
            Ok(estimate) => {
                debug!(%hash, "analysis served from cache");
                return Ok((estimate, true));
            }
            Err(e) => warn!(%hash, error = %e, "ignoring unusable cache entry"),
        },
        Ok(None) => {}
        Err(e) => warn!(%hash, error = ?e, "analysis cache read failed"),
    }

    let language = match language {
        Some(l) => l,
        None => get_profile(st).await?.language,
    };
    let context = history_context(&repo::load_history(st.kv.as_ref()).await?);

    let raw = st.ai.analyze_meal(image.payload(), language, &context).await?;
    let estimate = meal_estimate_from(&raw)?;
    info!(%hash, items = estimate.items.len(), %language, "meal analyzed");

    if let Err(e) = repo::cache_analysis(st.kv.as_ref(), &hash, &raw).await {
        warn!(%hash, error = ?e, "analysis cache write failed");
    }
    Ok((estimate, false))
}

pub async fn analyze(
    st: &AppState,
    raw_image: &str,
    language: Option<Language>,
) -> Result<AnalysisDraft, AppError> {
    let image = decode_image(raw_image)?;
    let (estimate, cached) = analyze_image(st, &image, language).await?;
    Ok(AnalysisDraft::new(estimate, cached))
}

#[instrument(skip(st, req))]
pub async fn confirm_meal(st: &AppState, req: ConfirmMealRequest) -> Result<MealAnalysis, AppError> {
    let image = decode_image(&req.image)?;
    if let Some(items) = &req.items {
        validate_items(items)?;
    }
    let (estimate, _) = analyze_image(st, &image, req.language).await?;
    let items = req.items.unwrap_or_else(|| estimate.items.clone());

    let id = Uuid::new_v4();
    let key = upload_meal_photo(st, id, &image).await?;
    let meal = MealAnalysis::new(
        id,
        OffsetDateTime::now_utc(),
        key,
        estimate,
        items,
        normalize_label(req.user_label),
    );

    let saved = {
        let _guard = st.history_lock.lock().await;
        match repo::load_history(st.kv.as_ref()).await {
            Ok(mut meals) => {
                meals.insert(0, meal.clone());
                repo::save_history(st.kv.as_ref(), &meals).await
            }
            Err(e) => Err(e),
        }
    };
    if let Err(e) = saved {
        if let Err(cleanup) = delete_photo(st, &meal.image).await {
            warn!(%id, error = ?cleanup, "orphaned photo after failed save");
        }
        return Err(e.into());
    }

    info!(%id, calories = meal.calories(), adjusted = meal.is_adjusted(), "meal saved");
    Ok(meal)
}

pub async fn list_meals(st: &AppState) -> Result<Vec<MealAnalysis>, AppError> {
    Ok(repo::load_history(st.kv.as_ref()).await?)
}

pub async fn get_meal(st: &AppState, id: Uuid) -> Result<MealAnalysis, AppError> {
    repo::load_history(st.kv.as_ref())
        .await?
        .into_iter()
        .find(|m| m.id == id)
        .ok_or_else(|| AppError::meal_not_found(id))
}

#[instrument(skip(st))]
pub async fn delete_meal(st: &AppState, id: Uuid) -> Result<(), AppError> {
    let removed = {
        let _guard = st.history_lock.lock().await;
        let mut meals = repo::load_history(st.kv.as_ref()).await?;
        let pos = meals
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| AppError::meal_not_found(id))?;
        let removed = meals.remove(pos);
        repo::save_history(st.kv.as_ref(), &meals).await?;
        removed
    };

    if let Err(e) = delete_photo(st, &removed.image).await {
        warn!(%id, key = %removed.image, error = ?e, "photo delete failed");
    }
    info!(%id, "meal deleted");
    Ok(())
}

#[instrument(skip(st))]
pub async fn set_label(
    st: &AppState,
    id: Uuid,
    label: Option<String>,
) -> Result<MealAnalysis, AppError> {
    let label = normalize_label(label);
    mutate_meal(st, id, move |meal| {
        meal.user_label = label;
        Ok(())
    })
    .await
}

/// Appends a user-confirmed item. The reference comes from the request,
/// the static table or the AI, in that order.
#[instrument(skip(st, req), fields(name = %req.name, grams = req.grams))]
pub async fn add_item(st: &AppState, id: Uuid, req: AddItemRequest) -> Result<MealAnalysis, AppError> {
    let name = validate_name(&req.name)?;
    validate_grams(req.grams)?;
    if let Some(r) = &req.reference {
        validate_reference(r)?;
    }
    get_meal(st, id).await?;

    // resolved outside the history lock; the AI call can take seconds
    let per_100g = resolve_reference(st, &name, req.reference).await?;
    let item = item_from_reference(name, &per_100g, req.grams);

    let result = mutate_meal(st, id, move |meal| {
        let mut items = meal.items().to_vec();
        items.push(item);
        meal.apply(recalculate_meal(items, ItemsOrigin::UserEdited));
        Ok(())
    })
    .await;
    if matches!(result, Err(AppError::NotFound(_))) {
        warn!(%id, "meal removed while the item was resolved; item discarded");
    }
    result
}

#[instrument(skip(st, req), fields(grams = req.grams))]
pub async fn update_item(
    st: &AppState,
    id: Uuid,
    index: usize,
    req: UpdateItemRequest,
) -> Result<MealAnalysis, AppError> {
    validate_grams(req.grams)?;
    let new_name = req.name.as_deref().map(validate_name).transpose()?;
    if let Some(r) = &req.reference {
        validate_reference(r)?;
    }

    mutate_meal(st, id, move |meal| {
        let mut items = meal.items().to_vec();
        let current = items.get(index).ok_or_else(|| item_not_found(index))?;
        let name = new_name.unwrap_or_else(|| current.name.clone());
        let per_100g = req
            .reference
            .or_else(|| reference::find(&name).map(|f| f.per_100g));

        let replacement = match per_100g {
            Some(r) => item_from_reference(name, &r, req.grams),
            None => FoodItem {
                name,
                confidence: Some(Confidence::High),
                ..rescale_item(current, req.grams)
            },
        };
        items[index] = replacement;
        meal.apply(recalculate_meal(items, ItemsOrigin::UserEdited));
        Ok(())
    })
    .await
}

#[instrument(skip(st))]
pub async fn remove_item(st: &AppState, id: Uuid, index: usize) -> Result<MealAnalysis, AppError> {
    mutate_meal(st, id, move |meal| {
        let mut items = meal.items().to_vec();
        if index >= items.len() {
            return Err(item_not_found(index));
        }
        items.remove(index);
        meal.apply(recalculate_meal(items, ItemsOrigin::UserEdited));
        Ok(())
    })
    .await
}

#[instrument(skip(st))]
pub async fn restore_meal(st: &AppState, id: Uuid) -> Result<MealAnalysis, AppError> {
    mutate_meal(st, id, |meal| {
        let update = meal.restore_update();
        meal.apply(update);
        Ok(())
    })
    .await
}

/// Removes meals in `scope`; returns how many went.
#[instrument(skip(st))]
pub async fn clear_history(st: &AppState, scope: ClearScope) -> Result<usize, AppError> {
    let now = OffsetDateTime::now_utc();
    let _guard = st.history_lock.lock().await;
    if scope == ClearScope::All {
        // an undecodable history can still be dropped
        let removed = match repo::load_history(st.kv.as_ref()).await {
            Ok(meals) => meals.len(),
            Err(e) => {
                warn!(error = ?e, "clearing unreadable history");
                0
            }
        };
        repo::delete_history(st.kv.as_ref()).await?;
        info!(?scope, removed, "history cleared");
        return Ok(removed);
    }

    let mut meals = repo::load_history(st.kv.as_ref()).await?;
    let before = meals.len();
    match scope {
        ClearScope::All => {}
        ClearScope::Today => {
            let since = day_start(now);
            meals.retain(|m| m.created_at < since);
        }
        ClearScope::Week => {
            let since = now - Duration::days(7);
            meals.retain(|m| m.created_at < since);
        }
    }
    let removed = before - meals.len();
    repo::save_history(st.kv.as_ref(), &meals).await?;
    info!(?scope, removed, "history cleared");
    Ok(removed)
}

pub async fn daily_summary(st: &AppState) -> Result<DailySummary, AppError> {
    let goal = get_profile(st).await?.daily_goal;
    let meals = repo::load_history(st.kv.as_ref()).await?;
    Ok(summarize_day(&meals, day_start(OffsetDateTime::now_utc()), goal))
}

pub fn summarize_day(meals: &[MealAnalysis], since: OffsetDateTime, goal: u32) -> DailySummary {
    let today: Vec<&MealAnalysis> = meals.iter().filter(|m| m.created_at >= since).collect();
    let calories: i64 = today.iter().map(|m| m.calories()).sum();
    let sum = |f: fn(&MealAnalysis) -> f64| round1(today.iter().map(|m| f(m)).sum());
    let average_health_score = if today.is_empty() {
        0
    } else {
        let total: u32 = today.iter().map(|m| u32::from(m.health_score())).sum();
        (f64::from(total) / today.len() as f64).round() as u8
    };
    let progress_percent = if goal == 0 {
        0.0
    } else {
        round1((calories as f64 / f64::from(goal) * 100.0).clamp(0.0, 100.0))
    };

    DailySummary {
        meal_count: today.len(),
        calories,
        protein: sum(|m| m.macros().protein),
        carbs: sum(|m| m.macros().carbs),
        fat: sum(|m| m.macros().fat),
        average_health_score,
        goal,
        progress_percent,
    }
}

/// UTC midnight of the day containing `now`.
pub fn day_start(now: OffsetDateTime) -> OffsetDateTime {
    now.replace_time(Time::MIDNIGHT)
}

async fn mutate_meal<F>(st: &AppState, id: Uuid, f: F) -> Result<MealAnalysis, AppError>
where
    F: FnOnce(&mut MealAnalysis) -> Result<(), AppError>,
{
    let _guard = st.history_lock.lock().await;
    let mut meals = repo::load_history(st.kv.as_ref()).await?;
    let meal = meals
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or_else(|| AppError::meal_not_found(id))?;
    f(meal)?;
    let updated = meal.clone();
    repo::save_history(st.kv.as_ref(), &meals).await?;
    Ok(updated)
}

async fn resolve_reference(
    st: &AppState,
    name: &str,
    explicit: Option<NutritionReference>,
) -> Result<NutritionReference, AppError> {
    if let Some(r) = explicit {
        debug!("using client reference");
        return Ok(r);
    }
    if let Some(food) = reference::find(name) {
        debug!(matched = food.name, "using reference table");
        return Ok(food.per_100g);
    }
    debug!("asking AI for ingredient estimate");
    let raw = st.ai.estimate_ingredient(name).await?;
    Ok(reference_from(&raw)?)
}

fn validate_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("item name must not be blank".into()));
    }
    Ok(name.to_owned())
}

fn validate_grams(grams: u32) -> Result<(), AppError> {
    if !(1..=MAX_ITEM_GRAMS).contains(&grams) {
        return Err(AppError::BadRequest(format!(
            "grams must be between 1 and {MAX_ITEM_GRAMS}"
        )));
    }
    Ok(())
}

fn in_range(value: f64, max: f64) -> bool {
    value.is_finite() && (0.0..=max).contains(&value)
}

fn validate_reference(r: &NutritionReference) -> Result<(), AppError> {
    let values = [r.calories, r.protein, r.carbs, r.fat];
    if !values.iter().all(|v| in_range(*v, MAX_PER_100G)) {
        return Err(AppError::BadRequest(format!(
            "reference values must be numbers between 0 and {MAX_PER_100G}"
        )));
    }
    Ok(())
}

fn validate_items(items: &[FoodItem]) -> Result<(), AppError> {
    if items.iter().any(|i| i.name.trim().is_empty()) {
        return Err(AppError::BadRequest("every item needs a name".into()));
    }
    let out_of_range = items.iter().any(|i| {
        ![i.calories, i.protein, i.carbs, i.fat]
            .iter()
            .all(|v| in_range(*v, MAX_ITEM_VALUE))
    });
    if out_of_range {
        return Err(AppError::BadRequest(format!(
            "item values must be numbers between 0 and {MAX_ITEM_VALUE}"
        )));
    }
    Ok(())
}

fn normalize_label(label: Option<String>) -> Option<String> {
    label
        .map(|l| l.trim().to_owned())
        .filter(|l| !l.is_empty())
}

fn item_not_found(index: usize) -> AppError {
    AppError::NotFound(format!("Item {index} not found"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ai::AiError;
    use crate::kv::{KvStore, HISTORY_KEY};
    use crate::test_support::{sample_analysis, FakeStorage, StubAi, PNG_DATA_URL};

    fn confirm_request(items: Option<Vec<FoodItem>>) -> ConfirmMealRequest {
        ConfirmMealRequest {
            image: PNG_DATA_URL.into(),
            items,
            user_label: None,
            language: None,
        }
    }

    fn add_request(name: &str, grams: u32) -> AddItemRequest {
        AddItemRequest {
            name: name.into(),
            grams,
            reference: None,
        }
    }

    fn meal_at(created_at: OffsetDateTime) -> MealAnalysis {
        let estimate = meal_estimate_from(&sample_analysis()).unwrap();
        let items = estimate.items.clone();
        MealAnalysis::new(Uuid::new_v4(), created_at, "meals/old.png".into(), estimate, items, None)
    }

    #[tokio::test]
    async fn second_analysis_of_same_image_is_cached() {
        let ai = Arc::new(StubAi::default());
        let st = AppState::fake_with_ai(ai.clone());

        let first = analyze(&st, PNG_DATA_URL, None).await.unwrap();
        let second = analyze(&st, PNG_DATA_URL, None).await.unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(ai.analyze_count(), 1);
        assert_eq!(first.calories, 378);
        assert_eq!(first.health_score, 80);
        assert_eq!(first.total_grams, 250);
        assert_eq!(first.macros.fiber, Some(1.2));
        assert_eq!(second.items, first.items);
    }

    #[tokio::test]
    async fn missing_key_surfaces_as_ai_error() {
        let st = AppState::fake_with_ai(Arc::new(StubAi::failing(|| AiError::MissingApiKey)));
        let err = analyze(&st, PNG_DATA_URL, None).await.unwrap_err();
        assert!(matches!(err, AppError::Ai(AiError::MissingApiKey)));
    }

    #[tokio::test]
    async fn confirming_unmodified_analysis_is_not_adjusted() {
        let ai = Arc::new(StubAi::default());
        let storage = FakeStorage::default();
        let st = AppState::fake_with(storage.clone(), ai.clone());

        analyze(&st, PNG_DATA_URL, None).await.unwrap();
        let meal = confirm_meal(&st, confirm_request(None)).await.unwrap();

        assert!(!meal.is_adjusted());
        assert_eq!(meal.items(), meal.ai_original_items());
        assert_eq!(meal.image, format!("meals/{}.png", meal.id));
        assert!(storage.contains(&meal.image));
        assert_eq!(ai.analyze_count(), 1);
        assert_eq!(list_meals(&st).await.unwrap(), vec![meal]);
    }

    #[tokio::test]
    async fn confirming_edited_items_is_adjusted() {
        let st = AppState::fake();
        let estimate = meal_estimate_from(&sample_analysis()).unwrap();
        let edited = vec![estimate.items[0].clone()];

        let meal = confirm_meal(&st, confirm_request(Some(edited))).await.unwrap();
        assert!(meal.is_adjusted());
        assert_eq!(meal.calories(), 248);
        assert_eq!(meal.ai_original_items(), estimate.items.as_slice());
    }

    #[tokio::test]
    async fn newest_meal_comes_first_and_feeds_history_context() {
        let st = AppState::fake();
        let first = confirm_meal(&st, confirm_request(None)).await.unwrap();
        let second = confirm_meal(
            &st,
            ConfirmMealRequest {
                user_label: Some("  Jantar  ".into()),
                ..confirm_request(None)
            },
        )
        .await
        .unwrap();

        let meals = list_meals(&st).await.unwrap();
        assert_eq!(meals[0].id, second.id);
        assert_eq!(meals[1].id, first.id);
        assert_eq!(second.user_label.as_deref(), Some("Jantar"));
        assert_eq!(
            history_context(&meals[..1]),
            "Frango Grelhado: 150g, Arroz Branco Cozido: 100g"
        );
    }

    #[test]
    fn history_context_uses_three_latest_meals() {
        let now = OffsetDateTime::now_utc();
        let meals: Vec<_> = (0..5).map(|_| meal_at(now)).collect();
        let context = history_context(&meals);
        assert_eq!(context.matches(" | ").count(), 2);
        assert_eq!(history_context(&[]), "");
    }

    #[tokio::test]
    async fn add_item_prefers_reference_table() {
        let ai = Arc::new(StubAi::default());
        let st = AppState::fake_with_ai(ai.clone());
        let meal = confirm_meal(&st, confirm_request(None)).await.unwrap();

        let updated = add_item(&st, meal.id, add_request("arroz", 200)).await.unwrap();
        let added = updated.items().last().unwrap();
        assert_eq!(added.name, "arroz");
        assert_eq!(added.amount, "200g");
        assert_eq!(added.calories, 260.0);
        assert_eq!(added.confidence, Some(Confidence::High));
        assert_eq!(updated.calories(), 638);
        assert!(updated.is_adjusted());
        assert_eq!(ai.estimate_count(), 0);
    }

    #[tokio::test]
    async fn add_item_falls_back_to_ai_estimate() {
        let ai = Arc::new(StubAi::default());
        let st = AppState::fake_with_ai(ai.clone());
        let meal = confirm_meal(&st, confirm_request(None)).await.unwrap();

        let updated = add_item(&st, meal.id, add_request("Quinoa Real", 150)).await.unwrap();
        let added = updated.items().last().unwrap();
        assert_eq!(added.calories, 180.0);
        assert_eq!(added.protein, 6.6);
        assert_eq!(ai.estimate_count(), 1);
    }

    #[tokio::test]
    async fn add_item_uses_explicit_reference() {
        let ai = Arc::new(StubAi::default());
        let st = AppState::fake_with_ai(ai.clone());
        let meal = confirm_meal(&st, confirm_request(None)).await.unwrap();

        let req = AddItemRequest {
            reference: Some(NutritionReference::new(50.0, 1.0, 10.0, 0.5)),
            ..add_request("Salada da Casa", 80)
        };
        let updated = add_item(&st, meal.id, req).await.unwrap();
        assert_eq!(updated.items().last().unwrap().calories, 40.0);
        assert_eq!(ai.estimate_count(), 0);
    }

    #[tokio::test]
    async fn add_item_validates_input() {
        let st = AppState::fake();
        let meal = confirm_meal(&st, confirm_request(None)).await.unwrap();

        for req in [add_request("Ovo", 0), add_request("Ovo", 5001), add_request("  ", 50)] {
            let err = add_item(&st, meal.id, req).await.unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
        let bad_ref = AddItemRequest {
            reference: Some(NutritionReference::new(-1.0, 0.0, 0.0, 0.0)),
            ..add_request("Ovo", 50)
        };
        assert!(matches!(
            add_item(&st, meal.id, bad_ref).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            add_item(&st, Uuid::new_v4(), add_request("Ovo", 50)).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(get_meal(&st, meal.id).await.unwrap(), meal);
    }

    #[tokio::test]
    async fn oversized_items_are_rejected_and_history_stays_readable() {
        let st = AppState::fake();
        let mut huge = meal_estimate_from(&sample_analysis()).unwrap().items;
        huge[0].protein = 1e308;
        huge[1].protein = 1e308;
        assert!(matches!(
            confirm_meal(&st, confirm_request(Some(huge))).await,
            Err(AppError::BadRequest(_))
        ));

        let mut negative = meal_estimate_from(&sample_analysis()).unwrap().items;
        negative[0].fat = -1.0;
        assert!(matches!(
            confirm_meal(&st, confirm_request(Some(negative))).await,
            Err(AppError::BadRequest(_))
        ));

        let meal = confirm_meal(&st, confirm_request(None)).await.unwrap();
        let req = AddItemRequest {
            reference: Some(NutritionReference::new(1e307, 1e307, 0.0, 0.0)),
            ..add_request("Ovo", MAX_ITEM_GRAMS)
        };
        assert!(matches!(add_item(&st, meal.id, req).await, Err(AppError::BadRequest(_))));
        assert_eq!(list_meals(&st).await.unwrap(), vec![meal]);
    }

    #[tokio::test]
    async fn history_with_null_numbers_still_loads() {
        let st = AppState::fake();
        let meal = confirm_meal(&st, confirm_request(None)).await.unwrap();

        let mut raw = st.kv.get(HISTORY_KEY).await.unwrap().unwrap();
        raw[0]["macros"]["protein"] = serde_json::Value::Null;
        raw[0]["items"][0]["calories"] = serde_json::Value::Null;
        st.kv.set(HISTORY_KEY, raw).await.unwrap();

        let meals = list_meals(&st).await.unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].id, meal.id);
        assert_eq!(meals[0].macros().protein, 0.0);
        assert_eq!(meals[0].items()[0].calories, 0.0);
    }

    #[tokio::test]
    async fn estimate_for_deleted_meal_is_discarded() {
        let (stub, entered, release) = StubAi::gated();
        let st = AppState::fake_with_ai(Arc::new(stub));
        let meal = confirm_meal(&st, confirm_request(None)).await.unwrap();

        let task = {
            let st = st.clone();
            tokio::spawn(async move { add_item(&st, meal.id, add_request("Quinoa Real", 100)).await })
        };
        entered.notified().await;
        delete_meal(&st, meal.id).await.unwrap();
        release.notify_one();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(list_meals(&st).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_item_with_table_hit_rescales_from_reference() {
        let st = AppState::fake();
        let meal = confirm_meal(&st, confirm_request(None)).await.unwrap();

        let req = UpdateItemRequest {
            grams: 200,
            name: None,
            reference: None,
        };
        let updated = update_item(&st, meal.id, 0, req).await.unwrap();
        let item = &updated.items()[0];
        assert_eq!(item.amount, "200g");
        assert_eq!(item.calories, 330.0);
        assert_eq!(item.protein, 62.0);
        assert_eq!(item.confidence, Some(Confidence::High));
        assert!(updated.is_adjusted());
    }

    #[tokio::test]
    async fn update_item_without_reference_rescales_item() {
        let st = AppState::fake();
        let meal = confirm_meal(&st, confirm_request(None)).await.unwrap();
        add_item(&st, meal.id, add_request("Quinoa Real", 100)).await.unwrap();

        let req = UpdateItemRequest {
            grams: 50,
            name: Some("Quinoa Vermelha".into()),
            reference: None,
        };
        let updated = update_item(&st, meal.id, 2, req).await.unwrap();
        let item = &updated.items()[2];
        assert_eq!(item.name, "Quinoa Vermelha");
        assert_eq!(item.amount, "50g");
        assert_eq!(item.calories, 60.0);
        assert_eq!(item.protein, 2.2);
    }

    #[tokio::test]
    async fn item_index_out_of_range_is_not_found() {
        let st = AppState::fake();
        let meal = confirm_meal(&st, confirm_request(None)).await.unwrap();
        let req = UpdateItemRequest {
            grams: 100,
            name: None,
            reference: None,
        };
        assert!(matches!(
            update_item(&st, meal.id, 9, req).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            remove_item(&st, meal.id, 2).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn restore_after_edits_returns_ai_state() {
        let st = AppState::fake();
        let meal = confirm_meal(&st, confirm_request(None)).await.unwrap();

        remove_item(&st, meal.id, 0).await.unwrap();
        add_item(&st, meal.id, add_request("Ovo Frito", 50)).await.unwrap();
        let edited = get_meal(&st, meal.id).await.unwrap();
        assert!(edited.is_adjusted());
        assert_ne!(edited.calories(), meal.calories());

        let restored = restore_meal(&st, meal.id).await.unwrap();
        assert!(!restored.is_adjusted());
        assert_eq!(restored.items(), meal.ai_original_items());
        assert_eq!(restored.calories(), meal.calories());
        assert_eq!(restored.health_score(), meal.health_score());
    }

    #[tokio::test]
    async fn blank_label_clears_it() {
        let st = AppState::fake();
        let meal = confirm_meal(&st, confirm_request(None)).await.unwrap();

        let labeled = set_label(&st, meal.id, Some("Almoço".into())).await.unwrap();
        assert_eq!(labeled.display_name(), "Almoço");
        let cleared = set_label(&st, meal.id, Some("   ".into())).await.unwrap();
        assert_eq!(cleared.user_label, None);
        assert_eq!(cleared.display_name(), "Frango com Arroz");
    }

    #[tokio::test]
    async fn delete_removes_meal_and_photo() {
        let storage = FakeStorage::default();
        let st = AppState::fake_with(storage.clone(), Arc::new(StubAi::default()));
        let meal = confirm_meal(&st, confirm_request(None)).await.unwrap();
        assert_eq!(storage.len(), 1);

        delete_meal(&st, meal.id).await.unwrap();
        assert_eq!(storage.len(), 0);
        assert!(matches!(get_meal(&st, meal.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(delete_meal(&st, meal.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn clear_scopes() {
        let st = AppState::fake();
        let now = OffsetDateTime::now_utc();
        let meals = vec![
            meal_at(now),
            meal_at(day_start(now) - Duration::hours(1)),
            meal_at(now - Duration::days(30)),
        ];
        repo::save_history(st.kv.as_ref(), &meals).await.unwrap();

        assert_eq!(clear_history(&st, ClearScope::Today).await.unwrap(), 1);
        assert_eq!(clear_history(&st, ClearScope::Week).await.unwrap(), 1);
        let left = list_meals(&st).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, meals[2].id);
        assert_eq!(clear_history(&st, ClearScope::All).await.unwrap(), 1);
        assert!(list_meals(&st).await.unwrap().is_empty());
        assert!(st.kv.get(HISTORY_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_all_drops_unreadable_history() {
        let st = AppState::fake();
        st.kv.set(HISTORY_KEY, serde_json::json!({"not": "a list"})).await.unwrap();
        assert!(list_meals(&st).await.is_err());

        assert_eq!(clear_history(&st, ClearScope::All).await.unwrap(), 0);
        assert!(list_meals(&st).await.unwrap().is_empty());
    }

    #[test]
    fn summary_counts_only_todays_meals() {
        let now = OffsetDateTime::now_utc();
        let since = day_start(now);
        let meals = vec![meal_at(now), meal_at(now), meal_at(since - Duration::minutes(1))];

        let summary = summarize_day(&meals, since, 2200);
        assert_eq!(summary.meal_count, 2);
        assert_eq!(summary.calories, 756);
        assert_eq!(summary.protein, 98.4);
        assert_eq!(summary.carbs, 56.0);
        assert_eq!(summary.fat, 11.4);
        assert_eq!(summary.average_health_score, 80);
        assert_eq!(summary.progress_percent, 34.4);
    }

    #[test]
    fn summary_progress_is_capped_and_guarded() {
        let now = OffsetDateTime::now_utc();
        let meals = vec![meal_at(now)];
        assert_eq!(summarize_day(&meals, day_start(now), 100).progress_percent, 100.0);
        assert_eq!(summarize_day(&meals, day_start(now), 0).progress_percent, 0.0);

        let empty = summarize_day(&[], day_start(now), 2200);
        assert_eq!(empty.meal_count, 0);
        assert_eq!(empty.average_health_score, 0);
        assert_eq!(empty.progress_percent, 0.0);
    }

    #[test]
    fn day_start_is_utc_midnight() {
        let now = time::macros::datetime!(2024-03-10 17:45:12 UTC);
        assert_eq!(day_start(now), time::macros::datetime!(2024-03-10 00:00 UTC));
    }
}
