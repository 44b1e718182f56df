use tracing::{info, instrument};

use super::dto::{ProfileUpdate, UserProfile};
use super::repo;
use crate::errors::AppError;
use crate::state::AppState;

#[instrument(skip(st))]
pub async fn get_profile(st: &AppState) -> Result<UserProfile, AppError> {
    Ok(repo::load_profile(st.kv.as_ref()).await?)
}

#[instrument(skip(st))]
pub async fn update_profile(st: &AppState, update: ProfileUpdate) -> Result<UserProfile, AppError> {
    if update.daily_goal == Some(0) {
        return Err(AppError::BadRequest("dailyGoal must be positive".into()));
    }
    let name = match update.name {
        Some(name) if name.trim().is_empty() => {
            return Err(AppError::BadRequest("name must not be blank".into()))
        }
        other => other.map(|n| n.trim().to_owned()),
    };

    let _guard = st.profile_lock.lock().await;
    let mut profile = repo::load_profile(st.kv.as_ref()).await?;
    if let Some(name) = name {
        profile.name = name;
    }
    if let Some(goal) = update.daily_goal {
        profile.daily_goal = goal;
    }
    if let Some(unit) = update.unit {
        profile.unit = unit;
    }
    if let Some(language) = update.language {
        profile.language = language;
    }
    if let Some(theme) = update.theme {
        profile.theme = theme;
    }
    repo::save_profile(st.kv.as_ref(), &profile).await?;
    info!(goal = profile.daily_goal, language = %profile.language, "profile updated");
    Ok(profile)
}
