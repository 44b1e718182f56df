use crate::kv::{self, KvStore, PROFILE_KEY};
use crate::profile::dto::UserProfile;

pub async fn load_profile(kv: &dyn KvStore) -> anyhow::Result<UserProfile> {
    Ok(kv::get_json(kv, PROFILE_KEY).await?.unwrap_or_default())
}

pub async fn save_profile(kv: &dyn KvStore, profile: &UserProfile) -> anyhow::Result<()> {
    kv::set_json(kv, PROFILE_KEY, profile).await
}
