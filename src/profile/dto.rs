use serde::{Deserialize, Serialize};

use crate::ai::Language;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Metric,
    Imperial,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    /// Daily calorie goal, kcal.
    pub daily_goal: u32,
    #[serde(default)]
    pub unit: Unit,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub theme: Theme,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "Explorador".into(),
            daily_goal: 2200,
            unit: Unit::Metric,
            language: Language::PtBr,
            theme: Theme::System,
        }
    }
}

/// Partial update; absent fields keep their value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub daily_goal: Option<u32>,
    pub unit: Option<Unit>,
    pub language: Option<Language>,
    pub theme: Option<Theme>,
}
