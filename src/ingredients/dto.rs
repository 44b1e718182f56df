use serde::{Deserialize, Serialize};

use crate::nutrition::NutritionReference;

fn default_limit() -> usize {
    6
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientEstimate {
    pub name: String,
    pub per_100g: NutritionReference,
    pub source: ReferenceSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceSource {
    Table,
    Ai,
}
