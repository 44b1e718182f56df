//! Health score: a 0–100 estimate built from macro balance, caloric
//! density and a keyword check on ingredient names.
//!
//! The score is recomputed from scratch on every ingredient-list change.
//! It starts at a base of 30 and adds fixed bonuses or penalties:
//!
//! | term | condition | delta |
//! |---|---|---|
//! | protein share of macro kcal | 15–35 % / above 8 % / otherwise | +25 / +15 / +5 |
//! | fat share of macro kcal | 15–35 % / up to 45 % / otherwise | +20 / +10 / −5 |
//! | carbs | any macro kcal present | +15 |
//! | total kcal | 300–750 / 750–1000 / above 1000 | +10 / +5 / −15 |
//! | vegetable-like items | 5 per item | up to +15 |
//! | processed-like items | 10 per item | up to −30 |

use serde::Serialize;

use super::text::fold;
use super::types::{finite_or_zero, FoodItem};

const BASE_SCORE: f64 = 30.0;
const CARB_BONUS: f64 = 15.0;

const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_CARBS: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

const VEGETABLE_KEYWORDS: &[&str] = &[
    "alface", "lettuce", "salada", "salad", "brocolis", "broccoli", "cenoura", "carrot",
    "tomate", "tomato", "abobrinha", "zucchini", "squash", "espinafre", "spinach", "couve",
    "kale", "berinjela", "eggplant", "chuchu", "chayote", "abobora", "pumpkin", "legumes",
    "vegetais", "vegetables", "vagem", "green bean", "quiabo", "okra",
];

const PROCESSED_KEYWORDS: &[&str] = &[
    "linguica", "salsicha", "sausage", "presunto", "mortadela", "salame", "salami", "bacon",
    "empanado", "breaded", "frito", "frita", "fried", "refrigerante", "soda", "candy",
    "chocolate", "chips", "salgadinho", "sorvete", "ice cream", "hamburguer", "burger",
    "nuggets", "farofa",
];

/// Coarse label used by list and summary views.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl HealthBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Self::Excellent,
            60..=79 => Self::Good,
            40..=59 => Self::Fair,
            _ => Self::Poor,
        }
    }
}

pub fn estimate_health_score(items: &[FoodItem]) -> u8 {
    if items.is_empty() {
        return 0;
    }
    let total_calories: f64 = items.iter().map(|i| finite_or_zero(i.calories)).sum();
    if total_calories == 0.0 {
        return 0;
    }

    let grams = |field: fn(&FoodItem) -> f64| -> f64 {
        items.iter().map(|i| finite_or_zero(field(i))).sum()
    };
    let protein_kcal = grams(|i| i.protein) * KCAL_PER_G_PROTEIN;
    let carbs_kcal = grams(|i| i.carbs) * KCAL_PER_G_CARBS;
    let fat_kcal = grams(|i| i.fat) * KCAL_PER_G_FAT;
    let macro_kcal = protein_kcal + carbs_kcal + fat_kcal;

    let mut score = BASE_SCORE;
    if macro_kcal > 0.0 {
        score += protein_band(protein_kcal / macro_kcal);
        score += fat_band(fat_kcal / macro_kcal);
        // carbs are not banded, only rewarded
        score += CARB_BONUS;
    }
    score += density_adjustment(total_calories);
    score += ingredient_quality(items);

    score.clamp(0.0, 100.0).round() as u8
}

fn protein_band(share: f64) -> f64 {
    if (0.15..=0.35).contains(&share) {
        25.0
    } else if share > 0.08 {
        15.0
    } else {
        5.0
    }
}

fn fat_band(share: f64) -> f64 {
    if (0.15..=0.35).contains(&share) {
        20.0
    } else if share <= 0.45 {
        10.0
    } else {
        -5.0
    }
}

fn density_adjustment(total_calories: f64) -> f64 {
    if (300.0..=750.0).contains(&total_calories) {
        10.0
    } else if total_calories > 750.0 && total_calories <= 1000.0 {
        5.0
    } else if total_calories > 1000.0 {
        -15.0
    } else {
        0.0
    }
}

fn ingredient_quality(items: &[FoodItem]) -> f64 {
    let names: Vec<String> = items.iter().map(|i| fold(&i.name)).collect();
    let vegetables = names.iter().filter(|n| mentions_any(n, VEGETABLE_KEYWORDS)).count();
    let processed = names.iter().filter(|n| mentions_any(n, PROCESSED_KEYWORDS)).count();

    (vegetables as f64 * 5.0).min(15.0) - (processed as f64 * 10.0).min(30.0)
}

fn mentions_any(name: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| name.contains(k))
}
