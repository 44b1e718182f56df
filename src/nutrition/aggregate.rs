use serde::Serialize;

use super::quantity::parse_grams;
use super::types::{finite_or_zero, round1, FoodItem, Macros};

/// Meal-level sums of an item list.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
pub struct Totals {
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Totals {
    pub fn macros(&self) -> Macros {
        Macros {
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            fiber: None,
        }
    }
}

/// Sums first, rounds once at the end.
pub fn aggregate(items: &[FoodItem]) -> Totals {
    let (calories, protein, carbs, fat) =
        items
            .iter()
            .fold((0.0, 0.0, 0.0, 0.0), |(cal, p, c, f), item| {
                (
                    cal + finite_or_zero(item.calories),
                    p + finite_or_zero(item.protein),
                    c + finite_or_zero(item.carbs),
                    f + finite_or_zero(item.fat),
                )
            });

    // finite inputs can still overflow to infinity when summed
    Totals {
        calories: finite_or_zero(calories).round() as i64,
        protein: finite_or_zero(round1(protein)),
        carbs: finite_or_zero(round1(carbs)),
        fat: finite_or_zero(round1(fat)),
    }
}

/// Display-only weight of the plate.
pub fn total_grams(items: &[FoodItem]) -> u64 {
    items
        .iter()
        .map(|item| u64::from(parse_grams(&item.amount)))
        .sum()
}
