use lazy_static::lazy_static;
use regex::Regex;

use super::types::{finite_or_zero, round1, Confidence, FoodItem, NutritionReference, ScaledNutrition};

/// Grams assumed when an amount string carries no digits.
pub const DEFAULT_GRAMS: u32 = 100;

lazy_static! {
    static ref DIGITS_RE: Regex = Regex::new(r"[0-9]+").unwrap();
}

/// Leading digit run of a free-text amount ("150g" -> 150). Text without
/// digits falls back to [`DEFAULT_GRAMS`].
pub fn parse_grams(amount: &str) -> u32 {
    DIGITS_RE
        .find(amount)
        .map(|m| m.as_str().parse::<u32>().unwrap_or(u32::MAX))
        .unwrap_or(DEFAULT_GRAMS)
}

pub fn format_amount(grams: u32) -> String {
    format!("{grams}g")
}

pub fn scale_reference(reference: &NutritionReference, grams: u32) -> ScaledNutrition {
    let multiplier = f64::from(grams) / 100.0;
    let scaled = |per_100g: f64| finite_or_zero(finite_or_zero(per_100g) * multiplier);
    ScaledNutrition {
        calories: scaled(reference.calories).round() as i64,
        protein: round1(scaled(reference.protein)),
        carbs: round1(scaled(reference.carbs)),
        fat: round1(scaled(reference.fat)),
    }
}

/// Resizes an already-scaled item by recovering its implied per-100 g
/// reference. Lossy: the stored values were rounded when they were scaled.
pub fn rescale_item(item: &FoodItem, new_grams: u32) -> FoodItem {
    let original_grams = match parse_grams(&item.amount) {
        0 => DEFAULT_GRAMS,
        grams => grams,
    };
    let divisor = f64::from(original_grams) / 100.0;
    let reference = NutritionReference::new(
        finite_or_zero(item.calories) / divisor,
        finite_or_zero(item.protein) / divisor,
        finite_or_zero(item.carbs) / divisor,
        finite_or_zero(item.fat) / divisor,
    );
    scale_reference(&reference, new_grams).into_item(
        item.name.clone(),
        format_amount(new_grams),
        item.confidence,
    )
}

/// Builds a user-confirmed item from a per-100 g reference.
pub fn item_from_reference(
    name: impl Into<String>,
    reference: &NutritionReference,
    grams: u32,
) -> FoodItem {
    scale_reference(reference, grams).into_item(
        name.into(),
        format_amount(grams),
        Some(Confidence::High),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> NutritionReference {
        NutritionReference::new(100.0, 10.0, 10.0, 10.0)
    }

    #[test]
    fn parse_grams_takes_first_digit_run() {
        assert_eq!(parse_grams("150g"), 150);
        assert_eq!(parse_grams("approx. 80 g (1 cup)"), 80);
        assert_eq!(parse_grams("0g"), 0);
    }

    #[test]
    fn parse_grams_defaults_without_digits() {
        assert_eq!(parse_grams("about 2 cups"), 2);
        assert_eq!(parse_grams("a handful"), 100);
        assert_eq!(parse_grams(""), 100);
    }

    #[test]
    fn parse_grams_saturates_huge_numbers() {
        assert_eq!(parse_grams("99999999999999999999g"), u32::MAX);
    }

    #[test]
    fn parse_grams_ignores_non_ascii_digits() {
        assert_eq!(parse_grams("١٥٠g"), 100);
    }

    #[test]
    fn scale_half_portion() {
        let scaled = scale_reference(&reference(), 50);
        assert_eq!(scaled.calories, 50);
        assert_eq!(format!("{:.1}", scaled.protein), "5.0");
        assert_eq!(format!("{:.1}", scaled.carbs), "5.0");
        assert_eq!(format!("{:.1}", scaled.fat), "5.0");
    }

    #[test]
    fn scale_rounds_calories_to_integer_and_macros_to_one_decimal() {
        let chicken = NutritionReference::new(165.0, 31.0, 0.0, 3.6);
        let scaled = scale_reference(&chicken, 150);
        assert_eq!(scaled.calories, 248);
        assert_eq!(scaled.protein, 46.5);
        assert_eq!(scaled.fat, 5.4);
        let json = serde_json::to_string(&scaled).unwrap();
        assert_eq!(json, r#"{"calories":248,"protein":46.5,"carbs":0,"fat":5.4}"#);
    }

    #[test]
    fn scale_zero_grams_is_all_zero() {
        let scaled = scale_reference(&reference(), 0);
        assert_eq!(scaled.calories, 0);
        assert_eq!(scaled.protein, 0.0);
        assert_eq!(scaled.carbs, 0.0);
        assert_eq!(scaled.fat, 0.0);
    }

    #[test]
    fn scale_overflow_is_zeroed() {
        let scaled = scale_reference(&NutritionReference::new(f64::MAX, 1e307, 10.0, 0.0), 5000);
        assert_eq!(scaled.calories, 0);
        assert_eq!(scaled.protein, 0.0);
        assert_eq!(scaled.carbs, 500.0);
    }

    #[test]
    fn rescale_with_same_grams_is_stable() {
        let item = item_from_reference("Arroz", &NutritionReference::new(130.0, 2.7, 28.0, 0.3), 200);
        let again = rescale_item(&item, 200);
        assert_eq!(again, item);
    }

    #[test]
    fn rescale_doubles_portion() {
        let item = FoodItem {
            name: "Feijão Preto Cozido".into(),
            amount: "100g".into(),
            calories: 91.0,
            protein: 6.0,
            carbs: 14.0,
            fat: 0.5,
            confidence: Some(Confidence::Medium),
        };
        let doubled = rescale_item(&item, 200);
        assert_eq!(doubled.amount, "200g");
        assert_eq!(doubled.calories, 182.0);
        assert_eq!(doubled.protein, 12.0);
        assert_eq!(doubled.carbs, 28.0);
        assert_eq!(doubled.fat, 1.0);
        assert_eq!(doubled.name, item.name);
        assert_eq!(doubled.confidence, Some(Confidence::Medium));
    }

    #[test]
    fn rescale_treats_zero_gram_amount_as_hundred() {
        let item = FoodItem {
            name: "Mystery".into(),
            amount: "0g".into(),
            calories: 50.0,
            protein: 1.0,
            carbs: 1.0,
            fat: 1.0,
            confidence: None,
        };
        let resized = rescale_item(&item, 200);
        assert_eq!(resized.calories, 100.0);
        assert_eq!(resized.protein, 2.0);
    }

    #[test]
    fn item_from_reference_is_user_confirmed() {
        let item = item_from_reference("Ovo Cozido", &NutritionReference::new(155.0, 13.0, 1.1, 11.0), 50);
        assert_eq!(item.amount, "50g");
        assert_eq!(item.calories, 78.0);
        assert_eq!(item.confidence, Some(Confidence::High));
    }
}
