//! Static per-100 g reference table used for ingredient search and for
//! resolving user-entered items without an AI round trip.

use serde::Serialize;

use super::text::fold;
use super::types::NutritionReference;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FoodReference {
    pub name: &'static str,
    pub synonyms: &'static [&'static str],
    #[serde(rename = "per100g")]
    pub per_100g: NutritionReference,
}

const fn food(
    name: &'static str,
    synonyms: &'static [&'static str],
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
) -> FoodReference {
    FoodReference {
        name,
        synonyms,
        per_100g: NutritionReference::new(calories, protein, carbs, fat),
    }
}

pub static FOODS: &[FoodReference] = &[
    // proteins
    food("Frango Grelhado", &["grilled chicken", "peito de frango"], 165.0, 31.0, 0.0, 3.6),
    food("Frango Cozido", &["boiled chicken", "frango desfiado"], 150.0, 28.0, 0.0, 4.0),
    food("Peito de Frango Assado", &["roast chicken breast"], 195.0, 30.0, 0.0, 7.7),
    food("Bife de Carne Bovina (Patinho)", &["beef steak", "bife"], 220.0, 32.0, 0.0, 9.0),
    food("Carne Moída (Acém)", &["ground beef", "carne moida"], 212.0, 26.0, 0.0, 12.0),
    food("Picanha Grelhada", &["picanha", "grilled rump cap"], 238.0, 24.0, 0.0, 15.0),
    food("Ovo Cozido", &["boiled egg", "ovo"], 155.0, 13.0, 1.1, 11.0),
    food("Ovo Frito", &["fried egg"], 196.0, 13.0, 0.8, 15.0),
    food("Omelete Simples", &["omelette", "omelet"], 154.0, 11.0, 0.6, 12.0),
    food("Salmão Grelhado", &["grilled salmon", "salmao"], 208.0, 20.0, 0.0, 13.0),
    food("Tilápia Grelhada", &["grilled tilapia", "peixe grelhado"], 128.0, 26.0, 0.0, 2.7),
    food("Atum Enlatado (Água)", &["canned tuna", "atum"], 116.0, 26.0, 0.0, 0.8),
    food("Camarão Cozido", &["boiled shrimp", "camarao"], 99.0, 24.0, 0.2, 0.3),
    food("Whey Protein (Pó)", &["whey"], 380.0, 80.0, 5.0, 4.0),
    // grains and starches
    food("Arroz Branco Cozido", &["white rice", "arroz"], 130.0, 2.7, 28.0, 0.3),
    food("Arroz Integral Cozido", &["brown rice"], 110.0, 2.6, 23.0, 0.9),
    food("Feijão Carioca Cozido", &["pinto beans", "feijao"], 76.0, 4.8, 14.0, 0.5),
    food("Feijão Preto Cozido", &["black beans"], 91.0, 6.0, 14.0, 0.5),
    food("Grão de Bico Cozido", &["chickpeas", "grao de bico"], 164.0, 8.9, 27.0, 2.6),
    food("Lentilha Cozida", &["lentils"], 116.0, 9.0, 20.0, 0.4),
    food("Macarrão Cozido", &["pasta", "espaguete", "spaghetti"], 158.0, 5.8, 31.0, 0.9),
    food("Macarrão Integral Cozido", &["whole wheat pasta"], 124.0, 5.3, 25.0, 1.1),
    food("Batata Doce Cozida", &["sweet potato"], 86.0, 1.6, 20.0, 0.1),
    food("Batata Inglesa Cozida", &["boiled potato", "batata"], 77.0, 2.0, 17.0, 0.1),
    food("Purê de Batata", &["mashed potatoes", "batata amassada"], 113.0, 2.0, 15.0, 4.2),
    food("Mandioca Cozida", &["aipim", "macaxeira", "cassava"], 160.0, 1.4, 38.0, 0.3),
    food("Cuscuz de Milho", &["cuscuz", "corn couscous"], 112.0, 2.3, 25.0, 0.2),
    food("Tapioca (Goma)", &["tapioca"], 240.0, 0.0, 60.0, 0.0),
    food("Aveia em Flocos", &["oats", "oatmeal", "aveia"], 389.0, 17.0, 66.0, 7.0),
    food("Pão Francês", &["french bread", "pao", "pãozinho"], 310.0, 9.0, 58.0, 3.0),
    food("Pão de Forma Integral", &["whole wheat bread"], 250.0, 10.0, 45.0, 4.0),
    food("Pão de Queijo", &["cheese bread"], 360.0, 10.0, 40.0, 18.0),
    // vegetables
    food("Alface Americana", &["lettuce", "alface"], 14.0, 0.9, 2.9, 0.1),
    food("Brócolis Cozido", &["broccoli", "brocolis"], 35.0, 2.4, 7.2, 0.4),
    food("Cenoura Crua", &["raw carrot", "cenoura"], 41.0, 0.9, 10.0, 0.2),
    food("Cenoura Cozida", &["boiled carrot"], 35.0, 0.8, 8.0, 0.2),
    food("Tomate Cereja", &["cherry tomato", "tomate"], 18.0, 0.9, 3.9, 0.2),
    food("Pepino", &["cucumber"], 15.0, 0.7, 3.6, 0.1),
    food("Abobrinha Cozida", &["zucchini", "abobrinha"], 17.0, 1.2, 3.1, 0.3),
    food("Espinafre Cozido", &["spinach", "espinafre"], 23.0, 3.0, 3.6, 0.4),
    food("Couve Refogada", &["sauteed kale", "couve"], 90.0, 3.0, 10.0, 5.0),
    food("Berinjela Grelhada", &["grilled eggplant", "berinjela"], 35.0, 1.0, 8.0, 0.2),
    food("Chuchu Cozido", &["chayote", "chuchu"], 19.0, 0.7, 4.5, 0.1),
    food("Abóbora Cozida", &["pumpkin", "abobora", "jerimum"], 26.0, 1.0, 6.5, 0.1),
    // fruits
    food("Banana Nanica", &["banana"], 92.0, 1.1, 24.0, 0.3),
    food("Banana Prata", &[], 89.0, 1.1, 23.0, 0.3),
    food("Maçã com Casca", &["apple", "maca"], 52.0, 0.3, 14.0, 0.2),
    food("Mamão Papaia", &["papaya", "mamao"], 43.0, 0.5, 11.0, 0.3),
    food("Abacate", &["avocado"], 160.0, 2.0, 9.0, 15.0),
    food("Morango", &["strawberry", "strawberries"], 33.0, 0.7, 8.0, 0.3),
    food("Uva Italiana", &["grapes", "uva"], 67.0, 0.6, 18.0, 0.4),
    food("Laranja Pêra", &["orange", "laranja"], 47.0, 0.9, 12.0, 0.1),
    food("Abacaxi", &["pineapple"], 50.0, 0.5, 13.0, 0.1),
    food("Melancia", &["watermelon"], 30.0, 0.6, 7.5, 0.2),
    food("Manga Palmer", &["mango", "manga"], 60.0, 0.8, 15.0, 0.4),
    // dairy, fats and others
    food("Leite Integral", &["whole milk", "leite"], 61.0, 3.2, 4.8, 3.3),
    food("Leite Desnatado", &["skim milk"], 35.0, 3.4, 5.0, 0.1),
    food("Queijo Muçarela", &["mozzarella", "mussarela"], 280.0, 25.0, 2.4, 20.0),
    food("Queijo Minas Frescal", &["queijo branco", "fresh cheese"], 243.0, 17.0, 3.2, 18.0),
    food("Iogurte Natural", &["plain yogurt", "iogurte"], 63.0, 3.5, 5.0, 3.5),
    food("Manteiga com Sal", &["butter", "manteiga"], 717.0, 0.8, 0.1, 81.0),
    food("Azeite de Oliva", &["olive oil", "azeite"], 884.0, 0.0, 0.0, 100.0),
    food("Pasta de Amendoim", &["peanut butter"], 588.0, 25.0, 20.0, 50.0),
    food("Castanha do Pará", &["brazil nut", "castanha"], 659.0, 14.0, 12.0, 66.0),
    food("Café sem Açúcar", &["black coffee", "cafe"], 2.0, 0.1, 0.0, 0.0),
];

impl FoodReference {
    fn folded_names(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(self.name)
            .chain(self.synonyms.iter().copied())
            .map(fold)
    }
}

/// Case- and accent-insensitive substring search over names and synonyms,
/// in table order.
pub fn search(query: &str, limit: usize) -> Vec<&'static FoodReference> {
    let needle = fold(query.trim());
    if needle.is_empty() {
        return Vec::new();
    }
    FOODS
        .iter()
        .filter(|food| food.folded_names().any(|n| n.contains(&needle)))
        .take(limit)
        .collect()
}

/// Exact lookup by name or synonym, ignoring case and accents.
pub fn find(name: &str) -> Option<&'static FoodReference> {
    let needle = fold(name.trim());
    if needle.is_empty() {
        return None;
    }
    FOODS
        .iter()
        .find(|food| food.folded_names().any(|n| n == needle))
}
