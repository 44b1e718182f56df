use unicode_normalization::UnicodeNormalization;

/// Lowercases and strips combining diacritics ("Brócolis" -> "brocolis").
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect::<String>()
        .to_lowercase()
}
