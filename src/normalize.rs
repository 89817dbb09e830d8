//! Address normalization shared by the DVF table and the lookup path.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize an address for exact matching.
///
/// Decomposes to base characters plus combining marks (NFKD), drops the
/// marks, keeps only `[A-Za-z0-9 ]`, uppercases and trims.
///
/// ```
/// use fiche::normalize::normalize;
///
/// assert_eq!(normalize("12 rue de l'Église, 75011 Paris"), "12 RUE DE LEGLISE 75011 PARIS");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(raw: &str) -> String {
    raw.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect::<String>()
        .to_ascii_uppercase()
        .trim()
        .to_string()
}
