//! Allergen matching against the user's profile.
//!
//! Names are compared after normalization (lower-case, every whitespace run
//! collapsed to one `_`) and a product allergen matches when its normalized
//! form *contains* a normalized profile entry, so "Nonfat  Milk" matches the
//! profile entry "milk".

use crate::domain::model::AllergenMatchResult;
use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

pub fn normalize_allergen(name: &str) -> String {
    WHITESPACE_RUN
        .replace_all(&name.to_lowercase(), "_")
        .into_owned()
}

/// Partition `product_allergens` into `matching` / `other`.
///
/// Both buckets keep input order and duplicates are kept as-is.
pub fn match_allergens<P, A>(user_profile: &[P], product_allergens: &[A]) -> AllergenMatchResult
where
    P: AsRef<str>,
    A: AsRef<str>,
{
    let needles: Vec<String> = user_profile
        .iter()
        .map(|id| normalize_allergen(id.as_ref()))
        .collect();

    let mut result = AllergenMatchResult::default();
    for allergen in product_allergens {
        let allergen = allergen.as_ref();
        let normalized = normalize_allergen(allergen);
        if needles.iter().any(|needle| normalized.contains(needle.as_str())) {
            result.matching.push(allergen.to_string());
        } else {
            result.other.push(allergen.to_string());
        }
    }
    result
}

/// Title-cases every space separated word ("tree NUTS" -> "Tree Nuts").
pub fn display_name(allergen: &str) -> String {
    allergen
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
