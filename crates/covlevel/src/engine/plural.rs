//! CLDR plural categories per language.
//!
//! Used to fill a locale's `Target-Plurals` set when the supplemental data
//! does not list it. Categories are cached per thread per language.

use std::cell::RefCell;
use std::collections::BTreeSet;

use icu_locale_core::Locale;
use icu_plurals::{PluralCategory, PluralRuleType, PluralRules};

thread_local! {
    /// Per-thread cache of category sets keyed by language code.
    static CATEGORY_CACHE: RefCell<Vec<(String, BTreeSet<String>)>> = const { RefCell::new(Vec::new()) };
}

/// Translate a `PluralCategory` enum to its string representation.
fn category_str(category: PluralCategory) -> &'static str {
    match category {
        PluralCategory::Zero => "zero",
        PluralCategory::One => "one",
        PluralCategory::Two => "two",
        PluralCategory::Few => "few",
        PluralCategory::Many => "many",
        PluralCategory::Other => "other",
    }
}

fn build_categories(language: &str) -> BTreeSet<String> {
    let Ok(locale) = Locale::try_from_str(language) else {
        return BTreeSet::new();
    };
    match PluralRules::try_new(locale.into(), PluralRuleType::Cardinal.into()) {
        Ok(rules) => rules
            .categories()
            .map(|category| category_str(category).to_string())
            .collect(),
        Err(_) => BTreeSet::new(),
    }
}

/// Cardinal plural categories used by `language` (e.g. `{"one", "other"}`
/// for "en"). Returns an empty set for codes ICU cannot parse.
///
/// # Examples
///
/// ```
/// use covlevel::plural_categories;
///
/// assert!(plural_categories("ru").contains("few"));
/// assert!(!plural_categories("en").contains("few"));
/// ```
pub fn plural_categories(language: &str) -> BTreeSet<String> {
    CATEGORY_CACHE.with_borrow_mut(|cache| {
        if let Some((_, categories)) = cache.iter().find(|(code, _)| code == language) {
            return categories.clone();
        }
        let categories = build_categories(language);
        cache.push((language.to_string(), categories.clone()));
        categories
    })
}
