//! Locale attribute data consumed by the engine.
//!
//! The engine never reaches for process-wide data. Everything locale-specific
//! comes through a [`SupplementalData`] handed to the evaluator, cache, or
//! approval matcher at construction time.

use std::collections::{BTreeMap, BTreeSet};

use icu_locale_core::LanguageIdentifier;
use serde::{Deserialize, Serialize};

use crate::engine::plural::plural_categories;
use crate::types::{CoverageLevel, LocaleCoverageContext};

/// Source of per-language attribute sets and organization coverage targets.
pub trait SupplementalData: Send + Sync {
    /// Attribute sets for a target language (not a full locale id).
    fn coverage_context(&self, language: &str) -> LocaleCoverageContext;

    /// Locales an organization targets at exactly `level`.
    fn locales_at_level(&self, organization: &str, level: CoverageLevel) -> BTreeSet<String>;
}

/// The language subtag of a locale id (`"de_CH"` -> `"de"`).
///
/// Ids ICU cannot parse, such as `root`, fall back to the text before the
/// first separator.
pub fn target_language(locale: &str) -> String {
    match LanguageIdentifier::try_from_str(locale) {
        Ok(id) => id.language.as_str().to_string(),
        Err(_) => locale
            .split(['_', '-'])
            .next()
            .unwrap_or(locale)
            .to_ascii_lowercase(),
    }
}

/// Normalize a locale id for comparison: `-` separators become `_`.
pub fn normalize_locale(locale: &str) -> String {
    locale.trim().replace('-', "_")
}

/// Attribute sets for one language, as stored in supplemental data files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageCoverageData {
    pub scripts: BTreeSet<String>,
    pub territories: BTreeSet<String>,
    pub time_zones: BTreeSet<String>,
    pub currencies: BTreeSet<String>,
    /// When absent, ICU's cardinal categories for the language are used.
    pub plurals: Option<BTreeSet<String>>,
    pub calendars: BTreeSet<String>,
}

/// In-memory [`SupplementalData`], typically deserialized from JSON.
///
/// ```json
/// {
///   "languages": { "de": { "scripts": ["Latn"], "territories": ["DE", "AT"] } },
///   "organizations": { "Cldr": { "modern": ["de", "fr"] } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticSupplementalData {
    languages: BTreeMap<String, LanguageCoverageData>,
    organizations: BTreeMap<String, BTreeMap<CoverageLevel, BTreeSet<String>>>,
}

impl StaticSupplementalData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the attribute sets for `language`.
    pub fn with_language(mut self, language: impl Into<String>, data: LanguageCoverageData) -> Self {
        self.languages.insert(language.into(), data);
        self
    }

    /// Add locales an organization targets at `level`.
    pub fn with_organization_locales<I, S>(
        mut self,
        organization: impl Into<String>,
        level: CoverageLevel,
        locales: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.organizations
            .entry(organization.into())
            .or_default()
            .entry(level)
            .or_default()
            .extend(locales.into_iter().map(Into::into));
        self
    }

    /// Languages with explicit attribute data.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }
}

impl SupplementalData for StaticSupplementalData {
    fn coverage_context(&self, language: &str) -> LocaleCoverageContext {
        let data = self.languages.get(language).cloned().unwrap_or_default();
        let plurals = data
            .plurals
            .unwrap_or_else(|| plural_categories(language));
        LocaleCoverageContext::builder()
            .target_language(language)
            .scripts(data.scripts)
            .territories(data.territories)
            .time_zones(data.time_zones)
            .currencies(data.currencies)
            .plurals(plurals)
            .calendars(data.calendars)
            .build()
    }

    fn locales_at_level(&self, organization: &str, level: CoverageLevel) -> BTreeSet<String> {
        self.organizations
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(organization))
            .and_then(|(_, levels)| levels.get(&level))
            .map(|locales| locales.iter().map(|l| normalize_locale(l)).collect())
            .unwrap_or_default()
    }
}
