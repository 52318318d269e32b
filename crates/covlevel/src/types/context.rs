//! Per-locale attribute snapshot consulted by coverage rules.

use std::collections::BTreeSet;

use bon::Builder;

use crate::types::VariableKind;

/// Immutable per-locale view of the attribute sets coverage rules test
/// against.
///
/// One context is built per locale (usually by a
/// [`SupplementalData`](crate::SupplementalData) provider) and then only read.
///
/// # Example
///
/// ```
/// use std::collections::BTreeSet;
/// use covlevel::{LocaleCoverageContext, VariableKind};
///
/// let context = LocaleCoverageContext::builder()
///     .target_language("sr")
///     .scripts(BTreeSet::from(["Cyrl".to_string(), "Latn".to_string()]))
///     .build();
///
/// assert!(context.matches_variable(VariableKind::Scripts, Some("Latn")));
/// assert!(!context.matches_variable(VariableKind::Scripts, Some("Arab")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
#[builder(on(String, into))]
pub struct LocaleCoverageContext {
    /// Language subtag of the locale (e.g. "de" for "de_CH").
    target_language: String,
    #[builder(default)]
    territories: BTreeSet<String>,
    #[builder(default)]
    scripts: BTreeSet<String>,
    #[builder(default)]
    time_zones: BTreeSet<String>,
    #[builder(default)]
    currencies: BTreeSet<String>,
    #[builder(default)]
    plurals: BTreeSet<String>,
    #[builder(default)]
    calendars: BTreeSet<String>,
}

impl LocaleCoverageContext {
    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn territories(&self) -> &BTreeSet<String> {
        &self.territories
    }

    pub fn scripts(&self) -> &BTreeSet<String> {
        &self.scripts
    }

    pub fn time_zones(&self) -> &BTreeSet<String> {
        &self.time_zones
    }

    pub fn currencies(&self) -> &BTreeSet<String> {
        &self.currencies
    }

    pub fn plurals(&self) -> &BTreeSet<String> {
        &self.plurals
    }

    pub fn calendars(&self) -> &BTreeSet<String> {
        &self.calendars
    }

    /// Second-stage check for a value captured by a rule's placeholder.
    ///
    /// `Language` compares against the target language; the set kinds test
    /// membership. A `Plurals` capture that is absent or empty always
    /// matches, since the count attribute is optional in paths.
    pub fn matches_variable(&self, kind: VariableKind, captured: Option<&str>) -> bool {
        let set = match kind {
            VariableKind::Language => {
                return captured.is_some_and(|value| value == self.target_language);
            }
            VariableKind::Plurals => match captured {
                None | Some("") => return true,
                Some(_) => &self.plurals,
            },
            VariableKind::Scripts => &self.scripts,
            VariableKind::Territories => &self.territories,
            VariableKind::TimeZones => &self.time_zones,
            VariableKind::Currencies => &self.currencies,
            VariableKind::Calendars => &self.calendars,
        };
        captured.is_some_and(|value| set.contains(value))
    }
}
