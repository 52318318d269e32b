//! Required-vote lookup for locale/path combinations.

use std::collections::BTreeSet;
use std::sync::Arc;

use bon::Builder;
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::engine::error::ApprovalError;
use crate::engine::supplemental::{SupplementalData, normalize_locale};
use crate::types::CoverageLevel;

/// An uncompiled approval requirement.
///
/// `locales` is `*` or a whitespace-separated list of locale ids and
/// `Organization:level` groups; `paths` is a regular expression that must
/// match the whole path. An absent or `*` value matches everything.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(on(String, into))]
pub struct ApprovalRule {
    votes: u32,
    locales: Option<String>,
    paths: Option<String>,
}

impl ApprovalRule {
    pub fn votes(&self) -> u32 {
        self.votes
    }

    pub fn locales(&self) -> Option<&str> {
        self.locales.as_deref()
    }

    pub fn paths(&self) -> Option<&str> {
        self.paths.as_deref()
    }

    /// Whether this rule matches every locale and every path.
    pub fn is_catch_all(&self) -> bool {
        is_universal(self.locales.as_deref()) && is_universal(self.paths.as_deref())
    }
}

fn is_universal(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty() || v.trim() == "*")
}

/// A compiled approval requirement.
#[derive(Debug)]
struct ApprovalMatcher {
    locales: Option<BTreeSet<String>>,
    paths: Option<fancy_regex::Regex>,
    votes: u32,
}

impl ApprovalMatcher {
    fn compile(
        index: usize,
        rule: &ApprovalRule,
        data: &dyn SupplementalData,
    ) -> Result<Self, ApprovalError> {
        let locales = rule
            .locales
            .as_deref()
            .filter(|value| !is_universal(Some(value)))
            .map(|value| expand_locales(value, data));
        let paths = rule
            .paths
            .as_deref()
            .filter(|value| !is_universal(Some(value)))
            .map(|pattern| {
                fancy_regex::Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
                    ApprovalError::InvalidPaths {
                        index,
                        pattern: pattern.to_string(),
                        source: Box::new(source),
                    }
                })
            })
            .transpose()?;
        Ok(Self {
            locales,
            paths,
            votes: rule.votes,
        })
    }

    fn matches(&self, locale: &str, path: Option<&str>) -> bool {
        if let Some(locales) = &self.locales {
            if !locales.contains(locale) {
                return false;
            }
        }
        match (&self.paths, path) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(re), Some(path)) => re.is_match(path).unwrap_or_else(|err| {
                warn!(pattern = re.as_str(), %err, "approval path match failed, treating as no match");
                false
            }),
        }
    }
}

/// Expand a `locales` attribute. Entries of the form `Org:level` become the
/// locales the organization targets at that level.
fn expand_locales(value: &str, data: &dyn SupplementalData) -> BTreeSet<String> {
    let mut locales = BTreeSet::new();
    for entry in value.split_whitespace() {
        match entry.split_once(':') {
            None => {
                locales.insert(normalize_locale(entry));
            }
            Some((organization, level)) => match level.parse::<CoverageLevel>() {
                Ok(level) => locales.extend(data.locales_at_level(organization, level)),
                Err(_) => warn!(entry, "unknown coverage level in approval locales, ignoring"),
            },
        }
    }
    locales
}

/// Ordered approval requirements; the first matching rule decides.
///
/// Rules are compiled on first lookup. Concurrent first callers block until
/// a single build finishes and never observe a partial list.
pub struct ApprovalRequirements {
    rules: Vec<ApprovalRule>,
    data: Arc<dyn SupplementalData>,
    matchers: OnceCell<Vec<ApprovalMatcher>>,
}

impl ApprovalRequirements {
    pub fn new(rules: Vec<ApprovalRule>, data: Arc<dyn SupplementalData>) -> Self {
        if !rules.last().is_some_and(ApprovalRule::is_catch_all) {
            warn!(
                rules = rules.len(),
                "approval rules do not end with a catch-all; unmatched lookups will fail"
            );
        }
        Self {
            rules,
            data,
            matchers: OnceCell::new(),
        }
    }

    pub fn rules(&self) -> &[ApprovalRule] {
        &self.rules
    }

    /// Votes required to approve `path` in `locale`.
    ///
    /// Running off the end of the list means the configuration has no
    /// catch-all rule; that is reported as
    /// [`ApprovalError::NoMatchingRequirement`] rather than guessed.
    pub fn required_votes<'a>(
        &self,
        locale: &str,
        path: impl Into<Option<&'a str>>,
    ) -> Result<u32, ApprovalError> {
        let path = path.into();
        let locale = normalize_locale(locale);
        self.matchers()?
            .iter()
            .find(|matcher| matcher.matches(&locale, path))
            .map(|matcher| matcher.votes)
            .ok_or_else(|| ApprovalError::NoMatchingRequirement {
                locale,
                path: path.map(str::to_string),
            })
    }

    /// Compile every rule now, reporting the first invalid `paths` regex.
    pub fn validate(&self) -> Result<(), ApprovalError> {
        self.matchers().map(|_| ())
    }

    /// Whether the last rule matches every locale and path.
    pub fn has_catch_all(&self) -> bool {
        self.rules.last().is_some_and(ApprovalRule::is_catch_all)
    }

    fn matchers(&self) -> Result<&[ApprovalMatcher], ApprovalError> {
        let matchers = self.matchers.get_or_try_init(|| {
            let built = self
                .rules
                .iter()
                .enumerate()
                .map(|(index, rule)| ApprovalMatcher::compile(index, rule, self.data.as_ref()))
                .collect::<Result<Vec<_>, _>>()?;
            debug!(rules = built.len(), "compiled approval requirements");
            Ok::<_, ApprovalError>(built)
        })?;
        Ok(matchers)
    }
}
