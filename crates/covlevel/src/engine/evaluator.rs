//! Per-locale coverage evaluation.

use std::sync::Arc;

use crate::engine::rule_set::{Rejection, RuleMatch, RuleSet, Trace};
use crate::engine::supplemental::{SupplementalData, normalize_locale, target_language};
use crate::types::{CoverageLevel, LocaleCoverageContext};

/// A rule set bound to one locale's attribute context.
///
/// The rule set is shared; the context is owned. Evaluation takes `&self`
/// and holds no locks, so one evaluator may serve many threads.
#[derive(Debug)]
pub struct CoverageEvaluator {
    locale: String,
    rules: Arc<RuleSet>,
    context: LocaleCoverageContext,
}

impl CoverageEvaluator {
    /// Bind `rules` to an explicit context.
    pub fn new(locale: impl Into<String>, rules: Arc<RuleSet>, context: LocaleCoverageContext) -> Self {
        Self {
            locale: locale.into(),
            rules,
            context,
        }
    }

    /// Build the context for `locale` from supplemental data.
    pub fn for_locale(rules: Arc<RuleSet>, data: &dyn SupplementalData, locale: &str) -> Self {
        let locale = normalize_locale(locale);
        let context = data.coverage_context(&target_language(&locale));
        Self::new(locale, rules, context)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn context(&self) -> &LocaleCoverageContext {
        &self.context
    }

    pub fn rules(&self) -> &Arc<RuleSet> {
        &self.rules
    }

    /// Coverage level of `path`. An absent path is
    /// [`CoverageLevel::Undetermined`]; a path no rule covers is
    /// [`CoverageLevel::Comprehensive`].
    pub fn level<'a>(&self, path: impl Into<Option<&'a str>>) -> CoverageLevel {
        match path.into() {
            Some(path) => self.rules.resolve_level(path, &self.context),
            None => CoverageLevel::Undetermined,
        }
    }

    /// Numeric value of [`level`](Self::level).
    pub fn int_level<'a>(&self, path: impl Into<Option<&'a str>>) -> u8 {
        self.level(path).value()
    }

    /// The rule deciding `path`, if any.
    pub fn explain<'p>(&self, path: &'p str) -> Option<RuleMatch<'_, 'p>> {
        self.rules.explain(path, &self.context)
    }

    /// The deciding rule and the skipped rules from a single scan.
    pub fn trace<'p>(&self, path: &'p str) -> Trace<'_, 'p> {
        self.rules.trace(path, &self.context)
    }

    /// Rules skipped on the way to the deciding rule.
    pub fn rejections(&self, path: &str) -> Vec<Rejection> {
        self.rules.rejections(path, &self.context)
    }
}
