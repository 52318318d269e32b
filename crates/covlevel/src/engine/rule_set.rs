//! Ordered, immutable collections of coverage rules.

use tracing::debug;

use crate::engine::compiler::DEFAULT_ROOT;
use crate::engine::error::LoadError;
use crate::engine::rule::{MatchRule, RejectReason, RuleDefinition, RuleOutcome};
use crate::types::{CoverageLevel, LocaleCoverageContext};

/// An ordered list of compiled coverage rules.
///
/// Order is declaration order and is never changed: the first rule that
/// applies to a path decides its level. A path no rule applies to is
/// [`CoverageLevel::Comprehensive`].
///
/// Compiled matchers are immutable, so a `RuleSet` can be shared across
/// threads (behind an `Arc`) and scanned concurrently without locking.
///
/// # Example
///
/// ```
/// use std::collections::BTreeSet;
/// use covlevel::{CoverageLevel, LocaleCoverageContext, RuleDefinition, RuleSet};
///
/// let rules = RuleSet::builder()
///     .rules(vec![
///         RuleDefinition::builder()
///             .template("x/y[@z=\"${Target-Scripts}\"]")
///             .level(CoverageLevel::Modern)
///             .build(),
///         RuleDefinition::builder()
///             .template("x/.*")
///             .level(CoverageLevel::Comprehensive)
///             .build(),
///     ])
///     .root("//")
///     .build()
///     .unwrap();
///
/// let context = LocaleCoverageContext::builder()
///     .target_language("en")
///     .scripts(BTreeSet::from(["Latn".to_string()]))
///     .build();
///
/// assert_eq!(rules.resolve_level("//x/y[@z=\"Latn\"]", &context), CoverageLevel::Modern);
/// assert_eq!(rules.resolve_level("//x/y[@z=\"Cyrl\"]", &context), CoverageLevel::Comprehensive);
/// ```
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<MatchRule>,
    root: String,
}

#[bon::bon]
impl RuleSet {
    /// Compile `rules` in order. Any failing rule aborts construction.
    #[builder]
    pub fn new(
        rules: Vec<RuleDefinition>,
        #[builder(into, default = DEFAULT_ROOT.to_string())] root: String,
    ) -> Result<Self, LoadError> {
        let compiled = rules
            .iter()
            .enumerate()
            .map(|(index, definition)| {
                MatchRule::compile(definition, &root)
                    .map_err(|source| LoadError::Compile { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(rules = compiled.len(), root = %root, "compiled coverage rule set");
        Ok(Self {
            rules: compiled,
            root,
        })
    }
}

impl RuleSet {
    /// The rules in priority order.
    pub fn rules(&self) -> &[MatchRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The path prefix every template is anchored under.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Level of `path` for the locale described by `context`.
    pub fn resolve_level(&self, path: &str, context: &LocaleCoverageContext) -> CoverageLevel {
        self.scan(path, context, |_, _| {})
            .map_or(CoverageLevel::Comprehensive, |found| found.rule.level())
    }

    /// The rule that decides `path`, if any.
    pub fn explain<'s, 'p>(
        &'s self,
        path: &'p str,
        context: &LocaleCoverageContext,
    ) -> Option<RuleMatch<'s, 'p>> {
        self.scan(path, context, |_, _| {})
    }

    /// Every rule rejected before the deciding rule (or all rules, when none
    /// applies), with the reason each was skipped.
    pub fn rejections(&self, path: &str, context: &LocaleCoverageContext) -> Vec<Rejection> {
        let mut rejected = Vec::new();
        self.scan(path, context, |index, reason| {
            rejected.push(Rejection { index, reason });
        });
        rejected
    }

    /// The deciding rule and every rule skipped before it, from one pass.
    pub fn trace<'s, 'p>(
        &'s self,
        path: &'p str,
        context: &LocaleCoverageContext,
    ) -> Trace<'s, 'p> {
        let mut rejections = Vec::new();
        let matched = self.scan(path, context, |index, reason| {
            rejections.push(Rejection { index, reason });
        });
        Trace {
            matched,
            rejections,
        }
    }

    fn scan<'s, 'p>(
        &'s self,
        path: &'p str,
        context: &LocaleCoverageContext,
        mut on_reject: impl FnMut(usize, RejectReason),
    ) -> Option<RuleMatch<'s, 'p>> {
        for (index, rule) in self.rules.iter().enumerate() {
            match rule.evaluate(path, context) {
                RuleOutcome::Matched(captured) => {
                    return Some(RuleMatch {
                        index,
                        rule,
                        captured,
                    });
                }
                RuleOutcome::Rejected(reason) => on_reject(index, reason),
            }
        }
        None
    }
}

/// The rule that decided a path's level.
#[derive(Debug, Clone)]
pub struct RuleMatch<'s, 'p> {
    /// Position of the rule in declaration order.
    pub index: usize,
    pub rule: &'s MatchRule,
    /// Text captured by the rule's placeholder.
    pub captured: Option<&'p str>,
}

/// Full record of one evaluation: see [`RuleSet::trace`].
#[derive(Debug, Clone)]
pub struct Trace<'s, 'p> {
    pub matched: Option<RuleMatch<'s, 'p>>,
    pub rejections: Vec<Rejection>,
}

impl Trace<'_, '_> {
    /// The level this evaluation resolves to.
    pub fn level(&self) -> CoverageLevel {
        self.matched
            .as_ref()
            .map_or(CoverageLevel::Comprehensive, |found| found.rule.level())
    }
}

/// A rule that was considered and skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub index: usize,
    pub reason: RejectReason,
}
