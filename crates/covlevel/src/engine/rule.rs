//! Compiled coverage rules.

use std::collections::BTreeSet;

use bon::Builder;
use regex::Regex;

use crate::engine::compiler::{CompiledPattern, compile_template};
use crate::engine::error::CompileError;
use crate::types::{CoverageLevel, LocaleCoverageContext, VariableKind};

/// An uncompiled coverage rule.
///
/// # Example
///
/// ```
/// use covlevel::{CoverageLevel, RuleDefinition};
///
/// let rule = RuleDefinition::builder()
///     .template("numbers/minimumGroupingDigits")
///     .level(CoverageLevel::Modern)
///     .in_language("(de|fi)")
///     .build();
/// assert_eq!(rule.level(), CoverageLevel::Modern);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(on(String, into))]
pub struct RuleDefinition {
    /// Path template relative to the rule set root.
    template: String,
    level: CoverageLevel,
    /// Regex that must fully match the target language.
    in_language: Option<String>,
    /// Whitespace-separated scripts; any overlap with the locale's scripts.
    in_script: Option<String>,
    /// Whitespace-separated territories; any overlap with the locale's territories.
    in_territory: Option<String>,
}

impl RuleDefinition {
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn level(&self) -> CoverageLevel {
        self.level
    }
}

/// Direct language/script/territory restrictions on a rule.
#[derive(Debug, Clone, Default)]
pub struct ContextPredicates {
    in_language: Option<Regex>,
    in_scripts: Option<BTreeSet<String>>,
    in_territories: Option<BTreeSet<String>>,
}

impl ContextPredicates {
    pub fn parse(
        in_language: Option<&str>,
        in_script: Option<&str>,
        in_territory: Option<&str>,
    ) -> Result<Self, CompileError> {
        let in_language = in_language
            .map(|predicate| {
                Regex::new(&format!("^(?:{predicate})$")).map_err(|source| {
                    CompileError::InvalidPredicate {
                        predicate: predicate.to_string(),
                        source,
                    }
                })
            })
            .transpose()?;
        Ok(Self {
            in_language,
            in_scripts: in_script.map(split_set),
            in_territories: in_territory.map(split_set),
        })
    }

    /// Whether the rule declares no restrictions at all.
    pub fn is_empty(&self) -> bool {
        self.in_language.is_none() && self.in_scripts.is_none() && self.in_territories.is_none()
    }

    /// A rule with no restrictions is always eligible; otherwise any one
    /// declared restriction must hold.
    pub fn eligible(&self, context: &LocaleCoverageContext) -> bool {
        if self.is_empty() {
            return true;
        }
        self.in_language
            .as_ref()
            .is_some_and(|re| re.is_match(context.target_language()))
            || self
                .in_scripts
                .as_ref()
                .is_some_and(|scripts| !scripts.is_disjoint(context.scripts()))
            || self
                .in_territories
                .as_ref()
                .is_some_and(|territories| !territories.is_disjoint(context.territories()))
    }
}

fn split_set(value: &str) -> BTreeSet<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// Why a rule did not apply to a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The rule's language/script/territory restrictions excluded the locale.
    ContextPredicate,
    /// The path did not match the template.
    NoMatch,
    /// The placeholder captured a value the locale does not use.
    VariableNotInContext {
        kind: VariableKind,
        value: Option<String>,
    },
}

/// Result of testing one rule against a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome<'p> {
    /// The rule applies; carries the placeholder capture, if any.
    Matched(Option<&'p str>),
    Rejected(RejectReason),
}

/// A compiled coverage rule.
#[derive(Debug, Clone)]
pub struct MatchRule {
    raw_pattern: String,
    compiled: CompiledPattern,
    level: CoverageLevel,
    predicates: ContextPredicates,
}

impl MatchRule {
    /// Compile a rule definition under `root`.
    pub fn compile(definition: &RuleDefinition, root: &str) -> Result<Self, CompileError> {
        let compiled = compile_template(&definition.template, root)?;
        let predicates = ContextPredicates::parse(
            definition.in_language.as_deref(),
            definition.in_script.as_deref(),
            definition.in_territory.as_deref(),
        )?;
        Ok(Self {
            raw_pattern: definition.template.clone(),
            compiled,
            level: definition.level,
            predicates,
        })
    }

    pub fn raw_pattern(&self) -> &str {
        &self.raw_pattern
    }

    pub fn regex_source(&self) -> &str {
        self.compiled.regex_source()
    }

    pub fn variable(&self) -> Option<VariableKind> {
        self.compiled.variable()
    }

    pub fn level(&self) -> CoverageLevel {
        self.level
    }

    pub fn predicates(&self) -> &ContextPredicates {
        &self.predicates
    }

    /// Test this rule: cheap context predicates first, then the matcher,
    /// then the placeholder check.
    pub fn evaluate<'p>(&self, path: &'p str, context: &LocaleCoverageContext) -> RuleOutcome<'p> {
        if !self.predicates.eligible(context) {
            return RuleOutcome::Rejected(RejectReason::ContextPredicate);
        }
        let Some(captured) = self.compiled.match_path(path) else {
            return RuleOutcome::Rejected(RejectReason::NoMatch);
        };
        match self.compiled.variable() {
            Some(kind) if !context.matches_variable(kind, captured) => {
                RuleOutcome::Rejected(RejectReason::VariableNotInContext {
                    kind,
                    value: captured.map(str::to_string),
                })
            }
            _ => RuleOutcome::Matched(captured),
        }
    }
}
