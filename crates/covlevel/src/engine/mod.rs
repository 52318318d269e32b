//! Coverage rule engine.
//!
//! Compiles templates into anchored matchers, evaluates paths against an
//! ordered rule set for a locale, caches per-locale evaluators, and looks up
//! approval vote requirements.

mod approval;
mod cache;
mod compiler;
mod error;
mod evaluator;
mod loader;
mod plural;
mod rule;
mod rule_set;
mod supplemental;

pub use approval::{ApprovalRequirements, ApprovalRule};
pub use cache::{DEFAULT_CAPACITY, EvaluatorCache};
pub use compiler::{CompiledPattern, DEFAULT_ROOT, compile_pattern, compile_template, to_regex_source};
pub use error::{ApprovalError, CompileError, LoadError};
pub use evaluator::CoverageEvaluator;
pub use loader::RuleSource;
pub use plural::plural_categories;
pub use rule::{ContextPredicates, MatchRule, RejectReason, RuleDefinition, RuleOutcome};
pub use rule_set::{Rejection, RuleMatch, RuleSet, Trace};
pub use supplemental::{
    LanguageCoverageData, StaticSupplementalData, SupplementalData, normalize_locale,
    target_language,
};
