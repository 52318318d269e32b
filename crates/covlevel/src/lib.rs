pub mod engine;
pub mod parser;
pub mod types;

pub use engine::{
    ApprovalError, ApprovalRequirements, ApprovalRule, CompileError, CoverageEvaluator,
    EvaluatorCache, LanguageCoverageData, LoadError, MatchRule, Rejection, RejectReason,
    RuleDefinition, RuleMatch, RuleSet, RuleSource, StaticSupplementalData, SupplementalData, Trace,
    plural_categories, target_language,
};
pub use parser::ParseError;
pub use types::{CoverageLevel, LocaleCoverageContext, UnknownLevel, VariableKind};
