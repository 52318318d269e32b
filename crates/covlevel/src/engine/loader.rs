//! Loading rule files into a rule set and approval list.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::engine::approval::{ApprovalRequirements, ApprovalRule};
use crate::engine::compiler::DEFAULT_ROOT;
use crate::engine::error::LoadError;
use crate::engine::rule::RuleDefinition;
use crate::engine::rule_set::RuleSet;
use crate::engine::supplemental::SupplementalData;
use crate::parser::error::compute_suggestions;
use crate::parser::{
    ApprovalDefinition, CoverageDefinition, Statement, VotesSpec, parse_rule_file,
};
use crate::types::CoverageLevel;

/// A loaded rule file: the compiled coverage rules plus the declared
/// approval requirements.
///
/// `variable` and `threshold` declarations apply to the whole file, so a
/// rule may use a name declared further down.
///
/// # Example
///
/// ```
/// use covlevel::{CoverageLevel, LocaleCoverageContext, RuleSource};
///
/// let source = RuleSource::parse(r#"
///     variable %calendar = "(gregorian|buddhist)";
///     coverage modern "dates/calendars/calendar[@type='%calendar']/months";
///     approval votes=4;
/// "#).unwrap();
///
/// let context = LocaleCoverageContext::builder().target_language("th").build();
/// let path = "//ldml/dates/calendars/calendar[@type=\"buddhist\"]/months";
/// assert_eq!(source.coverage().resolve_level(path, &context), CoverageLevel::Modern);
/// assert_eq!(source.approval_rules().len(), 1);
/// ```
#[derive(Debug)]
pub struct RuleSource {
    path: Option<PathBuf>,
    coverage: Arc<RuleSet>,
    approvals: Vec<ApprovalRule>,
    variables: BTreeMap<String, String>,
    thresholds: BTreeMap<String, u32>,
}

impl RuleSource {
    /// Parse rule file text, anchoring templates under `//ldml/`.
    pub fn parse(content: &str) -> Result<Self, LoadError> {
        Self::parse_with_root(content, DEFAULT_ROOT)
    }

    /// Parse rule file text with a custom root prefix.
    pub fn parse_with_root(content: &str, root: &str) -> Result<Self, LoadError> {
        Self::build(content, root, None)
    }

    /// Read and parse a rule file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::load_with_root(path, DEFAULT_ROOT)
    }

    /// Read and parse a rule file with a custom root prefix.
    pub fn load_with_root(path: impl AsRef<Path>, root: &str) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::build(&content, root, Some(path))
    }

    /// The file this source was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn coverage(&self) -> &Arc<RuleSet> {
        &self.coverage
    }

    /// Approval rules in declaration order, with thresholds resolved.
    pub fn approval_rules(&self) -> &[ApprovalRule] {
        &self.approvals
    }

    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    pub fn thresholds(&self) -> &BTreeMap<String, u32> {
        &self.thresholds
    }

    /// An approval matcher over this file's approval rules.
    pub fn approvals(&self, data: Arc<dyn SupplementalData>) -> ApprovalRequirements {
        ApprovalRequirements::new(self.approvals.clone(), data)
    }

    pub fn into_parts(self) -> (Arc<RuleSet>, Vec<ApprovalRule>) {
        (self.coverage, self.approvals)
    }

    fn build(content: &str, root: &str, path: Option<&Path>) -> Result<Self, LoadError> {
        let file = parse_rule_file(content).map_err(|source| LoadError::Parse {
            path: path.map(Path::to_path_buf),
            source,
        })?;

        let mut variables = BTreeMap::new();
        let mut thresholds = BTreeMap::new();
        for statement in &file.statements {
            match statement {
                Statement::Variable { name, value } => {
                    variables.insert(name.clone(), value.clone());
                }
                Statement::Threshold { name, votes } => {
                    thresholds.insert(name.clone(), *votes);
                }
                Statement::Coverage(_) | Statement::Approval(_) => {}
            }
        }

        let substitution = Substitution::new(&variables);
        let mut definitions = Vec::new();
        let mut approvals = Vec::new();
        for statement in &file.statements {
            match statement {
                Statement::Coverage(coverage) => {
                    definitions.push(coverage_rule(definitions.len(), coverage, &substitution)?);
                }
                Statement::Approval(approval) => {
                    approvals.push(approval_rule(approval, &thresholds, &substitution)?);
                }
                Statement::Variable { .. } | Statement::Threshold { .. } => {}
            }
        }

        let coverage = RuleSet::builder()
            .rules(definitions)
            .root(root)
            .build()?;
        debug!(
            coverage = coverage.len(),
            approvals = approvals.len(),
            variables = variables.len(),
            thresholds = thresholds.len(),
            "loaded rule source"
        );
        Ok(Self {
            path: path.map(Path::to_path_buf),
            coverage: Arc::new(coverage),
            approvals,
            variables,
            thresholds,
        })
    }
}

fn coverage_rule(
    index: usize,
    coverage: &CoverageDefinition,
    substitution: &Substitution<'_>,
) -> Result<RuleDefinition, LoadError> {
    let level = parse_level(index, &coverage.level)?;
    Ok(RuleDefinition::builder()
        .template(substitution.apply(&coverage.template))
        .level(level)
        .maybe_in_language(coverage.in_language.as_deref().map(|v| substitution.apply(v)))
        .maybe_in_script(coverage.in_script.as_deref().map(|v| substitution.apply(v)))
        .maybe_in_territory(coverage.in_territory.as_deref().map(|v| substitution.apply(v)))
        .build())
}

/// Rule levels exclude `undetermined`, which only describes a missing path.
fn parse_level(index: usize, level: &str) -> Result<CoverageLevel, LoadError> {
    match level.parse::<CoverageLevel>() {
        Ok(parsed) if parsed != CoverageLevel::Undetermined => Ok(parsed),
        _ => Err(LoadError::UnknownLevel {
            index,
            level: level.to_string(),
            suggestions: compute_suggestions(
                &level.to_ascii_lowercase(),
                &CoverageLevel::NAMES[1..],
            ),
        }),
    }
}

fn approval_rule(
    approval: &ApprovalDefinition,
    thresholds: &BTreeMap<String, u32>,
    substitution: &Substitution<'_>,
) -> Result<ApprovalRule, LoadError> {
    let votes = match &approval.votes {
        VotesSpec::Count(votes) => *votes,
        VotesSpec::Named(name) => thresholds.get(name).copied().ok_or_else(|| {
            let known: Vec<&str> = thresholds.keys().map(String::as_str).collect();
            LoadError::UnknownThreshold {
                name: name.clone(),
                suggestions: compute_suggestions(name, &known),
            }
        })?,
    };
    Ok(ApprovalRule::builder()
        .votes(votes)
        .maybe_locales(approval.locales.clone())
        .maybe_paths(approval.paths.as_deref().map(|v| substitution.apply(v)))
        .build())
}

/// `%name` replacement, longest names first so `%a` never clobbers `%ab`.
struct Substitution<'a> {
    variables: Vec<(&'a str, &'a str)>,
}

impl<'a> Substitution<'a> {
    fn new(variables: &'a BTreeMap<String, String>) -> Self {
        let mut variables: Vec<(&str, &str)> = variables
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        variables.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
        Self { variables }
    }

    fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (name, value) in &self.variables {
            if result.contains(name) {
                result = result.replace(name, value);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longer_variable_names_substitute_first() {
        let variables = BTreeMap::from([
            ("%a".to_string(), "short".to_string()),
            ("%ab".to_string(), "long".to_string()),
        ]);
        let substitution = Substitution::new(&variables);
        assert_eq!(substitution.apply("x/%ab/%a"), "x/long/short");
    }

    #[test]
    fn undetermined_is_not_a_rule_level() {
        assert!(matches!(
            parse_level(0, "undetermined"),
            Err(LoadError::UnknownLevel { .. })
        ));
        assert_eq!(parse_level(0, "MODERN").ok(), Some(CoverageLevel::Modern));
        assert_eq!(parse_level(0, "40").ok(), Some(CoverageLevel::Basic));
    }

    #[test]
    fn misspelled_level_gets_suggestion() {
        let Err(LoadError::UnknownLevel { suggestions, .. }) = parse_level(3, "modrn") else {
            panic!("expected unknown level");
        };
        assert_eq!(suggestions, vec!["modern".to_string()]);
    }
}
