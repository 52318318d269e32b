//! Public AST types for path templates and rule files.
//!
//! These types are public so tooling can inspect rules without compiling
//! them.

use crate::types::VariableKind;

// =============================================================================
// Path templates
// =============================================================================

/// A parsed path template.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub nodes: Vec<PatternNode>,
}

impl Pattern {
    /// All placeholders in the template, in source order (including those
    /// nested inside groups and attributes).
    pub fn variables(&self) -> Vec<VariableKind> {
        let mut found = Vec::new();
        collect_variables(&self.nodes, &mut found);
        found
    }

    /// Whether any group in the template is a negative lookahead.
    pub fn has_lookahead(&self) -> bool {
        any_lookahead(&self.nodes)
    }
}

fn collect_variables(nodes: &[PatternNode], found: &mut Vec<VariableKind>) {
    for node in nodes {
        match node {
            PatternNode::Variable(kind) => found.push(*kind),
            PatternNode::Attribute { name, value } => {
                collect_variables(name, found);
                if let Some(value) = value {
                    collect_variables(value, found);
                }
            }
            PatternNode::Group { nodes, .. } => collect_variables(nodes, found),
            PatternNode::Literal(_)
            | PatternNode::Quote
            | PatternNode::Escape(_)
            | PatternNode::CharClass(_) => {}
        }
    }
}

fn any_lookahead(nodes: &[PatternNode]) -> bool {
    nodes.iter().any(|node| match node {
        PatternNode::Group { kind, nodes, .. } => {
            *kind == GroupKind::NegativeLookahead || any_lookahead(nodes)
        }
        PatternNode::Attribute { name, value } => {
            any_lookahead(name) || value.as_deref().is_some_and(any_lookahead)
        }
        PatternNode::Literal(_)
        | PatternNode::Quote
        | PatternNode::Escape(_)
        | PatternNode::CharClass(_)
        | PatternNode::Variable(_) => false,
    })
}

/// One element of a path template.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternNode {
    /// Path text, kept as regex source (`.`, `*`, `|` keep their meaning).
    Literal(String),
    /// A `'` or `"` delimiter; always compiled as `"`.
    Quote,
    /// A backslash escape such as `\[` or `\d`.
    Escape(char),
    /// A bracket expression that is not an attribute, e.g. `[^/]`.
    CharClass(String),
    /// A path attribute: `[@name='value']` or `[@name]`.
    Attribute {
        name: Vec<PatternNode>,
        value: Option<Vec<PatternNode>>,
    },
    /// A `${...}` placeholder.
    Variable(VariableKind),
    /// A parenthesized group with an optional trailing quantifier.
    Group {
        kind: GroupKind,
        nodes: Vec<PatternNode>,
        quantifier: Option<Quantifier>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// `( ... )` or `(?: ... )`.
    NonCapturing,
    /// `(?! ... )`.
    NegativeLookahead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// `?`
    Optional,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl Quantifier {
    pub fn as_char(self) -> char {
        match self {
            Quantifier::Optional => '?',
            Quantifier::ZeroOrMore => '*',
            Quantifier::OneOrMore => '+',
        }
    }
}

// =============================================================================
// Rule files
// =============================================================================

/// A parsed rule file: statements in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleFile {
    pub statements: Vec<Statement>,
}

/// A top-level rule-file statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `variable %name = "text";`
    Variable { name: String, value: String },
    /// `threshold NAME = 20;`
    Threshold { name: String, votes: u32 },
    /// `coverage LEVEL [predicates] "template";`
    Coverage(CoverageDefinition),
    /// `approval votes=N [locales="..."] [paths="..."];`
    Approval(ApprovalDefinition),
}

/// An uncompiled coverage rule as written in a rule file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoverageDefinition {
    /// Level name or numeric value, validated at load time.
    pub level: String,
    pub template: String,
    pub in_language: Option<String>,
    pub in_script: Option<String>,
    pub in_territory: Option<String>,
}

/// An uncompiled approval requirement as written in a rule file.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalDefinition {
    pub votes: VotesSpec,
    pub locales: Option<String>,
    pub paths: Option<String>,
}

/// The `votes=` value of an approval requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VotesSpec {
    Count(u32),
    /// A reference to a `threshold` declaration.
    Named(String),
}
