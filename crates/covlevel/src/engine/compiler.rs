//! Compiles template ASTs into anchored matchers.

use std::error::Error;
use std::str::Chars;

use tracing::warn;

use crate::engine::error::CompileError;
use crate::parser::{GroupKind, Pattern, PatternNode, parse_pattern};
use crate::types::VariableKind;

/// Root every coverage template is anchored under.
pub const DEFAULT_ROOT: &str = "//ldml/";

/// Regex source for the single placeholder capture.
const VARIABLE_CAPTURE: &str = "([^\"]*)";

/// A template compiled to an anchored matcher.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    matcher: Matcher,
    variable: Option<VariableKind>,
}

impl CompiledPattern {
    /// The generated regular expression source.
    pub fn regex_source(&self) -> &str {
        self.matcher.as_str()
    }

    /// The placeholder kind, if the template had one.
    pub fn variable(&self) -> Option<VariableKind> {
        self.variable
    }

    /// Match a full path. Returns `None` when the path does not match,
    /// otherwise the text captured by the placeholder (if it participated).
    pub fn match_path<'p>(&self, path: &'p str) -> Option<Option<&'p str>> {
        if self.variable.is_none() {
            return self.matcher.is_match(path).then_some(None);
        }
        self.matcher.capture(path)
    }
}

/// Parse and compile a template under `root`.
///
/// Fails if the template does not parse, has more than one placeholder, or
/// produces a regex the engine rejects.
pub fn compile_template(template: &str, root: &str) -> Result<CompiledPattern, CompileError> {
    let pattern = parse_pattern(template).map_err(|source| CompileError::Parse {
        pattern: template.to_string(),
        source,
    })?;
    compile_pattern(template, &pattern, root)
}

/// Compile an already-parsed template.
pub fn compile_pattern(
    template: &str,
    pattern: &Pattern,
    root: &str,
) -> Result<CompiledPattern, CompileError> {
    let variables = pattern.variables();
    if variables.len() > 1 {
        return Err(CompileError::MultipleVariables {
            pattern: template.to_string(),
            found: variables,
        });
    }

    let source = to_regex_source(pattern, root);
    let backtracking = pattern.has_lookahead() || has_possessive_quantifier(&source);
    let matcher = Matcher::new(&source, backtracking).map_err(|source| {
        CompileError::InvalidRegex {
            pattern: template.to_string(),
            source,
        }
    })?;

    Ok(CompiledPattern {
        matcher,
        variable: variables.first().copied(),
    })
}

/// Render the anchored regex source for a template.
pub fn to_regex_source(pattern: &Pattern, root: &str) -> String {
    let mut body = String::new();
    emit(&pattern.nodes, &mut body);
    format!("^{}(?:{body})$", regex::escape(root))
}

fn emit(nodes: &[PatternNode], out: &mut String) {
    for node in nodes {
        match node {
            PatternNode::Literal(text) => out.push_str(text),
            PatternNode::Quote => out.push('"'),
            PatternNode::Escape(c) => {
                out.push('\\');
                out.push(*c);
            }
            PatternNode::CharClass(body) => {
                out.push('[');
                out.push_str(&body.replace('\'', "\""));
                out.push(']');
            }
            PatternNode::Attribute { name, value } => {
                out.push_str("\\[@");
                emit(name, out);
                if let Some(value) = value {
                    out.push('=');
                    emit(value, out);
                }
                out.push_str("\\]");
            }
            PatternNode::Variable(_) => out.push_str(VARIABLE_CAPTURE),
            PatternNode::Group {
                kind,
                nodes,
                quantifier,
            } => {
                out.push_str(match kind {
                    GroupKind::NonCapturing => "(?:",
                    GroupKind::NegativeLookahead => "(?!",
                });
                emit(nodes, out);
                out.push(')');
                if let Some(quantifier) = quantifier {
                    out.push(quantifier.as_char());
                }
            }
        }
    }
}

/// Whether `source` has a possessive quantifier (`X++`, `X*+`, `X?+`,
/// `X{n}+`). The `regex` crate accepts these but reads them as a repeat of a
/// repeat, so they must go to the backtracking engine.
fn has_possessive_quantifier(source: &str) -> bool {
    let mut chars = source.chars();
    let mut after_quantifier = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
                after_quantifier = false;
            }
            '[' => {
                skip_class(&mut chars);
                after_quantifier = false;
            }
            '+' if after_quantifier => return true,
            '+' | '*' | '?' | '}' => after_quantifier = true,
            _ => after_quantifier = false,
        }
    }
    false
}

/// Consume a bracket expression up to and including its closing `]`.
fn skip_class(chars: &mut Chars<'_>) {
    let mut first = true;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '^' if first => continue,
            ']' if !first => return,
            _ => {}
        }
        first = false;
    }
}

/// An immutable compiled regex. Plain patterns use the linear-time `regex`
/// engine. Patterns with lookahead or possessive quantifiers, or with
/// syntax `regex` rejects, use `fancy-regex`.
#[derive(Debug, Clone)]
pub(crate) enum Matcher {
    Plain(regex::Regex),
    Backtracking(fancy_regex::Regex),
}

type BoxedError = Box<dyn Error + Send + Sync>;

impl Matcher {
    pub(crate) fn new(source: &str, backtracking: bool) -> Result<Self, BoxedError> {
        if backtracking {
            return Ok(Matcher::Backtracking(fancy_regex::Regex::new(source)?));
        }
        match regex::Regex::new(source) {
            Ok(re) => Ok(Matcher::Plain(re)),
            Err(plain) => match fancy_regex::Regex::new(source) {
                Ok(re) => Ok(Matcher::Backtracking(re)),
                Err(_) => Err(plain.into()),
            },
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        match self {
            Matcher::Plain(re) => re.as_str(),
            Matcher::Backtracking(re) => re.as_str(),
        }
    }

    pub(crate) fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Plain(re) => re.is_match(text),
            Matcher::Backtracking(re) => re.is_match(text).unwrap_or_else(|err| {
                warn!(pattern = re.as_str(), %err, "backtracking match failed, treating as no match");
                false
            }),
        }
    }

    fn capture<'t>(&self, text: &'t str) -> Option<Option<&'t str>> {
        match self {
            Matcher::Plain(re) => re
                .captures(text)
                .map(|caps| caps.get(1).map(|m| m.as_str())),
            Matcher::Backtracking(re) => match re.captures(text) {
                Ok(found) => found.map(|caps| caps.get(1).map(|m| m.as_str())),
                Err(err) => {
                    warn!(pattern = re.as_str(), %err, "backtracking match failed, treating as no match");
                    None
                }
            },
        }
    }
}
