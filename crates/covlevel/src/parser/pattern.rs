//! Path template parser using winnow.
//!
//! Parses the coverage template language into an AST. Handles:
//! - Literal path text (kept as regex source)
//! - Quote delimiters (`'` and `"`, normalized at compile time)
//! - Attribute brackets `[@name='value']`
//! - Character classes `[^/]` and backslash escapes
//! - Groups `( ... )`, `(?: ... )`, and negative lookahead `(?! ... )`
//! - Variable placeholders `${Target-Scripts}` and friends

use winnow::combinator::{alt, cut_err, opt, preceded, repeat};
use winnow::prelude::*;
use winnow::token::{any, none_of, one_of, take_while};

use super::ast::{GroupKind, Pattern, PatternNode, Quantifier};
use super::error::{ParseError, calculate_position, compute_suggestions, did_you_mean};
use crate::types::VariableKind;

/// Where a run of nodes is being parsed; decides which characters end a
/// literal run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Body,
    AttributeName,
}

impl Scope {
    fn stops(self, c: char) -> bool {
        matches!(c, '(' | ')' | '[' | ']' | '\\' | '\'' | '"' | '$')
            || (self == Scope::AttributeName && c == '=')
    }
}

/// Parse a path template into an AST.
///
/// Unknown placeholder names are rejected here; the one-placeholder limit
/// is enforced when the pattern is compiled.
pub fn parse_pattern(input: &str) -> Result<Pattern, ParseError> {
    let mut remaining = input;
    match nodes(&mut remaining, Scope::Body) {
        Ok(nodes) => {
            if remaining.is_empty() {
                Ok(Pattern { nodes })
            } else {
                Err(describe_failure(input, remaining))
            }
        }
        Err(_) => Err(describe_failure(input, remaining)),
    }
}

/// Build an error for the point where parsing stopped.
fn describe_failure(original: &str, remaining: &str) -> ParseError {
    let (line, column) = calculate_position(original, remaining);
    let consumed = &original[..original.len() - remaining.len()];

    if consumed.ends_with("${") {
        let name: String = remaining.chars().take_while(|&c| c != '}').collect();
        let names: Vec<&str> = VariableKind::ALL
            .iter()
            .map(|kind| kind.placeholder_name())
            .collect();
        let suggestions = compute_suggestions(&name, &names);
        return ParseError::Syntax {
            line,
            column,
            message: format!("unknown variable '${{{name}}}'{}", did_you_mean(&suggestions)),
        };
    }

    match remaining.chars().next() {
        None => ParseError::UnexpectedEof {
            line,
            column,
            message: "unclosed group, bracket, or placeholder".to_string(),
        },
        Some(c @ (')' | ']')) => ParseError::Syntax {
            line,
            column,
            message: format!("unmatched '{c}'"),
        },
        Some(c) => ParseError::Syntax {
            line,
            column,
            message: format!("unexpected character: '{c}'"),
        },
    }
}

/// Parse nodes until a character that closes the current scope.
fn nodes(input: &mut &str, scope: Scope) -> ModalResult<Vec<PatternNode>> {
    let parsed: Vec<PatternNode> = repeat(0.., |i: &mut &str| node(i, scope)).parse_next(input)?;
    Ok(merge_literals(parsed))
}

/// Merge adjacent Literal nodes into single nodes.
fn merge_literals(nodes: Vec<PatternNode>) -> Vec<PatternNode> {
    let mut result = Vec::with_capacity(nodes.len());

    for node in nodes {
        match node {
            PatternNode::Literal(text) => {
                if let Some(PatternNode::Literal(prev)) = result.last_mut() {
                    prev.push_str(&text);
                } else {
                    result.push(PatternNode::Literal(text));
                }
            }
            other => result.push(other),
        }
    }

    result
}

/// Parse a single node.
fn node(input: &mut &str, scope: Scope) -> ModalResult<PatternNode> {
    alt((
        variable,
        dollar,
        group,
        attribute,
        char_class,
        escape,
        quote,
        |i: &mut &str| literal(i, scope),
    ))
    .parse_next(input)
}

/// Parse a placeholder: ${Target-Language}
fn variable(input: &mut &str) -> ModalResult<PatternNode> {
    preceded(
        "${",
        cut_err((
            take_while(1.., |c: char| {
                c.is_ascii_alphanumeric() || c == '-' || c == '_'
            })
            .verify_map(VariableKind::from_placeholder),
            '}',
        )),
    )
    .map(|(kind, _)| PatternNode::Variable(kind))
    .parse_next(input)
}

/// A `$` that does not start a placeholder is plain regex text.
fn dollar(input: &mut &str) -> ModalResult<PatternNode> {
    '$'.value(PatternNode::Literal("$".to_string()))
        .parse_next(input)
}

/// Parse a group: ( nodes ) with optional `?:`/`?!` prefix and quantifier.
fn group(input: &mut &str) -> ModalResult<PatternNode> {
    '('.parse_next(input)?;
    let kind = opt(alt((
        "?!".value(GroupKind::NegativeLookahead),
        "?:".value(GroupKind::NonCapturing),
    )))
    .parse_next(input)?
    .unwrap_or(GroupKind::NonCapturing);
    let inner = nodes(input, Scope::Body)?;
    cut_err(')').parse_next(input)?;
    let quantifier = opt(alt((
        '?'.value(Quantifier::Optional),
        '*'.value(Quantifier::ZeroOrMore),
        '+'.value(Quantifier::OneOrMore),
    )))
    .parse_next(input)?;

    Ok(PatternNode::Group {
        kind,
        nodes: inner,
        quantifier,
    })
}

/// Parse a path attribute: [@name] or [@name=value]
fn attribute(input: &mut &str) -> ModalResult<PatternNode> {
    "[@".parse_next(input)?;
    let name = nodes(input, Scope::AttributeName)?;
    let value = opt(preceded('=', |i: &mut &str| nodes(i, Scope::Body))).parse_next(input)?;
    cut_err(']').parse_next(input)?;
    Ok(PatternNode::Attribute { name, value })
}

/// Parse a bracket expression that is not an attribute: [^/], []a]
fn char_class(input: &mut &str) -> ModalResult<PatternNode> {
    '['.parse_next(input)?;
    let mut body = String::new();
    if let Some(c) = opt('^').parse_next(input)? {
        body.push(c);
    }
    if let Some(c) = opt(']').parse_next(input)? {
        body.push(c);
    }
    let items: Vec<String> = repeat(0.., class_item).parse_next(input)?;
    for item in items {
        body.push_str(&item);
    }
    cut_err(']').parse_next(input)?;
    Ok(PatternNode::CharClass(body))
}

/// Parse one item inside a bracket expression.
fn class_item(input: &mut &str) -> ModalResult<String> {
    alt((
        preceded('\\', any).map(|c: char| format!("\\{c}")),
        none_of([']', '\\']).map(|c: char| c.to_string()),
    ))
    .parse_next(input)
}

/// Parse a backslash escape.
fn escape(input: &mut &str) -> ModalResult<PatternNode> {
    preceded('\\', cut_err(any))
        .map(PatternNode::Escape)
        .parse_next(input)
}

/// Parse a quote delimiter.
fn quote(input: &mut &str) -> ModalResult<PatternNode> {
    one_of(['\'', '"']).value(PatternNode::Quote).parse_next(input)
}

/// Parse a run of plain template text.
fn literal(input: &mut &str, scope: Scope) -> ModalResult<PatternNode> {
    take_while(1.., move |c: char| !scope.stops(c))
        .map(|s: &str| PatternNode::Literal(s.to_string()))
        .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lone_dollar_merges_into_literal() {
        let pattern = parse_pattern("a$b").unwrap();
        assert_eq!(pattern.nodes, vec![PatternNode::Literal("a$b".into())]);
    }

    #[test]
    fn attribute_name_stops_at_equals() {
        let pattern = parse_pattern("x[@type=\"y\"]").unwrap();
        assert_eq!(
            pattern.nodes[1],
            PatternNode::Attribute {
                name: vec![PatternNode::Literal("type".into())],
                value: Some(vec![
                    PatternNode::Quote,
                    PatternNode::Literal("y".into()),
                    PatternNode::Quote,
                ]),
            }
        );
    }
}
