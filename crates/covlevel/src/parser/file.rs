//! Rule file format parser.
//!
//! Parses coverage rule files containing `variable`, `threshold`,
//! `coverage`, and `approval` statements.

use winnow::ascii::digit1;
use winnow::combinator::{alt, cut_err, delimited, not, preceded, repeat, terminated};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use super::ast::{ApprovalDefinition, CoverageDefinition, RuleFile, Statement, VotesSpec};
use super::error::{ParseError, calculate_position, compute_suggestions, did_you_mean};

const KEYWORDS: [&str; 4] = ["variable", "threshold", "coverage", "approval"];

const ATTRIBUTES: [&str; 6] = [
    "in-language",
    "in-script",
    "in-territory",
    "votes",
    "locales",
    "paths",
];

/// Parse an entire rule file into statements.
pub fn parse_rule_file(input: &str) -> Result<RuleFile, ParseError> {
    let mut remaining = input;
    match file(&mut remaining) {
        Ok(statements) => {
            // Skip any trailing whitespace/comments
            let _ = skip_ws_and_comments(&mut remaining);
            if remaining.is_empty() {
                Ok(RuleFile { statements })
            } else {
                Err(describe_failure(input, remaining))
            }
        }
        Err(_) => Err(describe_failure(input, remaining)),
    }
}

/// Build an error for the point where parsing stopped, with suggestions
/// for misspelled keywords and attribute names.
fn describe_failure(original: &str, remaining: &str) -> ParseError {
    let (line, column) = calculate_position(original, remaining);
    if remaining.is_empty() {
        let message = if in_open_string(original) {
            "unterminated string"
        } else {
            "expected ';'"
        };
        return ParseError::UnexpectedEof {
            line,
            column,
            message: message.to_string(),
        };
    }

    let word: &str = {
        let end = remaining
            .find(|c: char| !is_word_char(c))
            .unwrap_or(remaining.len());
        &remaining[..end]
    };
    let message = if word.is_empty() {
        format!(
            "unexpected character: '{}'",
            remaining.chars().next().unwrap_or('?')
        )
    } else if remaining[word.len()..].starts_with('=') {
        let suggestions = compute_suggestions(word, &ATTRIBUTES);
        format!("unknown attribute '{word}'{}", did_you_mean(&suggestions))
    } else if is_statement_start(original, remaining) && !KEYWORDS.contains(&word) {
        let suggestions = compute_suggestions(word, &KEYWORDS);
        format!("unknown statement '{word}'{}", did_you_mean(&suggestions))
    } else {
        format!("unexpected '{word}'")
    };

    ParseError::Syntax {
        line,
        column,
        message,
    }
}

/// Whether `remaining` begins a new statement (only whitespace or comments
/// since the previous `;`).
fn is_statement_start(original: &str, remaining: &str) -> bool {
    let consumed = &original[..original.len() - remaining.len()];
    let tail = consumed.rsplit(';').next().unwrap_or(consumed);
    tail.lines().all(|line| {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with("//")
    })
}

/// Whether the input ends inside a double-quoted string. Comments are
/// skipped only outside strings.
fn in_open_string(input: &str) -> bool {
    let mut open = false;
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if open && chars.peek() == Some(&'"') => {
                chars.next();
            }
            '"' => open = !open,
            '/' if !open && chars.peek() == Some(&'/') => {
                chars.by_ref().find(|&c| c == '\n');
            }
            _ => {}
        }
    }
    open
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Parse an entire file into statements.
fn file(input: &mut &str) -> ModalResult<Vec<Statement>> {
    skip_ws_and_comments(input)?;
    let statements: Vec<Statement> =
        repeat(0.., terminated(statement, skip_ws_and_comments)).parse_next(input)?;
    Ok(statements)
}

/// Skip whitespace and line comments.
fn skip_ws_and_comments(input: &mut &str) -> ModalResult<()> {
    let _: Vec<()> = repeat(0.., alt((ws_only.void(), line_comment.void()))).parse_next(input)?;
    Ok(())
}

/// Parse whitespace (no comments).
fn ws_only<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_whitespace()).parse_next(input)
}

/// Parse a line comment: // ... newline
fn line_comment<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    preceded("//", take_while(0.., |c| c != '\n')).parse_next(input)
}

/// Parse a keyword that is not the prefix of a longer word.
fn keyword<'i>(word: &'static str) -> impl Parser<&'i str, &'i str, ErrMode<ContextError>> {
    terminated(word, not(one_of(is_word_char)))
}

/// Parse one statement.
fn statement(input: &mut &str) -> ModalResult<Statement> {
    alt((
        preceded(keyword("variable"), cut_err(variable_body)),
        preceded(keyword("threshold"), cut_err(threshold_body)),
        preceded(keyword("coverage"), cut_err(coverage_body)),
        preceded(keyword("approval"), cut_err(approval_body)),
    ))
    .parse_next(input)
}

/// Parse the rest of: variable %name = "text";
fn variable_body(input: &mut &str) -> ModalResult<Statement> {
    skip_ws_and_comments(input)?;
    let name = preceded('%', take_while(1.., is_word_char))
        .map(|s: &str| format!("%{s}"))
        .parse_next(input)?;
    skip_ws_and_comments(input)?;
    '='.parse_next(input)?;
    skip_ws_and_comments(input)?;
    let value = quoted_string(input)?;
    end_of_statement(input)?;
    Ok(Statement::Variable { name, value })
}

/// Parse the rest of: threshold NAME = 20;
fn threshold_body(input: &mut &str) -> ModalResult<Statement> {
    skip_ws_and_comments(input)?;
    let name = identifier(input)?;
    skip_ws_and_comments(input)?;
    '='.parse_next(input)?;
    skip_ws_and_comments(input)?;
    let votes = number(input)?;
    end_of_statement(input)?;
    Ok(Statement::Threshold { name, votes })
}

/// A coverage rule predicate attribute.
enum CoverageAttribute {
    InLanguage(String),
    InScript(String),
    InTerritory(String),
}

/// Parse the rest of: coverage LEVEL [attributes] "template";
fn coverage_body(input: &mut &str) -> ModalResult<Statement> {
    skip_ws_and_comments(input)?;
    let level = take_while(1.., is_word_char)
        .map(str::to_string)
        .parse_next(input)?;
    skip_ws_and_comments(input)?;
    let attributes: Vec<CoverageAttribute> =
        repeat(0.., terminated(coverage_attribute, skip_ws_and_comments)).parse_next(input)?;
    let template = quoted_string(input)?;
    end_of_statement(input)?;

    let mut definition = CoverageDefinition {
        level,
        template,
        ..CoverageDefinition::default()
    };
    for attribute in attributes {
        match attribute {
            CoverageAttribute::InLanguage(v) => definition.in_language = Some(v),
            CoverageAttribute::InScript(v) => definition.in_script = Some(v),
            CoverageAttribute::InTerritory(v) => definition.in_territory = Some(v),
        }
    }
    Ok(Statement::Coverage(definition))
}

/// Parse a coverage predicate: in-language="..." etc.
fn coverage_attribute(input: &mut &str) -> ModalResult<CoverageAttribute> {
    alt((
        attribute_value("in-language").map(CoverageAttribute::InLanguage),
        attribute_value("in-script").map(CoverageAttribute::InScript),
        attribute_value("in-territory").map(CoverageAttribute::InTerritory),
    ))
    .parse_next(input)
}

/// An optional approval attribute.
enum ApprovalAttribute {
    Locales(String),
    Paths(String),
}

/// Parse the rest of: approval votes=N [locales="..."] [paths="..."];
fn approval_body(input: &mut &str) -> ModalResult<Statement> {
    skip_ws_and_comments(input)?;
    (keyword("votes"), '=').parse_next(input)?;
    let votes = alt((
        number.map(VotesSpec::Count),
        identifier.map(VotesSpec::Named),
    ))
    .parse_next(input)?;
    skip_ws_and_comments(input)?;
    let attributes: Vec<ApprovalAttribute> =
        repeat(0.., terminated(approval_attribute, skip_ws_and_comments)).parse_next(input)?;
    ';'.parse_next(input)?;

    let mut definition = ApprovalDefinition {
        votes,
        locales: None,
        paths: None,
    };
    for attribute in attributes {
        match attribute {
            ApprovalAttribute::Locales(v) => definition.locales = Some(v),
            ApprovalAttribute::Paths(v) => definition.paths = Some(v),
        }
    }
    Ok(Statement::Approval(definition))
}

/// Parse an approval attribute: locales="..." or paths="..."
fn approval_attribute(input: &mut &str) -> ModalResult<ApprovalAttribute> {
    alt((
        attribute_value("locales").map(ApprovalAttribute::Locales),
        attribute_value("paths").map(ApprovalAttribute::Paths),
    ))
    .parse_next(input)
}

/// Parse `name="value"`, returning the unescaped value.
fn attribute_value<'i>(name: &'static str) -> impl Parser<&'i str, String, ErrMode<ContextError>> {
    preceded((keyword(name), '='), quoted_string)
}

/// Parse optional whitespace followed by `;`.
fn end_of_statement(input: &mut &str) -> ModalResult<()> {
    skip_ws_and_comments(input)?;
    ';'.void().parse_next(input)
}

/// Parse a threshold or attribute identifier: HIGH_BAR
fn identifier(input: &mut &str) -> ModalResult<String> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .map(str::to_string)
        .parse_next(input)
}

/// Parse a non-negative vote count.
fn number(input: &mut &str) -> ModalResult<u32> {
    digit1.parse_to().parse_next(input)
}

/// Parse a double-quoted string. `\"` is an escaped quote; every other
/// backslash is kept as written.
fn quoted_string(input: &mut &str) -> ModalResult<String> {
    delimited(
        '"',
        repeat(0.., string_piece).map(|pieces: Vec<&str>| pieces.concat()),
        cut_err('"'),
    )
    .parse_next(input)
}

/// Parse one piece of a quoted string.
fn string_piece<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    alt((
        "\\\"".value("\""),
        "\\",
        take_while(1.., |c: char| c != '"' && c != '\\'),
    ))
    .parse_next(input)
}
