//! Error types for rule compilation, loading, and approval lookup.

use std::error::Error as StdError;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::parser::ParseError;
use crate::parser::error::did_you_mean;
use crate::types::VariableKind;

/// Errors that occur while compiling a single rule.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The template itself could not be parsed.
    #[error("invalid template '{pattern}': {source}")]
    Parse {
        pattern: String,
        #[source]
        source: ParseError,
    },

    /// More than one `${...}` placeholder in one template.
    #[error(
        "template '{pattern}' has {} placeholders ({}), only one is allowed",
        found.len(),
        found.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )]
    MultipleVariables {
        pattern: String,
        found: Vec<VariableKind>,
    },

    /// The generated regular expression was rejected by the regex engine.
    #[error("template '{pattern}' produced an invalid regex: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// An `in-language` predicate is not a valid regular expression.
    #[error("invalid in-language predicate '{predicate}': {source}")]
    InvalidPredicate {
        predicate: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors that occur while loading a rule source.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O error when reading a rule file.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The rule file is not syntactically valid.
    #[error("{}: {source}", display_path(path.as_deref()))]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: ParseError,
    },

    /// A coverage statement names a level that does not exist.
    #[error(
        "coverage rule {index}: unknown level '{level}'{}",
        did_you_mean(suggestions)
    )]
    UnknownLevel {
        index: usize,
        level: String,
        suggestions: Vec<String>,
    },

    /// A coverage rule failed to compile.
    #[error("coverage rule {index}: {source}")]
    Compile {
        index: usize,
        #[source]
        source: CompileError,
    },

    /// An approval statement references an undeclared threshold.
    #[error(
        "unknown vote threshold '{name}'{}",
        did_you_mean(suggestions)
    )]
    UnknownThreshold {
        name: String,
        suggestions: Vec<String>,
    },
}

fn display_path(path: Option<&Path>) -> String {
    path.map_or_else(|| "<rules>".to_string(), |p| p.display().to_string())
}

/// Errors returned by approval-requirement lookups.
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// An approval `paths` pattern could not be compiled.
    #[error("approval rule {index}: invalid paths pattern '{pattern}': {source}")]
    InvalidPaths {
        index: usize,
        pattern: String,
        #[source]
        source: Box<fancy_regex::Error>,
    },

    /// No approval rule matched; the configuration lacks a catch-all.
    #[error(
        "no approval requirement matches locale '{locale}' and path {}; \
         the approval rules must end with a catch-all",
        path.as_deref().unwrap_or("<none>")
    )]
    NoMatchingRequirement {
        locale: String,
        path: Option<String>,
    },
}
