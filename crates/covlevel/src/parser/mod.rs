//! Path template and rule file parser.
//!
//! This module turns template strings and rule files into ASTs. Nothing here
//! builds regular expressions; that happens in the compiler.

pub mod ast;
pub mod error;
mod file;
mod pattern;

pub use ast::*;
pub use error::ParseError;
pub use file::parse_rule_file;
pub use pattern::parse_pattern;
