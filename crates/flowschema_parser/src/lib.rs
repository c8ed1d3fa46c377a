//! flowschema_parser: source text to syntax tree.
//!
//! A hand-written scanner and recursive-descent parser for the Flow-typed
//! JavaScript subset the type-graph engine consumes. Statements outside
//! that subset are scanned over and dropped rather than rejected; type
//! annotations inside it are parsed in full.
//!
//! The parser allocates every node into a caller-owned `bumpalo::Bump`, so
//! the resulting tree borrows the arena (`&'a` nodes) and outlives the
//! parser itself.

pub mod pragma;
pub mod scanner;

mod parser;

pub use parser::Parser;

use flowschema_core::text::LineAndColumn;
use thiserror::Error;

/// A fatal parse error. There is no recovery: the first malformed
/// construct inside the supported subset aborts the run.
#[derive(Debug, Error)]
#[error("{file}:{line}:{column}: {message}")]
pub struct ParseError {
    pub file: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(file: &str, at: LineAndColumn, message: String) -> Self {
        Self {
            file: file.to_string(),
            line: at.line + 1,
            column: at.column + 1,
            message,
        }
    }
}
