//! The engine's fatal error type.
//!
//! Resolution has no recoverable-error path: every variant here aborts the
//! whole collection run and is propagated unchanged to the caller. Partial
//! results are discarded.

use std::path::PathBuf;
use thiserror::Error;

use flowschema_parser::ParseError;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("unknown name '{name}'")]
    UnknownName { name: String },

    #[error("unsupported node: {0}")]
    UnsupportedNode(String),

    #[error("'{name}' is already defined in this scope")]
    Redefinition { name: String },

    #[error("resolution protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("cannot resolve import '{specifier}' from {}", importer.display())]
    UnresolvedImport { specifier: String, importer: PathBuf },

    #[error("recursive generic instantiation while resolving '{name}'")]
    RecursiveInstantiation { name: String },

    #[error("bad operand for {operator}: {detail}")]
    BadOperand { operator: &'static str, detail: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, GraphError>;
