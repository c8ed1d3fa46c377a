//! flowschema_core: small shared building blocks.
//!
//! Source position tracking used by the scanner, parser, and error
//! messages.

pub mod text;
