//! Comment pragma recognition.
//!
//! A field comment of the form `@repr {i32}` narrows how a `number`
//! annotation is rendered. Anything that does not match the pragma shape
//! is an ordinary comment and is ignored.

use regex::Regex;
use std::sync::OnceLock;

/// Numeric representations a `@repr` pragma can name.
pub const REPR_NAMES: [&str; 6] = ["i32", "i64", "u32", "u64", "f32", "f64"];

fn repr_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Compiled from a literal; cannot fail.
        Regex::new(r"@repr\s*\{\s*(i32|i64|u32|u64|f32|f64)\s*\}").unwrap()
    })
}

/// Extract the representation name from a field comment, if the comment
/// carries a well-formed `@repr` pragma.
pub fn parse_repr(comment: &str) -> Option<&str> {
    let captures = repr_pattern().captures(comment)?;
    let matched = captures.get(1)?;
    REPR_NAMES
        .iter()
        .find(|&&name| name == matched.as_str())
        .copied()
}
