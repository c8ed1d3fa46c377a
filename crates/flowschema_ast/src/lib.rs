//! flowschema_ast: the syntax tree for the Flow-typed JavaScript subset.
//!
//! Nodes are allocated into a caller-owned bump arena by the parser and
//! referenced with `&'a` throughout; the resolution engine keeps these
//! references inside scope entries so declarations can be re-walked lazily
//! when a query first demands them.

pub mod node;
pub mod walk;

pub use node::*;
pub use walk::{walk, AnyNode};
