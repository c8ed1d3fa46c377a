//! flowschema_graph: the type resolution engine.
//!
//! Walks Flow-typed declaration trees and derives a flat, deduplicated,
//! cycle-free graph of named types. Construction is lazy and demand
//! driven: collecting a file only registers names; a type is built the
//! first time something queries it, with cross-module references, generic
//! instantiation, and inheritance chains resolved along the way. All
//! results land in the [`Fund`], keyed by stable [`TypeId`]s, ready for a
//! renderer to emit reference pointers instead of inlining.

pub mod error;
pub mod fund;
pub mod module;
pub mod scope;
pub mod specials;
pub mod types;

mod collector;

pub use collector::Collector;
pub use error::{GraphError, Result};
pub use fund::Fund;
pub use types::{Field, LiteralValue, NumberRepr, Type, TypeId, TypeKind};
