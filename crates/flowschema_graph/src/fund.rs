//! The result store.
//!
//! A flat, insertion-ordered container of every committed type, keyed by
//! `TypeId`, with a subset of ids marked as "tops" (the directly requested
//! exports of entry files). Insertion order is resolution order, which is
//! what makes `take_all` deterministic across runs.

use indexmap::IndexMap;

use crate::error::{GraphError, Result};
use crate::types::{Field, Type, TypeId, TypeKind};

#[derive(Debug, Default)]
pub struct Fund {
    types: IndexMap<TypeId, Type>,
    tops: Vec<TypeId>,
}

impl Fund {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a named type. The id must be unique across the run.
    pub fn put(&mut self, ty: Type) -> Result<()> {
        let id = ty.id.clone().ok_or_else(|| {
            GraphError::ProtocolViolation("committed a type without an id".to_string())
        })?;
        if let Some(existing) = self.types.get(&id) {
            if *existing == ty {
                return Ok(());
            }
            return Err(GraphError::ProtocolViolation(format!(
                "two distinct types share the id '{id}'"
            )));
        }
        self.types.insert(id, ty);
        Ok(())
    }

    /// Mark an already-committed id as a root of the output.
    pub fn mark_top(&mut self, id: TypeId) {
        if !self.tops.contains(&id) {
            self.tops.push(id);
        }
    }

    pub fn take(&self, id: &TypeId) -> Option<&Type> {
        self.types.get(id)
    }

    /// All committed types, in commit order.
    pub fn take_all(&self) -> impl Iterator<Item = &Type> {
        self.types.values()
    }

    /// The requested roots, in request order.
    pub fn take_tops(&self) -> impl Iterator<Item = &Type> {
        self.tops.iter().filter_map(|id| self.types.get(id))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Dereference and merge a type down to its record fields, following
    /// references and flattening intersections. On a name collision the
    /// later (most-derived) part wins. Non-record shapes cannot be
    /// flattened.
    pub fn merged_fields(&self, ty: &Type) -> Result<Vec<Field>> {
        match &ty.kind {
            TypeKind::Record { fields } => Ok(fields.clone()),
            TypeKind::Reference { to } => {
                let target = self.take(to).ok_or_else(|| {
                    GraphError::ProtocolViolation(format!(
                        "reference to '{to}' points outside the fund"
                    ))
                })?;
                self.merged_fields(target)
            }
            TypeKind::Intersection { parts } => {
                let mut merged: Vec<Field> = Vec::new();
                for part in parts {
                    for field in self.merged_fields(part)? {
                        if let Some(existing) =
                            merged.iter_mut().find(|f| f.name == field.name)
                        {
                            *existing = field;
                        } else {
                            merged.push(field);
                        }
                    }
                }
                Ok(merged)
            }
            other => Err(GraphError::ProtocolViolation(format!(
                "cannot flatten fields out of a {} type",
                kind_name(other)
            ))),
        }
    }
}

fn kind_name(kind: &TypeKind) -> &'static str {
    match kind {
        TypeKind::Record { .. } => "record",
        TypeKind::Array { .. } => "array",
        TypeKind::Tuple { .. } => "tuple",
        TypeKind::Map { .. } => "map",
        TypeKind::Union { .. } => "union",
        TypeKind::Intersection { .. } => "intersection",
        TypeKind::Maybe { .. } => "maybe",
        TypeKind::Number { .. } => "number",
        TypeKind::String => "string",
        TypeKind::Boolean => "boolean",
        TypeKind::Literal { .. } => "literal",
        TypeKind::Any => "any",
        TypeKind::Mixed => "mixed",
        TypeKind::Reference { .. } => "reference",
    }
}
