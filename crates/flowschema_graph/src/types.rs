//! The resolved-type data model.
//!
//! A `Type` is one node of the final graph: a closed tagged union of data
//! shapes, optionally carrying the stable `TypeId` under which it was
//! committed to the fund. Cross-references between committed types always
//! go through the `Reference` variant, never direct embedding, which is
//! what keeps mutually recursive declarations finite.

use serde::Serialize;
use std::fmt;

/// Stable identity of a committed type: an ordered sequence of namespace
/// segments ending in the declaration name (plus an instantiation suffix
/// for generic instances). Equality and hashing are by segment sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TypeId(pub Vec<String>);

impl TypeId {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// A copy of this id with one more segment appended.
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn join(&self) -> String {
        self.0.join(".")
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join())
    }
}

/// Numeric representation for `number` types. `F64` unless a `@repr`
/// pragma narrows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberRepr {
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
}

impl NumberRepr {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "i32" => NumberRepr::I32,
            "i64" => NumberRepr::I64,
            "u32" => NumberRepr::U32,
            "u64" => NumberRepr::U64,
            "f32" => NumberRepr::F32,
            "f64" => NumberRepr::F64,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            NumberRepr::I32 => "i32",
            NumberRepr::I64 => "i64",
            NumberRepr::U32 => "u32",
            NumberRepr::U64 => "u64",
            NumberRepr::F32 => "f32",
            NumberRepr::F64 => "f64",
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, NumberRepr::F32 | NumberRepr::F64)
    }
}

/// A literal value carried by the `literal` type kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Str(String),
    Num(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Str(s) => f.write_str(s),
            LiteralValue::Num(n) => write!(f, "{n}"),
            LiteralValue::Bool(b) => write!(f, "{b}"),
            LiteralValue::Null => f.write_str("null"),
        }
    }
}

/// One named member of a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub value: Type,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeKind {
    Record {
        fields: Vec<Field>,
    },
    Array {
        items: Box<Type>,
    },
    /// An unresolvable member is kept positionally as `None`.
    Tuple {
        items: Vec<Option<Type>>,
    },
    Map {
        keys: Box<Type>,
        values: Box<Type>,
    },
    /// Nested unions are not flattened.
    Union {
        variants: Vec<Type>,
    },
    Intersection {
        parts: Vec<Type>,
    },
    Maybe {
        value: Box<Type>,
    },
    Number {
        repr: NumberRepr,
    },
    String,
    Boolean,
    Literal {
        value: LiteralValue,
    },
    Any,
    Mixed,
    Reference {
        to: TypeId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Type {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<TypeId>,
    #[serde(flatten)]
    pub kind: TypeKind,
}

impl Type {
    /// A transient (unnamed) type.
    pub fn of(kind: TypeKind) -> Self {
        Self { id: None, kind }
    }

    pub fn number(repr: NumberRepr) -> Self {
        Self::of(TypeKind::Number { repr })
    }

    pub fn literal(value: LiteralValue) -> Self {
        Self::of(TypeKind::Literal { value })
    }

    pub fn reference(to: TypeId) -> Self {
        Self::of(TypeKind::Reference { to })
    }

    /// Wrap in `maybe`, collapsing `maybe(maybe(T))` to `maybe(T)`.
    pub fn maybe(inner: Type) -> Self {
        if matches!(inner.kind, TypeKind::Maybe { .. }) {
            inner
        } else {
            Self::of(TypeKind::Maybe {
                value: Box::new(inner),
            })
        }
    }

    /// The segment used when this type appears in a generated
    /// instantiation name. Only reference, primitive, and literal
    /// parameters produce one; composite parameters cannot be named.
    pub fn instance_segment(&self) -> Option<String> {
        match &self.kind {
            TypeKind::Reference { to } => to.last().map(str::to_string),
            TypeKind::String => Some("string".to_string()),
            TypeKind::Boolean => Some("boolean".to_string()),
            TypeKind::Number { repr } => Some(format!("number_{}", repr.name())),
            TypeKind::Any => Some("any".to_string()),
            TypeKind::Mixed => Some("mixed".to_string()),
            TypeKind::Literal { value } => Some(value.to_string()),
            _ => None,
        }
    }
}
