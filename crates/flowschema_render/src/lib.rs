//! flowschema_render: JSON Schema emission over a resolved fund.
//!
//! A pure function from the fund to a schema document. Every committed
//! type becomes an entry under `definitions` keyed by its dotted id;
//! references become `$ref` pointers; the requested tops form a top-level
//! `anyOf`. Definitions are emitted in fund insertion order, so the
//! document is deterministic for a fixed input.

use serde_json::{json, Map, Value};

use flowschema_graph::{Fund, LiteralValue, Type, TypeId, TypeKind};

const SCHEMA_DIALECT: &str = "http://json-schema.org/draft-04/schema#";

pub fn render(fund: &Fund) -> Value {
    let mut definitions = Map::new();
    for ty in fund.take_all() {
        if let Some(id) = &ty.id {
            definitions.insert(id.join(), schema_of(ty));
        }
    }
    let mut document = Map::new();
    document.insert("$schema".to_string(), Value::String(SCHEMA_DIALECT.to_string()));
    document.insert("definitions".to_string(), Value::Object(definitions));
    let tops: Vec<Value> = fund
        .take_tops()
        .filter_map(|ty| ty.id.as_ref().map(ref_to))
        .collect();
    if !tops.is_empty() {
        document.insert("anyOf".to_string(), Value::Array(tops));
    }
    Value::Object(document)
}

fn ref_to(id: &TypeId) -> Value {
    json!({ "$ref": format!("#/definitions/{}", id.join()) })
}

fn schema_of(ty: &Type) -> Value {
    match &ty.kind {
        TypeKind::Record { fields } => {
            let mut properties = Map::new();
            let mut required = Vec::new();
            for field in fields {
                properties.insert(field.name.clone(), schema_of(&field.value));
                if field.required {
                    required.push(Value::String(field.name.clone()));
                }
            }
            let mut schema = Map::new();
            schema.insert("type".to_string(), json!("object"));
            schema.insert("properties".to_string(), Value::Object(properties));
            if !required.is_empty() {
                schema.insert("required".to_string(), Value::Array(required));
            }
            schema.insert("additionalProperties".to_string(), json!(false));
            Value::Object(schema)
        }
        TypeKind::Array { items } => json!({
            "type": "array",
            "items": schema_of(items),
        }),
        TypeKind::Tuple { items } => {
            let slots: Vec<Value> = items
                .iter()
                .map(|item| match item {
                    Some(ty) => schema_of(ty),
                    // An unresolvable slot constrains nothing.
                    None => json!({}),
                })
                .collect();
            json!({
                "type": "array",
                "items": slots,
                "minItems": items.len(),
                "maxItems": items.len(),
            })
        }
        TypeKind::Map { values, .. } => json!({
            "type": "object",
            "additionalProperties": schema_of(values),
        }),
        TypeKind::Union { variants } => {
            if let Some(symbols) = string_enum(variants) {
                json!({ "enum": symbols })
            } else {
                json!({ "anyOf": variants.iter().map(schema_of).collect::<Vec<_>>() })
            }
        }
        TypeKind::Intersection { parts } => json!({
            "allOf": parts.iter().map(schema_of).collect::<Vec<_>>(),
        }),
        TypeKind::Maybe { value } => json!({
            "anyOf": [schema_of(value), { "type": "null" }],
        }),
        TypeKind::Number { repr } => {
            if repr.is_integer() {
                json!({ "type": "integer" })
            } else {
                json!({ "type": "number" })
            }
        }
        TypeKind::String => json!({ "type": "string" }),
        TypeKind::Boolean => json!({ "type": "boolean" }),
        TypeKind::Literal { value } => match value {
            LiteralValue::Null => json!({ "type": "null" }),
            other => json!({ "enum": [literal_value(other)] }),
        },
        TypeKind::Any | TypeKind::Mixed => json!({}),
        TypeKind::Reference { to } => ref_to(to),
    }
}

/// A union of only string literals renders as a plain enum.
fn string_enum(variants: &[Type]) -> Option<Vec<Value>> {
    variants
        .iter()
        .map(|variant| match &variant.kind {
            TypeKind::Literal {
                value: LiteralValue::Str(s),
            } => Some(Value::String(s.clone())),
            _ => None,
        })
        .collect()
}

fn literal_value(value: &LiteralValue) -> Value {
    match value {
        LiteralValue::Str(s) => json!(s),
        LiteralValue::Num(n) => json!(n),
        LiteralValue::Bool(b) => json!(b),
        LiteralValue::Null => Value::Null,
    }
}
