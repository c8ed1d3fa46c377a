//! Built-in polymorphic operators.
//!
//! `$Keys`, `$Values`, `$Diff`, `$Shape`, `$ElementType`, `$NonMaybeType`
//! and `$ReadOnly` are native functions over already-resolved parameter
//! types. Each assumes its operand is a record (or a reference to one,
//! dereferenced through the fund) and aborts on any other shape. Their
//! results are transient: they carry no id and are cloned inline at the
//! reference site.

use crate::error::{GraphError, Result};
use crate::fund::Fund;
use crate::types::{Field, LiteralValue, Type, TypeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialOp {
    Keys,
    Values,
    Diff,
    Shape,
    ElementType,
    NonMaybeType,
    ReadOnly,
}

impl SpecialOp {
    pub fn all() -> [SpecialOp; 7] {
        [
            SpecialOp::Keys,
            SpecialOp::Values,
            SpecialOp::Diff,
            SpecialOp::Shape,
            SpecialOp::ElementType,
            SpecialOp::NonMaybeType,
            SpecialOp::ReadOnly,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            SpecialOp::Keys => "$Keys",
            SpecialOp::Values => "$Values",
            SpecialOp::Diff => "$Diff",
            SpecialOp::Shape => "$Shape",
            SpecialOp::ElementType => "$ElementType",
            SpecialOp::NonMaybeType => "$NonMaybeType",
            SpecialOp::ReadOnly => "$ReadOnly",
        }
    }

    fn arity(self) -> usize {
        match self {
            SpecialOp::Diff | SpecialOp::ElementType => 2,
            _ => 1,
        }
    }
}

/// Apply an operator to resolved parameter types, dereferencing through
/// the fund where a parameter is a reference.
pub fn apply(op: SpecialOp, params: &[Type], fund: &Fund) -> Result<Type> {
    if params.len() != op.arity() {
        return Err(GraphError::BadOperand {
            operator: op.name(),
            detail: format!("expected {} parameter(s), got {}", op.arity(), params.len()),
        });
    }
    match op {
        SpecialOp::Keys => {
            let fields = operand_fields(op, &params[0], fund)?;
            let literals = fields
                .iter()
                .map(|f| Type::literal(LiteralValue::Str(f.name.clone())))
                .collect();
            collapse_variants(op, literals)
        }
        SpecialOp::Values => {
            let fields = operand_fields(op, &params[0], fund)?;
            collapse_variants(op, fields.into_iter().map(|f| f.value).collect())
        }
        SpecialOp::Diff => {
            let keep = operand_fields(op, &params[0], fund)?;
            let drop = operand_fields(op, &params[1], fund)?;
            let fields: Vec<Field> = keep
                .into_iter()
                .filter(|f| drop.iter().all(|d| d.name != f.name))
                .collect();
            Ok(Type::of(TypeKind::Record { fields }))
        }
        SpecialOp::Shape => {
            let fields = operand_fields(op, &params[0], fund)?
                .into_iter()
                .map(|mut f| {
                    f.required = false;
                    f
                })
                .collect();
            Ok(Type::of(TypeKind::Record { fields }))
        }
        SpecialOp::ElementType => {
            let fields = operand_fields(op, &params[0], fund)?;
            let key = match &params[1].kind {
                TypeKind::Literal {
                    value: LiteralValue::Str(name),
                } => name.clone(),
                _ => {
                    return Err(GraphError::BadOperand {
                        operator: op.name(),
                        detail: "key parameter must be a string literal".to_string(),
                    })
                }
            };
            fields
                .into_iter()
                .find(|f| f.name == key)
                .map(|f| f.value)
                .ok_or_else(|| GraphError::BadOperand {
                    operator: op.name(),
                    detail: format!("no field named '{key}'"),
                })
        }
        SpecialOp::NonMaybeType => {
            let param = &params[0];
            match &param.kind {
                TypeKind::Maybe { value } => Ok((**value).clone()),
                _ => Ok(param.clone()),
            }
        }
        SpecialOp::ReadOnly => {
            // The output model has no mutability, but the operand shape is
            // still validated.
            operand_fields(op, &params[0], fund)?;
            Ok(params[0].clone())
        }
    }
}

/// Dereference an operand down to record fields.
fn operand_fields(op: SpecialOp, param: &Type, fund: &Fund) -> Result<Vec<Field>> {
    match &param.kind {
        TypeKind::Record { fields } => Ok(fields.clone()),
        TypeKind::Reference { to } => {
            let target = fund.take(to).ok_or_else(|| GraphError::BadOperand {
                operator: op.name(),
                detail: format!("reference '{to}' is not resolved"),
            })?;
            fund.merged_fields(target).map_err(|_| GraphError::BadOperand {
                operator: op.name(),
                detail: format!("'{to}' does not resolve to a record"),
            })
        }
        _ => Err(GraphError::BadOperand {
            operator: op.name(),
            detail: "operand must be a record or a reference to one".to_string(),
        }),
    }
}

fn collapse_variants(op: SpecialOp, variants: Vec<Type>) -> Result<Type> {
    match variants.len() {
        0 => Err(GraphError::BadOperand {
            operator: op.name(),
            detail: "operand record has no fields".to_string(),
        }),
        1 => Ok(variants.into_iter().next().ok_or_else(|| {
            GraphError::ProtocolViolation("variant vanished while collapsing".to_string())
        })?),
        _ => Ok(Type::of(TypeKind::Union { variants })),
    }
}
