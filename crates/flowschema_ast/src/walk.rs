//! Generic depth-first traversal over the heterogeneous tree.
//!
//! `walk` is the single traversal primitive: it hands every node to the
//! callback and the callback answers with a "detain" signal. `true` means
//! the caller has fully handled the node (dispatched it to a specialized
//! handler) and the walker must not descend into its children; `false`
//! means the walker enters the node and yields its children in declaration
//! order. Each call is a fresh traversal.

use crate::node::*;

/// A reference to any node kind the walker can visit.
#[derive(Debug, Clone, Copy)]
pub enum AnyNode<'a> {
    Program(&'a Program<'a>),
    Statement(Statement<'a>),
    TypeParam(&'a TypeParam<'a>),
    TypeRef(&'a TypeRef<'a>),
    TypeAnnot(&'a TypeAnnot<'a>),
    ObjectProp(&'a ObjectProp<'a>),
}

/// Depth-first walk starting at `node`. The callback returns the detain
/// signal for each visited node.
pub fn walk<'a, F>(node: AnyNode<'a>, visit: &mut F)
where
    F: FnMut(AnyNode<'a>) -> bool,
{
    let detained = visit(node);
    if detained {
        return;
    }
    each_child(node, &mut |child| walk(child, visit));
}

/// Invoke `f` on every direct child of `node`, in source order.
fn each_child<'a>(node: AnyNode<'a>, f: &mut dyn FnMut(AnyNode<'a>)) {
    match node {
        AnyNode::Program(program) => {
            for stmt in program.statements {
                f(AnyNode::Statement(*stmt));
            }
        }
        AnyNode::Statement(stmt) => each_statement_child(stmt, f),
        AnyNode::TypeParam(param) => {
            if let Some(default) = param.default {
                f(AnyNode::TypeAnnot(default));
            }
        }
        AnyNode::TypeRef(reference) => {
            for arg in reference.args {
                f(AnyNode::TypeAnnot(arg));
            }
        }
        AnyNode::TypeAnnot(annot) => each_annot_child(annot, f),
        AnyNode::ObjectProp(prop) => match prop {
            ObjectProp::Field(field) => {
                if let Some(value) = field.value {
                    f(AnyNode::TypeAnnot(value));
                }
            }
            ObjectProp::Indexer(indexer) => {
                f(AnyNode::TypeAnnot(indexer.key));
                f(AnyNode::TypeAnnot(indexer.value));
            }
        },
    }
}

fn each_statement_child<'a>(stmt: Statement<'a>, f: &mut dyn FnMut(AnyNode<'a>)) {
    match stmt {
        Statement::TypeAlias(decl) => {
            for param in decl.type_params {
                f(AnyNode::TypeParam(param));
            }
            f(AnyNode::TypeAnnot(decl.annot));
        }
        Statement::Interface(decl) => {
            for param in decl.type_params {
                f(AnyNode::TypeParam(param));
            }
            for base in decl.extends {
                f(AnyNode::TypeRef(base));
            }
            for prop in decl.body.props {
                f(AnyNode::ObjectProp(prop));
            }
        }
        Statement::Class(decl) => {
            for param in decl.type_params {
                f(AnyNode::TypeParam(param));
            }
            if let Some(superclass) = decl.superclass {
                f(AnyNode::TypeRef(superclass));
            }
            for member in decl.members {
                f(AnyNode::ObjectProp(member));
            }
        }
        Statement::ExportNamed(export) => {
            if let Some(decl) = export.declaration {
                f(AnyNode::Statement(decl));
            }
        }
        Statement::ExportDefault(export) => {
            if let DefaultExport::Class(decl) = export.value {
                f(AnyNode::Statement(Statement::Class(decl)));
            }
        }
        Statement::Function(decl) => {
            for stmt in decl.body.statements {
                f(AnyNode::Statement(*stmt));
            }
        }
        Statement::Block(block) => {
            for stmt in block.statements {
                f(AnyNode::Statement(*stmt));
            }
        }
        Statement::Import(_)
        | Statement::Require(_)
        | Statement::ConstLiteral(_)
        | Statement::Skipped => {}
    }
}

fn each_annot_child<'a>(annot: &'a TypeAnnot<'a>, f: &mut dyn FnMut(AnyNode<'a>)) {
    match annot {
        TypeAnnot::Nullable { inner, .. } => f(AnyNode::TypeAnnot(inner)),
        TypeAnnot::Array { element, .. } => f(AnyNode::TypeAnnot(element)),
        TypeAnnot::Tuple { elements, .. } => {
            for elem in *elements {
                f(AnyNode::TypeAnnot(elem));
            }
        }
        TypeAnnot::Union { variants, .. } => {
            for variant in *variants {
                f(AnyNode::TypeAnnot(variant));
            }
        }
        TypeAnnot::Intersection { parts, .. } => {
            for part in *parts {
                f(AnyNode::TypeAnnot(part));
            }
        }
        TypeAnnot::Object(object) => {
            for prop in object.props {
                f(AnyNode::ObjectProp(prop));
            }
        }
        TypeAnnot::Reference(reference) => {
            for arg in reference.args {
                f(AnyNode::TypeAnnot(arg));
            }
        }
        TypeAnnot::String(_)
        | TypeAnnot::Number(_)
        | TypeAnnot::Boolean(_)
        | TypeAnnot::Any(_)
        | TypeAnnot::Mixed(_)
        | TypeAnnot::Null(_)
        | TypeAnnot::StringLiteral { .. }
        | TypeAnnot::NumberLiteral { .. }
        | TypeAnnot::BooleanLiteral { .. }
        | TypeAnnot::Function { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowschema_core::text::TextSpan;

    fn span() -> TextSpan {
        TextSpan::empty(0)
    }

    #[test]
    fn test_walk_visits_nested_annotations() {
        let string = TypeAnnot::String(span());
        let array = TypeAnnot::Array { span: span(), element: &string };
        let mut kinds = Vec::new();
        walk(AnyNode::TypeAnnot(&array), &mut |node| {
            if let AnyNode::TypeAnnot(annot) = node {
                kinds.push(std::mem::discriminant(annot));
            }
            false
        });
        assert_eq!(kinds.len(), 2);
    }

    #[test]
    fn test_detain_skips_children() {
        let string = TypeAnnot::String(span());
        let array = TypeAnnot::Array { span: span(), element: &string };
        let mut count = 0;
        walk(AnyNode::TypeAnnot(&array), &mut |_| {
            count += 1;
            true
        });
        assert_eq!(count, 1);
    }
}
