//! AST node definitions.
//!
//! The tree covers exactly the declaration-shaped surface the type-graph
//! engine consumes: imports, exports, type aliases, interfaces, classes,
//! literal consts, and the blocks that can nest them. Everything else in a
//! source file parses to `Statement::Skipped`.
//!
//! Container nodes reference children through arena slices (`NodeList`) so
//! the whole tree is `Copy`-cheap to hand around.

use flowschema_core::text::TextSpan;

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

/// The root of a parsed source file.
#[derive(Debug)]
pub struct Program<'a> {
    pub statements: NodeList<'a, Statement<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub enum Statement<'a> {
    Import(&'a ImportDecl<'a>),
    /// `const X = require('./m')` / `const {A, B} = require('./m')`.
    Require(&'a RequireDecl<'a>),
    ExportNamed(&'a ExportNamed<'a>),
    ExportDefault(&'a ExportDefault<'a>),
    TypeAlias(&'a TypeAliasDecl<'a>),
    Interface(&'a InterfaceDecl<'a>),
    Class(&'a ClassDecl<'a>),
    /// `const X = 'literal'` — declares a literal type.
    ConstLiteral(&'a ConstLiteralDecl<'a>),
    Function(&'a FunctionDecl<'a>),
    Block(&'a Block<'a>),
    /// A statement the engine has no use for; parsed over and dropped.
    Skipped,
}

// ============================================================================
// Imports and exports
// ============================================================================

/// One imported name. `imported: None` binds the default export.
#[derive(Debug)]
pub struct ImportBinding<'a> {
    pub local: &'a str,
    pub imported: Option<&'a str>,
}

#[derive(Debug)]
pub struct ImportDecl<'a> {
    pub span: TextSpan,
    pub source: &'a str,
    pub bindings: NodeList<'a, ImportBinding<'a>>,
}

#[derive(Debug)]
pub struct RequireDecl<'a> {
    pub span: TextSpan,
    pub source: &'a str,
    pub bindings: NodeList<'a, ImportBinding<'a>>,
}

/// `export <declaration>` or `export {A, B as C}`.
#[derive(Debug)]
pub struct ExportNamed<'a> {
    pub span: TextSpan,
    pub declaration: Option<Statement<'a>>,
    pub specifiers: NodeList<'a, ExportSpecifier<'a>>,
}

#[derive(Debug)]
pub struct ExportSpecifier<'a> {
    pub local: &'a str,
    pub exported: &'a str,
}

#[derive(Debug)]
pub struct ExportDefault<'a> {
    pub span: TextSpan,
    pub value: DefaultExport<'a>,
}

#[derive(Debug, Clone, Copy)]
pub enum DefaultExport<'a> {
    /// `export default SomeName;`
    Name(&'a str),
    /// `export default class C { ... }`
    Class(&'a ClassDecl<'a>),
}

// ============================================================================
// Type declarations
// ============================================================================

/// A formal type parameter, e.g. the `U = string` in `type T<U = string>`.
#[derive(Debug)]
pub struct TypeParam<'a> {
    pub name: &'a str,
    pub default: Option<&'a TypeAnnot<'a>>,
}

#[derive(Debug)]
pub struct TypeAliasDecl<'a> {
    pub span: TextSpan,
    pub name: &'a str,
    pub type_params: NodeList<'a, TypeParam<'a>>,
    pub annot: &'a TypeAnnot<'a>,
}

#[derive(Debug)]
pub struct InterfaceDecl<'a> {
    pub span: TextSpan,
    pub name: &'a str,
    pub type_params: NodeList<'a, TypeParam<'a>>,
    pub extends: NodeList<'a, TypeRef<'a>>,
    pub body: ObjectAnnot<'a>,
}

#[derive(Debug)]
pub struct ClassDecl<'a> {
    pub span: TextSpan,
    pub name: &'a str,
    pub type_params: NodeList<'a, TypeParam<'a>>,
    pub superclass: Option<&'a TypeRef<'a>>,
    pub members: NodeList<'a, ObjectProp<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralExpr<'a> {
    Str(&'a str),
    Num(f64),
    Bool(bool),
}

#[derive(Debug)]
pub struct ConstLiteralDecl<'a> {
    pub span: TextSpan,
    pub name: &'a str,
    pub value: LiteralExpr<'a>,
}

/// A function declaration. Parameters and the return annotation are not
/// retained; the body is, because type declarations may nest inside it.
#[derive(Debug)]
pub struct FunctionDecl<'a> {
    pub span: TextSpan,
    pub name: &'a str,
    pub body: Block<'a>,
}

#[derive(Debug)]
pub struct Block<'a> {
    pub span: TextSpan,
    pub statements: NodeList<'a, Statement<'a>>,
}

// ============================================================================
// Type annotations
// ============================================================================

/// A named type reference with optional type arguments: `Foo<Bar, Baz>`.
#[derive(Debug)]
pub struct TypeRef<'a> {
    pub span: TextSpan,
    pub name: &'a str,
    pub args: NodeList<'a, TypeAnnot<'a>>,
}

#[derive(Debug)]
pub enum TypeAnnot<'a> {
    String(TextSpan),
    Number(TextSpan),
    Boolean(TextSpan),
    Any(TextSpan),
    Mixed(TextSpan),
    /// `void` and `null` both resolve to the null literal type.
    Null(TextSpan),
    StringLiteral { span: TextSpan, value: &'a str },
    NumberLiteral { span: TextSpan, value: f64 },
    BooleanLiteral { span: TextSpan, value: bool },
    /// `?T`
    Nullable { span: TextSpan, inner: &'a TypeAnnot<'a> },
    /// `T[]` or `Array<T>` (the parser keeps `Array<T>` as a reference;
    /// the builder special-cases it).
    Array { span: TextSpan, element: &'a TypeAnnot<'a> },
    Tuple { span: TextSpan, elements: NodeList<'a, TypeAnnot<'a>> },
    Union { span: TextSpan, variants: NodeList<'a, TypeAnnot<'a>> },
    Intersection { span: TextSpan, parts: NodeList<'a, TypeAnnot<'a>> },
    Object(ObjectAnnot<'a>),
    Reference(TypeRef<'a>),
    /// `(a: T) => R` — carried so containers can drop it by policy.
    Function { span: TextSpan },
}

impl<'a> TypeAnnot<'a> {
    pub fn span(&self) -> TextSpan {
        match self {
            TypeAnnot::String(s)
            | TypeAnnot::Number(s)
            | TypeAnnot::Boolean(s)
            | TypeAnnot::Any(s)
            | TypeAnnot::Mixed(s)
            | TypeAnnot::Null(s)
            | TypeAnnot::Function { span: s } => *s,
            TypeAnnot::StringLiteral { span, .. }
            | TypeAnnot::NumberLiteral { span, .. }
            | TypeAnnot::BooleanLiteral { span, .. }
            | TypeAnnot::Nullable { span, .. }
            | TypeAnnot::Array { span, .. }
            | TypeAnnot::Tuple { span, .. }
            | TypeAnnot::Union { span, .. }
            | TypeAnnot::Intersection { span, .. } => *span,
            TypeAnnot::Object(o) => o.span,
            TypeAnnot::Reference(r) => r.span,
        }
    }
}

/// An object type body: `{ a: T }`, exact `{| a: T |}`, or a class body.
#[derive(Debug)]
pub struct ObjectAnnot<'a> {
    pub span: TextSpan,
    pub exact: bool,
    pub props: NodeList<'a, ObjectProp<'a>>,
}

#[derive(Debug)]
pub enum ObjectProp<'a> {
    Field(FieldProp<'a>),
    Indexer(IndexerProp<'a>),
}

#[derive(Debug)]
pub struct FieldProp<'a> {
    pub span: TextSpan,
    pub name: &'a str,
    /// Absent for class methods without an annotation.
    pub value: Option<&'a TypeAnnot<'a>>,
    pub optional: bool,
    pub is_static: bool,
    pub is_method: bool,
    /// Raw text of the comment immediately preceding the property, if any.
    /// The pragma micro-parser decides whether it means something.
    pub leading_comment: Option<&'a str>,
}

/// `[string]: V` or `[key: string]: V`.
#[derive(Debug)]
pub struct IndexerProp<'a> {
    pub span: TextSpan,
    pub key: &'a TypeAnnot<'a>,
    pub value: &'a TypeAnnot<'a>,
}
