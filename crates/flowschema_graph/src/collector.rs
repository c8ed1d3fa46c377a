//! The resolution driver.
//!
//! `collect` registers a file's declarations without resolving anything;
//! types are built lazily the first time a name is queried, either by the
//! eager pass over an entry file's exports or transitively through
//! references. Resolution follows the declare-then-define protocol: an
//! entry moves to `Pending` carrying its final id before its body is
//! walked, so queries that re-enter it (mutual or self recursion) resolve
//! to a reference instead of recursing forever.

use bumpalo::Bump;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use flowschema_ast::node::{
    DefaultExport, LiteralExpr, NodeList, ObjectProp, Program, Statement, TypeAnnot, TypeParam,
    TypeRef,
};
use flowschema_ast::walk::{walk, AnyNode};
use flowschema_parser::{pragma, Parser};

use crate::error::{GraphError, Result};
use crate::fund::Fund;
use crate::module::{self, Module, ModuleId, Modules};
use crate::scope::{Entry, ImportInfo, ScopeId, Scopes};
use crate::specials::{self, SpecialOp};
use crate::types::{Field, LiteralValue, NumberRepr, Type, TypeId, TypeKind};

/// Cap on nested query depth. Same-tuple re-entry is served by the
/// pending/in-flight indirection, so only an instantiation chain over
/// ever-growing distinct parameters can get here.
const MAX_RESOLUTION_DEPTH: usize = 256;

const EXTENSIONS: [&str; 1] = [".js"];

pub struct Collector<'a> {
    arena: &'a Bump,
    scopes: Scopes<'a>,
    modules: Modules,
    fund: Fund,
    /// Parent of every module's top-level scope; holds the built-in
    /// operators.
    root_scope: ScopeId,
    /// Preloaded sources, checked before the file system.
    sources: FxHashMap<PathBuf, String>,
    /// Directory of the first collected entry; namespaces are derived
    /// relative to it.
    root_dir: Option<PathBuf>,
    /// In-flight template instantiations, keyed by defining scope, name,
    /// and parameter signature.
    in_flight: FxHashMap<(ScopeId, String, String), TypeId>,
    depth: usize,
}

impl<'a> Collector<'a> {
    pub fn new(arena: &'a Bump) -> Self {
        let mut scopes = Scopes::new();
        let root_scope = scopes.push_root();
        for op in SpecialOp::all() {
            scopes.get_mut(root_scope).add_special(op);
        }
        Self {
            arena,
            scopes,
            modules: Modules::new(),
            fund: Fund::new(),
            root_scope,
            sources: FxHashMap::default(),
            root_dir: None,
            in_flight: FxHashMap::default(),
            depth: 0,
        }
    }

    /// Preload a source so `collect` and import resolution find it
    /// without touching the file system. The path must be absolute.
    pub fn add_source(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.sources
            .insert(module::normalize_path(&path.into()), text.into());
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.add_source(path, text);
        self
    }

    /// Collect an entry file: parse, register its declarations, then
    /// eagerly resolve its exports. Idempotent per absolute path.
    pub fn collect(&mut self, path: &Path) -> Result<()> {
        self.collect_file(path, false)?;
        Ok(())
    }

    pub fn finish(self) -> Fund {
        self.fund
    }

    fn collect_file(&mut self, path: &Path, internal: bool) -> Result<ModuleId> {
        let path = self.absolutize(path)?;
        if let Some(id) = self.modules.by_path(&path) {
            return Ok(id);
        }
        if self.root_dir.is_none() {
            self.root_dir = Some(
                path.parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("/")),
            );
        }
        debug!(path = %path.display(), internal, "collecting module");

        let text = self.load(&path)?;
        let program = Parser::new(self.arena, &path.to_string_lossy(), &text).parse_program()?;

        let root_dir = self
            .root_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("/"));
        let namespace = module::namespace_of(&root_dir, &path);
        let mut file_module = Module::new(path, namespace);
        let top_namespace = file_module.generate_scope_id();
        let module_id = self.modules.insert(file_module);
        let scope = self
            .scopes
            .extend(self.root_scope, Some(module_id), top_namespace);

        self.register_program(module_id, scope, program)?;
        if !internal {
            self.resolve_exports(module_id)?;
        }
        Ok(module_id)
    }

    fn absolutize(&self, path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            return Ok(module::normalize_path(path));
        }
        let cwd = std::env::current_dir().map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(module::normalize_path(&cwd.join(path)))
    }

    fn load(&self, path: &Path) -> Result<String> {
        if let Some(text) = self.sources.get(path) {
            return Ok(text.clone());
        }
        std::fs::read_to_string(path).map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    // ------------------------------------------------------------------
    // Registration pass: names only, no resolution
    // ------------------------------------------------------------------

    /// Drive the walker over a parsed program, detaining every statement:
    /// declaration-shape statements are dispatched to `register_statement`
    /// and the walker never descends on its own.
    fn register_program(
        &mut self,
        module: ModuleId,
        scope: ScopeId,
        program: &'a Program<'a>,
    ) -> Result<()> {
        let mut outcome = Ok(());
        walk(AnyNode::Program(program), &mut |node| match node {
            AnyNode::Statement(statement) => {
                if outcome.is_ok() {
                    outcome = self.register_statement(module, scope, statement);
                }
                true
            }
            _ => false,
        });
        outcome
    }

    fn register_statements(
        &mut self,
        module: ModuleId,
        scope: ScopeId,
        statements: NodeList<'a, Statement<'a>>,
    ) -> Result<()> {
        for statement in statements {
            self.register_statement(module, scope, *statement)?;
        }
        Ok(())
    }

    fn register_statement(
        &mut self,
        module: ModuleId,
        scope: ScopeId,
        statement: Statement<'a>,
    ) -> Result<()> {
        match statement {
            Statement::Import(decl) => {
                for binding in decl.bindings {
                    self.scopes.get_mut(scope).add_import(ImportInfo {
                        local: binding.local.to_string(),
                        imported: binding.imported.map(str::to_string),
                        source: decl.source.to_string(),
                    })?;
                }
            }
            Statement::Require(decl) => {
                for binding in decl.bindings {
                    self.scopes.get_mut(scope).add_import(ImportInfo {
                        local: binding.local.to_string(),
                        imported: binding.imported.map(str::to_string),
                        source: decl.source.to_string(),
                    })?;
                }
            }
            Statement::TypeAlias(decl) => {
                self.scopes
                    .get_mut(scope)
                    .add_declaration(decl.name, statement, decl.type_params)?;
            }
            Statement::Interface(decl) => {
                self.scopes
                    .get_mut(scope)
                    .add_declaration(decl.name, statement, decl.type_params)?;
            }
            Statement::Class(decl) => {
                self.scopes
                    .get_mut(scope)
                    .add_declaration(decl.name, statement, decl.type_params)?;
            }
            Statement::ConstLiteral(decl) => {
                self.scopes
                    .get_mut(scope)
                    .add_declaration(decl.name, statement, &[])?;
            }
            Statement::Function(decl) => {
                let namespace = self.modules.get_mut(module).generate_scope_id();
                let child = self.scopes.extend(scope, Some(module), namespace);
                self.register_statements(module, child, decl.body.statements)?;
            }
            Statement::Block(block) => {
                let namespace = self.modules.get_mut(module).generate_scope_id();
                let child = self.scopes.extend(scope, Some(module), namespace);
                self.register_statements(module, child, block.statements)?;
            }
            Statement::ExportNamed(export) => {
                if let Some(declaration) = export.declaration {
                    self.register_statement(module, scope, declaration)?;
                    if let Some(name) = declared_name(declaration) {
                        self.modules.get_mut(module).add_export(
                            Some(name.to_string()),
                            scope,
                            name.to_string(),
                        );
                    }
                }
                for specifier in export.specifiers {
                    self.modules.get_mut(module).add_export(
                        Some(specifier.exported.to_string()),
                        scope,
                        specifier.local.to_string(),
                    );
                }
            }
            Statement::ExportDefault(export) => match export.value {
                DefaultExport::Name(name) => {
                    self.modules
                        .get_mut(module)
                        .add_export(None, scope, name.to_string());
                }
                DefaultExport::Class(decl) => {
                    self.scopes.get_mut(scope).add_declaration(
                        decl.name,
                        Statement::Class(decl),
                        decl.type_params,
                    )?;
                    self.modules
                        .get_mut(module)
                        .add_export(None, scope, decl.name.to_string());
                }
            },
            Statement::Skipped => {}
        }
        Ok(())
    }

    /// Eagerly resolve a requested file's exports and mark them as tops.
    /// A template export is instantiated only when every formal carries a
    /// default; otherwise importers instantiate it on demand.
    fn resolve_exports(&mut self, module: ModuleId) -> Result<()> {
        for (name, binding) in self.modules.get(module).exports_in_order() {
            let undefaulted_template = matches!(
                self.scopes.lookup(binding.scope, &binding.local),
                Some((_, Entry::Template { formals, .. }))
                    if formals.iter().any(|f| f.default.is_none())
            );
            if undefaulted_template {
                trace!(export = ?name, "leaving template export for importers");
                continue;
            }
            let ty = self.query(binding.scope, &binding.local, &[])?;
            if let Some(id) = ty.id {
                self.fund.mark_top(id);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // The query protocol
    // ------------------------------------------------------------------

    fn query(&mut self, scope: ScopeId, name: &str, params: &[Type]) -> Result<Type> {
        self.depth += 1;
        if self.depth > MAX_RESOLUTION_DEPTH {
            self.depth -= 1;
            return Err(GraphError::RecursiveInstantiation {
                name: name.to_string(),
            });
        }
        let result = self.query_inner(scope, name, params);
        self.depth -= 1;
        result
    }

    fn query_inner(&mut self, scope: ScopeId, name: &str, params: &[Type]) -> Result<Type> {
        let mut current_scope = scope;
        let mut current_name = name.to_string();
        loop {
            let hit = match self.scopes.lookup(current_scope, &current_name) {
                None => {
                    return Err(GraphError::UnknownName {
                        name: current_name,
                    })
                }
                Some((found, entry)) => match entry {
                    Entry::Definition(ty) => Hit::Definition(ty.clone()),
                    Entry::Pending(id) => Hit::Pending(id.clone()),
                    Entry::Special(op) => Hit::Special(*op),
                    Entry::External(info) => Hit::External(found, info.clone()),
                    Entry::Declaration(node) => Hit::Declaration(found, *node),
                    Entry::Template { node, formals, .. } => Hit::Template(found, *node, *formals),
                },
            };

            trace!(name = %current_name, params = params.len(), "query");
            return match hit {
                Hit::Definition(ty) => {
                    if params.is_empty() {
                        Ok(ty)
                    } else {
                        Err(GraphError::ProtocolViolation(format!(
                            "'{current_name}' is not generic but was given type parameters"
                        )))
                    }
                }
                Hit::Pending(id) => Ok(Type {
                    id: Some(id.clone()),
                    kind: TypeKind::Reference { to: id },
                }),
                Hit::Special(op) => specials::apply(op, params, &self.fund),
                Hit::External(found, info) => {
                    let (target_scope, target_name) = self.follow_import(found, &info)?;
                    current_scope = target_scope;
                    current_name = target_name;
                    continue;
                }
                Hit::Declaration(found, node) => {
                    if !params.is_empty() {
                        return Err(GraphError::ProtocolViolation(format!(
                            "'{current_name}' is not generic but was given type parameters"
                        )));
                    }
                    self.resolve_plain(found, &current_name, node)
                }
                Hit::Template(found, node, formals) => {
                    self.resolve_template(found, &current_name, node, formals, params)
                }
            };
        }
    }

    /// Resolve an import to the (scope, local name) it binds in the
    /// source module, collecting that module first if needed.
    fn follow_import(&mut self, scope: ScopeId, info: &ImportInfo) -> Result<(ScopeId, String)> {
        let module_id = self.scopes.get(scope).module.ok_or_else(|| {
            GraphError::ProtocolViolation("import registered outside a module".to_string())
        })?;
        let importer = self.modules.get(module_id).path.clone();
        let dir = self.modules.get(module_id).dir().to_path_buf();

        let resolved = {
            let sources = &self.sources;
            module::resolve_import(&dir, &info.source, &EXTENSIONS, &mut |p| {
                sources.contains_key(p) || p.is_file()
            })
        }
        .ok_or_else(|| GraphError::UnresolvedImport {
            specifier: info.source.clone(),
            importer,
        })?;

        let target = self.collect_file(&resolved, true)?;
        let binding = self
            .modules
            .get(target)
            .export(info.imported.as_deref())
            .cloned()
            .ok_or_else(|| GraphError::UnknownName {
                name: info
                    .imported
                    .clone()
                    .unwrap_or_else(|| format!("default export of '{}'", info.source)),
            })?;
        Ok((binding.scope, binding.local))
    }

    /// Declare → pending → define for a non-generic declaration.
    fn resolve_plain(&mut self, scope: ScopeId, name: &str, node: Statement<'a>) -> Result<Type> {
        let id = self.scopes.get(scope).namespace.child(name);
        debug!(id = %id, "resolving declaration");
        self.scopes.get_mut(scope).set_pending(name, id.clone())?;
        let mut ty = self.build_declaration(scope, node)?;
        ty.id = Some(id);
        self.scopes
            .get_mut(scope)
            .add_definition(name, ty.clone(), true)?;
        self.fund.put(ty.clone())?;
        Ok(ty)
    }

    /// Instantiate a template for a concrete parameter tuple, reusing the
    /// cache when a structurally equal tuple was seen before.
    fn resolve_template(
        &mut self,
        scope: ScopeId,
        name: &str,
        node: Statement<'a>,
        formals: NodeList<'a, TypeParam<'a>>,
        params: &[Type],
    ) -> Result<Type> {
        if params.len() > formals.len() {
            return Err(GraphError::ProtocolViolation(format!(
                "'{name}' takes {} type parameter(s), got {}",
                formals.len(),
                params.len()
            )));
        }
        let mut bound = Vec::with_capacity(formals.len());
        for (i, formal) in formals.iter().enumerate() {
            match params.get(i) {
                Some(actual) => bound.push(actual.clone()),
                None => {
                    let default = formal.default.ok_or_else(|| {
                        GraphError::ProtocolViolation(format!(
                            "missing type parameter '{}' for '{name}'",
                            formal.name
                        ))
                    })?;
                    let ty = self.make_type_required(scope, default)?;
                    bound.push(ty);
                }
            }
        }

        if let Some(cached) = self.scopes.get(scope).find_instance(name, &bound) {
            trace!(name, "instance cache hit");
            return Ok(cached.clone());
        }

        let signature = bound
            .iter()
            .map(|ty| {
                ty.instance_segment().ok_or_else(|| {
                    GraphError::ProtocolViolation(format!(
                        "cannot name an instantiation of '{name}' over a composite parameter"
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?
            .join("_");
        let id = self
            .scopes
            .get(scope)
            .namespace
            .child(name)
            .child(&signature);

        let key = (scope, name.to_string(), signature);
        if let Some(pending) = self.in_flight.get(&key) {
            return Ok(Type {
                id: Some(pending.clone()),
                kind: TypeKind::Reference {
                    to: pending.clone(),
                },
            });
        }
        debug!(id = %id, "instantiating template");
        self.in_flight.insert(key.clone(), id.clone());

        let module = self.scopes.get(scope).module;
        let child_namespace = match module {
            Some(m) => self.modules.get_mut(m).generate_scope_id(),
            None => id.clone(),
        };
        let child = self.scopes.extend(scope, module, child_namespace);
        for (formal, actual) in formals.iter().zip(&bound) {
            self.scopes
                .get_mut(child)
                .add_definition(formal.name, actual.clone(), false)?;
        }

        let built = self.build_declaration(child, node);
        self.in_flight.remove(&key);
        let mut ty = built?;
        ty.id = Some(id);
        self.scopes
            .get_mut(scope)
            .add_instance(name, bound, ty.clone())?;
        self.fund.put(ty.clone())?;
        Ok(ty)
    }

    // ------------------------------------------------------------------
    // The type builder
    // ------------------------------------------------------------------

    fn build_declaration(&mut self, scope: ScopeId, node: Statement<'a>) -> Result<Type> {
        match node {
            Statement::TypeAlias(decl) => {
                self.make_type(scope, decl.annot)?.ok_or_else(|| {
                    GraphError::ProtocolViolation(format!(
                        "type alias '{}' has no representable type",
                        decl.name
                    ))
                })
            }
            Statement::Interface(decl) => {
                let own = self.build_object_type(scope, decl.body.props)?;
                let bases = decl
                    .extends
                    .iter()
                    .map(|base| self.base_reference(scope, base))
                    .collect::<Result<Vec<_>>>()?;
                Ok(with_bases(bases, own))
            }
            Statement::Class(decl) => {
                let own = self.build_object_type(scope, decl.members)?;
                let bases = match decl.superclass {
                    Some(base) => vec![self.base_reference(scope, base)?],
                    None => Vec::new(),
                };
                Ok(with_bases(bases, own))
            }
            Statement::ConstLiteral(decl) => Ok(Type::literal(match decl.value {
                LiteralExpr::Str(s) => LiteralValue::Str(s.to_string()),
                LiteralExpr::Num(n) => LiteralValue::Num(n),
                LiteralExpr::Bool(b) => LiteralValue::Bool(b),
            })),
            _ => Err(GraphError::ProtocolViolation(
                "statement is not a resolvable declaration".to_string(),
            )),
        }
    }

    /// A reference to an `extends`/superclass base, which must resolve to
    /// a named type.
    fn base_reference(&mut self, scope: ScopeId, base: &TypeRef<'a>) -> Result<Type> {
        let args = self.make_args(scope, base)?;
        let ty = self.query(scope, base.name, &args)?;
        let id = ty.id.ok_or_else(|| {
            GraphError::ProtocolViolation(format!("base '{}' is not a named type", base.name))
        })?;
        Ok(Type::reference(id))
    }

    /// Convert an annotation subtree into a type. `None` means the
    /// annotation has no representation (function types); containers
    /// decide whether that drops the member or the whole shape.
    fn make_type(&mut self, scope: ScopeId, annot: &TypeAnnot<'a>) -> Result<Option<Type>> {
        Ok(match annot {
            TypeAnnot::String(_) => Some(Type::of(TypeKind::String)),
            TypeAnnot::Boolean(_) => Some(Type::of(TypeKind::Boolean)),
            TypeAnnot::Number(_) => Some(Type::number(NumberRepr::F64)),
            TypeAnnot::Any(_) => Some(Type::of(TypeKind::Any)),
            TypeAnnot::Mixed(_) => Some(Type::of(TypeKind::Mixed)),
            TypeAnnot::Null(_) => Some(Type::literal(LiteralValue::Null)),
            TypeAnnot::StringLiteral { value, .. } => {
                Some(Type::literal(LiteralValue::Str(value.to_string())))
            }
            TypeAnnot::NumberLiteral { value, .. } => {
                Some(Type::literal(LiteralValue::Num(*value)))
            }
            TypeAnnot::BooleanLiteral { value, .. } => {
                Some(Type::literal(LiteralValue::Bool(*value)))
            }
            TypeAnnot::Function { .. } => None,
            TypeAnnot::Nullable { inner, .. } => {
                self.make_type(scope, inner)?.map(Type::maybe)
            }
            TypeAnnot::Array { element, .. } => {
                self.make_type(scope, element)?.map(|items| {
                    Type::of(TypeKind::Array {
                        items: Box::new(items),
                    })
                })
            }
            TypeAnnot::Tuple { elements, .. } => {
                let mut items = Vec::with_capacity(elements.len());
                for element in *elements {
                    items.push(self.make_type(scope, element)?);
                }
                if items.iter().all(Option::is_none) {
                    None
                } else {
                    Some(Type::of(TypeKind::Tuple { items }))
                }
            }
            TypeAnnot::Union { variants, .. } => {
                let mut resolved = Vec::new();
                for variant in *variants {
                    if let Some(ty) = self.make_type(scope, variant)? {
                        resolved.push(ty);
                    }
                }
                collapse(resolved, |variants| TypeKind::Union { variants })
            }
            TypeAnnot::Intersection { parts, .. } => {
                let mut resolved = Vec::new();
                for part in *parts {
                    if let Some(ty) = self.make_type(scope, part)? {
                        resolved.push(ty);
                    }
                }
                collapse(resolved, |parts| TypeKind::Intersection { parts })
            }
            TypeAnnot::Object(object) => self.build_object_type(scope, object.props)?,
            TypeAnnot::Reference(reference) => {
                let mut args = self.make_args(scope, reference)?;
                if reference.name == "Array" && args.len() == 1 {
                    let items = args.remove(0);
                    return Ok(Some(Type::of(TypeKind::Array {
                        items: Box::new(items),
                    })));
                }
                let ty = self.query(scope, reference.name, &args)?;
                match ty.id {
                    // Named types are pointed at, never inlined.
                    Some(id) => Some(Type::reference(id)),
                    // Transient results (bound formals, operator results)
                    // are cloned inline.
                    None => Some(ty),
                }
            }
        })
    }

    fn make_type_required(&mut self, scope: ScopeId, annot: &TypeAnnot<'a>) -> Result<Type> {
        self.make_type(scope, annot)?.ok_or_else(|| {
            GraphError::UnsupportedNode("annotation has no representable type".to_string())
        })
    }

    fn make_args(&mut self, scope: ScopeId, reference: &TypeRef<'a>) -> Result<Vec<Type>> {
        let mut args = Vec::with_capacity(reference.args.len());
        for arg in reference.args {
            args.push(self.make_type_required(scope, arg)?);
        }
        Ok(args)
    }

    /// Build an object body: non-indexer properties become a record,
    /// each indexer becomes a map; one map with no fields stands alone,
    /// otherwise everything joins in an intersection.
    fn build_object_type(
        &mut self,
        scope: ScopeId,
        props: NodeList<'a, ObjectProp<'a>>,
    ) -> Result<Option<Type>> {
        let mut fields = Vec::new();
        let mut maps = Vec::new();
        for prop in props {
            match prop {
                ObjectProp::Field(field) => {
                    if field.is_static {
                        continue;
                    }
                    // A pragma replaces the field's type wholesale.
                    if let Some(repr) = field
                        .leading_comment
                        .and_then(pragma::parse_repr)
                        .and_then(NumberRepr::from_name)
                    {
                        fields.push(Field {
                            name: field.name.to_string(),
                            value: Type::number(repr),
                            required: !field.optional,
                        });
                        continue;
                    }
                    let Some(annot) = field.value else {
                        continue;
                    };
                    let Some(value) = self.make_type(scope, annot)? else {
                        // Function-typed fields are invisible to the
                        // output.
                        continue;
                    };
                    fields.push(Field {
                        name: field.name.to_string(),
                        value,
                        required: !field.optional,
                    });
                }
                ObjectProp::Indexer(indexer) => {
                    let keys = self.make_type_required(scope, indexer.key)?;
                    let values = self.make_type_required(scope, indexer.value)?;
                    maps.push(Type::of(TypeKind::Map {
                        keys: Box::new(keys),
                        values: Box::new(values),
                    }));
                }
            }
        }
        Ok(Some(match (fields.is_empty(), maps.len()) {
            (true, 1) => maps.remove(0),
            (_, 0) => Type::of(TypeKind::Record { fields }),
            _ => {
                let mut parts = vec![Type::of(TypeKind::Record { fields })];
                parts.append(&mut maps);
                Type::of(TypeKind::Intersection { parts })
            }
        }))
    }
}

/// The owned snapshot of a scope lookup, so the borrow of the scope arena
/// ends before the resolution step mutates it.
enum Hit<'a> {
    Definition(Type),
    Pending(TypeId),
    Special(SpecialOp),
    External(ScopeId, ImportInfo),
    Declaration(ScopeId, Statement<'a>),
    Template(ScopeId, Statement<'a>, NodeList<'a, TypeParam<'a>>),
}

fn declared_name<'a>(statement: Statement<'a>) -> Option<&'a str> {
    match statement {
        Statement::TypeAlias(decl) => Some(decl.name),
        Statement::Interface(decl) => Some(decl.name),
        Statement::Class(decl) => Some(decl.name),
        Statement::ConstLiteral(decl) => Some(decl.name),
        _ => None,
    }
}

/// Combine base references with the own body: no bases leaves the body
/// alone, otherwise `intersection([bases..., own])` with the own body
/// last so most-derived fields win when flattened.
fn with_bases(bases: Vec<Type>, own: Option<Type>) -> Type {
    let own = own.unwrap_or_else(|| Type::of(TypeKind::Record { fields: vec![] }));
    if bases.is_empty() {
        own
    } else {
        let mut parts = bases;
        parts.push(own);
        Type::of(TypeKind::Intersection { parts })
    }
}

/// Arity collapsing shared by unions and intersections: zero resolved
/// members drop the whole shape, one stands alone, more keep the wrapper.
fn collapse(mut resolved: Vec<Type>, wrap: impl FnOnce(Vec<Type>) -> TypeKind) -> Option<Type> {
    match resolved.len() {
        0 => None,
        1 => Some(resolved.remove(0)),
        _ => Some(Type::of(wrap(resolved))),
    }
}
