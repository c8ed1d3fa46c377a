//! Lexical scopes and their entries.
//!
//! Scopes form a tree through parent indices into a flat arena owned by
//! the collector; a scope never enumerates its children. Each scope maps
//! names to entries that move through the declaration state machine:
//! `Declaration` → `Pending` (definition walk in flight) → `Definition`,
//! with `Template` accumulating instances instead of becoming a single
//! definition, and `External`/`Special` redirecting resolution elsewhere.

use rustc_hash::FxHashMap;

use flowschema_ast::node::{NodeList, Statement, TypeParam};

use crate::error::{GraphError, Result};
use crate::module::ModuleId;
use crate::specials::SpecialOp;
use crate::types::{Type, TypeId};

/// Index into the collector's scope arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub(crate) u32);

/// An import binding: `local` in this scope names `imported` (or the
/// default export, if `None`) of `source`.
#[derive(Debug, Clone)]
pub struct ImportInfo {
    pub local: String,
    pub imported: Option<String>,
    pub source: String,
}

/// One cached instantiation of a template.
#[derive(Debug, Clone)]
pub struct Instance {
    pub params: Vec<Type>,
    pub ty: Type,
}

#[derive(Debug)]
pub enum Entry<'a> {
    /// An unresolved declaration, still a syntax subtree.
    Declaration(Statement<'a>),
    /// A declaration with formal type parameters plus its growing
    /// instance cache.
    Template {
        node: Statement<'a>,
        formals: NodeList<'a, TypeParam<'a>>,
        instances: Vec<Instance>,
    },
    /// A resolved type.
    Definition(Type),
    /// A definition walk is in flight; queries resolve to a reference to
    /// the committed-to-be id.
    Pending(TypeId),
    External(ImportInfo),
    Special(SpecialOp),
}

#[derive(Debug)]
pub struct Scope<'a> {
    pub parent: Option<ScopeId>,
    /// `None` only for the root scope holding the built-in operators.
    pub module: Option<ModuleId>,
    /// This scope's TypeId prefix.
    pub namespace: TypeId,
    entries: FxHashMap<String, Entry<'a>>,
}

impl<'a> Scope<'a> {
    fn new(parent: Option<ScopeId>, module: Option<ModuleId>, namespace: TypeId) -> Self {
        Self {
            parent,
            module,
            namespace,
            entries: FxHashMap::default(),
        }
    }

    pub fn entry(&self, name: &str) -> Option<&Entry<'a>> {
        self.entries.get(name)
    }

    fn insert_new(&mut self, name: &str, entry: Entry<'a>) -> Result<()> {
        if self.entries.contains_key(name) {
            return Err(GraphError::Redefinition {
                name: name.to_string(),
            });
        }
        self.entries.insert(name.to_string(), entry);
        Ok(())
    }

    /// Register an unresolved declaration; templated when `formals` is
    /// non-empty.
    pub fn add_declaration(
        &mut self,
        name: &str,
        node: Statement<'a>,
        formals: NodeList<'a, TypeParam<'a>>,
    ) -> Result<()> {
        let entry = if formals.is_empty() {
            Entry::Declaration(node)
        } else {
            Entry::Template {
                node,
                formals,
                instances: Vec::new(),
            }
        };
        self.insert_new(name, entry)
    }

    pub fn add_import(&mut self, info: ImportInfo) -> Result<()> {
        let name = info.local.clone();
        self.insert_new(&name, Entry::External(info))
    }

    pub fn add_special(&mut self, op: SpecialOp) {
        self.entries.insert(op.name().to_string(), Entry::Special(op));
    }

    /// Move a declaration into the in-flight state.
    pub fn set_pending(&mut self, name: &str, id: TypeId) -> Result<()> {
        match self.entries.get_mut(name) {
            Some(entry @ Entry::Declaration(_)) => {
                *entry = Entry::Pending(id);
                Ok(())
            }
            _ => Err(GraphError::ProtocolViolation(format!(
                "'{name}' is not an unresolved declaration"
            ))),
        }
    }

    /// Commit a resolved type under `name`. With `declared` set, the entry
    /// must currently be `Pending` (the declare-then-define protocol);
    /// without it, `name` must be entirely new.
    pub fn add_definition(&mut self, name: &str, ty: Type, declared: bool) -> Result<()> {
        if declared {
            match self.entries.get_mut(name) {
                Some(entry @ Entry::Pending(_)) => {
                    *entry = Entry::Definition(ty);
                    Ok(())
                }
                Some(_) => Err(GraphError::ProtocolViolation(format!(
                    "defining '{name}' out of order"
                ))),
                None => Err(GraphError::ProtocolViolation(format!(
                    "defining '{name}' without a declaration"
                ))),
            }
        } else {
            self.insert_new(name, Entry::Definition(ty))
        }
    }

    /// Append a cached instantiation to a template entry.
    pub fn add_instance(&mut self, name: &str, params: Vec<Type>, ty: Type) -> Result<()> {
        match self.entries.get_mut(name) {
            Some(Entry::Template { instances, .. }) => {
                instances.push(Instance { params, ty });
                Ok(())
            }
            _ => Err(GraphError::ProtocolViolation(format!(
                "'{name}' is not a template"
            ))),
        }
    }

    /// A cached instance whose parameter tuple is structurally equal.
    pub fn find_instance(&self, name: &str, params: &[Type]) -> Option<&Type> {
        match self.entries.get(name) {
            Some(Entry::Template { instances, .. }) => instances
                .iter()
                .find(|instance| instance.params == params)
                .map(|instance| &instance.ty),
            _ => None,
        }
    }
}

/// The scope arena. Scopes are created per module/block/template walk and
/// live for the whole run.
#[derive(Debug, Default)]
pub struct Scopes<'a> {
    arena: Vec<Scope<'a>>,
}

impl<'a> Scopes<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_root(&mut self) -> ScopeId {
        self.push(Scope::new(None, None, TypeId::empty()))
    }

    /// Create a child scope. A fresh `namespace` starts a new id-generation
    /// context (new module or nested block); see `Module::generate_scope_id`.
    pub fn extend(
        &mut self,
        parent: ScopeId,
        module: Option<ModuleId>,
        namespace: TypeId,
    ) -> ScopeId {
        self.push(Scope::new(Some(parent), module, namespace))
    }

    fn push(&mut self, scope: Scope<'a>) -> ScopeId {
        let id = ScopeId(self.arena.len() as u32);
        self.arena.push(scope);
        id
    }

    pub fn get(&self, id: ScopeId) -> &Scope<'a> {
        &self.arena[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut Scope<'a> {
        &mut self.arena[id.0 as usize]
    }

    /// Resolve `name` through the parent chain. Returns the scope that
    /// actually holds the entry.
    pub fn lookup(&self, from: ScopeId, name: &str) -> Option<(ScopeId, &Entry<'a>)> {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = self.get(id);
            if let Some(entry) = scope.entry(name) {
                return Some((id, entry));
            }
            current = scope.parent;
        }
        None
    }
}
