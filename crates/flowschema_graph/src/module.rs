//! Per-file modules: namespaces, export tables, import path resolution.

use rustc_hash::FxHashMap;
use std::path::{Component, Path, PathBuf};

use crate::scope::ScopeId;
use crate::types::TypeId;

/// Index into the collector's module arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(pub(crate) u32);

/// One export binding: the exported name maps to `local` in `scope`.
#[derive(Debug, Clone)]
pub struct ExportBinding {
    pub scope: ScopeId,
    pub local: String,
}

#[derive(Debug)]
pub struct Module {
    /// Canonical absolute path of the source file.
    pub path: PathBuf,
    /// TypeId prefix derived from the path.
    pub namespace: TypeId,
    /// Exported name → binding; `None` keys the default export.
    exports: FxHashMap<Option<String>, ExportBinding>,
    /// Ordered list of exported names, for deterministic eager resolution.
    export_order: Vec<Option<String>>,
    scope_counter: u32,
}

impl Module {
    pub fn new(path: PathBuf, namespace: TypeId) -> Self {
        Self {
            path,
            namespace,
            exports: FxHashMap::default(),
            export_order: Vec::new(),
            scope_counter: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("/"))
    }

    /// The first call returns the module's own namespace (the top-level
    /// scope); every later call appends an incrementing numeric suffix so
    /// nested scopes get distinct TypeId prefixes.
    pub fn generate_scope_id(&mut self) -> TypeId {
        let n = self.scope_counter;
        self.scope_counter += 1;
        if n == 0 {
            self.namespace.clone()
        } else {
            self.namespace.child(&n.to_string())
        }
    }

    /// Record an export binding. Re-adding the same name overwrites
    /// (last write wins).
    pub fn add_export(&mut self, name: Option<String>, scope: ScopeId, local: String) {
        if !self.exports.contains_key(&name) {
            self.export_order.push(name.clone());
        }
        self.exports.insert(name, ExportBinding { scope, local });
    }

    pub fn export(&self, name: Option<&str>) -> Option<&ExportBinding> {
        self.exports.get(&name.map(str::to_string))
    }

    /// Export bindings in declaration order.
    pub fn exports_in_order(&self) -> Vec<(Option<String>, ExportBinding)> {
        self.export_order
            .iter()
            .filter_map(|name| {
                self.exports
                    .get(name)
                    .map(|binding| (name.clone(), binding.clone()))
            })
            .collect()
    }
}

/// The module arena plus its by-path cache. A file is ever parsed once.
#[derive(Debug, Default)]
pub struct Modules {
    arena: Vec<Module>,
    by_path: FxHashMap<PathBuf, ModuleId>,
}

impl Modules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ModuleId) -> &Module {
        &self.arena[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.arena[id.0 as usize]
    }

    pub fn by_path(&self, path: &Path) -> Option<ModuleId> {
        self.by_path.get(path).copied()
    }

    pub fn insert(&mut self, module: Module) -> ModuleId {
        let id = ModuleId(self.arena.len() as u32);
        self.by_path.insert(module.path.clone(), id);
        self.arena.push(module);
        id
    }
}

/// Lexically normalize a path: resolve `.` and `..` components without
/// touching the file system.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Resolve a relative import specifier against the importing file's
/// directory: probe the path as written, then with each extension
/// appended, then as a directory with an index file. Bare (package)
/// specifiers are not resolvable.
pub fn resolve_import(
    base_dir: &Path,
    specifier: &str,
    extensions: &[&str],
    exists: &mut dyn FnMut(&Path) -> bool,
) -> Option<PathBuf> {
    if !specifier.starts_with('.') && !specifier.starts_with('/') {
        return None;
    }
    let base = normalize_path(&base_dir.join(specifier));

    if exists(&base) {
        return Some(base);
    }
    for ext in extensions {
        let candidate = with_appended(&base, ext);
        if exists(&candidate) {
            return Some(candidate);
        }
    }
    for ext in extensions {
        let candidate = base.join(format!("index{ext}"));
        if exists(&candidate) {
            return Some(candidate);
        }
    }
    None
}

fn with_appended(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}

/// Derive a module's namespace from its path, relative to the collection
/// root. Segments are the relative path components with the extension
/// dropped and non-identifier characters replaced.
pub fn namespace_of(root: &Path, path: &Path) -> TypeId {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if let Some(last) = segments.last_mut() {
        if let Some(stem) = Path::new(last.as_str())
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
        {
            *last = stem;
        }
    }
    TypeId::new(segments.into_iter().map(|s| sanitize(&s)).collect())
}

fn sanitize(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for ch in segment.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/a/b/../c/./d.js")),
            PathBuf::from("/a/c/d.js")
        );
    }

    #[test]
    fn test_resolve_import_probes_extensions_and_index() {
        let files = [
            PathBuf::from("/src/a.js"),
            PathBuf::from("/src/lib/index.js"),
        ];
        let mut exists = |p: &Path| files.iter().any(|f| f == p);

        assert_eq!(
            resolve_import(Path::new("/src"), "./a", &[".js"], &mut exists),
            Some(PathBuf::from("/src/a.js"))
        );
        assert_eq!(
            resolve_import(Path::new("/src"), "./a.js", &[".js"], &mut exists),
            Some(PathBuf::from("/src/a.js"))
        );
        assert_eq!(
            resolve_import(Path::new("/src"), "./lib", &[".js"], &mut exists),
            Some(PathBuf::from("/src/lib/index.js"))
        );
        assert_eq!(
            resolve_import(Path::new("/src"), "./missing", &[".js"], &mut exists),
            None
        );
        // Bare specifiers never resolve.
        assert_eq!(
            resolve_import(Path::new("/src"), "react", &[".js"], &mut exists),
            None
        );
    }

    #[test]
    fn test_namespace_of() {
        let ns = namespace_of(Path::new("/src"), Path::new("/src/sub/my-file.js"));
        assert_eq!(ns, TypeId::new(vec!["sub".into(), "my_file".into()]));
        let outside = namespace_of(Path::new("/src"), Path::new("/other/x.js"));
        assert_eq!(outside, TypeId::new(vec!["other".into(), "x".into()]));
    }

    #[test]
    fn test_generate_scope_id_sequence() {
        let mut module = Module::new(
            PathBuf::from("/src/a.js"),
            TypeId::new(vec!["a".into()]),
        );
        assert_eq!(module.generate_scope_id(), TypeId::new(vec!["a".into()]));
        assert_eq!(
            module.generate_scope_id(),
            TypeId::new(vec!["a".into(), "1".into()])
        );
        assert_eq!(
            module.generate_scope_id(),
            TypeId::new(vec!["a".into(), "2".into()])
        );
    }

    #[test]
    fn test_export_last_write_wins() {
        let mut module = Module::new(
            PathBuf::from("/src/a.js"),
            TypeId::new(vec!["a".into()]),
        );
        module.add_export(Some("T".into()), ScopeId(0), "First".into());
        module.add_export(Some("T".into()), ScopeId(0), "Second".into());
        let exports = module.exports_in_order();
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].1.local, "Second");
    }
}
