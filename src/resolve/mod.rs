//! Import resolution and cross-module declaration lookup.
//!
//! Lookups never fail hard: a name that cannot be found yields `None` and the
//! caller leaves the reference as written.

mod imports;
pub mod path;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::trace;

pub use imports::{ImportKind, ImportRecord, ImportTable};

use crate::manifest::{
    Declaration, DeclarationId, DeclarationKind, ExportKind, Module, ModuleSpecifier, Package,
    Reference,
};

/// Custom resolution hook: `(specifier, importer) -> path`.
pub type ResolveFn = dyn Fn(&str, &str) -> Option<String> + Send + Sync;

/// Maps import specifiers to module paths of the analyzed package.
#[derive(Clone, Default)]
pub struct Resolver {
    known: HashSet<String>,
    custom: Option<Arc<ResolveFn>>,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("known", &self.known.len())
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

impl Resolver {
    pub fn new(paths: impl IntoIterator<Item = String>, custom: Option<Arc<ResolveFn>>) -> Self {
        Self {
            known: paths.into_iter().collect(),
            custom,
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.known.contains(path)
    }

    /// Resolve `specifier` as imported from the module at `importer`.
    ///
    /// Relative specifiers are joined with the importer's directory. Every
    /// specifier is then matched against known files, trying common extension
    /// variants. A bare specifier no known file matches is returned unchanged.
    pub fn resolve(&self, specifier: &str, importer: &str) -> String {
        let (base, fallback) = match self.custom.as_ref().and_then(|hook| hook(specifier, importer)) {
            Some(mapped) => {
                let base = path::normalize(&mapped);
                (base.clone(), base)
            }
            None if path::is_bare_module_specifier(specifier) => {
                (path::normalize(specifier), specifier.to_string())
            }
            None => {
                let base = path::join(path::dirname(importer), specifier);
                (base.clone(), base)
            }
        };
        let resolved = self.find_known(&base).unwrap_or(fallback);
        trace!(specifier, importer, resolved = %resolved, "resolved import");
        resolved
    }

    fn find_known(&self, base: &str) -> Option<String> {
        path::candidates(base)
            .into_iter()
            .find(|candidate| self.known.contains(candidate))
    }
}

/// Which manifest of a [`Manifests`] set a location points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestSlot {
    Primary,
    ThirdParty(usize),
}

/// Position of a declaration within a manifest set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclarationLocation {
    pub manifest: ManifestSlot,
    pub module: usize,
    pub declaration: usize,
}

/// Specifier for a module at `path` in the given manifest: third-party modules
/// and non-script paths are addressed as packages.
pub fn specifier_for_module(slot: ManifestSlot, path: &str) -> ModuleSpecifier {
    match slot {
        ManifestSlot::Primary if path::has_script_extension(path) => {
            ModuleSpecifier::Module(path.to_string())
        }
        _ => ModuleSpecifier::Package(path.to_string()),
    }
}

/// The package being built plus any third-party manifests, searched in order.
#[derive(Debug, Clone, Copy)]
pub struct Manifests<'a> {
    primary: &'a Package,
    third_party: &'a [Package],
}

impl<'a> Manifests<'a> {
    pub fn new(primary: &'a Package, third_party: &'a [Package]) -> Self {
        Self {
            primary,
            third_party,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ManifestSlot, &'a Package)> {
        std::iter::once((ManifestSlot::Primary, self.primary)).chain(
            self.third_party
                .iter()
                .enumerate()
                .map(|(i, p)| (ManifestSlot::ThirdParty(i), p)),
        )
    }

    pub fn get(&self, slot: ManifestSlot) -> Option<&'a Package> {
        match slot {
            ManifestSlot::Primary => Some(self.primary),
            ManifestSlot::ThirdParty(i) => self.third_party.get(i),
        }
    }

    pub fn module(&self, location: DeclarationLocation) -> Option<&'a Module> {
        self.get(location.manifest)?.modules.get(location.module)
    }

    pub fn declaration(&self, location: DeclarationLocation) -> Option<&'a Declaration> {
        self.module(location)?.declarations.get(location.declaration)
    }

    /// Reference to the declaration at `location`, addressed from outside.
    pub fn reference_to(&self, location: DeclarationLocation) -> Option<Reference> {
        let module = self.module(location)?;
        let declaration = module.declarations.get(location.declaration)?;
        Some(Reference::from_specifier(
            declaration.name(),
            specifier_for_module(location.manifest, &module.path),
        ))
    }

    /// Find the declaration that `name` denotes when looked up from the module
    /// at `start`.
    ///
    /// Exports are searched first, following named re-export chains and `*`
    /// re-exports across modules and manifests; local declarations are the
    /// fallback. Class-like kinds match each other.
    pub fn resolve_declaration(
        &self,
        name: &str,
        kind: Option<DeclarationKind>,
        start: &str,
    ) -> Option<DeclarationLocation> {
        let mut visited = HashSet::new();
        self.resolve_in(name, kind, start, &mut visited)
    }

    fn resolve_in(
        &self,
        name: &str,
        kind: Option<DeclarationKind>,
        path: &str,
        visited: &mut HashSet<(String, String)>,
    ) -> Option<DeclarationLocation> {
        if !visited.insert((path.to_string(), name.to_string())) {
            return None;
        }

        for (slot, package) in self.iter() {
            let Some((module_idx, module)) =
                package.modules.iter().enumerate().find(|(_, m)| m.path == path)
            else {
                continue;
            };
            let local = |target: &str| {
                find_local(module, target, kind).map(|declaration| DeclarationLocation {
                    manifest: slot,
                    module: module_idx,
                    declaration,
                })
            };

            let js_exports = module.exports.iter().filter(|e| e.kind == ExportKind::Js);
            for export in js_exports.clone().filter(|e| e.name == name) {
                let target = &export.declaration;
                let target_path = target.location().unwrap_or(path);
                let found = if target_path == path {
                    local(&target.name)
                } else {
                    self.resolve_in(&target.name, kind, target_path, visited)
                };
                if found.is_some() {
                    return found;
                }
            }

            if name != "default" {
                for export in js_exports.filter(|e| e.is_wildcard()) {
                    let Some(target_path) = export.declaration.location() else {
                        continue;
                    };
                    if target_path == path {
                        continue;
                    }
                    if let Some(found) = self.resolve_in(name, kind, target_path, visited) {
                        return Some(found);
                    }
                }
            }

            if let Some(found) = local(name) {
                return Some(found);
            }
        }
        None
    }

    /// Locate a declaration by identity with a full scan.
    pub fn find_by_id(&self, id: DeclarationId) -> Option<DeclarationLocation> {
        self.iter().find_map(|(slot, package)| {
            package.modules.iter().enumerate().find_map(|(mi, module)| {
                module
                    .declarations
                    .iter()
                    .position(|d| d.id() == id)
                    .map(|di| DeclarationLocation {
                        manifest: slot,
                        module: mi,
                        declaration: di,
                    })
            })
        })
    }
}

fn kind_matches(wanted: Option<DeclarationKind>, actual: DeclarationKind) -> bool {
    match wanted {
        None => true,
        Some(w) => w == actual || (w.is_class_like() && actual.is_class_like()),
    }
}

fn find_local(module: &Module, name: &str, kind: Option<DeclarationKind>) -> Option<usize> {
    module
        .declarations
        .iter()
        .position(|d| d.name() == name && kind_matches(kind, d.kind()))
}

/// Declaration id to owning module, kept up to date as modules are added.
#[derive(Debug, Clone, Default)]
pub struct DeclarationIndex {
    owners: HashMap<DeclarationId, (ManifestSlot, usize)>,
}

impl DeclarationIndex {
    pub fn insert_module(&mut self, slot: ManifestSlot, module_idx: usize, module: &Module) {
        for declaration in &module.declarations {
            self.owners.insert(declaration.id(), (slot, module_idx));
        }
    }

    pub fn insert_package(&mut self, slot: ManifestSlot, package: &Package) {
        for (idx, module) in package.modules.iter().enumerate() {
            self.insert_module(slot, idx, module);
        }
    }

    pub fn owner(&self, id: DeclarationId) -> Option<(ManifestSlot, usize)> {
        self.owners.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// What to compute a module-or-package specifier for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierQuery<'q> {
    /// A local binding name, looked up in the current file's imports.
    Name(&'q str),
    /// A declaration already recorded in some manifest.
    Declaration(DeclarationId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{ClassDeclaration, Export};

    fn class_module(path: &str, class: &str) -> Module {
        let mut module = Module::new(path);
        module
            .declarations
            .push(Declaration::Class(ClassDeclaration::new(class)));
        module
    }

    #[test]
    fn test_resolver_extension_variants() {
        let resolver = Resolver::new(
            ["src/a.ts".to_string(), "src/lib/index.js".to_string()],
            None,
        );
        assert_eq!(resolver.resolve("./a.js", "src/b.js"), "src/a.ts");
        assert_eq!(resolver.resolve("./lib", "src/b.js"), "src/lib/index.js");
        assert_eq!(resolver.resolve("./missing.js", "src/b.js"), "src/missing.js");
        assert_eq!(resolver.resolve("lit", "src/b.js"), "lit");
    }

    #[test]
    fn test_resolver_matches_bare_specifier_against_known_files() {
        let resolver = Resolver::new(
            ["src/util.ts".to_string(), "widgets/index.js".to_string()],
            None,
        );
        assert_eq!(resolver.resolve("src/util.js", "src/b.js"), "src/util.ts");
        assert_eq!(resolver.resolve("widgets", "src/b.js"), "widgets/index.js");
        assert_eq!(resolver.resolve("lit/decorators.js", "src/b.js"), "lit/decorators.js");
    }

    #[test]
    fn test_resolver_custom_hook_first() {
        let hook: Arc<ResolveFn> = Arc::new(|spec: &str, _: &str| {
            spec.strip_prefix("@app/").map(|rest| format!("src/{rest}"))
        });
        let resolver = Resolver::new(["src/x.js".to_string()], Some(hook));
        assert_eq!(resolver.resolve("@app/x", "src/b.js"), "src/x.js");
        assert_eq!(resolver.resolve("lit", "src/b.js"), "lit");
    }

    #[test]
    fn test_resolve_through_reexport_chain() {
        let mut package = Package::new();
        let mut index = Module::new("index.js");
        index
            .exports
            .push(Export::js("*", Reference::module("*", "a.js")));
        let mut a = Module::new("a.js");
        a.exports
            .push(Export::js("Renamed", Reference::module("Base", "b.js")));
        let mut b = class_module("b.js", "Base");
        b.exports
            .push(Export::js("Base", Reference::module("Base", "b.js")));
        package.modules = vec![index, a, b];

        let manifests = Manifests::new(&package, &[]);
        let found = manifests
            .resolve_declaration("Renamed", Some(DeclarationKind::Class), "index.js")
            .unwrap();
        assert_eq!(found.module, 2);
        assert_eq!(manifests.declaration(found).unwrap().name(), "Base");
    }

    #[test]
    fn test_resolve_terminates_on_cyclic_reexports() {
        let mut package = Package::new();
        let mut a = Module::new("a.js");
        a.exports.push(Export::js("*", Reference::module("*", "b.js")));
        let mut b = Module::new("b.js");
        b.exports.push(Export::js("*", Reference::module("*", "a.js")));
        package.modules = vec![a, b];

        let manifests = Manifests::new(&package, &[]);
        assert!(manifests.resolve_declaration("X", None, "a.js").is_none());
    }

    #[test]
    fn test_third_party_lookup_and_specifier() {
        let primary = Package::new();
        let mut lib = Package::new();
        let mut module = class_module("my-lib", "LibElement");
        module
            .exports
            .push(Export::js("LibElement", Reference::module("LibElement", "my-lib")));
        lib.modules.push(module);
        let third_party = vec![lib];

        let manifests = Manifests::new(&primary, &third_party);
        let found = manifests
            .resolve_declaration("LibElement", Some(DeclarationKind::Class), "my-lib")
            .unwrap();
        assert_eq!(found.manifest, ManifestSlot::ThirdParty(0));
        assert_eq!(
            manifests.reference_to(found),
            Some(Reference::package("LibElement", "my-lib"))
        );
    }

    #[test]
    fn test_declaration_index() {
        let module = class_module("a.js", "A");
        let id = module.declarations[0].id();
        let mut index = DeclarationIndex::default();
        index.insert_module(ManifestSlot::Primary, 3, &module);
        assert_eq!(index.owner(id), Some((ManifestSlot::Primary, 3)));
    }

    #[test]
    fn test_specifier_for_module() {
        assert_eq!(
            specifier_for_module(ManifestSlot::Primary, "src/a.js"),
            ModuleSpecifier::Module("src/a.js".into())
        );
        assert_eq!(
            specifier_for_module(ManifestSlot::Primary, "my-pkg"),
            ModuleSpecifier::Package("my-pkg".into())
        );
        assert_eq!(
            specifier_for_module(ManifestSlot::ThirdParty(0), "x/a.js"),
            ModuleSpecifier::Package("x/a.js".into())
        );
    }
}
