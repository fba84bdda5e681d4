//! Folding several analyzed packages into one document, and merging two
//! finished documents.
//!
//! Each package becomes a single module whose path is the package name. The
//! module holds the declarations of the package entrypoint plus every module the
//! entrypoint reaches through re-exports. Names that collide within the folded
//! module are suffixed (`Foo`, `Foo1`, `Foo2`, ...) and every reference that
//! pointed at a folded declaration is rewritten to `{name, package}` so that
//! cross-package superclasses resolve once all packages are assembled.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, warn};

use crate::error::Result;
use crate::inheritance::apply_inheritance;
use crate::manifest::{Declaration, Export, ExportKind, Module, Package, Reference};
use crate::parser::SourceFile;
use crate::pipeline::{Generator, GeneratorOptions};
use crate::resolve::{path, Manifests};

/// Source files of one package to bundle.
#[derive(Debug, Clone)]
pub struct PackageSources {
    /// Package name; becomes the path of the folded module.
    pub name: String,
    /// Module path of the entrypoint. When absent the shortest `index.*` path is
    /// used, then the first file.
    pub entrypoint: Option<String>,
    pub files: Vec<SourceFile>,
}

impl PackageSources {
    pub fn new(name: impl Into<String>, files: Vec<SourceFile>) -> Self {
        Self {
            name: name.into(),
            entrypoint: None,
            files,
        }
    }

    pub fn with_entrypoint(mut self, entrypoint: impl Into<String>) -> Self {
        self.entrypoint = Some(entrypoint.into());
        self
    }
}

/// Analyze every package and fold each into one module of a single document.
pub fn bundle(packages: &[PackageSources], options: &GeneratorOptions) -> Result<Package> {
    let mut bundled = Package::new();
    for sources in packages {
        let generated = Generator::new(options.clone()).generate(&sources.files)?;
        match fold_package(&sources.name, sources.entrypoint.as_deref(), &generated) {
            Some(module) => {
                debug!(
                    package = %sources.name,
                    declarations = module.declarations.len(),
                    exports = module.exports.len(),
                    "package folded"
                );
                bundled.modules.push(module);
            }
            None => warn!(package = %sources.name, "package has no modules; skipped"),
        }
    }
    apply_inheritance(&mut bundled, &options.third_party)?;
    Ok(bundled)
}

/// Merge two finished documents. Modules keep their first-seen position; on a
/// path collision the module from `second` replaces the one from `first`.
pub fn merge_custom_elements_manifests(first: &Package, second: &Package) -> Result<Package> {
    let mut merged = Package::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for module in first.modules.iter().chain(&second.modules) {
        match positions.get(module.path.as_str()) {
            Some(&i) => merged.modules[i] = module.clone(),
            None => {
                positions.insert(&module.path, merged.modules.len());
                merged.modules.push(module.clone());
            }
        }
    }
    // Both inputs may carry copies of the same declaration records.
    merged
        .modules
        .iter_mut()
        .flat_map(|m| m.declarations.iter_mut())
        .for_each(Declaration::refresh_id);
    apply_inheritance(&mut merged, &[])?;
    Ok(merged)
}

fn entrypoint(package: &Package, explicit: Option<&str>) -> Option<usize> {
    if let Some(explicit) = explicit {
        let explicit = path::normalize(explicit);
        if let Some(i) = package.modules.iter().position(|m| m.path == explicit) {
            return Some(i);
        }
        warn!(entrypoint = %explicit, "entrypoint is not an analyzed module");
    }
    package
        .modules
        .iter()
        .enumerate()
        .filter(|(_, m)| file_name(&m.path).starts_with("index."))
        .min_by_key(|(_, m)| m.path.len())
        .map(|(i, _)| i)
        .or_else(|| (!package.modules.is_empty()).then_some(0))
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Modules reachable from `entry` through re-exports, entry first.
fn reachable(package: &Package, entry: usize) -> Vec<usize> {
    let by_path: HashMap<&str, usize> = package
        .modules
        .iter()
        .enumerate()
        .map(|(i, m)| (m.path.as_str(), i))
        .collect();

    let mut order = vec![entry];
    let mut seen = HashSet::from([entry]);
    let mut queue = VecDeque::from([entry]);
    while let Some(i) = queue.pop_front() {
        for export in &package.modules[i].exports {
            let Some(&target) = export
                .declaration
                .module
                .as_deref()
                .and_then(|m| by_path.get(m))
            else {
                continue;
            };
            if seen.insert(target) {
                order.push(target);
                queue.push_back(target);
            }
        }
    }
    order
}

/// First of `name`, `name1`, `name2`, ... not in `taken`.
fn free_name(name: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(name) {
        return name.to_string();
    }
    (1..)
        .map(|n| format!("{name}{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

struct Fold<'p> {
    name: &'p str,
    package: &'p Package,
    /// Per source module: original declaration name to folded name.
    renames: HashMap<usize, HashMap<String, String>>,
}

impl Fold<'_> {
    /// Where a module reference of the source package lands in the bundle.
    fn rewrite(&self, reference: &Reference) -> Option<Reference> {
        let path = reference.module.as_deref()?;
        let location =
            Manifests::new(self.package, &[]).resolve_declaration(&reference.name, None, path)?;
        let original = self.package.modules[location.module]
            .declarations
            .get(location.declaration)?
            .name();
        let renamed = self.renames.get(&location.module)?.get(original)?;
        Some(Reference::package(renamed.clone(), self.name))
    }

    fn rewrite_or_keep(&self, reference: &Reference) -> Reference {
        self.rewrite(reference).unwrap_or_else(|| reference.clone())
    }

    /// The JavaScript exports of the module at `index`, with `export *` from
    /// modules of the same package expanded.
    fn flatten_exports(&self, index: usize, visited: &mut HashSet<usize>, out: &mut Vec<Export>) {
        if !visited.insert(index) {
            return;
        }
        let module = &self.package.modules[index];
        for export in module.exports.iter().filter(|e| e.kind == ExportKind::Js) {
            if !export.is_wildcard() {
                out.push(Export::js(
                    export.name.clone(),
                    self.rewrite_or_keep(&export.declaration),
                ));
                continue;
            }
            let target = export.declaration.module.as_deref().and_then(|m| {
                self.package.modules.iter().position(|candidate| candidate.path == m)
            });
            match target {
                Some(target) => self.flatten_exports(target, visited, out),
                None => out.push(export.clone()),
            }
        }
    }
}

fn fold_package(name: &str, explicit: Option<&str>, package: &Package) -> Option<Module> {
    let entry = entrypoint(package, explicit)?;
    let order = reachable(package, entry);

    let mut taken = HashSet::new();
    let mut renames: HashMap<usize, HashMap<String, String>> = HashMap::new();
    let mut declarations = Vec::new();
    for &index in &order {
        let map = renames.entry(index).or_default();
        for declaration in &package.modules[index].declarations {
            let folded = free_name(declaration.name(), &taken);
            taken.insert(folded.clone());
            if folded != declaration.name() {
                debug!(
                    package = name,
                    module = %package.modules[index].path,
                    from = declaration.name(),
                    to = %folded,
                    "renamed colliding declaration"
                );
            }
            map.insert(declaration.name().to_string(), folded.clone());
            let mut copy = declaration.clone();
            copy.set_name(folded);
            declarations.push(copy);
        }
    }

    let fold = Fold {
        name,
        package,
        renames,
    };
    for class in declarations.iter_mut().filter_map(|d| d.as_class_like_mut()) {
        for reference in class.references_mut() {
            if let Some(rewritten) = fold.rewrite(reference) {
                *reference = rewritten;
            }
        }
    }

    let mut module = Module::new(name);
    module.declarations = declarations;

    let mut exports = Vec::new();
    fold.flatten_exports(entry, &mut HashSet::new(), &mut exports);
    for export in exports {
        if !module.exports.iter().any(|e| e.kind == export.kind && e.name == export.name) {
            module.exports.push(export);
        }
    }
    for &index in &order {
        for export in package.modules[index]
            .exports
            .iter()
            .filter(|e| e.kind == ExportKind::CustomElementDefinition)
        {
            module.push_export(Export::custom_element(
                export.name.clone(),
                fold.rewrite_or_keep(&export.declaration),
            ));
        }
    }
    Some(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{ClassDeclaration, NamedItem};

    fn parse(path: &str, source: &str) -> SourceFile {
        SourceFile::parse(path, source).unwrap()
    }

    #[test]
    fn test_free_name_takes_first_unused_suffix() {
        let taken: HashSet<String> = ["Foo", "Foo1", "Foo3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(free_name("Bar", &taken), "Bar");
        assert_eq!(free_name("Foo", &taken), "Foo2");
    }

    #[test]
    fn test_entrypoint_prefers_shortest_index() {
        let mut package = Package::new();
        for path in ["src/a.js", "src/components/index.js", "src/index.js"] {
            package.modules.push(Module::new(path));
        }
        assert_eq!(entrypoint(&package, None), Some(2));
        assert_eq!(entrypoint(&package, Some("./src/a.js")), Some(0));
        assert_eq!(entrypoint(&package, Some("missing.js")), Some(2));

        let mut plain = Package::new();
        plain.modules.push(Module::new("lib/el.js"));
        assert_eq!(entrypoint(&plain, None), Some(0));
        assert_eq!(entrypoint(&Package::new(), None), None);
    }

    #[test]
    fn test_fold_renames_and_rewrites_superclass() {
        let files = vec![
            parse(
                "index.js",
                "import { Foo as BFoo } from './b.js';\n\
                 export { Foo } from './a.js';\n\
                 export { Foo as Bar } from './b.js';\n\
                 export class Sub extends BFoo {}",
            ),
            parse("a.js", "export class Foo {}"),
            parse("b.js", "export class Foo extends HTMLElement {}"),
        ];
        let bundled = bundle(
            &[PackageSources::new("my-pkg", files)],
            &GeneratorOptions::default(),
        )
        .unwrap();

        assert_eq!(bundled.modules.len(), 1);
        let module = &bundled.modules[0];
        assert_eq!(module.path, "my-pkg");
        // Re-exports are followed in sorted export order: `Bar` (b.js) before `Foo` (a.js).
        let names: Vec<_> = module.declarations.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["Sub", "Foo", "Foo1"]);
        let from_b = module.declaration("Foo").unwrap().as_class_like().unwrap();
        assert_eq!(
            from_b.superclass,
            Some(Reference::package("HTMLElement", "global:"))
        );

        let sub = module.declaration("Sub").unwrap().as_class_like().unwrap();
        assert_eq!(sub.superclass, Some(Reference::package("Foo", "my-pkg")));

        let bar = module.exports.iter().find(|e| e.name == "Bar").unwrap();
        assert_eq!(bar.declaration, Reference::package("Foo", "my-pkg"));
        let foo = module.exports.iter().find(|e| e.name == "Foo").unwrap();
        assert_eq!(foo.declaration, Reference::package("Foo1", "my-pkg"));
    }

    #[test]
    fn test_merge_second_wins_at_first_position() {
        let mut first = Package::new();
        first.modules.push(Module::new("a.js"));
        first.modules.push(Module::new("b.js"));
        let mut replacement = Module::new("a.js");
        replacement
            .declarations
            .push(Declaration::Class(ClassDeclaration::new("FromSecond")));
        let mut second = Package::new();
        second.modules.push(Module::new("c.js"));
        second.modules.push(replacement);

        let merged = merge_custom_elements_manifests(&first, &second).unwrap();
        let paths: Vec<_> = merged.modules.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["a.js", "b.js", "c.js"]);
        assert!(merged.modules[0].declaration("FromSecond").is_some());
    }

    #[test]
    fn test_merge_applies_inheritance_across_inputs() {
        let mut base = ClassDeclaration::new("Base");
        base.slots = Some(vec![NamedItem::new("icon", "Icon slot")]);
        let mut first = Package::new();
        let mut base_module = Module::new("base.js");
        base_module.declarations.push(Declaration::Class(base));
        first.modules.push(base_module);

        let mut child = ClassDeclaration::new("Child");
        child.superclass = Some(Reference::module("Base", "base.js"));
        let mut second = Package::new();
        let mut child_module = Module::new("child.js");
        child_module.declarations.push(Declaration::Class(child));
        second.modules.push(child_module);

        let merged = merge_custom_elements_manifests(&first, &second).unwrap();
        let child = merged.modules[1].declarations[0].as_class_like().unwrap();
        let slot = &child.slots.as_ref().unwrap()[0];
        assert_eq!(slot.name, "icon");
        assert_eq!(slot.inherited_from, Some(Reference::module("Base", "base.js")));
    }
}
