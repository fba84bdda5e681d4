//! Per-phase plugin contexts.
//!
//! Each phase gets exactly the state it may touch: node hooks see one file and
//! its module document, link hooks see the finished module or package.

use std::ops::ControlFlow;

use crate::analysis::{self, Ast, NodeId, NodeKind, WalkOptions};
use crate::jsdoc::{self, JsDocBlock};
use crate::manifest::{DeclarationId, DeclarationKind, Module, ModuleSpecifier, Package, Reference};
use crate::parser::SourceFile;
use crate::resolve::{
    specifier_for_module, DeclarationIndex, DeclarationLocation, ImportRecord, ImportTable,
    Manifests, Resolver, SpecifierQuery,
};

use super::GeneratorOptions;

/// State shared by every node hook of one run.
pub(crate) struct Shared<'a> {
    pub resolver: &'a Resolver,
    pub manifests: Manifests<'a>,
    pub index: &'a DeclarationIndex,
    pub dev: bool,
}

pub struct InitializeContext<'a> {
    pub manifest: &'a mut Package,
    pub options: &'a GeneratorOptions,
}

/// Context for collect and analyze hooks: one node of one file.
pub struct FileContext<'a> {
    file: &'a SourceFile,
    node: NodeId,
    shared: &'a Shared<'a>,
    /// The module document being built for this file.
    pub module_doc: &'a mut Module,
    imports: &'a mut ImportTable,
}

impl<'a> FileContext<'a> {
    pub(crate) fn new(
        file: &'a SourceFile,
        node: NodeId,
        shared: &'a Shared<'a>,
        module_doc: &'a mut Module,
        imports: &'a mut ImportTable,
    ) -> Self {
        Self {
            file,
            node,
            shared,
            module_doc,
            imports,
        }
    }

    pub fn file(&self) -> &'a SourceFile {
        self.file
    }

    /// The tree of the current file. Borrowed independently of the context so
    /// hooks can walk it while editing `module_doc`.
    pub fn ast(&self) -> &'a Ast {
        &self.file.ast
    }

    /// The node being visited.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn kind(&self) -> &'a NodeKind {
        self.file.ast.kind(self.node)
    }

    /// Module path of the current file.
    pub fn path(&self) -> &'a str {
        &self.file.path
    }

    pub fn dev(&self) -> bool {
        self.shared.dev
    }

    pub fn print(&self, node: NodeId) -> &'a str {
        self.file.ast.print(node)
    }

    pub fn parse_jsdoc(&self, node: NodeId) -> Vec<JsDocBlock> {
        jsdoc::parse_jsdoc_for(&self.file.ast, &self.file.comments, node)
    }

    pub fn walk<B>(
        &self,
        root: NodeId,
        options: &WalkOptions,
        visit: impl FnMut(NodeId) -> ControlFlow<B>,
    ) -> ControlFlow<B> {
        analysis::walk(&self.file.ast, root, options, visit)
    }

    /// Module-scope node that declares `name` (class, function or variable).
    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        let ast = &self.file.ast;
        analysis::find(ast, ast.root(), WalkOptions::module_scope(), |id| match ast.kind(id) {
            NodeKind::ClassDeclaration(c) => c.name.as_deref() == Some(name),
            NodeKind::FunctionDeclaration(f) => f.name.as_deref() == Some(name),
            NodeKind::VariableDeclarator {
                name: declared,
                is_pattern: false,
                ..
            } => declared == name,
            _ => false,
        })
    }

    /// Resolve an import specifier relative to the current file.
    pub fn resolve(&self, specifier: &str) -> String {
        self.shared.resolver.resolve(specifier, self.path())
    }

    pub fn collect_import(&mut self, record: ImportRecord) {
        self.imports.push(record);
    }

    pub fn reset_imports(&mut self) {
        self.imports.reset();
    }

    pub fn imports(&self) -> &ImportTable {
        &*self.imports
    }

    pub fn manifests(&self) -> Manifests<'a> {
        self.shared.manifests
    }

    pub fn resolve_declaration(
        &self,
        name: &str,
        kind: Option<DeclarationKind>,
        start: &str,
    ) -> Option<DeclarationLocation> {
        self.shared.manifests.resolve_declaration(name, kind, start)
    }

    /// Module of an already-recorded declaration.
    pub fn declaration_module(&self, id: DeclarationId) -> Option<&'a Module> {
        let (slot, module_idx) = self.shared.index.owner(id)?;
        self.shared.manifests.get(slot)?.modules.get(module_idx)
    }

    /// Where a local name or a recorded declaration lives.
    pub fn resolve_module_or_package_specifier(
        &self,
        query: SpecifierQuery<'_>,
    ) -> Option<ModuleSpecifier> {
        match query {
            SpecifierQuery::Name(name) => self
                .imports
                .find(name)
                .map(|import| self.specifier_for_import(import)),
            SpecifierQuery::Declaration(id) => {
                if self.module_doc.declarations.iter().any(|d| d.id() == id) {
                    return Some(ModuleSpecifier::Module(self.path().to_string()));
                }
                let (slot, module_idx) = self.shared.index.owner(id)?;
                let module = self.shared.manifests.get(slot)?.modules.get(module_idx)?;
                Some(specifier_for_module(slot, &module.path))
            }
        }
    }

    /// Specifier an import statement points at.
    pub fn specifier_for_import(&self, import: &ImportRecord) -> ModuleSpecifier {
        let resolved = self.resolve(&import.path);
        if self.shared.resolver.contains(&resolved) || !import.is_bare_module_specifier {
            ModuleSpecifier::Module(resolved)
        } else {
            ModuleSpecifier::Package(import.path.clone())
        }
    }

    /// Reference to whatever `local` denotes in this file: an import target, or
    /// a declaration of the current module.
    pub fn reference_to(&self, local: &str) -> Reference {
        match self.imports.find(local) {
            Some(import) => {
                let name = import.imported_name.as_deref().unwrap_or(local);
                Reference::from_specifier(name, self.specifier_for_import(import))
            }
            None => Reference::module(local, self.path()),
        }
    }
}

/// Context for module-link hooks: one finished module document.
pub struct ModuleLinkContext<'a> {
    pub module_doc: &'a mut Module,
    file: &'a SourceFile,
    resolver: &'a Resolver,
    dev: bool,
}

impl<'a> ModuleLinkContext<'a> {
    pub(crate) fn new(
        module_doc: &'a mut Module,
        file: &'a SourceFile,
        resolver: &'a Resolver,
        dev: bool,
    ) -> Self {
        Self {
            module_doc,
            file,
            resolver,
            dev,
        }
    }

    pub fn file(&self) -> &'a SourceFile {
        self.file
    }

    pub fn ast(&self) -> &'a Ast {
        &self.file.ast
    }

    pub fn path(&self) -> &'a str {
        &self.file.path
    }

    pub fn resolve(&self, specifier: &str) -> String {
        self.resolver.resolve(specifier, self.path())
    }

    pub fn dev(&self) -> bool {
        self.dev
    }
}

/// Context for package-link hooks: the whole package.
pub struct PackageLinkContext<'a> {
    pub manifest: &'a mut Package,
    pub third_party: &'a [Package],
    dev: bool,
}

impl<'a> PackageLinkContext<'a> {
    pub(crate) fn new(manifest: &'a mut Package, third_party: &'a [Package], dev: bool) -> Self {
        Self {
            manifest,
            third_party,
            dev,
        }
    }

    pub fn dev(&self) -> bool {
        self.dev
    }
}
