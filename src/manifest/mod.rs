//! Custom elements manifest document model.
//!
//! The serialized shape is a fixed external contract (schema `1.0.0`). Every
//! collection on a class-like declaration is optional so that empty lists can be
//! dropped from the output by the cleanup pass.

mod declarations;
mod items;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

pub use declarations::{
    ClassDeclaration, Declaration, DeclarationKind, FunctionDeclaration, VariableDeclaration,
};
pub use items::{
    Attribute, CssProperty, Event, Field, Member, Method, NamedItem, Parameter, Privacy,
    ReturnInfo, TypeInfo,
};

/// Schema version written into every package document.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Module kind written into every module document.
pub const MODULE_KIND: &str = "javascript-module";

/// Package pseudo-specifier used for browser globals such as `HTMLElement`.
pub const GLOBAL_PACKAGE: &str = "global:";

/// Process-unique identity of a declaration.
///
/// Declarations reference each other by name and location only; the id exists so
/// that "which module owns this declaration" can be answered without comparing
/// whole records. It is never serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclarationId(u64);

static NEXT_DECLARATION_ID: AtomicU64 = AtomicU64::new(1);

impl DeclarationId {
    /// Allocate a new id.
    pub fn fresh() -> Self {
        DeclarationId(NEXT_DECLARATION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for DeclarationId {
    fn default() -> Self {
        Self::fresh()
    }
}

impl fmt::Display for DeclarationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Root output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub schema_version: String,
    #[serde(default)]
    pub readme: String,
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl Default for Package {
    fn default() -> Self {
        Self::new()
    }
}

impl Package {
    pub fn new() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            readme: String::new(),
            modules: Vec::new(),
        }
    }

    /// Parse a manifest from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Find a module by path.
    pub fn module(&self, path: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.path == path)
    }

    /// Find a module by path, mutably.
    pub fn module_mut(&mut self, path: &str) -> Option<&mut Module> {
        self.modules.iter_mut().find(|m| m.path == path)
    }

    /// Iterate over every class-like declaration in the package.
    pub fn class_likes(&self) -> impl Iterator<Item = (&Module, &ClassDeclaration)> {
        self.modules.iter().flat_map(|module| {
            module
                .declarations
                .iter()
                .filter_map(move |d| d.as_class_like().map(|c| (module, c)))
        })
    }
}

/// One source file (or, after bundling, one package entrypoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub kind: String,
    pub path: String,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    #[serde(default)]
    pub exports: Vec<Export>,
}

impl Module {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            kind: MODULE_KIND.to_string(),
            path: path.into(),
            declarations: Vec::new(),
            exports: Vec::new(),
        }
    }

    /// Find a declaration by name.
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name() == name)
    }

    /// Find the most recently added class-like declaration with the given name.
    pub fn class_mut(&mut self, name: &str) -> Option<&mut ClassDeclaration> {
        self.declarations
            .iter_mut()
            .rev()
            .filter_map(|d| d.as_class_like_mut())
            .find(|c| c.name == name)
    }

    /// Add an export unless an identical one is already present.
    pub fn push_export(&mut self, export: Export) {
        if !self.exports.contains(&export) {
            self.exports.push(export);
        }
    }
}

/// Pointer to another declaration.
///
/// Exactly one of `module` (same package, path addressed) or `package` (bare
/// specifier) is set. Use the constructors to keep that invariant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

impl Reference {
    pub fn module(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: Some(module.into()),
            package: None,
        }
    }

    pub fn package(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: None,
            package: Some(package.into()),
        }
    }

    pub fn from_specifier(name: impl Into<String>, specifier: ModuleSpecifier) -> Self {
        match specifier {
            ModuleSpecifier::Module(path) => Self::module(name, path),
            ModuleSpecifier::Package(pkg) => Self::package(name, pkg),
        }
    }

    /// The module path or package specifier this reference points into.
    pub fn location(&self) -> Option<&str> {
        self.module.as_deref().or(self.package.as_deref())
    }

    pub fn specifier(&self) -> Option<ModuleSpecifier> {
        match (&self.module, &self.package) {
            (Some(m), _) => Some(ModuleSpecifier::Module(m.clone())),
            (None, Some(p)) => Some(ModuleSpecifier::Package(p.clone())),
            (None, None) => None,
        }
    }
}

/// Where a name lives: a module of the analyzed package, or an external package.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModuleSpecifier {
    Module(String),
    Package(String),
}

impl ModuleSpecifier {
    pub fn as_str(&self) -> &str {
        match self {
            ModuleSpecifier::Module(s) | ModuleSpecifier::Package(s) => s,
        }
    }
}

/// Kind of export entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportKind {
    Js,
    CustomElementDefinition,
}

/// An export of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Export {
    pub kind: ExportKind,
    pub name: String,
    pub declaration: Reference,
}

impl Export {
    pub fn js(name: impl Into<String>, declaration: Reference) -> Self {
        Self {
            kind: ExportKind::Js,
            name: name.into(),
            declaration,
        }
    }

    pub fn custom_element(tag_name: impl Into<String>, declaration: Reference) -> Self {
        Self {
            kind: ExportKind::CustomElementDefinition,
            name: tag_name.into(),
            declaration,
        }
    }

    /// `export * from '...'`
    pub fn is_wildcard(&self) -> bool {
        self.kind == ExportKind::Js && self.name == "*"
    }
}
