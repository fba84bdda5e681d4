//! Per-file import table.

use super::path::is_bare_module_specifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import x from '...'`
    Default,
    /// `import { x } from '...'`
    Named,
    /// `import * as ns from '...'`
    Aggregate,
    /// `import '...'`
    SideEffect,
}

/// One imported binding, as the analyzer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub kind: ImportKind,
    /// Specifier exactly as written.
    pub path: String,
    /// Local binding name (absent for side-effect imports).
    pub name: Option<String>,
    /// Exported name on the other side, when it differs in kind or spelling.
    pub imported_name: Option<String>,
    pub is_bare_module_specifier: bool,
    pub is_type_only: bool,
}

impl ImportRecord {
    pub fn new(kind: ImportKind, path: impl Into<String>, name: Option<String>) -> Self {
        let path = path.into();
        Self {
            kind,
            is_bare_module_specifier: is_bare_module_specifier(&path),
            path,
            name,
            imported_name: None,
            is_type_only: false,
        }
    }

    /// The name to look up in the target module.
    pub fn target_name(&self) -> Option<&str> {
        match self.kind {
            ImportKind::Default => Some("default"),
            ImportKind::Named => self.imported_name.as_deref().or(self.name.as_deref()),
            ImportKind::Aggregate | ImportKind::SideEffect => None,
        }
    }
}

/// Imports of the file currently being analyzed. Reset before each file.
#[derive(Debug, Clone, Default)]
pub struct ImportTable {
    records: Vec<ImportRecord>,
}

impl ImportTable {
    pub fn push(&mut self, record: ImportRecord) {
        self.records.push(record);
    }

    pub fn reset(&mut self) {
        self.records.clear();
    }

    /// The import that binds `local`, if any.
    pub fn find(&self, local: &str) -> Option<&ImportRecord> {
        self.records
            .iter()
            .find(|r| r.name.as_deref() == Some(local))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImportRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
