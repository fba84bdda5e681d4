//! Grammar selection for JavaScript and TypeScript sources.

use std::path::Path;

use once_cell::sync::OnceCell;
use tree_sitter::{Language, Query};

/// Source dialect, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    JavaScript,
    TypeScript,
    Tsx,
}

/// Query matching every comment node.
const COMMENT_QUERY: &str = "(comment) @comment";

static JAVASCRIPT: OnceCell<Grammar> = OnceCell::new();
static TYPESCRIPT: OnceCell<Grammar> = OnceCell::new();
static TSX: OnceCell<Grammar> = OnceCell::new();

/// A loaded grammar with its precompiled queries.
pub struct Grammar {
    pub language: Language,
    pub comments: Query,
}

impl Grammar {
    fn load(language: Language) -> anyhow::Result<Self> {
        let comments = Query::new(&language, COMMENT_QUERY)?;
        Ok(Self { language, comments })
    }
}

impl SourceLanguage {
    /// Pick the dialect for a path. Unknown extensions are parsed as JavaScript.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        Self::from_extension(ext)
    }

    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "ts" | "mts" | "cts" => SourceLanguage::TypeScript,
            "tsx" => SourceLanguage::Tsx,
            _ => SourceLanguage::JavaScript,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SourceLanguage::JavaScript => "javascript",
            SourceLanguage::TypeScript => "typescript",
            SourceLanguage::Tsx => "tsx",
        }
    }

    /// The grammar for this dialect, loaded on first use.
    pub fn grammar(&self) -> anyhow::Result<&'static Grammar> {
        let (cell, language): (&OnceCell<Grammar>, fn() -> Language) = match self {
            SourceLanguage::JavaScript => (&JAVASCRIPT, || tree_sitter_javascript::LANGUAGE.into()),
            SourceLanguage::TypeScript => {
                (&TYPESCRIPT, || tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            }
            SourceLanguage::Tsx => (&TSX, || tree_sitter_typescript::LANGUAGE_TSX.into()),
        };
        cell.get_or_try_init(|| Grammar::load(language()))
    }
}
