//! Source parsing.
//!
//! Each file is parsed with tree-sitter, lowered into an [`Ast`] and paired with
//! its comments. Parsing is the only parallel stage of the pipeline: files are
//! independent until analysis begins.

mod comments;
mod grammar;
mod lower;

use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, warn};
use tree_sitter::Parser as TsParser;

pub use comments::Comment;
pub use grammar::SourceLanguage;

use crate::analysis::Ast;
use crate::error::{AnalyzerError, Result};

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Module path as it appears in the manifest.
    pub path: String,
    pub language: SourceLanguage,
    pub ast: Ast,
    /// Every comment, in document order.
    pub comments: Vec<Comment>,
    /// The parser had to recover from syntax errors.
    pub has_errors: bool,
}

impl SourceFile {
    /// Parse `source` under the module path `path`.
    pub fn parse(path: impl Into<String>, source: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let source = source.into();
        let language = SourceLanguage::from_path(&path);

        let parse_error = |message: String| AnalyzerError::Parse {
            path: path.clone(),
            message,
        };
        let grammar = language.grammar().map_err(|e| parse_error(e.to_string()))?;

        let mut parser = TsParser::new();
        parser
            .set_language(&grammar.language)
            .map_err(|e| parse_error(e.to_string()))?;
        let tree = parser
            .parse(source.as_bytes(), None)
            .ok_or_else(|| parse_error("parser produced no tree".to_string()))?;

        let has_errors = tree.root_node().has_error();
        if has_errors {
            warn!(path = %path, "source contains syntax errors; analyzing recovered tree");
        }

        let comments = comments::extract(grammar, &tree, &source);
        let ast = lower::lower(&tree, &source);
        debug!(path = %path, nodes = ast.len(), comments = comments.len(), "parsed");

        Ok(Self {
            path,
            language,
            ast,
            comments,
            has_errors,
        })
    }

    /// Read and parse `file`, naming the module by its path relative to `root`.
    pub fn read(root: &Path, file: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(file).map_err(|source| AnalyzerError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        Self::parse(module_path(root, file), source)
    }

    pub fn source(&self) -> &str {
        self.ast.source()
    }
}

/// Module path of `file` relative to `root`, with forward slashes.
pub fn module_path(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Read and parse files in parallel, preserving input order.
pub fn parse_files(root: &Path, files: &[impl AsRef<Path> + Sync]) -> Result<Vec<SourceFile>> {
    files
        .par_iter()
        .map(|file| SourceFile::read(root, file.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_records_language() {
        let file = SourceFile::parse("src/el.ts", "export const x: number = 1;").unwrap();
        assert_eq!(file.language, SourceLanguage::TypeScript);
        assert!(!file.has_errors);
        assert_eq!(file.source(), "export const x: number = 1;");
    }

    #[test]
    fn test_parse_recovers_from_errors() {
        let file = SourceFile::parse("bad.js", "class { ").unwrap();
        assert!(file.has_errors);
    }

    #[test]
    fn test_module_path_is_relative() {
        let root = Path::new("/project");
        assert_eq!(
            module_path(root, Path::new("/project/src/my-el.js")),
            "src/my-el.js"
        );
    }

    #[test]
    fn test_parse_files_preserves_order() {
        let dir = TempDir::new().unwrap();
        let names = ["b.js", "a.js", "c.js"];
        for name in names {
            std::fs::write(dir.path().join(name), format!("export const {} = 1;", &name[..1])).unwrap();
        }
        let paths: Vec<_> = names.iter().map(|n| dir.path().join(n)).collect();
        let files = parse_files(dir.path(), &paths).unwrap();
        let parsed: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(parsed, names);
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = SourceFile::read(dir.path(), &dir.path().join("missing.js")).unwrap_err();
        assert!(matches!(err, AnalyzerError::Io { .. }));
    }
}
