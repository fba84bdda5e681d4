//! Analyzer configuration.
//!
//! Read from `custom-elements-manifest.config.yaml` (auto-discovered in the
//! analyzed directory); command-line flags override file values.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{AnalyzerError, Result};
use crate::manifest::Package;
use crate::parser::module_path;
use crate::pipeline::GeneratorOptions;
use crate::plugins::Framework;
use crate::resolve::ResolveFn;

/// Config file names searched for, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "custom-elements-manifest.config.yaml",
    "custom-elements-manifest.config.yml",
];

/// Source globs used when none are configured.
pub const DEFAULT_GLOBS: &[&str] = &["**/*.{js,mjs,ts,tsx}"];

/// Always excluded, in addition to configured excludes.
pub const DEFAULT_EXCLUDE: &[&str] = &[
    "**/node_modules/**",
    "**/*.d.ts",
    "**/*.test.*",
    "**/*.spec.*",
    "**/*.stories.*",
    "**/custom-elements.json",
];

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Globs of source files to analyze, relative to the analyzed directory.
    pub globs: Vec<String>,
    /// Globs of files to skip.
    pub exclude: Vec<String>,
    /// Directory `custom-elements.json` is written to.
    pub outdir: Option<PathBuf>,
    pub dev: bool,
    /// Enable the Lit plugins.
    pub litelement: bool,
    /// Point the `customElements` field of `package.json` at the output.
    pub packagejson: bool,
    /// Paths of already-built manifests of dependencies.
    pub dependencies: Vec<PathBuf>,
    /// Import specifier prefix rewrites, e.g. `"@app/": "src/"`.
    pub aliases: BTreeMap<String, String>,
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| AnalyzerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
            .map_err(|e| AnalyzerError::Config(format!("{}: {e}", path.display())))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Find a config file directly inside `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    pub fn framework(&self) -> Framework {
        if self.litelement {
            Framework::Lit
        } else {
            Framework::Vanilla
        }
    }

    fn globs(&self) -> Vec<&str> {
        if self.globs.is_empty() {
            DEFAULT_GLOBS.to_vec()
        } else {
            self.globs.iter().map(String::as_str).collect()
        }
    }

    /// Custom import resolution built from `aliases`, longest prefix first.
    pub fn resolve_fn(&self) -> Option<Arc<ResolveFn>> {
        if self.aliases.is_empty() {
            return None;
        }
        let mut aliases: Vec<(String, String)> = self
            .aliases
            .iter()
            .map(|(from, to)| (from.clone(), to.clone()))
            .collect();
        aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Some(Arc::new(move |specifier: &str, _importer: &str| {
            aliases.iter().find_map(|(from, to)| {
                specifier
                    .strip_prefix(from.as_str())
                    .map(|rest| format!("{to}{rest}"))
            })
        }))
    }

    /// Source files under `root` matching the globs and not excluded, sorted
    /// by path.
    pub fn discover_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let include = glob_set(self.globs())?;
        let exclude = glob_set(
            DEFAULT_EXCLUDE
                .iter()
                .copied()
                .chain(self.exclude.iter().map(String::as_str)),
        )?;

        let mut files = Vec::new();
        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                let name = e.file_name().to_string_lossy();
                !(e.file_type().is_dir()
                    && e.depth() > 0
                    && (name.starts_with('.') || name == "node_modules"))
            })
        {
            let entry = entry.map_err(|e| AnalyzerError::Io {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf()),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = module_path(root, entry.path());
            if include.is_match(&relative) && !exclude.is_match(&relative) {
                files.push(entry.path().to_path_buf());
            }
        }
        debug!(root = %root.display(), files = files.len(), "discovered source files");
        Ok(files)
    }

    /// Read dependency manifests. Unreadable ones are skipped with a warning.
    pub fn load_dependencies(&self, root: &Path) -> Vec<Package> {
        self.dependencies
            .iter()
            .filter_map(|path| {
                let path = root.join(path);
                let parsed = fs::read_to_string(&path)
                    .map_err(|e| e.to_string())
                    .and_then(|text| Package::from_json(&text).map_err(|e| e.to_string()));
                match parsed {
                    Ok(package) => Some(package),
                    Err(error) => {
                        warn!(path = %path.display(), %error, "skipping dependency manifest");
                        None
                    }
                }
            })
            .collect()
    }

    /// Generator options for analyzing `root`.
    pub fn generator_options(&self, root: &Path) -> GeneratorOptions {
        GeneratorOptions {
            dev: self.dev,
            framework: self.framework(),
            resolve: self.resolve_fn(),
            third_party: self.load_dependencies(root),
        }
    }
}

fn glob_set<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| AnalyzerError::Config(format!("invalid glob {pattern:?}: {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| AnalyzerError::Config(e.to_string()))
}

/// Validate a configuration for correctness.
pub fn validate(config: &Config) -> Result<()> {
    glob_set(config.globs())?;
    glob_set(config.exclude.iter().map(String::as_str))?;
    if let Some((from, _)) = config.aliases.iter().find(|(from, _)| from.is_empty()) {
        return Err(AnalyzerError::Config(format!(
            "alias prefix must not be empty (got {from:?})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
globs: ["src/**/*.js"]
exclude: ["src/internal/**"]
outdir: dist
litelement: true
aliases:
  "@app/": "src/"
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.globs, vec!["src/**/*.js"]);
        assert_eq!(config.outdir, Some(PathBuf::from("dist")));
        assert_eq!(config.framework(), Framework::Lit);
        assert!(!config.dev);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::parse("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_glob_rejected() {
        let config = Config {
            globs: vec!["src/[".to_string()],
            ..Config::default()
        };
        assert!(matches!(validate(&config), Err(AnalyzerError::Config(_))));
    }

    #[test]
    fn test_aliases_rewrite_longest_prefix() {
        let config = Config {
            aliases: BTreeMap::from([
                ("@app/".to_string(), "src/".to_string()),
                ("@app/el/".to_string(), "src/elements/".to_string()),
            ]),
            ..Config::default()
        };
        let resolve = config.resolve_fn().unwrap();
        assert_eq!(resolve("@app/el/x.js", "a.js").as_deref(), Some("src/elements/x.js"));
        assert_eq!(resolve("@app/y.js", "a.js").as_deref(), Some("src/y.js"));
        assert_eq!(resolve("lit", "a.js"), None);
    }

    #[test]
    fn test_discover_files_applies_globs_and_excludes() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for file in [
            "src/a.js",
            "src/b.ts",
            "src/b.test.ts",
            "src/types.d.ts",
            "src/internal/c.js",
            "node_modules/lit/index.js",
            "README.md",
        ] {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }

        let config = Config {
            exclude: vec!["src/internal/**".to_string()],
            ..Config::default()
        };
        let found: Vec<_> = config
            .discover_files(root)
            .unwrap()
            .iter()
            .map(|p| module_path(root, p))
            .collect();
        assert_eq!(found, vec!["src/a.js", "src/b.ts"]);
    }

    #[test]
    fn test_unreadable_dependency_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("good.json"), r#"{"schemaVersion":"1.0.0","modules":[]}"#)
            .unwrap();
        fs::write(dir.path().join("bad.json"), "not json").unwrap();
        let config = Config {
            dependencies: vec!["good.json".into(), "bad.json".into(), "missing.json".into()],
            ..Config::default()
        };
        assert_eq!(config.load_dependencies(dir.path()).len(), 1);
    }

    #[test]
    fn test_discover_config_file() {
        let dir = TempDir::new().unwrap();
        assert!(Config::discover(dir.path()).is_none());
        fs::write(dir.path().join(CONFIG_FILE_NAMES[1]), "dev: true\n").unwrap();
        let found = Config::discover(dir.path()).unwrap();
        assert!(Config::parse_file(&found).unwrap().dev);
    }
}
