//! Integration tests for the `cem` commands against temporary directories.

use std::fs;
use std::path::Path;

use cem_analyzer::cli::{self, AnalyzeArgs, InitArgs, MergeArgs, EXIT_ERROR, EXIT_SUCCESS};
use cem_analyzer::config::{Config, CONFIG_FILE_NAMES};
use cem_analyzer::report::MANIFEST_FILE;
use cem_analyzer::Package;
use tempfile::TempDir;

fn write(root: &Path, file: &str, content: &str) {
    let path = root.join(file);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn analyze_args(root: &Path) -> AnalyzeArgs {
    AnalyzeArgs {
        path: root.to_path_buf(),
        globs: Vec::new(),
        exclude: Vec::new(),
        outdir: None,
        config: None,
        litelement: false,
        packagejson: false,
        stdout: false,
    }
}

fn read_manifest(path: &Path) -> Package {
    Package::from_json(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_analyze_writes_manifest_and_package_json() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "src/my-el.js",
        "export class MyEl extends HTMLElement {}\ncustomElements.define('my-el', MyEl);",
    );
    write(root, "package.json", r#"{"name": "my-lib"}"#);
    write(root, CONFIG_FILE_NAMES[0], "outdir: dist\npackagejson: true\n");

    let code = cli::run_analyze(&analyze_args(root), false).unwrap();
    assert_eq!(code, EXIT_SUCCESS);

    let manifest = read_manifest(&root.join("dist").join(MANIFEST_FILE));
    assert_eq!(manifest.modules.len(), 1);
    assert_eq!(manifest.modules[0].path, "src/my-el.js");
    let class = manifest.modules[0].declarations[0].as_class_like().unwrap();
    assert_eq!(class.tag_name.as_deref(), Some("my-el"));

    let package_json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.join("package.json")).unwrap()).unwrap();
    assert_eq!(package_json["customElements"], "dist/custom-elements.json");
}

#[test]
fn test_analyze_flags_override_config() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "src/a.js", "export const a = 1;");
    write(root, "lib/b.js", "export const b = 2;");
    write(root, CONFIG_FILE_NAMES[0], "globs: ['src/**/*.js']\n");

    let mut args = analyze_args(root);
    args.globs = vec!["lib/**/*.js".to_string()];
    assert_eq!(cli::run_analyze(&args, false).unwrap(), EXIT_SUCCESS);

    let manifest = read_manifest(&root.join(MANIFEST_FILE));
    let paths: Vec<_> = manifest.modules.iter().map(|m| m.path.as_str()).collect();
    assert_eq!(paths, vec!["lib/b.js"]);
}

#[test]
fn test_analyze_reports_invalid_config() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), CONFIG_FILE_NAMES[0], "globs: 12\n");
    assert!(cli::run_analyze(&analyze_args(dir.path()), false).is_err());

    let missing = dir.path().join("missing");
    assert_eq!(
        cli::run_analyze(&analyze_args(&missing), false).unwrap(),
        EXIT_ERROR
    );
}

#[test]
fn test_analyze_uses_dependency_manifests() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "deps/base.json",
        r#"{
  "schemaVersion": "1.0.0",
  "modules": [{
    "kind": "javascript-module",
    "path": "index.js",
    "declarations": [{
      "kind": "class",
      "name": "BaseEl",
      "members": [{"kind": "field", "name": "tone", "description": "Shared tone."}]
    }],
    "exports": [{"kind": "js", "name": "BaseEl", "declaration": {"name": "BaseEl", "module": "index.js"}}]
  }]
}"#,
    );
    write(
        root,
        "src/el.js",
        "import { BaseEl } from 'base-lib';\nexport class El extends BaseEl {}",
    );
    write(root, CONFIG_FILE_NAMES[0], "dependencies: ['deps/base.json']\nglobs: ['src/**/*.js']\n");

    assert_eq!(cli::run_analyze(&analyze_args(root), false).unwrap(), EXIT_SUCCESS);
    let manifest = read_manifest(&root.join(MANIFEST_FILE));
    let class = manifest.modules[0].declarations[0].as_class_like().unwrap();
    assert!(class.member("tone", false).is_some());
}

#[test]
fn test_merge_command_writes_outfile() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "a.json",
        r#"{"schemaVersion": "1.0.0", "modules": [{"kind": "javascript-module", "path": "a.js"}]}"#,
    );
    write(
        root,
        "b.json",
        r#"{"schemaVersion": "1.0.0", "modules": [{"kind": "javascript-module", "path": "b.js"}]}"#,
    );
    let args = MergeArgs {
        first: root.join("a.json"),
        second: root.join("b.json"),
        outfile: Some(root.join("merged.json")),
    };
    assert_eq!(cli::run_merge(&args).unwrap(), EXIT_SUCCESS);
    let merged = read_manifest(&root.join("merged.json"));
    let paths: Vec<_> = merged.modules.iter().map(|m| m.path.as_str()).collect();
    assert_eq!(paths, vec!["a.js", "b.js"]);
}

#[test]
fn test_init_writes_parseable_template_once() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("config").join(CONFIG_FILE_NAMES[0]);
    let args = InitArgs {
        output: output.clone(),
    };
    assert_eq!(cli::run_init(&args).unwrap(), EXIT_SUCCESS);
    let config = Config::parse_file(&output).unwrap();
    assert!(!config.litelement);
    assert_eq!(config.globs, vec!["src/**/*.{js,ts}"]);

    assert_eq!(cli::run_init(&args).unwrap(), EXIT_ERROR);
}
