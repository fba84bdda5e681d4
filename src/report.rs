//! Writing the manifest and reporting what was found.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::*;
use serde_json::Value;

use crate::manifest::Package;

/// Output file name.
pub const MANIFEST_FILE: &str = "custom-elements.json";

/// Counts shown after an analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub modules: usize,
    pub declarations: usize,
    /// `(tag name, class name)` of every custom element, in document order.
    pub custom_elements: Vec<(String, String)>,
}

impl Summary {
    pub fn of(package: &Package) -> Self {
        Self {
            modules: package.modules.len(),
            declarations: package.modules.iter().map(|m| m.declarations.len()).sum(),
            custom_elements: package
                .class_likes()
                .filter_map(|(_, class)| {
                    let tag = class.tag_name.as_ref().filter(|t| !t.is_empty())?;
                    Some((tag.clone(), class.name.clone()))
                })
                .collect(),
        }
    }
}

/// Serialize `package` the way it is written to disk.
pub fn to_json(package: &Package) -> anyhow::Result<String> {
    let mut json = package.to_json_pretty()?;
    json.push('\n');
    Ok(json)
}

/// Write `package` to `<outdir>/custom-elements.json`.
pub fn write_manifest(outdir: &Path, package: &Package) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(outdir)
        .with_context(|| format!("failed to create {}", outdir.display()))?;
    let path = outdir.join(MANIFEST_FILE);
    fs::write(&path, to_json(package)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Point the `customElements` field of `<root>/package.json` at `manifest`.
///
/// Returns whether the file changed. A missing `package.json` is not an error.
pub fn update_package_json(root: &Path, manifest: &str) -> anyhow::Result<bool> {
    let path = root.join("package.json");
    if !path.is_file() {
        return Ok(false);
    }
    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut json: Value = serde_json::from_str(&text)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;
    let Some(object) = json.as_object_mut() else {
        anyhow::bail!("{} is not a JSON object", path.display());
    };
    if object.get("customElements").and_then(Value::as_str) == Some(manifest) {
        return Ok(false);
    }
    object.insert("customElements".to_string(), Value::String(manifest.to_string()));

    let mut out = serde_json::to_string_pretty(&json)?;
    out.push('\n');
    fs::write(&path, out).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

/// Print a colored summary of an analysis run.
pub fn write_pretty(path: &str, summary: &Summary, written: Option<&Path>) {
    println!();
    print!("  ");
    print!("{}", "cem".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Analyzed: ".dimmed());
    println!("{}", path);
    print!("  {}", "Modules:  ".dimmed());
    println!("{}", summary.modules);
    print!("  {}", "Declared: ".dimmed());
    println!("{}", summary.declarations);
    println!();

    if summary.custom_elements.is_empty() {
        println!("  {}", "No custom elements found".yellow());
    } else {
        println!("  {}", "Custom elements".bold());
        let width = summary
            .custom_elements
            .iter()
            .map(|(tag, _)| tag.len() + 2)
            .max()
            .unwrap_or(0);
        for (tag, class) in &summary.custom_elements {
            let label = format!("<{tag}>");
            let padding = " ".repeat(width - label.len());
            println!("    {}{}  {}", label.green(), padding, class.dimmed());
        }
    }
    println!();

    if let Some(written) = written {
        println!("  {} {}", "✓ Wrote".green(), written.display());
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{ClassDeclaration, Declaration, Module};
    use tempfile::TempDir;

    fn package() -> Package {
        let mut module = Module::new("src/el.js");
        let mut element = ClassDeclaration::new("MyEl");
        element.tag_name = Some("my-el".into());
        module.declarations.push(Declaration::Class(element));
        module
            .declarations
            .push(Declaration::Class(ClassDeclaration::new("Helper")));
        let mut package = Package::new();
        package.modules.push(module);
        package
    }

    #[test]
    fn test_summary_lists_custom_elements() {
        let summary = Summary::of(&package());
        assert_eq!(summary.modules, 1);
        assert_eq!(summary.declarations, 2);
        assert_eq!(
            summary.custom_elements,
            vec![("my-el".to_string(), "MyEl".to_string())]
        );
    }

    #[test]
    fn test_write_manifest_creates_outdir() {
        let dir = TempDir::new().unwrap();
        let outdir = dir.path().join("dist");
        let path = write_manifest(&outdir, &package()).unwrap();
        assert_eq!(path, outdir.join(MANIFEST_FILE));
        let written = Package::from_json(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written, package());
    }

    #[test]
    fn test_update_package_json_preserves_fields() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"name": "my-lib", "version": "1.0.0"}"#,
        )
        .unwrap();

        assert!(update_package_json(dir.path(), "custom-elements.json").unwrap());
        assert!(!update_package_json(dir.path(), "custom-elements.json").unwrap());

        let json: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("package.json")).unwrap())
                .unwrap();
        assert_eq!(json["name"], "my-lib");
        assert_eq!(json["customElements"], "custom-elements.json");
    }

    #[test]
    fn test_missing_package_json_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(!update_package_json(dir.path(), "custom-elements.json").unwrap());
    }
}
