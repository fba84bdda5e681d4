//! Integration tests for bundling packages and merging finished manifests.

use std::path::PathBuf;

use cem_analyzer::manifest::{ClassDeclaration, Declaration, ExportKind, Member, Module, Package, Reference};
use cem_analyzer::parser;
use cem_analyzer::{bundle, merge_custom_elements_manifests, Config, GeneratorOptions, PackageSources};

fn package_sources(name: &str) -> PackageSources {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata/packages")
        .join(name);
    let files = Config::default()
        .discover_files(&root)
        .expect("should discover fixtures");
    let sources = parser::parse_files(&root, &files).expect("fixtures should parse");
    PackageSources::new(name, sources)
}

fn bundled() -> Package {
    bundle(
        &[package_sources("app"), package_sources("base-lib")],
        &GeneratorOptions::default(),
    )
    .expect("bundling should succeed")
}

fn class<'p>(module: &'p Module, name: &str) -> &'p ClassDeclaration {
    module
        .declaration(name)
        .and_then(|d| d.as_class_like())
        .unwrap_or_else(|| panic!("no class {name} in {}", module.path))
}

#[test]
fn test_bundle_folds_each_package_into_one_module() {
    let package = bundled();
    let paths: Vec<_> = package.modules.iter().map(|m| m.path.as_str()).collect();
    assert_eq!(paths, vec!["app", "base-lib"]);

    let app = &package.modules[0];
    let names: Vec<_> = app.declarations.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["AppEl", "AppEl1", "Card"]);

    let exports: Vec<_> = app
        .exports
        .iter()
        .map(|e| (e.kind, e.name.as_str(), e.declaration.clone()))
        .collect();
    assert!(exports.contains(&(ExportKind::Js, "AppEl", Reference::package("AppEl", "app"))));
    assert!(exports.contains(&(ExportKind::Js, "Card", Reference::package("Card", "app"))));
    assert!(exports.contains(&(
        ExportKind::CustomElementDefinition,
        "app-el",
        Reference::package("AppEl", "app")
    )));
}

#[test]
fn test_bundle_rewrites_references_to_renamed_declarations() {
    let package = bundled();
    let app = &package.modules[0];

    let card = class(app, "Card");
    assert_eq!(card.superclass, Some(Reference::package("AppEl1", "app")));
    // Card extends the card module's own AppEl, not the one inheriting from BaseEl.
    assert!(card.member("tone", false).is_none());
    assert!(card.member("heading", false).is_some());
}

#[test]
fn test_bundle_resolves_cross_package_superclass() {
    let package = bundled();
    let app_el = class(&package.modules[0], "AppEl");
    assert_eq!(app_el.superclass, Some(Reference::package("BaseEl", "base-lib")));
    assert_eq!(app_el.tag_name.as_deref(), Some("app-el"));

    let provenance = Reference::package("BaseEl", "base-lib");
    let Some(Member::Field(tone)) = app_el.member("tone", false) else {
        panic!("tone should be inherited");
    };
    assert_eq!(tone.description, "Shared tone.");
    assert_eq!(tone.inherited_from.as_ref(), Some(&provenance));
    let slots = app_el.slots.as_ref().expect("slots should be inherited");
    assert_eq!(slots[0].name, "icon");
    assert_eq!(slots[0].inherited_from.as_ref(), Some(&provenance));
}

#[test]
fn test_bundle_respects_explicit_entrypoint() {
    let package = bundle(
        &[package_sources("app").with_entrypoint("card.js")],
        &GeneratorOptions::default(),
    )
    .unwrap();
    let names: Vec<_> = package.modules[0]
        .declarations
        .iter()
        .map(|d| d.name())
        .collect();
    assert_eq!(names, vec!["AppEl", "Card"]);
}

fn manifest(modules: &[(&str, &str)]) -> Package {
    let mut package = Package::new();
    for (path, class) in modules {
        let mut module = Module::new(*path);
        module
            .declarations
            .push(Declaration::Class(ClassDeclaration::new(*class)));
        package.modules.push(module);
    }
    package
}

fn sorted_paths(package: &Package) -> Vec<&str> {
    let mut paths: Vec<_> = package.modules.iter().map(|m| m.path.as_str()).collect();
    paths.sort();
    paths
}

#[test]
fn test_merge_is_deterministic_up_to_collisions() {
    let m1 = manifest(&[("a.js", "A"), ("shared.js", "FromM1")]);
    let m2 = manifest(&[("b.js", "B"), ("shared.js", "FromM2")]);

    let forward = merge_custom_elements_manifests(&m1, &m2).unwrap();
    let backward = merge_custom_elements_manifests(&m2, &m1).unwrap();

    assert_eq!(sorted_paths(&forward), sorted_paths(&backward));
    for path in ["a.js", "b.js"] {
        assert_eq!(forward.module(path), backward.module(path));
    }
    assert!(forward.module("shared.js").unwrap().declaration("FromM2").is_some());
    assert!(backward.module("shared.js").unwrap().declaration("FromM1").is_some());
}

#[test]
fn test_merge_round_trips_through_json() {
    let m1 = manifest(&[("a.js", "A")]);
    let m2 = manifest(&[("b.js", "B")]);
    let merged = merge_custom_elements_manifests(&m1, &m2).unwrap();
    let parsed = Package::from_json(&merged.to_json_pretty().unwrap()).unwrap();
    assert_eq!(parsed, merged);
}
