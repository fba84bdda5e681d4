//! Records the `js` exports of each module.

use crate::analysis::NodeKind;
use crate::jsdoc::has_ignore;
use crate::manifest::{Export, ModuleSpecifier, Reference};
use crate::pipeline::{FileContext, Plugin};
use crate::resolve::path::is_bare_module_specifier;

use super::names;

fn specifier(ctx: &FileContext<'_>, source: &str) -> ModuleSpecifier {
    if is_bare_module_specifier(source) {
        let resolved = ctx.resolve(source);
        if resolved != source {
            return ModuleSpecifier::Module(resolved);
        }
        ModuleSpecifier::Package(source.to_string())
    } else {
        ModuleSpecifier::Module(ctx.resolve(source))
    }
}

/// Names a declaration node binds, in source order.
fn declared_names(ctx: &FileContext<'_>, node: crate::analysis::NodeId) -> Vec<String> {
    let ast = ctx.ast();
    match ast.kind(node) {
        NodeKind::ClassDeclaration(c) => c.name.iter().cloned().collect(),
        NodeKind::FunctionDeclaration(f) => f.name.iter().cloned().collect(),
        NodeKind::VariableDeclaration { declarators, .. } => declarators
            .iter()
            .filter(|d| !has_ignore(&ctx.parse_jsdoc(**d)))
            .filter_map(|d| match ast.kind(*d) {
                NodeKind::VariableDeclarator {
                    name,
                    is_pattern: false,
                    ..
                } => Some(name.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn plugin() -> Plugin {
    Plugin::new(names::EXPORTS).on_analyze(|ctx| {
        let path = ctx.path();
        let exports: Vec<Export> = match ctx.kind() {
            NodeKind::ExportAll { alias, source } => {
                let name = alias.clone().unwrap_or_else(|| "*".to_string());
                vec![Export::js(
                    name,
                    Reference::from_specifier("*", specifier(ctx, source)),
                )]
            }
            NodeKind::ExportNamed {
                declaration: Some(declaration),
                type_only: false,
                ..
            } => {
                if has_ignore(&ctx.parse_jsdoc(ctx.node())) {
                    return Ok(());
                }
                declared_names(ctx, *declaration)
                    .into_iter()
                    .map(|name| Export::js(name.clone(), Reference::module(name, path)))
                    .collect()
            }
            NodeKind::ExportNamed {
                declaration: None,
                bindings,
                source,
                type_only: false,
            } => bindings
                .iter()
                .filter(|b| !b.type_only)
                .map(|binding| {
                    let reference = match source {
                        Some(source) => {
                            Reference::from_specifier(binding.local.clone(), specifier(ctx, source))
                        }
                        None => ctx.reference_to(&binding.local),
                    };
                    Export::js(binding.exported.clone(), reference)
                })
                .collect(),
            NodeKind::ExportDefault { declaration } => {
                if has_ignore(&ctx.parse_jsdoc(ctx.node())) {
                    return Ok(());
                }
                let ast = ctx.ast();
                let target = ast.unwrap_expression(*declaration);
                let reference = match ast.kind(target) {
                    NodeKind::Identifier { name } => Some(ctx.reference_to(name)),
                    NodeKind::ClassDeclaration(c) | NodeKind::ClassExpression(c) => {
                        c.name.as_ref().map(|n| Reference::module(n.clone(), path))
                    }
                    NodeKind::FunctionDeclaration(f) | NodeKind::FunctionExpression(f) => {
                        f.name.as_ref().map(|n| Reference::module(n.clone(), path))
                    }
                    _ => None,
                };
                reference
                    .map(|r| Export::js("default", r))
                    .into_iter()
                    .collect()
            }
            _ => return Ok(()),
        };

        for export in exports {
            ctx.module_doc.push_export(export);
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Package;
    use crate::parser::SourceFile;
    use crate::pipeline::{Generator, GeneratorOptions};

    fn exports_of(path: &str, source: &str) -> Vec<Export> {
        let file = SourceFile::parse(path, source).unwrap();
        let package: Package = Generator::empty(GeneratorOptions::default())
            .with_plugin(super::super::imports::plugin())
            .with_plugin(plugin())
            .generate(&[file])
            .unwrap();
        package.modules[0].exports.clone()
    }

    #[test]
    fn test_declaration_exports() {
        let exports = exports_of(
            "src/a.js",
            "export class A {}\nexport function f() {}\nexport const x = 1, y = 2;",
        );
        let names: Vec<_> = exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "f", "x", "y"]);
        assert_eq!(exports[0].declaration, Reference::module("A", "src/a.js"));
    }

    #[test]
    fn test_reexports() {
        let exports = exports_of(
            "src/index.js",
            "export * from './a.js';\nexport * as ns from 'lib';\nexport { B as C } from './b.js';",
        );
        assert_eq!(exports[0].name, "*");
        assert_eq!(exports[0].declaration, Reference::module("*", "src/a.js"));
        assert_eq!(exports[1].name, "ns");
        assert_eq!(exports[1].declaration, Reference::package("*", "lib"));
        assert_eq!(exports[2].name, "C");
        assert_eq!(exports[2].declaration, Reference::module("B", "src/b.js"));
    }

    #[test]
    fn test_local_clause_uses_imports() {
        let exports = exports_of(
            "src/index.js",
            "import { Base } from './base.js';\nclass Local {}\nexport { Base, Local as default };",
        );
        assert_eq!(exports[0].declaration, Reference::module("Base", "src/base.js"));
        assert_eq!(exports[1].name, "default");
        assert_eq!(exports[1].declaration, Reference::module("Local", "src/index.js"));
    }

    #[test]
    fn test_default_and_ignored_exports() {
        let exports = exports_of(
            "a.js",
            "/** @ignore */\nexport const hidden = 1;\nexport default class Shown {}",
        );
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].name, "default");
        assert_eq!(exports[0].declaration, Reference::module("Shown", "a.js"));
    }

    #[test]
    fn test_type_only_exports_skipped() {
        let exports = exports_of("a.ts", "type T = string;\nexport type { T };\nexport const v = 1;");
        let names: Vec<_> = exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["v"]);
    }
}
