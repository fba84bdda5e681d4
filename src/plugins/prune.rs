//! Remove declarations that are neither exported nor referenced from an
//! exported object-literal default.
//!
//! The reference check is textual: a retained declaration whose default reads
//! like `{ a, b: c }` keeps every same-module declaration named inside the
//! braces alive. Nested literals and computed keys are not understood.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::manifest::Module;
use crate::pipeline::Plugin;

use super::names;

lazy_static! {
    static ref OBJECT_LITERAL: Regex =
        Regex::new(r"(?s)^\s*\{(.*)\}\s*$").expect("object literal pattern is valid");
    static ref IDENTIFIER: Regex =
        Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").expect("identifier pattern is valid");
}

/// Names of declarations of `module` to keep.
fn retained_names(module: &Module) -> HashSet<String> {
    let mut retained: HashSet<String> = module
        .exports
        .iter()
        .filter(|e| e.declaration.package.is_none())
        .filter(|e| e.declaration.module.as_deref().map_or(true, |m| m == module.path))
        .map(|e| e.declaration.name.clone())
        .collect();

    loop {
        let referenced: Vec<String> = module
            .declarations
            .iter()
            .filter(|d| retained.contains(d.name()))
            .filter_map(|d| d.default_value())
            .filter_map(|default| OBJECT_LITERAL.captures(default))
            .filter_map(|c| c.get(1))
            .flat_map(|inner| IDENTIFIER.find_iter(inner.as_str()))
            .map(|m| m.as_str())
            .filter(|name| !retained.contains(*name))
            .filter(|name| module.declarations.iter().any(|d| d.name() == *name))
            .map(str::to_string)
            .collect();
        if referenced.is_empty() {
            return retained;
        }
        retained.extend(referenced);
    }
}

pub(crate) fn prune_module(module: &mut Module) {
    let retained = retained_names(module);
    module
        .declarations
        .retain(|d| retained.contains(d.name()));
}

pub(crate) fn plugin() -> Plugin {
    Plugin::new(names::PRUNE).on_package_link(|ctx| {
        ctx.manifest.modules.iter_mut().for_each(prune_module);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Declaration, Export, Reference, VariableDeclaration};

    fn variable(name: &str, default: &str) -> Declaration {
        Declaration::Variable(VariableDeclaration {
            default: Some(default.to_string()),
            ..VariableDeclaration::new(name)
        })
    }

    #[test]
    fn test_object_default_keeps_helpers_to_fixpoint() {
        let mut module = Module::new("a.js");
        module.declarations = vec![
            variable("config", "{ helper, size: SIZE }"),
            variable("helper", "{ inner }"),
            variable("inner", "1"),
            variable("SIZE", "10"),
            variable("unused", "2"),
        ];
        module
            .exports
            .push(Export::js("config", Reference::module("config", "a.js")));

        prune_module(&mut module);
        let names: Vec<_> = module.declarations.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["config", "helper", "inner", "SIZE"]);
    }

    #[test]
    fn test_reexported_names_do_not_retain_locals() {
        let mut module = Module::new("a.js");
        module.declarations = vec![variable("X", "1")];
        module
            .exports
            .push(Export::js("X", Reference::module("X", "b.js")));
        prune_module(&mut module);
        assert!(module.declarations.is_empty());
    }
}
