//! Lifecycle plumbing that never belongs to an element's public API.

use phf::phf_set;

use crate::manifest::{ClassDeclaration, Member, Package};
use crate::pipeline::Plugin;

use super::{names, Framework};

static METHODS: phf::Set<&'static str> = phf_set! {
    "connectedCallback",
    "disconnectedCallback",
    "attributeChangedCallback",
    "adoptedCallback",
};

static FIELDS: phf::Set<&'static str> = phf_set! {
    "observedAttributes",
};

static LIT_METHODS: phf::Set<&'static str> = phf_set! {
    "requestUpdate",
    "performUpdate",
    "shouldUpdate",
    "update",
    "render",
    "firstUpdated",
    "updated",
    "willUpdate",
    "createRenderRoot",
    "getUpdateComplete",
    "scheduleUpdate",
};

static LIT_FIELDS: phf::Set<&'static str> = phf_set! {
    "styles",
    "properties",
    "elementProperties",
    "shadowRootOptions",
    "elementStyles",
    "renderOptions",
    "updateComplete",
    "hasUpdated",
    "isUpdatePending",
};

#[derive(Clone, Copy)]
enum Target {
    Methods,
    Fields,
}

fn strip(class: &mut ClassDeclaration, target: Target, names: &phf::Set<&'static str>) {
    let Some(members) = class.members.as_mut() else {
        return;
    };
    members.retain(|member| match (target, member) {
        (Target::Methods, Member::Method(m)) => !names.contains(m.name.as_str()),
        (Target::Fields, Member::Field(f)) => !names.contains(f.name.as_str()),
        _ => true,
    });
}

fn denylist(name: &'static str, target: Target, names: &'static phf::Set<&'static str>) -> Plugin {
    Plugin::new(name).on_module_link(move |ctx| {
        for class in ctx
            .module_doc
            .declarations
            .iter_mut()
            .filter_map(|d| d.as_class_like_mut())
        {
            strip(class, target, names);
        }
        Ok(())
    })
}

/// Apply the framework's denylists to every class of `package`.
///
/// Runs after inheritance: dependency manifests are not filtered at module
/// link, so their lifecycle members arrive with the inherited copies.
pub(crate) fn strip_package(package: &mut Package, framework: Framework) {
    let mut lists = vec![(Target::Methods, &METHODS), (Target::Fields, &FIELDS)];
    if framework == Framework::Lit {
        lists.extend([(Target::Methods, &LIT_METHODS), (Target::Fields, &LIT_FIELDS)]);
    }
    for class in package
        .modules
        .iter_mut()
        .flat_map(|m| m.declarations.iter_mut())
        .filter_map(|d| d.as_class_like_mut())
    {
        for (target, names) in &lists {
            strip(class, *target, names);
        }
    }
}

pub(crate) fn method_denylist() -> Plugin {
    denylist(names::METHOD_DENYLIST, Target::Methods, &METHODS)
}

pub(crate) fn field_denylist() -> Plugin {
    denylist(names::FIELD_DENYLIST, Target::Fields, &FIELDS)
}

pub(crate) fn lit_method_denylist() -> Plugin {
    denylist(names::LIT_METHOD_DENYLIST, Target::Methods, &LIT_METHODS)
}

pub(crate) fn lit_field_denylist() -> Plugin {
    denylist(names::LIT_FIELD_DENYLIST, Target::Fields, &LIT_FIELDS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SourceFile;
    use crate::pipeline::{Generator, GeneratorOptions};

    #[test]
    fn test_lifecycle_members_removed() {
        let file = SourceFile::parse(
            "a.js",
            r#"class A extends HTMLElement {
  /** Documented, still removed. */
  connectedCallback() {}
  render() {}
  static styles = [];
  open = false;
}"#,
        )
        .unwrap();
        let package = Generator::empty(GeneratorOptions::default())
            .with_plugin(super::super::classes::plugin())
            .with_plugin(method_denylist())
            .with_plugin(lit_field_denylist())
            .generate(&[file])
            .unwrap();
        let class = package.modules[0].declarations[0].as_class_like().unwrap();
        let names: Vec<_> = class.members().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["render", "open"]);
    }
}
