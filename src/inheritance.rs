//! Copying inherited API surface from superclasses and mixins into subclasses.
//!
//! For every class-like declaration the ancestor chain is climbed through
//! `superclass` references, with each class's mixins visited before its
//! superclass. Every collection of every ancestor is folded into the
//! subclass:
//!
//! - an entry the subclass already has is an override; it keeps its own data,
//!   fills `type`/`privacy` gaps from the ancestor and is stamped with the
//!   ancestor as `inheritedFrom`;
//! - any other entry is copied and stamped the same way.
//!
//! Ancestors are folded nearest first, so data comes from the nearest ancestor
//! declaring an entry and `inheritedFrom` names the deepest one. Both hold
//! whether or not an ancestor was itself merged earlier in the run, which
//! keeps the result independent of declaration order.
//!
//! Touched collections are re-sorted by name.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::collate::locale_compare;
use crate::error::{AnalyzerError, Result};
use crate::manifest::{
    Attribute, ClassDeclaration, CssProperty, DeclarationKind, Event, Member, NamedItem, Package,
    Reference,
};
use crate::resolve::{DeclarationLocation, ManifestSlot, Manifests};

/// A collection entry that can be inherited.
trait Inheritable: Clone {
    fn name(&self) -> &str;
    fn inherited_from_mut(&mut self) -> &mut Option<Reference>;
    /// Fill gaps of an overriding entry from the entry it overrides.
    fn fill_from(&mut self, _overridden: &Self) {}
}

impl Inheritable for Member {
    fn name(&self) -> &str {
        Member::name(self)
    }

    fn inherited_from_mut(&mut self) -> &mut Option<Reference> {
        match self {
            Member::Field(f) => &mut f.inherited_from,
            Member::Method(m) => &mut m.inherited_from,
        }
    }

    fn fill_from(&mut self, overridden: &Self) {
        match (self, overridden) {
            (Member::Field(own), Member::Field(base)) => {
                if own.type_info.is_none() {
                    own.type_info = base.type_info.clone();
                }
                own.privacy = own.privacy.or(base.privacy);
            }
            (own, base) => {
                if let Member::Method(m) = own {
                    m.privacy = m.privacy.or(base.privacy());
                }
            }
        }
    }
}

impl Inheritable for Attribute {
    fn name(&self) -> &str {
        &self.name
    }

    fn inherited_from_mut(&mut self) -> &mut Option<Reference> {
        &mut self.inherited_from
    }

    fn fill_from(&mut self, overridden: &Self) {
        if self.type_info.is_none() {
            self.type_info = overridden.type_info.clone();
        }
    }
}

impl Inheritable for Event {
    fn name(&self) -> &str {
        &self.name
    }

    fn inherited_from_mut(&mut self) -> &mut Option<Reference> {
        &mut self.inherited_from
    }

    fn fill_from(&mut self, overridden: &Self) {
        if self.type_info.is_none() {
            self.type_info = overridden.type_info.clone();
        }
    }
}

impl Inheritable for NamedItem {
    fn name(&self) -> &str {
        &self.name
    }

    fn inherited_from_mut(&mut self) -> &mut Option<Reference> {
        &mut self.inherited_from
    }
}

impl Inheritable for CssProperty {
    fn name(&self) -> &str {
        &self.name
    }

    fn inherited_from_mut(&mut self) -> &mut Option<Reference> {
        &mut self.inherited_from
    }
}

fn merge_collection<T: Inheritable>(
    target: &mut Option<Vec<T>>,
    source: Option<&[T]>,
    provenance: &Reference,
) {
    let Some(source) = source.filter(|s| !s.is_empty()) else {
        return;
    };
    let target = target.get_or_insert_with(Vec::new);
    for item in source {
        match target.iter_mut().find(|t| t.name() == item.name()) {
            Some(existing) => {
                existing.fill_from(item);
                *existing.inherited_from_mut() = Some(provenance.clone());
            }
            None => {
                let mut copy = item.clone();
                *copy.inherited_from_mut() = Some(provenance.clone());
                target.push(copy);
            }
        }
    }
    target.sort_by(|a, b| locale_compare(a.name(), b.name()));
}

/// Fold one ancestor into `class`.
fn merge_from(class: &mut ClassDeclaration, ancestor: &ClassDeclaration, provenance: &Reference) {
    merge_collection(&mut class.attributes, ancestor.attributes.as_deref(), provenance);
    merge_collection(&mut class.css_parts, ancestor.css_parts.as_deref(), provenance);
    merge_collection(&mut class.css_properties, ancestor.css_properties.as_deref(), provenance);
    merge_collection(&mut class.css_states, ancestor.css_states.as_deref(), provenance);
    merge_collection(&mut class.events, ancestor.events.as_deref(), provenance);
    merge_collection(&mut class.icons, ancestor.icons.as_deref(), provenance);
    merge_collection(&mut class.locale, ancestor.locale.as_deref(), provenance);
    merge_collection(&mut class.members, ancestor.members.as_deref(), provenance);
    merge_collection(&mut class.slots, ancestor.slots.as_deref(), provenance);
}

/// Resolve a heritage reference made from the module at `from`.
fn resolve_reference(
    manifests: Manifests<'_>,
    reference: &Reference,
    from: &str,
) -> Option<DeclarationLocation> {
    let start = reference.location().unwrap_or(from);
    manifests
        .resolve_declaration(&reference.name, Some(DeclarationKind::Class), start)
        .or_else(|| {
            // Package references may name a dependency whose module paths differ
            // from the specifier; fall back to an exported class of that name in
            // a dependency manifest. The package being analyzed is never searched:
            // `import { Button as Base } from 'lib'; class Button extends Base {}`
            // would otherwise resolve to itself.
            reference.package.as_ref()?;
            let mut dependencies = manifests
                .iter()
                .filter(|(slot, _)| matches!(slot, ManifestSlot::ThirdParty(_)));
            dependencies.find_map(|(slot, package)| {
                package.modules.iter().enumerate().find_map(|(mi, module)| {
                    let exported = module.exports.iter().any(|e| e.name == reference.name);
                    let di = module.declarations.iter().position(|d| {
                        d.kind().is_class_like() && d.name() == reference.name
                    })?;
                    exported.then_some(DeclarationLocation {
                        manifest: slot,
                        module: mi,
                        declaration: di,
                    })
                })
            })
        })
}

/// Ancestors of the class at `location`, nearest first, with the reference each
/// was reached through. Fails when the superclass chain loops back on itself.
fn ancestors(
    manifests: Manifests<'_>,
    location: DeclarationLocation,
) -> Result<Vec<(ClassDeclaration, Reference)>> {
    let (Some(module), Some(start)) = (
        manifests.module(location),
        manifests.declaration(location).and_then(|d| d.as_class_like()),
    ) else {
        return Ok(Vec::new());
    };

    let mut visited = HashSet::from([start.id.get()]);
    let mut names = vec![start.name.clone()];
    let mut chain = Vec::new();
    let mut current = start;
    let mut path = module.path.as_str();

    loop {
        for mixin in current.mixins() {
            let Some(found) = resolve_reference(manifests, mixin, path) else {
                trace!(mixin = %mixin.name, "unresolved mixin");
                continue;
            };
            let Some(class) = manifests.declaration(found).and_then(|d| d.as_class_like()) else {
                continue;
            };
            if visited.insert(class.id.get()) {
                if let Some(reference) = manifests.reference_to(found) {
                    chain.push((class.clone(), reference));
                }
            }
        }

        let Some(superclass) = &current.superclass else {
            break;
        };
        let Some(found) = resolve_reference(manifests, superclass, path) else {
            trace!(superclass = %superclass.name, "unresolved superclass");
            break;
        };
        let (Some(class), Some(owner)) = (
            manifests.declaration(found).and_then(|d| d.as_class_like()),
            manifests.module(found),
        ) else {
            break;
        };
        names.push(class.name.clone());
        if !visited.insert(class.id.get()) {
            return Err(AnalyzerError::CyclicInheritance {
                class: start.name.clone(),
                chain: names,
            });
        }
        if let Some(reference) = manifests.reference_to(found) {
            chain.push((class.clone(), reference));
        }
        current = class;
        path = owner.path.as_str();
    }
    Ok(chain)
}

/// Apply inheritance to every class-like declaration of `package`, resolving
/// ancestors in `package` first and then in `third_party`.
pub fn apply_inheritance(package: &mut Package, third_party: &[Package]) -> Result<()> {
    let targets: Vec<(usize, usize)> = package
        .modules
        .iter()
        .enumerate()
        .flat_map(|(mi, module)| {
            module
                .declarations
                .iter()
                .enumerate()
                .filter(|(_, d)| d.kind().is_class_like())
                .map(move |(di, _)| (mi, di))
        })
        .collect();

    for (module, declaration) in targets {
        let location = DeclarationLocation {
            manifest: ManifestSlot::Primary,
            module,
            declaration,
        };
        let chain = ancestors(Manifests::new(package, third_party), location)?;
        if chain.is_empty() {
            continue;
        }
        let Some(class) = package.modules[module].declarations[declaration].as_class_like_mut()
        else {
            continue;
        };
        debug!(class = %class.name, ancestors = chain.len(), "applying inheritance");
        for (ancestor, provenance) in &chain {
            merge_from(class, ancestor, provenance);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Declaration, Export, Field, Module, Privacy, TypeInfo};

    fn class(name: &str, superclass: Option<Reference>, fields: &[&str]) -> ClassDeclaration {
        let mut class = ClassDeclaration::new(name);
        class.superclass = superclass;
        for field in fields {
            class.members_mut().push(Member::Field(Field {
                description: format!("{name}.{field}"),
                ..Field::new(*field)
            }));
        }
        class
    }

    fn package(classes: Vec<ClassDeclaration>) -> Package {
        let mut module = Module::new("a.js");
        for class in classes {
            module.exports.push(Export::js(
                class.name.clone(),
                Reference::module(class.name.clone(), "a.js"),
            ));
            module.declarations.push(Declaration::Class(class));
        }
        let mut package = Package::new();
        package.modules.push(module);
        package
    }

    fn members(package: &Package, name: &str) -> Vec<(String, Option<String>, String)> {
        let class = package.modules[0].declaration(name).unwrap().as_class_like().unwrap();
        class
            .members()
            .iter()
            .map(|m| {
                let Member::Field(f) = m else { unreachable!() };
                (
                    f.name.clone(),
                    f.inherited_from.as_ref().map(|r| r.name.clone()),
                    f.description.clone(),
                )
            })
            .collect()
    }

    #[test]
    fn test_override_keeps_own_data_and_is_stamped() {
        let mut a = class("A", Some(Reference::module("B", "a.js")), &["x"]);
        a.members_mut()[0] = Member::Field(Field {
            default: Some("1".into()),
            description: "A.x".into(),
            ..Field::new("x")
        });
        let mut b = class("B", None, &[]);
        b.members_mut().push(Member::Field(Field {
            type_info: Some(TypeInfo::new("number")),
            privacy: Some(Privacy::Public),
            default: Some("2".into()),
            ..Field::new("x")
        }));
        let mut package = package(vec![a, b]);

        apply_inheritance(&mut package, &[]).unwrap();

        let a = package.modules[0].declaration("A").unwrap().as_class_like().unwrap();
        let Member::Field(x) = &a.members()[0] else {
            unreachable!()
        };
        assert_eq!(x.description, "A.x");
        assert_eq!(x.default.as_deref(), Some("1"));
        assert_eq!(x.type_info, Some(TypeInfo::new("number")));
        assert_eq!(x.privacy, Some(Privacy::Public));
        assert_eq!(x.inherited_from, Some(Reference::module("B", "a.js")));
    }

    #[test]
    fn test_three_level_chain_keeps_deepest_provenance() {
        let a = class("A", Some(Reference::module("B", "a.js")), &["a"]);
        let b = class("B", Some(Reference::module("C", "a.js")), &["b"]);
        let c = class("C", None, &["c"]);
        let mut once = package(vec![a.clone(), b.clone(), c.clone()]);
        apply_inheritance(&mut once, &[]).unwrap();

        assert_eq!(
            members(&once, "A"),
            vec![
                ("a".into(), None, "A.a".into()),
                ("b".into(), Some("B".into()), "B.b".into()),
                ("c".into(), Some("C".into()), "C.c".into()),
            ]
        );

        // Merging B+C first, then A with the merged B, gives the same result.
        let mut staged = package(vec![b, c]);
        apply_inheritance(&mut staged, &[]).unwrap();
        staged.modules[0]
            .declarations
            .insert(0, Declaration::Class(a));
        apply_inheritance(&mut staged, &[]).unwrap();
        assert_eq!(members(&staged, "A"), members(&once, "A"));
    }

    fn override_x(name: &str, superclass: Option<&str>) -> ClassDeclaration {
        let mut class = class(name, superclass.map(|s| Reference::module(s, "a.js")), &[]);
        class.members_mut().push(Member::Field(Field {
            description: format!("{name}'s x"),
            ..Field::new("x")
        }));
        class
    }

    #[test]
    fn test_override_chain_independent_of_declaration_order() {
        let a = class("A", Some(Reference::module("B", "a.js")), &[]);
        let b = override_x("B", Some("C"));
        let mut c = override_x("C", None);
        if let Some(Member::Field(x)) = c.members_mut().first_mut() {
            x.type_info = Some(TypeInfo::new("number"));
        }

        let mut forward = package(vec![a.clone(), b.clone(), c.clone()]);
        apply_inheritance(&mut forward, &[]).unwrap();
        let mut backward = package(vec![c, b, a]);
        apply_inheritance(&mut backward, &[]).unwrap();

        for name in ["A", "B"] {
            assert_eq!(
                members(&forward, name),
                vec![("x".into(), Some("C".into()), "B's x".into())]
            );
            assert_eq!(
                forward.modules[0].declaration(name),
                backward.modules[0].declaration(name)
            );
        }
        let a = forward.modules[0].declaration("A").unwrap().as_class_like().unwrap();
        let Some(Member::Field(x)) = a.member("x", false) else {
            panic!("x should be inherited");
        };
        assert_eq!(x.type_info, Some(TypeInfo::new("number")));
    }

    #[test]
    fn test_reapplying_is_stable() {
        let mut package = package(vec![
            class("A", Some(Reference::module("B", "a.js")), &[]),
            override_x("B", Some("C")),
            override_x("C", None),
        ]);
        apply_inheritance(&mut package, &[]).unwrap();
        let first = package.clone();
        apply_inheritance(&mut package, &[]).unwrap();
        assert_eq!(package, first);
    }

    #[test]
    fn test_mixins_merged_before_superclass() {
        let mut mixin = class("M", None, &["fromMixin"]);
        mixin.css_parts = Some(vec![NamedItem::new("base", "")]);
        let mut a = class("A", Some(Reference::module("B", "a.js")), &[]);
        a.mixins = Some(vec![Reference::module("M", "a.js")]);
        let b = class("B", None, &["fromBase"]);
        let mut package = package(vec![a, b]);
        package.modules[0]
            .declarations
            .push(Declaration::Mixin(mixin));

        apply_inheritance(&mut package, &[]).unwrap();
        let names = members(&package, "A");
        assert_eq!(names[0].0, "fromBase");
        assert_eq!(names[1], ("fromMixin".into(), Some("M".into()), "M.fromMixin".into()));
        let a = package.modules[0].declaration("A").unwrap().as_class_like().unwrap();
        assert_eq!(a.css_parts.as_ref().unwrap()[0].inherited_from, Some(Reference::module("M", "a.js")));
    }

    #[test]
    fn test_cycle_is_reported() {
        let a = class("A", Some(Reference::module("B", "a.js")), &[]);
        let b = class("B", Some(Reference::module("A", "a.js")), &[]);
        let mut package = package(vec![a, b]);
        let err = apply_inheritance(&mut package, &[]).unwrap_err();
        match err {
            AnalyzerError::CyclicInheritance { class, chain } => {
                assert_eq!(class, "A");
                assert_eq!(chain, vec!["A", "B", "A"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    fn lib_with_button() -> Package {
        let mut lib = Package::new();
        let mut module = Module::new("index.js");
        let mut button = ClassDeclaration::new("Button");
        button.members_mut().push(Member::Field(Field {
            description: "Library variant.".into(),
            ..Field::new("variant")
        }));
        module
            .exports
            .push(Export::js("Button", Reference::module("Button", "index.js")));
        module.declarations.push(Declaration::Class(button));
        lib.modules.push(module);
        lib
    }

    #[test]
    fn test_aliased_wrapper_without_dependency_is_left_alone() {
        // `import { Button as BaseButton } from 'some-lib'; class Button extends BaseButton {}`
        let wrapper = class("Button", Some(Reference::package("Button", "some-lib")), &["size"]);
        let mut package = package(vec![wrapper]);
        apply_inheritance(&mut package, &[]).unwrap();
        assert_eq!(
            members(&package, "Button"),
            vec![("size".into(), None, "Button.size".into())]
        );
    }

    #[test]
    fn test_aliased_wrapper_inherits_from_dependency() {
        let wrapper = class("Button", Some(Reference::package("Button", "some-lib")), &["size"]);
        let mut package = package(vec![wrapper]);
        apply_inheritance(&mut package, &[lib_with_button()]).unwrap();
        assert_eq!(
            members(&package, "Button"),
            vec![
                ("size".into(), None, "Button.size".into()),
                (
                    "variant".into(),
                    Some("Button".into()),
                    "Library variant.".into()
                ),
            ]
        );
    }

    #[test]
    fn test_package_reference_never_matches_unrelated_local_class() {
        let local = class("Button", None, &["local"]);
        let sub = class("Fancy", Some(Reference::package("Button", "some-lib")), &[]);
        let mut package = package(vec![local, sub]);
        apply_inheritance(&mut package, &[]).unwrap();
        assert!(members(&package, "Fancy").is_empty());
    }

    #[test]
    fn test_third_party_superclass() {
        let mut lib = Package::new();
        let mut lib_module = Module::new("index.js");
        let mut base = ClassDeclaration::new("LibElement");
        base.slots = Some(vec![NamedItem::new("", "Default slot")]);
        lib_module.exports.push(Export::js(
            "LibElement",
            Reference::module("LibElement", "index.js"),
        ));
        lib_module.declarations.push(Declaration::Class(base));
        lib.modules.push(lib_module);

        let a = class("A", Some(Reference::package("LibElement", "some-lib")), &[]);
        let mut package = package(vec![a]);
        apply_inheritance(&mut package, &[lib]).unwrap();

        let a = package.modules[0].declaration("A").unwrap().as_class_like().unwrap();
        let slot = &a.slots.as_ref().unwrap()[0];
        assert_eq!(slot.description, "Default slot");
        assert_eq!(
            slot.inherited_from,
            Some(Reference::package("LibElement", "index.js"))
        );
    }
}
