//! Deterministic ordering of declarations, exports and class collections.

use crate::collate::locale_compare;
use crate::manifest::{ClassDeclaration, Module};
use crate::pipeline::Plugin;

use super::names;

fn sort_by_name<T>(items: &mut Option<Vec<T>>, name: impl Fn(&T) -> &str) {
    if let Some(items) = items {
        items.sort_by(|a, b| locale_compare(name(a), name(b)));
    }
}

pub(crate) fn sort_class(class: &mut ClassDeclaration) {
    sort_by_name(&mut class.members, |m| m.name());
    sort_by_name(&mut class.attributes, |a| a.name.as_str());
    sort_by_name(&mut class.events, |e| e.name.as_str());
    sort_by_name(&mut class.slots, |s| s.name.as_str());
    sort_by_name(&mut class.css_parts, |p| p.name.as_str());
    sort_by_name(&mut class.css_properties, |p| p.name.as_str());
    sort_by_name(&mut class.css_states, |s| s.name.as_str());
    sort_by_name(&mut class.icons, |i| i.name.as_str());
    sort_by_name(&mut class.locale, |l| l.name.as_str());
}

pub(crate) fn sort_module(module: &mut Module) {
    module
        .declarations
        .sort_by(|a, b| locale_compare(a.name(), b.name()));
    module
        .exports
        .sort_by(|a, b| locale_compare(&a.name, &b.name));
    module
        .declarations
        .iter_mut()
        .filter_map(|d| d.as_class_like_mut())
        .for_each(sort_class);
}

pub(crate) fn plugin() -> Plugin {
    Plugin::new(names::SORT).on_package_link(|ctx| {
        ctx.manifest.modules.iter_mut().for_each(sort_module);
        Ok(())
    })
}
