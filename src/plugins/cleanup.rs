//! Drop empty collections from class-like declarations.

use crate::manifest::ClassDeclaration;
use crate::pipeline::Plugin;

use super::names;

fn drop_empty<T>(collection: &mut Option<Vec<T>>) {
    if collection.as_ref().is_some_and(Vec::is_empty) {
        *collection = None;
    }
}

pub(crate) fn cleanup_class(class: &mut ClassDeclaration) {
    drop_empty(&mut class.mixins);
    drop_empty(&mut class.members);
    drop_empty(&mut class.attributes);
    drop_empty(&mut class.events);
    drop_empty(&mut class.slots);
    drop_empty(&mut class.css_parts);
    drop_empty(&mut class.css_properties);
    drop_empty(&mut class.css_states);
    drop_empty(&mut class.icons);
    drop_empty(&mut class.locale);
    drop_empty(&mut class.parameters);
}

pub(crate) fn plugin() -> Plugin {
    Plugin::new(names::CLEANUP).on_module_link(|ctx| {
        ctx.module_doc
            .declarations
            .iter_mut()
            .filter_map(|d| d.as_class_like_mut())
            .for_each(cleanup_class);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Attribute, Declaration};

    #[test]
    fn test_only_empty_collections_removed() {
        let mut class = ClassDeclaration::new("A");
        class.attributes_mut().push(Attribute::new("open"));
        cleanup_class(&mut class);
        assert!(class.members.is_none());
        assert!(class.slots.is_none());
        assert!(class.mixins.is_none());
        assert_eq!(class.attributes().len(), 1);

        let json = serde_json::to_value(Declaration::Class(class)).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 3, "{keys:?}");
    }
}
