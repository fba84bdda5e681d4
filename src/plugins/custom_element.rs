//! Flag every class that has a tag name as a custom element.

use crate::pipeline::Plugin;

use super::names;

pub(crate) fn plugin() -> Plugin {
    Plugin::new(names::CUSTOM_ELEMENT).on_package_link(|ctx| {
        for class in ctx
            .manifest
            .modules
            .iter_mut()
            .flat_map(|m| m.declarations.iter_mut())
            .filter_map(|d| d.as_class_like_mut())
        {
            if class.tag_name.as_deref().is_some_and(|t| !t.is_empty()) {
                class.custom_element = Some(true);
            }
        }
        Ok(())
    })
}
