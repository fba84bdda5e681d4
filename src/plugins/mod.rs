//! Built-in analysis plugins.
//!
//! Each submodule exposes a constructor returning a [`Plugin`]. The default set
//! is assembled by [`default_plugins`]; user plugins are appended after it.

mod classes;
mod cleanup;
mod custom_element;
mod decorators;
mod define;
mod denylist;
mod exports;
mod functions;
mod imports;
mod inheritance;
mod link_tags;
mod lit;
mod prune;
mod sort;
mod variables;

pub(crate) mod shared;

use serde::{Deserialize, Serialize};

use crate::pipeline::Plugin;

pub use classes::create_class;

/// Framework-specific plugin sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    #[default]
    Vanilla,
    Lit,
}

/// Names of the default plugins, for diagnostics and tests.
pub mod names {
    pub const IMPORTS: &str = "CORE - IMPORTS";
    pub const EXPORTS: &str = "CORE - EXPORTS";
    pub const DEFINE: &str = "CORE - CUSTOM-ELEMENTS-DEFINE-CALLS";
    pub const DECORATORS: &str = "CORE - DECORATORS";
    pub const CLASSES: &str = "CORE - CLASSES";
    pub const FUNCTIONS: &str = "CORE - FUNCTIONS";
    pub const VARIABLES: &str = "CORE - VARIABLES";
    pub const LIT_PROPERTIES: &str = "LIT - PROPERTIES";
    pub const METHOD_DENYLIST: &str = "CORE - METHOD-DENYLIST";
    pub const FIELD_DENYLIST: &str = "CORE - FIELD-DENYLIST";
    pub const LIT_METHOD_DENYLIST: &str = "LIT - METHOD-DENYLIST";
    pub const LIT_FIELD_DENYLIST: &str = "LIT - FIELD-DENYLIST";
    pub const CLEANUP: &str = "CORE - CLEANUP";
    pub const LINK_TAGS: &str = "CORE - LINK-CLASS-TO-TAGNAME";
    pub const INHERITANCE: &str = "CORE - APPLY-INHERITANCE";
    pub const CUSTOM_ELEMENT: &str = "CORE - IS-CUSTOM-ELEMENT";
    pub const PRUNE: &str = "CORE - REMOVE-UNEXPORTED-DECLARATIONS";
    pub const SORT: &str = "CORE - SORT";
}

/// The default plugins, in execution order.
pub fn default_plugins(framework: Framework) -> Vec<Plugin> {
    let mut plugins = vec![
        imports::plugin(),
        exports::plugin(),
        define::plugin(),
        decorators::plugin(),
        classes::plugin(),
        functions::plugin(),
        variables::plugin(),
    ];
    if framework == Framework::Lit {
        plugins.push(lit::plugin());
    }

    plugins.push(denylist::method_denylist());
    plugins.push(denylist::field_denylist());
    if framework == Framework::Lit {
        plugins.push(denylist::lit_method_denylist());
        plugins.push(denylist::lit_field_denylist());
    }
    plugins.push(cleanup::plugin());

    plugins.extend([
        link_tags::plugin(),
        inheritance::plugin(framework),
        custom_element::plugin(),
        prune::plugin(),
        sort::plugin(),
    ]);
    plugins
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order() {
        let names: Vec<_> = default_plugins(Framework::Vanilla)
            .iter()
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(names.first().map(String::as_str), Some(names::IMPORTS));
        assert_eq!(names.last().map(String::as_str), Some(names::SORT));
        assert!(!names.iter().any(|n| n.starts_with("LIT")));

        let lit: Vec<_> = default_plugins(Framework::Lit)
            .iter()
            .map(|p| p.name.clone())
            .collect();
        let properties = lit.iter().position(|n| n == names::LIT_PROPERTIES).unwrap();
        let variables = lit.iter().position(|n| n == names::VARIABLES).unwrap();
        let cleanup = lit.iter().position(|n| n == names::CLEANUP).unwrap();
        assert!(variables < properties && properties < cleanup);
    }
}
