//! Fold superclass and mixin API into subclasses once the package is complete.

use crate::pipeline::Plugin;

use super::{denylist, names, Framework};

pub(crate) fn plugin(framework: Framework) -> Plugin {
    Plugin::new(names::INHERITANCE).on_package_link(move |ctx| {
        crate::inheritance::apply_inheritance(ctx.manifest, ctx.third_party)?;
        denylist::strip_package(ctx.manifest, framework);
        Ok(())
    })
}
