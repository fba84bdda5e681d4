//! Copy tag names from `custom-element-definition` exports onto their classes.

use tracing::trace;

use crate::manifest::{DeclarationKind, ExportKind};
use crate::pipeline::Plugin;
use crate::resolve::{ManifestSlot, Manifests};

use super::names;

pub(crate) fn plugin() -> Plugin {
    Plugin::new(names::LINK_TAGS).on_package_link(|ctx| {
        let definitions: Vec<(String, String, String)> = ctx
            .manifest
            .modules
            .iter()
            .flat_map(|module| {
                module
                    .exports
                    .iter()
                    .filter(|e| e.kind == ExportKind::CustomElementDefinition)
                    .map(move |e| {
                        let location = e.declaration.module.as_deref().unwrap_or(&module.path);
                        (e.name.clone(), e.declaration.name.clone(), location.to_string())
                    })
            })
            .collect();

        for (tag, class_name, location) in definitions {
            let found = Manifests::new(ctx.manifest, &[])
                .resolve_declaration(&class_name, Some(DeclarationKind::Class), &location)
                .filter(|l| l.manifest == ManifestSlot::Primary)
                .map(|l| (l.module, l.declaration))
                .or_else(|| {
                    ctx.manifest.modules.iter().enumerate().find_map(|(mi, module)| {
                        module
                            .declarations
                            .iter()
                            .position(|d| d.kind().is_class_like() && d.name() == class_name)
                            .map(|di| (mi, di))
                    })
                });
            let Some((module, declaration)) = found else {
                trace!(tag = %tag, class = %class_name, "no class for custom element definition");
                continue;
            };
            if let Some(class) = ctx.manifest.modules[module].declarations[declaration].as_class_like_mut() {
                class.tag_name.get_or_insert(tag);
            }
        }
        Ok(())
    })
}
