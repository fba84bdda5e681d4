//! `@customElement('tag')` class decorators.

use crate::analysis::NodeKind;
use crate::manifest::{Export, Reference};
use crate::pipeline::Plugin;

use super::names;

pub(crate) fn plugin() -> Plugin {
    Plugin::new(names::DECORATORS).on_analyze(|ctx| {
        let ast = ctx.ast();
        let NodeKind::Decorator { expression } = ctx.kind() else {
            return Ok(());
        };
        let Some(class_name) = ast
            .parent(ctx.node())
            .and_then(|parent| ast.kind(parent).as_class())
            .and_then(|class| class.name.clone())
        else {
            return Ok(());
        };
        let NodeKind::Call { callee, arguments } = ast.kind(ast.unwrap_expression(*expression))
        else {
            return Ok(());
        };
        if ast.identifier_name(*callee) != Some("customElement") {
            return Ok(());
        }
        let Some(tag) = arguments.first().and_then(|a| ast.string_value(*a)) else {
            return Ok(());
        };

        let path = ctx.path();
        ctx.module_doc
            .push_export(Export::custom_element(tag, Reference::module(&class_name, path)));
        if let Some(class) = ctx.module_doc.class_mut(&class_name) {
            class.tag_name = Some(tag.to_string());
        }
        Ok(())
    })
}
