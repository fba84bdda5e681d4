//! `customElements.define(tag, Class)` calls.

use crate::analysis::{NodeId, NodeKind};
use crate::jsdoc::has_ignore;
use crate::manifest::{Declaration, Export, Reference};
use crate::pipeline::{FileContext, Plugin};

use super::classes::create_class;
use super::names;

/// Receivers `customElements` may be reached through.
const GLOBAL_OBJECTS: [&str; 3] = ["window", "globalThis", "self"];

fn is_define_call(ctx: &FileContext<'_>, callee: NodeId) -> bool {
    match ctx.ast().member_path(callee).as_deref() {
        Some(["customElements", "define"]) => true,
        Some([global, "customElements", "define"]) => GLOBAL_OBJECTS.contains(global),
        _ => false,
    }
}

/// The tag name argument: a string literal, or a module-scope constant holding one.
fn tag_name(ctx: &FileContext<'_>, argument: NodeId) -> Option<String> {
    let ast = ctx.ast();
    if let Some(value) = ast.string_value(argument) {
        return Some(value.to_string());
    }
    let name = ast.identifier_name(argument)?;
    match ast.kind(ctx.node_by_name(name)?) {
        NodeKind::VariableDeclarator { init: Some(init), .. } => {
            ast.string_value(*init).map(str::to_string)
        }
        _ => None,
    }
}

pub(crate) fn plugin() -> Plugin {
    let mut anonymous = 0usize;
    Plugin::new(names::DEFINE).on_analyze(move |ctx| {
        let ast = ctx.ast();
        let NodeKind::Call { callee, arguments } = ctx.kind() else {
            return Ok(());
        };
        if !is_define_call(ctx, *callee) || arguments.len() < 2 {
            return Ok(());
        }
        if has_ignore(&ctx.parse_jsdoc(ctx.node())) {
            return Ok(());
        }
        let Some(tag) = tag_name(ctx, arguments[0]) else {
            return Ok(());
        };

        let element = ast.unwrap_expression(arguments[1]);
        let reference = match ast.kind(element) {
            NodeKind::Identifier { name } => ctx.reference_to(name),
            NodeKind::ClassExpression(class) => {
                let name = match &class.name {
                    Some(name) => name.clone(),
                    None => {
                        anonymous += 1;
                        format!("anonymous_{anonymous}")
                    }
                };
                let mut declaration = create_class(ctx, element, &name);
                declaration.tag_name = Some(tag.clone());
                ctx.module_doc
                    .declarations
                    .push(Declaration::Class(declaration));
                Reference::module(name, ctx.path())
            }
            _ => return Ok(()),
        };

        ctx.module_doc.push_export(Export::custom_element(tag, reference));
        Ok(())
    })
}
