//! Function declarations, function-valued constants and class mixins.
//!
//! A function whose result is a class (`(base) => class extends base {}`) is
//! recorded as a mixin; its parameters are kept, and a superclass that is just
//! one of those parameters is dropped.

use once_cell::sync::Lazy;

use crate::analysis::{find, Function, IgnoreBranch, NodeId, NodeKind, NodeTag, WalkOptions};
use crate::jsdoc::{apply_common, has_ignore, parameters_with_docs, return_info};
use crate::manifest::{Declaration, FunctionDeclaration};
use crate::pipeline::{FileContext, Plugin};

use super::classes::{apply_class_tags, create_class};
use super::names;
use super::shared::sync_attributes;

/// One function body, without nested functions of any kind.
static FUNCTION_BODY: Lazy<WalkOptions> = Lazy::new(|| {
    WalkOptions::body_scope()
        .clone()
        .ignore(NodeTag::ArrowFunction, IgnoreBranch::All)
});

/// Function node and binding name for `function f() {}` and `const f = () => {}`.
fn function_at(ctx: &FileContext<'_>) -> Option<(NodeId, String)> {
    let ast = ctx.ast();
    match ctx.kind() {
        NodeKind::FunctionDeclaration(function) => Some((ctx.node(), function.name.clone()?)),
        NodeKind::VariableDeclarator {
            name,
            is_pattern: false,
            init: Some(init),
            ..
        } => {
            let init = ast.unwrap_expression(*init);
            ast.kind(init)
                .is_function_expression()
                .then(|| (init, name.clone()))
        }
        _ => None,
    }
}

/// The class a function returns, if it returns one.
fn returned_class(ctx: &FileContext<'_>, function: &Function) -> Option<NodeId> {
    let ast = ctx.ast();
    let body = function.body?;
    let expression = ast.unwrap_expression(body);
    match ast.kind(expression) {
        NodeKind::ClassExpression(_) => return Some(expression),
        NodeKind::Block { .. } => {}
        _ => return None,
    }

    let mut returned = None;
    find(ast, body, &FUNCTION_BODY, |id| {
        let NodeKind::Return {
            argument: Some(argument),
        } = ast.kind(id)
        else {
            return false;
        };
        let argument = ast.unwrap_expression(*argument);
        returned = match ast.kind(argument) {
            NodeKind::ClassExpression(_) => Some(argument),
            NodeKind::Identifier { name } => find(ast, body, &FUNCTION_BODY, |candidate| {
                matches!(ast.kind(candidate), NodeKind::ClassDeclaration(c) if c.name.as_deref() == Some(name.as_str()))
            }),
            _ => None,
        };
        returned.is_some()
    });
    returned
}

pub(crate) fn plugin() -> Plugin {
    Plugin::new(names::FUNCTIONS).on_analyze(|ctx| {
        let ast = ctx.ast();
        let Some((function_node, name)) = function_at(ctx) else {
            return Ok(());
        };
        let Some(function) = ast.kind(function_node).as_function() else {
            return Ok(());
        };
        let blocks = ctx.parse_jsdoc(ctx.node());
        if has_ignore(&blocks) {
            return Ok(());
        }

        let parameters = parameters_with_docs(ast, &function.params, &blocks);
        let declaration = match returned_class(ctx, function) {
            Some(class_node) => {
                let mut mixin = create_class(ctx, class_node, &name);
                apply_class_tags(&mut mixin, &blocks);
                sync_attributes(&mut mixin);
                let from_parameter = mixin
                    .superclass
                    .as_ref()
                    .is_some_and(|s| parameters.iter().any(|p| p.name == s.name));
                if from_parameter {
                    mixin.superclass = None;
                }
                mixin.parameters = (!parameters.is_empty()).then_some(parameters);
                Declaration::Mixin(mixin)
            }
            None => {
                let mut record = FunctionDeclaration {
                    parameters: (!parameters.is_empty()).then_some(parameters),
                    return_info: return_info(function.return_type.as_deref(), &blocks),
                    ..FunctionDeclaration::new(name)
                };
                apply_common(&mut record, &blocks);
                Declaration::Function(record)
            }
        };
        ctx.module_doc.declarations.push(declaration);
        Ok(())
    })
}
