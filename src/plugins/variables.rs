//! Module-level variables that hold plain values.

use crate::analysis::NodeKind;
use crate::jsdoc::{apply_common, apply_type, has_ignore};
use crate::manifest::{Declaration, TypeInfo, VariableDeclaration};
use crate::pipeline::Plugin;

use super::names;
use super::shared::infer_type;

pub(crate) fn plugin() -> Plugin {
    Plugin::new(names::VARIABLES).on_analyze(|ctx| {
        let ast = ctx.ast();
        let NodeKind::VariableDeclarator {
            name,
            is_pattern: false,
            type_annotation,
            init,
        } = ctx.kind()
        else {
            return Ok(());
        };
        // Functions and classes are recorded by their own plugins.
        if let Some(value) = init.map(|i| ast.unwrap_expression(i)) {
            let kind = ast.kind(value);
            if kind.is_function_expression() || matches!(kind, NodeKind::ClassExpression(_)) {
                return Ok(());
            }
        }
        let blocks = ctx.parse_jsdoc(ctx.node());
        if has_ignore(&blocks) {
            return Ok(());
        }

        let mut variable = VariableDeclaration {
            type_info: type_annotation
                .clone()
                .map(TypeInfo::new)
                .or_else(|| init.and_then(|i| infer_type(ast, i))),
            default: init.map(|i| ast.print(i).to_string()),
            ..VariableDeclaration::new(name.clone())
        };
        apply_common(&mut variable, &blocks);
        apply_type(&mut variable.type_info, &mut variable.description, &blocks);
        ctx.module_doc
            .declarations
            .push(Declaration::Variable(variable));
        Ok(())
    })
}
