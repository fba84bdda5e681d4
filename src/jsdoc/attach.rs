//! Attaching JSDoc comments to syntax nodes.
//!
//! The comment for a node is the nearest `/**` block that ends before the node
//! starts and after the node that precedes it in document order. Variable
//! declarators, export wrappers and expression statements are looked through so
//! that `export const x = 1` and `this.x = 1;` pick up the comment above the
//! whole statement.

use super::{parse_comment, JsDocBlock};
use crate::analysis::{Ast, NodeId, NodeKind};
use crate::parser::Comment;

/// The node whose leading comment documents `node`.
pub fn attachment_target(ast: &Ast, node: NodeId) -> NodeId {
    let mut target = node;
    loop {
        let Some(parent) = ast.parent(target) else {
            return target;
        };
        let climb = match ast.kind(parent) {
            NodeKind::VariableDeclaration { .. } => {
                matches!(ast.kind(target), NodeKind::VariableDeclarator { .. })
            }
            // Only a direct wrapper (the pre-order predecessor) is transparent.
            NodeKind::ExportNamed { .. }
            | NodeKind::ExportDefault { .. }
            | NodeKind::ExpressionStatement { .. } => target.previous() == Some(parent),
            _ => false,
        };
        if !climb {
            return target;
        }
        target = parent;
    }
}

/// Parsed JSDoc blocks documenting `node` (at most one: the nearest).
pub fn parse_jsdoc_for(ast: &Ast, comments: &[Comment], node: NodeId) -> Vec<JsDocBlock> {
    let target = attachment_target(ast, node);
    let span = ast.span(target);

    let lower = match target.previous() {
        Some(prev) if ast.parent(prev).is_none() => 0,
        Some(prev) => {
            let prev_span = ast.span(prev);
            if prev_span.end <= span.start {
                prev_span.end
            } else {
                // The predecessor encloses the target (it is an ancestor).
                prev_span.start.min(span.start)
            }
        }
        None => 0,
    };

    comments
        .iter()
        .rev()
        .filter(|c| c.is_jsdoc())
        .find(|c| c.span.end <= span.start && c.span.start >= lower)
        .and_then(|c| parse_comment(&c.text))
        .into_iter()
        .collect()
}
