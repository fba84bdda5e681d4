//! Depth-first pre-order traversal with early exit.
//!
//! Visitors return [`ControlFlow`]; `Break` stops the whole walk and is returned
//! to the caller. Branches can be pruned per node kind, either entirely or only
//! through selected child slots.

use std::collections::HashMap;
use std::ops::ControlFlow;

use once_cell::sync::Lazy;

use super::ast::{Ast, ChildSlot, NodeId, NodeTag};

/// Which children of a node kind the walker must not descend into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreBranch {
    /// Do not descend at all (the node itself is still visited).
    All,
    /// Skip only these slots.
    Slots(Vec<ChildSlot>),
}

#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Do not call the visitor for the root node.
    pub skip_root: bool,
    pub ignore_branches: HashMap<NodeTag, IgnoreBranch>,
}

/// Module-scope walk: skips function parameters and bodies, class members and
/// static blocks.
static MODULE_SCOPE: Lazy<WalkOptions> = Lazy::new(|| {
    use ChildSlot::*;
    WalkOptions::new()
        .ignore(NodeTag::FunctionDeclaration, IgnoreBranch::Slots(vec![Params, Body]))
        .ignore(NodeTag::FunctionExpression, IgnoreBranch::Slots(vec![Params, Body]))
        .ignore(NodeTag::ArrowFunction, IgnoreBranch::Slots(vec![Params, Body]))
        .ignore(NodeTag::ClassDeclaration, IgnoreBranch::Slots(vec![Members]))
        .ignore(NodeTag::ClassExpression, IgnoreBranch::Slots(vec![Members]))
        .ignore(NodeTag::StaticBlock, IgnoreBranch::All)
});

/// Walk inside one function or member body without entering nested functions
/// or classes.
static BODY_SCOPE: Lazy<WalkOptions> = Lazy::new(|| {
    WalkOptions::new()
        .ignore(NodeTag::FunctionDeclaration, IgnoreBranch::All)
        .ignore(NodeTag::FunctionExpression, IgnoreBranch::All)
        .ignore(NodeTag::ClassDeclaration, IgnoreBranch::All)
        .ignore(NodeTag::ClassExpression, IgnoreBranch::All)
});

impl WalkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_root(mut self) -> Self {
        self.skip_root = true;
        self
    }

    pub fn ignore(mut self, tag: NodeTag, branch: IgnoreBranch) -> Self {
        self.ignore_branches.insert(tag, branch);
        self
    }

    pub fn module_scope() -> &'static WalkOptions {
        &MODULE_SCOPE
    }

    pub fn body_scope() -> &'static WalkOptions {
        &BODY_SCOPE
    }

    fn descends(&self, tag: NodeTag, slot: ChildSlot) -> bool {
        match self.ignore_branches.get(&tag) {
            None => true,
            Some(IgnoreBranch::All) => false,
            Some(IgnoreBranch::Slots(slots)) => !slots.contains(&slot),
        }
    }
}

/// Visit `root` and its descendants in pre-order.
pub fn walk<B>(
    ast: &Ast,
    root: NodeId,
    options: &WalkOptions,
    mut visit: impl FnMut(NodeId) -> ControlFlow<B>,
) -> ControlFlow<B> {
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if !(options.skip_root && id == root) {
            if let ControlFlow::Break(value) = visit(id) {
                return ControlFlow::Break(value);
            }
        }

        let kind = ast.kind(id);
        let tag = kind.tag();
        let mut children: Vec<NodeId> = kind
            .slots()
            .into_iter()
            .filter(|(slot, _)| options.descends(tag, *slot))
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        children.reverse();
        stack.extend(children);
    }
    ControlFlow::Continue(())
}

/// First node (in pre-order) matching `predicate`.
pub fn find(
    ast: &Ast,
    root: NodeId,
    options: &WalkOptions,
    mut predicate: impl FnMut(NodeId) -> bool,
) -> Option<NodeId> {
    match walk(ast, root, options, |id| {
        if predicate(id) {
            ControlFlow::Break(id)
        } else {
            ControlFlow::Continue(())
        }
    }) {
        ControlFlow::Break(id) => Some(id),
        ControlFlow::Continue(()) => None,
    }
}

/// Every node (in pre-order) matching `predicate`.
pub fn collect(
    ast: &Ast,
    root: NodeId,
    options: &WalkOptions,
    mut predicate: impl FnMut(NodeId) -> bool,
) -> Vec<NodeId> {
    let mut found = Vec::new();
    let _ = walk::<()>(ast, root, options, |id| {
        if predicate(id) {
            found.push(id);
        }
        ControlFlow::Continue(())
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ast::NodeKind;
    use crate::parser::SourceFile;

    fn parse(source: &str) -> SourceFile {
        SourceFile::parse("test.js", source).unwrap()
    }

    fn identifiers(file: &SourceFile, options: &WalkOptions) -> Vec<String> {
        let ast = &file.ast;
        collect(ast, ast.root(), options, |id| {
            matches!(ast.kind(id), NodeKind::Identifier { .. })
        })
        .into_iter()
        .map(|id| ast.print(id).to_string())
        .collect()
    }

    #[test]
    fn test_walk_is_preorder() {
        let file = parse("a(b, c); d;");
        let names = identifiers(&file, &WalkOptions::new());
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_module_scope_skips_function_bodies_and_members() {
        let file = parse(
            "function f(p) { inner; }\nclass C extends Base { m() { member; } }\nouter;",
        );
        let names = identifiers(&file, WalkOptions::module_scope());
        assert_eq!(names, vec!["Base", "outer"]);
    }

    #[test]
    fn test_break_stops_walk() {
        let file = parse("a; b; c;");
        let ast = &file.ast;
        let mut seen = 0;
        let flow = walk(ast, ast.root(), &WalkOptions::new(), |id| {
            if let NodeKind::Identifier { name } = ast.kind(id) {
                seen += 1;
                if name == "b" {
                    return ControlFlow::Break(name.clone());
                }
            }
            ControlFlow::Continue(())
        });
        assert_eq!(flow, ControlFlow::Break("b".to_string()));
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_skip_root() {
        let file = parse("x;");
        let ast = &file.ast;
        let mut visited = Vec::new();
        let _ = walk::<()>(ast, ast.root(), &WalkOptions::new().skip_root(), |id| {
            visited.push(id);
            ControlFlow::Continue(())
        });
        assert!(!visited.contains(&ast.root()));
        assert!(!visited.is_empty());
    }

    #[test]
    fn test_ignore_all_still_visits_node() {
        let file = parse("function f() { hidden; }");
        let ast = &file.ast;
        let options = WalkOptions::new().ignore(NodeTag::FunctionDeclaration, IgnoreBranch::All);
        let found = find(ast, ast.root(), &options, |id| {
            matches!(ast.kind(id), NodeKind::FunctionDeclaration(_))
        });
        assert!(found.is_some());
        assert!(identifiers(&file, &options).is_empty());
    }
}
