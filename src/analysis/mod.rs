//! Syntax tree model and traversal.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ tree-sitter  │────▶│ Ast (arena,  │────▶│ walk()       │
//! │ CST          │     │ closed kinds)│     │ ControlFlow  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

mod ast;
mod walk;

pub use ast::{
    Accessibility, Ast, ChildSlot, Class, ExportBinding, Function, ImportBinding,
    ImportBindingKind, MethodDefinition, MethodKind, Modifiers, Node, NodeId, NodeKind, NodeTag,
    Parameter, PropertyDefinition, PropertyKey, Span, VariableKind,
};
pub use walk::{collect, find, walk, IgnoreBranch, WalkOptions};
