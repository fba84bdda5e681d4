//! Arena-allocated syntax tree.
//!
//! The tree-sitter CST is lowered once per file into this closed set of node
//! kinds. Nodes are allocated in pre-order, so arena order is document order and
//! `NodeId(n - 1)` is the node visited immediately before `NodeId(n)`.
//!
//! Every kind lists its child-holding slots in [`NodeKind::slots`]; the walker
//! only ever descends through that table.

use std::fmt;

/// Index of a node in its [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The node allocated immediately before this one (pre-order predecessor).
    pub fn previous(self) -> Option<NodeId> {
        self.0.checked_sub(1).map(NodeId)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// TypeScript accessibility modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessibility {
    Public,
    Private,
    Protected,
}

impl Accessibility {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "public" => Some(Accessibility::Public),
            "private" => Some(Accessibility::Private),
            "protected" => Some(Accessibility::Protected),
            _ => None,
        }
    }
}

/// Modifiers shared by class members and parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub is_static: bool,
    pub readonly: bool,
    pub is_async: bool,
    pub is_abstract: bool,
    pub optional: bool,
    pub declare: bool,
    pub accessibility: Option<Accessibility>,
}

/// Name of a class member or object property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKey {
    Identifier(String),
    /// `#name`, stored with the leading `#`.
    Private(String),
    String(String),
    Number(String),
    /// `[expr]`, stored as source text.
    Computed(String),
}

impl PropertyKey {
    pub fn name(&self) -> &str {
        match self {
            PropertyKey::Identifier(s)
            | PropertyKey::Private(s)
            | PropertyKey::String(s)
            | PropertyKey::Number(s)
            | PropertyKey::Computed(s) => s,
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, PropertyKey::Private(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportBindingKind {
    Default,
    Named,
    Namespace,
}

/// One local binding introduced by an import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub kind: ImportBindingKind,
    pub local: String,
    /// Exported name on the other side (`import { imported as local }`).
    pub imported: Option<String>,
    pub type_only: bool,
}

/// One `local as exported` pair of an export clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBinding {
    pub local: String,
    pub exported: String,
    pub type_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Method,
    Getter,
    Setter,
    Constructor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: Option<String>,
    pub decorators: Vec<NodeId>,
    pub superclass: Option<NodeId>,
    pub members: Vec<NodeId>,
    pub is_abstract: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDefinition {
    pub key: PropertyKey,
    pub kind: MethodKind,
    pub modifiers: Modifiers,
    pub decorators: Vec<NodeId>,
    pub params: Vec<NodeId>,
    pub body: Option<NodeId>,
    pub return_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    pub key: PropertyKey,
    pub modifiers: Modifiers,
    pub decorators: Vec<NodeId>,
    pub type_annotation: Option<String>,
    pub value: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<NodeId>,
    pub body: Option<NodeId>,
    pub return_type: Option<String>,
    pub is_async: bool,
    pub is_generator: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Binding name, or the source text of a destructuring pattern.
    pub name: String,
    pub type_annotation: Option<String>,
    pub default: Option<NodeId>,
    pub optional: bool,
    pub rest: bool,
    pub modifiers: Modifiers,
    pub decorators: Vec<NodeId>,
}

/// A syntax node variant together with its data and children.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Program { body: Vec<NodeId> },
    Import { bindings: Vec<ImportBinding>, source: String, type_only: bool },
    ExportNamed {
        declaration: Option<NodeId>,
        bindings: Vec<ExportBinding>,
        source: Option<String>,
        type_only: bool,
    },
    ExportDefault { declaration: NodeId },
    ExportAll { alias: Option<String>, source: String },
    ClassDeclaration(Class),
    ClassExpression(Class),
    Method(MethodDefinition),
    Property(PropertyDefinition),
    StaticBlock { body: Vec<NodeId> },
    FunctionDeclaration(Function),
    FunctionExpression(Function),
    ArrowFunction(Function),
    Parameter(Parameter),
    VariableDeclaration { kind: VariableKind, declarators: Vec<NodeId> },
    VariableDeclarator {
        name: String,
        is_pattern: bool,
        type_annotation: Option<String>,
        init: Option<NodeId>,
    },
    ExpressionStatement { expression: NodeId },
    Block { body: Vec<NodeId> },
    Return { argument: Option<NodeId> },
    If { test: NodeId, consequent: NodeId, alternate: Option<NodeId> },
    Call { callee: NodeId, arguments: Vec<NodeId> },
    New { callee: NodeId, arguments: Vec<NodeId> },
    Member { object: NodeId, property: String },
    Assignment { left: NodeId, right: NodeId },
    Decorator { expression: NodeId },
    Identifier { name: String },
    This,
    String { value: String },
    /// Template literal; `cooked` is set only when there are no substitutions.
    Template { cooked: Option<String>, expressions: Vec<NodeId> },
    Number { raw: String },
    Boolean { value: bool },
    Null,
    Undefined,
    Array { elements: Vec<NodeId> },
    Object { properties: Vec<NodeId> },
    Pair { key: PropertyKey, value: NodeId },
    Shorthand { name: String },
    Spread { argument: NodeId },
    /// Any construct the analyzer does not model, keyed by its grammar name.
    Other { kind: &'static str, children: Vec<NodeId> },
}

/// Fieldless discriminant of [`NodeKind`], used to key walker options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    Program,
    Import,
    ExportNamed,
    ExportDefault,
    ExportAll,
    ClassDeclaration,
    ClassExpression,
    Method,
    Property,
    StaticBlock,
    FunctionDeclaration,
    FunctionExpression,
    ArrowFunction,
    Parameter,
    VariableDeclaration,
    VariableDeclarator,
    ExpressionStatement,
    Block,
    Return,
    If,
    Call,
    New,
    Member,
    Assignment,
    Decorator,
    Identifier,
    This,
    String,
    Template,
    Number,
    Boolean,
    Null,
    Undefined,
    Array,
    Object,
    Pair,
    Shorthand,
    Spread,
    Other,
}

/// Named child-holding slot of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildSlot {
    Body,
    Declaration,
    Decorators,
    Superclass,
    Members,
    Params,
    Default,
    Init,
    Declarators,
    Expression,
    Argument,
    Test,
    Consequent,
    Alternate,
    Callee,
    Arguments,
    Object,
    Left,
    Right,
    Elements,
    Properties,
    Value,
    Children,
}

impl NodeKind {
    pub fn tag(&self) -> NodeTag {
        match self {
            NodeKind::Program { .. } => NodeTag::Program,
            NodeKind::Import { .. } => NodeTag::Import,
            NodeKind::ExportNamed { .. } => NodeTag::ExportNamed,
            NodeKind::ExportDefault { .. } => NodeTag::ExportDefault,
            NodeKind::ExportAll { .. } => NodeTag::ExportAll,
            NodeKind::ClassDeclaration(_) => NodeTag::ClassDeclaration,
            NodeKind::ClassExpression(_) => NodeTag::ClassExpression,
            NodeKind::Method(_) => NodeTag::Method,
            NodeKind::Property(_) => NodeTag::Property,
            NodeKind::StaticBlock { .. } => NodeTag::StaticBlock,
            NodeKind::FunctionDeclaration(_) => NodeTag::FunctionDeclaration,
            NodeKind::FunctionExpression(_) => NodeTag::FunctionExpression,
            NodeKind::ArrowFunction(_) => NodeTag::ArrowFunction,
            NodeKind::Parameter(_) => NodeTag::Parameter,
            NodeKind::VariableDeclaration { .. } => NodeTag::VariableDeclaration,
            NodeKind::VariableDeclarator { .. } => NodeTag::VariableDeclarator,
            NodeKind::ExpressionStatement { .. } => NodeTag::ExpressionStatement,
            NodeKind::Block { .. } => NodeTag::Block,
            NodeKind::Return { .. } => NodeTag::Return,
            NodeKind::If { .. } => NodeTag::If,
            NodeKind::Call { .. } => NodeTag::Call,
            NodeKind::New { .. } => NodeTag::New,
            NodeKind::Member { .. } => NodeTag::Member,
            NodeKind::Assignment { .. } => NodeTag::Assignment,
            NodeKind::Decorator { .. } => NodeTag::Decorator,
            NodeKind::Identifier { .. } => NodeTag::Identifier,
            NodeKind::This => NodeTag::This,
            NodeKind::String { .. } => NodeTag::String,
            NodeKind::Template { .. } => NodeTag::Template,
            NodeKind::Number { .. } => NodeTag::Number,
            NodeKind::Boolean { .. } => NodeTag::Boolean,
            NodeKind::Null => NodeTag::Null,
            NodeKind::Undefined => NodeTag::Undefined,
            NodeKind::Array { .. } => NodeTag::Array,
            NodeKind::Object { .. } => NodeTag::Object,
            NodeKind::Pair { .. } => NodeTag::Pair,
            NodeKind::Shorthand { .. } => NodeTag::Shorthand,
            NodeKind::Spread { .. } => NodeTag::Spread,
            NodeKind::Other { .. } => NodeTag::Other,
        }
    }

    /// Child slots in source order. Absent optional children yield empty slices.
    pub fn slots(&self) -> Vec<(ChildSlot, &[NodeId])> {
        use ChildSlot as S;
        match self {
            NodeKind::Program { body }
            | NodeKind::Block { body }
            | NodeKind::StaticBlock { body } => vec![(S::Body, body.as_slice())],
            NodeKind::Import { .. }
            | NodeKind::ExportAll { .. }
            | NodeKind::Identifier { .. }
            | NodeKind::This
            | NodeKind::String { .. }
            | NodeKind::Number { .. }
            | NodeKind::Boolean { .. }
            | NodeKind::Null
            | NodeKind::Undefined
            | NodeKind::Shorthand { .. } => Vec::new(),
            NodeKind::ExportNamed { declaration, .. } => {
                vec![(S::Declaration, declaration.as_slice())]
            }
            NodeKind::ExportDefault { declaration } => {
                vec![(S::Declaration, std::slice::from_ref(declaration))]
            }
            NodeKind::ClassDeclaration(class) | NodeKind::ClassExpression(class) => vec![
                (S::Decorators, class.decorators.as_slice()),
                (S::Superclass, class.superclass.as_slice()),
                (S::Members, class.members.as_slice()),
            ],
            NodeKind::Method(method) => vec![
                (S::Decorators, method.decorators.as_slice()),
                (S::Params, method.params.as_slice()),
                (S::Body, method.body.as_slice()),
            ],
            NodeKind::Property(property) => vec![
                (S::Decorators, property.decorators.as_slice()),
                (S::Value, property.value.as_slice()),
            ],
            NodeKind::FunctionDeclaration(function)
            | NodeKind::FunctionExpression(function)
            | NodeKind::ArrowFunction(function) => vec![
                (S::Params, function.params.as_slice()),
                (S::Body, function.body.as_slice()),
            ],
            NodeKind::Parameter(param) => vec![
                (S::Decorators, param.decorators.as_slice()),
                (S::Default, param.default.as_slice()),
            ],
            NodeKind::VariableDeclaration { declarators, .. } => {
                vec![(S::Declarators, declarators.as_slice())]
            }
            NodeKind::VariableDeclarator { init, .. } => vec![(S::Init, init.as_slice())],
            NodeKind::ExpressionStatement { expression } => {
                vec![(S::Expression, std::slice::from_ref(expression))]
            }
            NodeKind::Return { argument } => vec![(S::Argument, argument.as_slice())],
            NodeKind::If {
                test,
                consequent,
                alternate,
            } => vec![
                (S::Test, std::slice::from_ref(test)),
                (S::Consequent, std::slice::from_ref(consequent)),
                (S::Alternate, alternate.as_slice()),
            ],
            NodeKind::Call { callee, arguments } | NodeKind::New { callee, arguments } => vec![
                (S::Callee, std::slice::from_ref(callee)),
                (S::Arguments, arguments.as_slice()),
            ],
            NodeKind::Member { object, .. } => vec![(S::Object, std::slice::from_ref(object))],
            NodeKind::Assignment { left, right } => vec![
                (S::Left, std::slice::from_ref(left)),
                (S::Right, std::slice::from_ref(right)),
            ],
            NodeKind::Decorator { expression } => {
                vec![(S::Expression, std::slice::from_ref(expression))]
            }
            NodeKind::Template { expressions, .. } => {
                vec![(S::Children, expressions.as_slice())]
            }
            NodeKind::Array { elements } => vec![(S::Elements, elements.as_slice())],
            NodeKind::Object { properties } => vec![(S::Properties, properties.as_slice())],
            NodeKind::Pair { value, .. } => vec![(S::Value, std::slice::from_ref(value))],
            NodeKind::Spread { argument } => {
                vec![(S::Argument, std::slice::from_ref(argument))]
            }
            NodeKind::Other { children, .. } => vec![(S::Children, children.as_slice())],
        }
    }

    pub fn as_class(&self) -> Option<&Class> {
        match self {
            NodeKind::ClassDeclaration(c) | NodeKind::ClassExpression(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            NodeKind::FunctionDeclaration(f)
            | NodeKind::FunctionExpression(f)
            | NodeKind::ArrowFunction(f) => Some(f),
            _ => None,
        }
    }

    /// Function-like expressions (arrow functions and function expressions).
    pub fn is_function_expression(&self) -> bool {
        matches!(self, NodeKind::FunctionExpression(_) | NodeKind::ArrowFunction(_))
    }
}

/// One node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
}

/// Syntax tree of one source file.
#[derive(Debug, Clone)]
pub struct Ast {
    source: String,
    nodes: Vec<Node>,
}

impl Ast {
    pub(crate) fn with_source(source: String) -> Self {
        Self {
            source,
            nodes: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, kind: NodeKind, span: Span, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { kind, span, parent });
        id
    }

    pub(crate) fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id.index()].kind = kind;
    }

    pub(crate) fn set_span_start(&mut self, id: NodeId, start: usize) {
        let span = &mut self.nodes[id.index()].span;
        span.start = span.start.min(start);
    }

    /// The program node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// All node ids in document (pre-order) order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Children across all slots, in source order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id)
            .slots()
            .into_iter()
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect()
    }

    /// Source text of a node.
    pub fn print(&self, id: NodeId) -> &str {
        let span = self.span(id);
        self.source.get(span.start..span.end).unwrap_or("")
    }

    /// Walk up through parentheses and TypeScript type assertions.
    pub fn unwrap_expression(&self, mut id: NodeId) -> NodeId {
        loop {
            match self.kind(id) {
                NodeKind::Other { kind, children }
                    if matches!(
                        *kind,
                        "parenthesized_expression"
                            | "as_expression"
                            | "satisfies_expression"
                            | "non_null_expression"
                            | "type_assertion"
                    ) =>
                {
                    match children.iter().find(|c| !is_type_node(self.kind(**c))) {
                        Some(inner) => id = *inner,
                        None => return id,
                    }
                }
                _ => return id,
            }
        }
    }

    /// Identifier name of an expression, looking through wrappers.
    pub fn identifier_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(self.unwrap_expression(id)) {
            NodeKind::Identifier { name } => Some(name),
            _ => None,
        }
    }

    /// Value of a string literal or a template literal without substitutions.
    pub fn string_value(&self, id: NodeId) -> Option<&str> {
        match self.kind(self.unwrap_expression(id)) {
            NodeKind::String { value } => Some(value),
            NodeKind::Template {
                cooked: Some(value),
                ..
            } => Some(value),
            _ => None,
        }
    }

    /// Dotted path of a member expression chain, e.g. `window.customElements.define`.
    pub fn member_path(&self, id: NodeId) -> Option<Vec<&str>> {
        match self.kind(self.unwrap_expression(id)) {
            NodeKind::Identifier { name } => Some(vec![name.as_str()]),
            NodeKind::This => Some(vec!["this"]),
            NodeKind::Member { object, property } => {
                let mut path = self.member_path(*object)?;
                path.push(property);
                Some(path)
            }
            _ => None,
        }
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |p| self.parent(*p))
    }
}

fn is_type_node(kind: &NodeKind) -> bool {
    match kind {
        NodeKind::Other { kind, .. } => {
            kind.ends_with("_type")
                || matches!(
                    *kind,
                    "type_identifier" | "predefined_type" | "type_arguments" | "const"
                )
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ast {
        // customElements.define
        let mut ast = Ast::with_source("customElements.define".to_string());
        let program = ast.push(NodeKind::Program { body: vec![] }, Span::new(0, 21), None);
        let member = ast.push(
            NodeKind::Other {
                kind: "placeholder",
                children: vec![],
            },
            Span::new(0, 21),
            Some(program),
        );
        let object = ast.push(
            NodeKind::Identifier {
                name: "customElements".to_string(),
            },
            Span::new(0, 14),
            Some(member),
        );
        ast.set_kind(
            member,
            NodeKind::Member {
                object,
                property: "define".to_string(),
            },
        );
        ast.set_kind(program, NodeKind::Program { body: vec![member] });
        ast
    }

    #[test]
    fn test_member_path_and_print() {
        let ast = sample();
        let member = NodeId(1);
        assert_eq!(
            ast.member_path(member),
            Some(vec!["customElements", "define"])
        );
        assert_eq!(ast.print(NodeId(2)), "customElements");
        assert_eq!(ast.children(ast.root()), vec![member]);
    }

    #[test]
    fn test_ancestors() {
        let ast = sample();
        let ancestors: Vec<_> = ast.ancestors(NodeId(2)).collect();
        assert_eq!(ancestors, vec![NodeId(1), NodeId(0)]);
    }

    #[test]
    fn test_previous() {
        assert_eq!(NodeId(0).previous(), None);
        assert_eq!(NodeId(3).previous(), Some(NodeId(2)));
    }
}
