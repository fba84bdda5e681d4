//! Lowering from the tree-sitter CST into [`Ast`].
//!
//! Only named, non-comment nodes are lowered. Constructs the analyzer never
//! inspects become [`NodeKind::Other`] so their subtrees stay walkable.

use tree_sitter::{Node as TsNode, Tree};

use crate::analysis::{
    Accessibility, Ast, Class, ExportBinding, Function, ImportBinding, ImportBindingKind,
    MethodDefinition, MethodKind, Modifiers, NodeId, NodeKind, Parameter, PropertyDefinition,
    PropertyKey, Span, VariableKind,
};

pub(crate) fn lower(tree: &Tree, source: &str) -> Ast {
    let mut lowerer = Lowerer {
        source,
        ast: Ast::with_source(source.to_string()),
    };
    lowerer.lower(tree.root_node(), None);
    lowerer.ast
}

struct Lowerer<'s> {
    source: &'s str,
    ast: Ast,
}

fn span_of(node: TsNode) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

/// Named children that are not comments.
fn named_children(node: TsNode) -> Vec<TsNode> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment" && c.kind() != "html_comment")
        .collect()
}

fn all_children(node: TsNode) -> Vec<TsNode> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn field_children<'t>(node: TsNode<'t>, field: &str) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

fn has_token(node: TsNode, token: &str) -> bool {
    all_children(node)
        .iter()
        .any(|c| !c.is_named() && c.kind() == token)
}

fn unquote(text: &str) -> String {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close))
            if open == close && matches!(open, '"' | '\'' | '`') && trimmed.len() >= 2 =>
        {
            trimmed[1..trimmed.len() - 1].to_string()
        }
        _ => trimmed.to_string(),
    }
}

impl<'s> Lowerer<'s> {
    fn text(&self, node: TsNode) -> &'s str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn type_text(&self, node: Option<TsNode>) -> Option<String> {
        node.map(|n| {
            self.text(n)
                .trim()
                .trim_start_matches(':')
                .trim()
                .to_string()
        })
        .filter(|t| !t.is_empty())
    }

    fn alloc(&mut self, node: TsNode, parent: Option<NodeId>) -> NodeId {
        self.ast.push(
            NodeKind::Other {
                kind: node.kind(),
                children: Vec::new(),
            },
            span_of(node),
            parent,
        )
    }

    fn lower_all(&mut self, nodes: Vec<TsNode>, parent: NodeId) -> Vec<NodeId> {
        nodes.into_iter().map(|n| self.lower(n, Some(parent))).collect()
    }

    fn lower_opt(&mut self, node: Option<TsNode>, parent: NodeId) -> Option<NodeId> {
        node.map(|n| self.lower(n, Some(parent)))
    }

    fn lower(&mut self, node: TsNode, parent: Option<NodeId>) -> NodeId {
        let id = self.alloc(node, parent);
        let kind = self.lower_kind(node, id);
        self.ast.set_kind(id, kind);
        id
    }

    fn lower_kind(&mut self, node: TsNode, id: NodeId) -> NodeKind {
        match node.kind() {
            "program" => NodeKind::Program {
                body: self.lower_all(named_children(node), id),
            },
            "import_statement" => self.lower_import(node),
            "export_statement" => self.lower_export(node, id),
            "class_declaration" | "abstract_class_declaration" => {
                NodeKind::ClassDeclaration(self.lower_class(node, id, Vec::new()))
            }
            "class" => NodeKind::ClassExpression(self.lower_class(node, id, Vec::new())),
            "method_definition" | "method_signature" | "abstract_method_signature" => {
                NodeKind::Method(self.lower_method(node, id, Vec::new()))
            }
            "field_definition" | "public_field_definition" => {
                NodeKind::Property(self.lower_property(node, id, Vec::new()))
            }
            "function_declaration" | "generator_function_declaration" => {
                NodeKind::FunctionDeclaration(self.lower_function(node, id))
            }
            "function_expression" | "function" | "generator_function" => {
                NodeKind::FunctionExpression(self.lower_function(node, id))
            }
            "arrow_function" => NodeKind::ArrowFunction(self.lower_function(node, id)),
            "lexical_declaration" | "variable_declaration" => {
                let kind = match all_children(node).first().map(|c| self.text(*c)) {
                    Some("const") => VariableKind::Const,
                    Some("let") => VariableKind::Let,
                    _ => VariableKind::Var,
                };
                let declarators = named_children(node)
                    .into_iter()
                    .filter(|c| c.kind() == "variable_declarator")
                    .collect();
                NodeKind::VariableDeclaration {
                    kind,
                    declarators: self.lower_all(declarators, id),
                }
            }
            "variable_declarator" => {
                let name_node = node.child_by_field_name("name");
                let is_pattern = name_node.is_some_and(|n| n.kind() != "identifier");
                let name = name_node.map(|n| self.text(n)).unwrap_or("").to_string();
                let type_annotation = self.type_text(node.child_by_field_name("type"));
                let init = self.lower_opt(node.child_by_field_name("value"), id);
                NodeKind::VariableDeclarator {
                    name,
                    is_pattern,
                    type_annotation,
                    init,
                }
            }
            "expression_statement" => match named_children(node).first() {
                Some(expr) => NodeKind::ExpressionStatement {
                    expression: self.lower(*expr, Some(id)),
                },
                None => self.other(node, id),
            },
            "statement_block" => NodeKind::Block {
                body: self.lower_all(named_children(node), id),
            },
            "return_statement" => NodeKind::Return {
                argument: self.lower_opt(named_children(node).first().copied(), id),
            },
            "if_statement" => {
                let (Some(condition), Some(consequence)) = (
                    node.child_by_field_name("condition"),
                    node.child_by_field_name("consequence"),
                ) else {
                    return self.other(node, id);
                };
                let test = self.lower(condition, Some(id));
                let consequent = self.lower(consequence, Some(id));
                let alternate = self.lower_opt(node.child_by_field_name("alternative"), id);
                NodeKind::If {
                    test,
                    consequent,
                    alternate,
                }
            }
            "call_expression" => {
                let Some(function) = node.child_by_field_name("function") else {
                    return self.other(node, id);
                };
                let callee = self.lower(function, Some(id));
                let arguments = self.lower_arguments(node.child_by_field_name("arguments"), id);
                NodeKind::Call { callee, arguments }
            }
            "new_expression" => {
                let Some(constructor) = node.child_by_field_name("constructor") else {
                    return self.other(node, id);
                };
                let callee = self.lower(constructor, Some(id));
                let arguments = self.lower_arguments(node.child_by_field_name("arguments"), id);
                NodeKind::New { callee, arguments }
            }
            "member_expression" => {
                let (Some(object), Some(property)) = (
                    node.child_by_field_name("object"),
                    node.child_by_field_name("property"),
                ) else {
                    return self.other(node, id);
                };
                let property = self.text(property).to_string();
                NodeKind::Member {
                    object: self.lower(object, Some(id)),
                    property,
                }
            }
            "assignment_expression" => {
                let (Some(left), Some(right)) = (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("right"),
                ) else {
                    return self.other(node, id);
                };
                let left = self.lower(left, Some(id));
                let right = self.lower(right, Some(id));
                NodeKind::Assignment { left, right }
            }
            "decorator" => match named_children(node).first() {
                Some(expr) => NodeKind::Decorator {
                    expression: self.lower(*expr, Some(id)),
                },
                None => self.other(node, id),
            },
            "identifier" => NodeKind::Identifier {
                name: self.text(node).to_string(),
            },
            "shorthand_property_identifier" => NodeKind::Shorthand {
                name: self.text(node).to_string(),
            },
            "this" => NodeKind::This,
            "string" => NodeKind::String {
                value: unquote(self.text(node)),
            },
            "template_string" => {
                let substitutions: Vec<TsNode> = named_children(node)
                    .into_iter()
                    .filter(|c| c.kind() == "template_substitution")
                    .collect();
                if substitutions.is_empty() {
                    NodeKind::Template {
                        cooked: Some(unquote(self.text(node))),
                        expressions: Vec::new(),
                    }
                } else {
                    let inner = substitutions
                        .into_iter()
                        .filter_map(|s| named_children(s).first().copied())
                        .collect();
                    NodeKind::Template {
                        cooked: None,
                        expressions: self.lower_all(inner, id),
                    }
                }
            }
            "number" => NodeKind::Number {
                raw: self.text(node).to_string(),
            },
            "true" => NodeKind::Boolean { value: true },
            "false" => NodeKind::Boolean { value: false },
            "null" => NodeKind::Null,
            "undefined" => NodeKind::Undefined,
            "array" => NodeKind::Array {
                elements: self.lower_all(named_children(node), id),
            },
            "object" => NodeKind::Object {
                properties: self.lower_all(named_children(node), id),
            },
            "pair" => {
                let (Some(key), Some(value)) = (
                    node.child_by_field_name("key"),
                    node.child_by_field_name("value"),
                ) else {
                    return self.other(node, id);
                };
                NodeKind::Pair {
                    key: self.property_key(key),
                    value: self.lower(value, Some(id)),
                }
            }
            "spread_element" => match named_children(node).first() {
                Some(arg) => NodeKind::Spread {
                    argument: self.lower(*arg, Some(id)),
                },
                None => self.other(node, id),
            },
            _ => self.other(node, id),
        }
    }

    fn other(&mut self, node: TsNode, id: NodeId) -> NodeKind {
        NodeKind::Other {
            kind: node.kind(),
            children: self.lower_all(named_children(node), id),
        }
    }

    fn lower_arguments(&mut self, arguments: Option<TsNode>, id: NodeId) -> Vec<NodeId> {
        match arguments {
            Some(args) if args.kind() == "arguments" => self.lower_all(named_children(args), id),
            // Tagged template: the template itself is the only argument.
            Some(template) => vec![self.lower(template, Some(id))],
            None => Vec::new(),
        }
    }

    fn property_key(&self, node: TsNode) -> PropertyKey {
        let text = self.text(node);
        match node.kind() {
            "private_property_identifier" => PropertyKey::Private(text.to_string()),
            "string" => PropertyKey::String(unquote(text)),
            "number" => PropertyKey::Number(text.to_string()),
            "computed_property_name" => PropertyKey::Computed(text.to_string()),
            _ => PropertyKey::Identifier(text.to_string()),
        }
    }

    fn lower_import(&mut self, node: TsNode) -> NodeKind {
        let source = node
            .child_by_field_name("source")
            .map(|s| unquote(self.text(s)))
            .unwrap_or_default();
        let type_only = has_token(node, "type");

        let mut bindings = Vec::new();
        for clause in named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "import_clause")
        {
            for part in named_children(clause) {
                match part.kind() {
                    "identifier" => bindings.push(ImportBinding {
                        kind: ImportBindingKind::Default,
                        local: self.text(part).to_string(),
                        imported: None,
                        type_only,
                    }),
                    "namespace_import" => {
                        if let Some(name) = named_children(part).first() {
                            bindings.push(ImportBinding {
                                kind: ImportBindingKind::Namespace,
                                local: self.text(*name).to_string(),
                                imported: None,
                                type_only,
                            });
                        }
                    }
                    "named_imports" => {
                        for spec in named_children(part)
                            .into_iter()
                            .filter(|s| s.kind() == "import_specifier")
                        {
                            let Some(name) = spec.child_by_field_name("name") else {
                                continue;
                            };
                            let imported = unquote(self.text(name));
                            let local = spec
                                .child_by_field_name("alias")
                                .map(|a| self.text(a).to_string())
                                .unwrap_or_else(|| imported.clone());
                            bindings.push(ImportBinding {
                                kind: ImportBindingKind::Named,
                                local,
                                imported: Some(imported),
                                type_only: type_only || has_token(spec, "type"),
                            });
                        }
                    }
                    _ => {}
                }
            }
        }

        NodeKind::Import {
            bindings,
            source,
            type_only,
        }
    }

    fn lower_export(&mut self, node: TsNode, id: NodeId) -> NodeKind {
        let source = node
            .child_by_field_name("source")
            .map(|s| unquote(self.text(s)));
        let type_only = has_token(node, "type");
        let decorators = field_children(node, "decorator");

        if let Some(declaration) = node.child_by_field_name("declaration") {
            let declaration = self.lower_with_decorators(declaration, id, decorators);
            return if has_token(node, "default") {
                NodeKind::ExportDefault { declaration }
            } else {
                NodeKind::ExportNamed {
                    declaration: Some(declaration),
                    bindings: Vec::new(),
                    source: None,
                    type_only,
                }
            };
        }

        if let Some(value) = node.child_by_field_name("value") {
            let declaration = self.lower_with_decorators(value, id, decorators);
            return NodeKind::ExportDefault { declaration };
        }

        let children = named_children(node);
        if let Some(clause) = children.iter().find(|c| c.kind() == "export_clause") {
            let bindings = named_children(*clause)
                .into_iter()
                .filter(|s| s.kind() == "export_specifier")
                .filter_map(|spec| {
                    let local = unquote(self.text(spec.child_by_field_name("name")?));
                    let exported = spec
                        .child_by_field_name("alias")
                        .map(|a| unquote(self.text(a)))
                        .unwrap_or_else(|| local.clone());
                    Some(ExportBinding {
                        local,
                        exported,
                        type_only: type_only || has_token(spec, "type"),
                    })
                })
                .collect();
            return NodeKind::ExportNamed {
                declaration: None,
                bindings,
                source,
                type_only,
            };
        }

        if let Some(source) = source {
            let alias = children
                .iter()
                .find(|c| c.kind() == "namespace_export")
                .and_then(|ns| named_children(*ns).first().map(|n| unquote(self.text(*n))));
            if alias.is_some() || has_token(node, "*") {
                return NodeKind::ExportAll { alias, source };
            }
        }

        self.other(node, id)
    }

    /// Lower a declaration, handing `export`-level decorators to classes.
    fn lower_with_decorators(
        &mut self,
        node: TsNode,
        parent: NodeId,
        decorators: Vec<TsNode>,
    ) -> NodeId {
        match node.kind() {
            "class_declaration" | "abstract_class_declaration" | "class" if !decorators.is_empty() => {
                let id = self.alloc(node, Some(parent));
                if let Some(first) = decorators.first() {
                    self.ast.set_span_start(id, first.start_byte());
                }
                let class = self.lower_class(node, id, decorators);
                let kind = if node.kind() == "class" {
                    NodeKind::ClassExpression(class)
                } else {
                    NodeKind::ClassDeclaration(class)
                };
                self.ast.set_kind(id, kind);
                id
            }
            _ => self.lower(node, Some(parent)),
        }
    }

    fn lower_class(&mut self, node: TsNode, id: NodeId, extra_decorators: Vec<TsNode>) -> Class {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string());

        let mut decorator_nodes = extra_decorators;
        decorator_nodes.extend(field_children(node, "decorator"));
        let decorators = self.lower_all(decorator_nodes, id);

        let heritage = named_children(node)
            .into_iter()
            .find(|c| c.kind() == "class_heritage")
            .and_then(|heritage| {
                let children = named_children(heritage);
                match children.iter().find(|c| c.kind() == "extends_clause") {
                    Some(extends) => extends
                        .child_by_field_name("value")
                        .or_else(|| named_children(*extends).first().copied()),
                    None => children
                        .into_iter()
                        .find(|c| c.kind() != "implements_clause"),
                }
            });
        let superclass = self.lower_opt(heritage, id);

        let mut members = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            let mut pending: Vec<TsNode> = Vec::new();
            for child in named_children(body) {
                match child.kind() {
                    "decorator" => pending.push(child),
                    "method_definition" | "method_signature" | "abstract_method_signature" => {
                        let member = self.alloc(child, Some(id));
                        if let Some(first) = pending.first() {
                            self.ast.set_span_start(member, first.start_byte());
                        }
                        let method = self.lower_method(child, member, std::mem::take(&mut pending));
                        self.ast.set_kind(member, NodeKind::Method(method));
                        members.push(member);
                    }
                    "field_definition" | "public_field_definition" => {
                        let member = self.alloc(child, Some(id));
                        if let Some(first) = pending.first() {
                            self.ast.set_span_start(member, first.start_byte());
                        }
                        let property =
                            self.lower_property(child, member, std::mem::take(&mut pending));
                        self.ast.set_kind(member, NodeKind::Property(property));
                        members.push(member);
                    }
                    "class_static_block" => {
                        let member = self.alloc(child, Some(id));
                        let statements = child
                            .child_by_field_name("body")
                            .map(named_children)
                            .unwrap_or_default();
                        let body = self.lower_all(statements, member);
                        self.ast.set_kind(member, NodeKind::StaticBlock { body });
                        members.push(member);
                    }
                    _ => members.push(self.lower(child, Some(id))),
                }
            }
        }

        Class {
            name,
            decorators,
            superclass,
            members,
            is_abstract: node.kind() == "abstract_class_declaration",
        }
    }

    /// Modifier tokens that appear before `stop` (the member name).
    fn modifiers(&self, node: TsNode, stop: Option<TsNode>) -> (Modifiers, Option<MethodKind>) {
        let mut modifiers = Modifiers::default();
        let mut accessor = None;
        let stop_at = stop.map(|s| s.start_byte());
        for child in all_children(node) {
            if stop_at.is_some_and(|s| child.start_byte() >= s) {
                if child.kind() == "?" {
                    modifiers.optional = true;
                }
                continue;
            }
            match child.kind() {
                "static" => modifiers.is_static = true,
                "static get" => {
                    modifiers.is_static = true;
                    accessor = Some(MethodKind::Getter);
                }
                "get" => accessor = Some(MethodKind::Getter),
                "set" => accessor = Some(MethodKind::Setter),
                "async" => modifiers.is_async = true,
                "readonly" => modifiers.readonly = true,
                "abstract" => modifiers.is_abstract = true,
                "declare" => modifiers.declare = true,
                "accessibility_modifier" => {
                    modifiers.accessibility = Accessibility::parse(self.text(child))
                }
                _ => {}
            }
        }
        (modifiers, accessor)
    }

    fn lower_method(
        &mut self,
        node: TsNode,
        id: NodeId,
        extra_decorators: Vec<TsNode>,
    ) -> MethodDefinition {
        let name = node.child_by_field_name("name");
        let key = name
            .map(|n| self.property_key(n))
            .unwrap_or_else(|| PropertyKey::Identifier(String::new()));
        let (modifiers, accessor) = self.modifiers(node, name);

        let kind = match accessor {
            Some(kind) => kind,
            None if key.name() == "constructor" && !modifiers.is_static => MethodKind::Constructor,
            None => MethodKind::Method,
        };

        let mut decorator_nodes = extra_decorators;
        decorator_nodes.extend(field_children(node, "decorator"));
        let decorators = self.lower_all(decorator_nodes, id);
        let params = match node.child_by_field_name("parameters") {
            Some(params) => self.lower_params(params, id),
            None => Vec::new(),
        };
        let return_type = self.type_text(node.child_by_field_name("return_type"));
        let body = self.lower_opt(node.child_by_field_name("body"), id);

        MethodDefinition {
            key,
            kind,
            modifiers,
            decorators,
            params,
            body,
            return_type,
        }
    }

    fn lower_property(
        &mut self,
        node: TsNode,
        id: NodeId,
        extra_decorators: Vec<TsNode>,
    ) -> PropertyDefinition {
        let name = node
            .child_by_field_name("property")
            .or_else(|| node.child_by_field_name("name"));
        let key = name
            .map(|n| self.property_key(n))
            .unwrap_or_else(|| PropertyKey::Identifier(String::new()));
        let (modifiers, _) = self.modifiers(node, name);

        let mut decorator_nodes = extra_decorators;
        decorator_nodes.extend(field_children(node, "decorator"));
        let decorators = self.lower_all(decorator_nodes, id);
        let type_annotation = self.type_text(node.child_by_field_name("type"));
        let value = self.lower_opt(node.child_by_field_name("value"), id);

        PropertyDefinition {
            key,
            modifiers,
            decorators,
            type_annotation,
            value,
        }
    }

    fn lower_function(&mut self, node: TsNode, id: NodeId) -> Function {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string());
        let params = if let Some(params) = node.child_by_field_name("parameters") {
            self.lower_params(params, id)
        } else if let Some(param) = node.child_by_field_name("parameter") {
            vec![self.lower_param(param, id)]
        } else {
            Vec::new()
        };
        let return_type = self.type_text(node.child_by_field_name("return_type"));
        let body = self.lower_opt(node.child_by_field_name("body"), id);

        Function {
            name,
            params,
            body,
            return_type,
            is_async: has_token(node, "async"),
            is_generator: has_token(node, "*"),
        }
    }

    fn lower_params(&mut self, params: TsNode, parent: NodeId) -> Vec<NodeId> {
        named_children(params)
            .into_iter()
            .filter(|p| p.kind() != "decorator")
            .map(|p| self.lower_param(p, parent))
            .collect()
    }

    fn lower_param(&mut self, node: TsNode, parent: NodeId) -> NodeId {
        let id = self.alloc(node, Some(parent));

        let mut param = Parameter {
            name: String::new(),
            type_annotation: None,
            default: None,
            optional: node.kind() == "optional_parameter",
            rest: false,
            modifiers: Modifiers::default(),
            decorators: Vec::new(),
        };

        let mut pattern = node;
        let mut default = None;
        match node.kind() {
            "required_parameter" | "optional_parameter" => {
                param.decorators = self.lower_all(field_children(node, "decorator"), id);
                let name = node.child_by_field_name("pattern");
                let (modifiers, _) = self.modifiers(node, name);
                param.modifiers = modifiers;
                param.type_annotation = self.type_text(node.child_by_field_name("type"));
                default = node.child_by_field_name("value");
                if let Some(name) = name {
                    pattern = name;
                }
            }
            "assignment_pattern" => {
                if let Some(left) = node.child_by_field_name("left") {
                    pattern = left;
                }
                default = node.child_by_field_name("right");
            }
            _ => {}
        }

        if pattern.kind() == "rest_pattern" {
            param.rest = true;
            if let Some(inner) = named_children(pattern).first() {
                pattern = *inner;
            }
        }
        param.name = self.text(pattern).to_string();
        param.default = self.lower_opt(default, id);

        self.ast.set_kind(id, NodeKind::Parameter(param));
        id
    }
}
