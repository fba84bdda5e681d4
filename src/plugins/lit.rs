//! Lit reactive properties: `@property()`/`@state()` decorators and
//! `static properties = {...}` declarations.

use crate::analysis::{Ast, MethodKind, NodeId, NodeKind};
use crate::manifest::{ClassDeclaration, Field, TypeInfo};
use crate::pipeline::Plugin;

use super::classes::class_at;
use super::names;
use super::shared::{sync_attributes, upsert_field};

/// Options of one reactive property.
#[derive(Debug, Default, PartialEq)]
struct PropertyOptions {
    type_text: Option<&'static str>,
    /// `None` means "derive from the property name".
    attribute: Option<AttributeOption>,
    reflect: bool,
    state: bool,
}

#[derive(Debug, PartialEq)]
enum AttributeOption {
    Named(String),
    Disabled,
}

fn type_name(constructor: &str) -> Option<&'static str> {
    Some(match constructor {
        "String" => "string",
        "Number" => "number",
        "Boolean" => "boolean",
        "Array" => "array",
        "Object" => "object",
        _ => return None,
    })
}

fn parse_options(ast: &Ast, object: Option<NodeId>) -> PropertyOptions {
    let mut options = PropertyOptions::default();
    let Some(NodeKind::Object { properties }) = object.map(|o| ast.kind(ast.unwrap_expression(o)))
    else {
        return options;
    };
    for &property in properties {
        let NodeKind::Pair { key, value } = ast.kind(property) else {
            continue;
        };
        let value_kind = ast.kind(ast.unwrap_expression(*value));
        match (key.name(), value_kind) {
            ("type", _) => options.type_text = ast.identifier_name(*value).and_then(type_name),
            ("attribute", NodeKind::Boolean { value: false }) => {
                options.attribute = Some(AttributeOption::Disabled)
            }
            ("attribute", _) => {
                if let Some(name) = ast.string_value(*value) {
                    options.attribute = Some(AttributeOption::Named(name.to_string()));
                }
            }
            ("reflect", NodeKind::Boolean { value }) => options.reflect = *value,
            ("state", NodeKind::Boolean { value }) => options.state = *value,
            _ => {}
        }
    }
    options
}

fn apply_options(class: &mut ClassDeclaration, name: &str, options: PropertyOptions) {
    let attribute = match (&options.attribute, options.state) {
        (_, true) | (Some(AttributeOption::Disabled), _) => None,
        (Some(AttributeOption::Named(attr)), _) => Some(attr.clone()),
        (None, false) => Some(name.to_ascii_lowercase()),
    };
    upsert_field(
        class,
        Field {
            type_info: options.type_text.map(TypeInfo::new),
            attribute,
            reflects: options.reflect.then_some(true),
            ..Field::new(name)
        },
    );
}

/// Reactive-property decorator on a member: `@property({...})` or `@state()`.
fn decorator_options(ast: &Ast, decorators: &[NodeId]) -> Option<PropertyOptions> {
    decorators.iter().find_map(|&decorator| {
        let NodeKind::Decorator { expression } = ast.kind(decorator) else {
            return None;
        };
        let NodeKind::Call { callee, arguments } = ast.kind(ast.unwrap_expression(*expression))
        else {
            return None;
        };
        let mut options = parse_options(ast, arguments.first().copied());
        match ast.identifier_name(*callee)? {
            "property" => {}
            "state" | "internalProperty" => options.state = true,
            _ => return None,
        }
        Some(options)
    })
}

/// Object literal of `static properties = {...}` or `static get properties() { return {...} }`.
fn static_properties(ast: &Ast, member: NodeId) -> Option<NodeId> {
    match ast.kind(member) {
        NodeKind::Property(p) if p.modifiers.is_static && p.key.name() == "properties" => p.value,
        NodeKind::Method(m)
            if m.modifiers.is_static
                && m.kind == MethodKind::Getter
                && m.key.name() == "properties" =>
        {
            let NodeKind::Block { body } = ast.kind(m.body?) else {
                return None;
            };
            body.iter().find_map(|statement| match ast.kind(*statement) {
                NodeKind::Return { argument } => *argument,
                _ => None,
            })
        }
        _ => None,
    }
}

pub(crate) fn plugin() -> Plugin {
    Plugin::new(names::LIT_PROPERTIES).on_analyze(|ctx| {
        let ast = ctx.ast();
        let Some((class_node, name)) = class_at(ctx) else {
            return Ok(());
        };
        let Some(syntax) = ast.kind(class_node).as_class() else {
            return Ok(());
        };
        // Absent when the class was excluded with `@ignore`.
        let Some(class) = ctx.module_doc.class_mut(&name) else {
            return Ok(());
        };

        for &member in &syntax.members {
            let (key, decorators) = match ast.kind(member) {
                NodeKind::Property(p) => (&p.key, &p.decorators),
                NodeKind::Method(m) => (&m.key, &m.decorators),
                _ => continue,
            };
            if let Some(options) = decorator_options(ast, decorators) {
                apply_options(class, key.name(), options);
            }

            let Some(object) = static_properties(ast, member) else {
                continue;
            };
            let NodeKind::Object { properties } = ast.kind(ast.unwrap_expression(object)) else {
                continue;
            };
            for &property in properties {
                let (name, options) = match ast.kind(property) {
                    NodeKind::Pair { key, value } => (key.name(), parse_options(ast, Some(*value))),
                    NodeKind::Shorthand { name } => (name.as_str(), PropertyOptions::default()),
                    _ => continue,
                };
                apply_options(class, name, options);
            }
        }

        sync_attributes(class);
        Ok(())
    })
}
