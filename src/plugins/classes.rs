//! Class declarations: heritage, members, attributes, events and the
//! class-level JSDoc tags describing slots, parts and CSS hooks.

use std::collections::HashSet;
use std::ops::ControlFlow;

use crate::analysis::{
    MethodDefinition, MethodKind, NodeId, NodeKind, PropertyDefinition, PropertyKey, WalkOptions,
};
use crate::jsdoc::{
    apply_common, apply_field_tags, has_ignore, parameters_with_docs, return_info, JsDocBlock,
    JsDocTag,
};
use crate::manifest::{
    Attribute, ClassDeclaration, CssProperty, Declaration, Event, Field, Member, Method,
    NamedItem, Privacy, Reference, TypeInfo, GLOBAL_PACKAGE,
};
use crate::pipeline::{FileContext, Plugin};

use super::names;
use super::shared::{
    infer_type, is_browser_global, privacy_of, string_array, sync_attributes, upsert_attribute,
    upsert_field,
};

pub(crate) fn plugin() -> Plugin {
    Plugin::new(names::CLASSES).on_analyze(|ctx| {
        let Some((class_node, name)) = class_at(ctx) else {
            return Ok(());
        };
        if has_ignore(&ctx.parse_jsdoc(ctx.node())) {
            return Ok(());
        }
        let class = create_class(ctx, class_node, &name);
        ctx.module_doc.declarations.push(Declaration::Class(class));
        Ok(())
    })
}

/// The class syntax node and binding name the current node declares: a named
/// class declaration or `const X = class {}`.
pub(crate) fn class_at(ctx: &FileContext<'_>) -> Option<(NodeId, String)> {
    let ast = ctx.ast();
    match ctx.kind() {
        NodeKind::ClassDeclaration(class) => Some((ctx.node(), class.name.clone()?)),
        NodeKind::VariableDeclarator {
            name,
            is_pattern: false,
            init: Some(init),
            ..
        } => {
            let init = ast.unwrap_expression(*init);
            matches!(ast.kind(init), NodeKind::ClassExpression(_)).then(|| (init, name.clone()))
        }
        _ => None,
    }
}

/// Build the manifest record for the class at `class_node`.
///
/// Used for declarations, inline classes passed to `customElements.define` and
/// classes returned from mixin functions.
pub fn create_class(ctx: &FileContext<'_>, class_node: NodeId, name: &str) -> ClassDeclaration {
    let ast = ctx.ast();
    let mut class = ClassDeclaration::new(name);
    let Some(syntax) = ast.kind(class_node).as_class() else {
        return class;
    };

    if let Some(heritage) = syntax.superclass {
        let (mixins, superclass) = heritage_of(ctx, heritage);
        class.mixins = Some(mixins);
        class.superclass = superclass;
    }

    let mut getters = HashSet::new();
    let mut setters = HashSet::new();
    for &member in &syntax.members {
        let blocks = ctx.parse_jsdoc(member);
        if has_ignore(&blocks) {
            continue;
        }
        match ast.kind(member) {
            NodeKind::Method(method) => match method.kind {
                MethodKind::Constructor => add_constructor(ctx, &mut class, method),
                MethodKind::Getter | MethodKind::Setter => {
                    let key = (method.key.name().to_string(), method.modifiers.is_static);
                    if method.kind == MethodKind::Getter {
                        getters.insert(key);
                    } else {
                        setters.insert(key);
                    }
                    add_accessor(ctx, &mut class, method, &blocks);
                }
                MethodKind::Method => add_method(ctx, &mut class, method, &blocks),
            },
            NodeKind::Property(property) => add_property(ctx, &mut class, property, &blocks),
            _ => {}
        }
        add_dispatched_events(ctx, &mut class, member);
    }

    for (name, is_static) in getters.difference(&setters) {
        if let Some(Member::Field(field)) = class
            .members_mut()
            .iter_mut()
            .find(|m| m.name() == name && m.is_static() == *is_static)
        {
            field.readonly.get_or_insert(true);
        }
    }

    let blocks = ctx.parse_jsdoc(doc_anchor(ctx, class_node));
    apply_class_tags(&mut class, &blocks);
    sync_attributes(&mut class);
    class
}

/// Declarator of `const X = class {}`, otherwise the class itself.
fn doc_anchor(ctx: &FileContext<'_>, class_node: NodeId) -> NodeId {
    let ast = ctx.ast();
    match ast.parent(class_node) {
        Some(parent) if matches!(ast.kind(parent), NodeKind::VariableDeclarator { .. }) => parent,
        _ => class_node,
    }
}

/// Reference for an identifier used in a heritage clause.
fn heritage_reference(ctx: &FileContext<'_>, name: &str) -> Reference {
    if ctx.imports().find(name).is_some() {
        ctx.reference_to(name)
    } else if is_browser_global(name) && ctx.node_by_name(name).is_none() {
        Reference::package(name, GLOBAL_PACKAGE)
    } else {
        Reference::module(name, ctx.path())
    }
}

/// Split `A(B(Base))` into mixins `[A, B]` and superclass `Base`.
fn heritage_of(ctx: &FileContext<'_>, expression: NodeId) -> (Vec<Reference>, Option<Reference>) {
    let ast = ctx.ast();
    let mut mixins = Vec::new();
    let mut current = Some(expression);
    while let Some(node) = current.map(|n| ast.unwrap_expression(n)) {
        match ast.kind(node) {
            NodeKind::Call { callee, arguments } => {
                if let Some(name) = ast.identifier_name(*callee) {
                    mixins.push(heritage_reference(ctx, name));
                }
                current = arguments.first().copied();
            }
            NodeKind::Identifier { name } => return (mixins, Some(heritage_reference(ctx, name))),
            NodeKind::Member { .. } => {
                let name = ast.print(node).to_string();
                return (mixins, Some(Reference::module(name, ctx.path())));
            }
            _ => break,
        }
    }
    (mixins, None)
}

fn is_static(flag: bool) -> Option<bool> {
    flag.then_some(true)
}

fn apply_privacy_tags(privacy: &mut Option<Privacy>, blocks: &[JsDocBlock]) {
    for tag in blocks.iter().flat_map(|b| b.tags.iter()) {
        if let Some(p) = Privacy::parse(&tag.tag.to_ascii_lowercase()) {
            *privacy = Some(p);
        }
    }
}

fn observed_attributes(class: &mut ClassDeclaration, names: Vec<String>) {
    for name in names {
        upsert_attribute(class, Attribute::new(name));
    }
}

fn add_method(
    ctx: &FileContext<'_>,
    class: &mut ClassDeclaration,
    method: &MethodDefinition,
    blocks: &[JsDocBlock],
) {
    let ast = ctx.ast();
    let parameters = parameters_with_docs(ast, &method.params, blocks);
    let mut record = Method {
        is_static: is_static(method.modifiers.is_static),
        privacy: privacy_of(&method.modifiers, &method.key),
        parameters: (!parameters.is_empty()).then_some(parameters),
        return_info: return_info(method.return_type.as_deref(), blocks),
        ..Method::new(method.key.name())
    };
    apply_common(&mut record, blocks);
    apply_privacy_tags(&mut record.privacy, blocks);
    add_fires_tags(class, blocks);
    class.members_mut().push(Member::Method(record));
}

fn add_accessor(
    ctx: &FileContext<'_>,
    class: &mut ClassDeclaration,
    method: &MethodDefinition,
    blocks: &[JsDocBlock],
) {
    let ast = ctx.ast();
    let name = method.key.name();

    if method.modifiers.is_static && name == "observedAttributes" {
        if method.kind == MethodKind::Getter {
            let names = method.body.and_then(|body| returned_value(ctx, body));
            observed_attributes(class, names.map(|v| string_array(ast, v)).unwrap_or_default());
        }
        return;
    }

    let type_text = match method.kind {
        MethodKind::Getter => method.return_type.clone(),
        _ => method.params.first().and_then(|p| match ast.kind(*p) {
            NodeKind::Parameter(param) => param.type_annotation.clone(),
            _ => None,
        }),
    };
    let mut field = Field {
        is_static: is_static(method.modifiers.is_static),
        privacy: privacy_of(&method.modifiers, &method.key),
        type_info: type_text.map(TypeInfo::new),
        ..Field::new(name)
    };
    apply_field_tags(&mut field, blocks);
    upsert_field(class, field);
}

/// First value returned directly from a function body.
fn returned_value(ctx: &FileContext<'_>, body: NodeId) -> Option<NodeId> {
    let ast = ctx.ast();
    let flow = ctx.walk(body, WalkOptions::body_scope(), |id| match ast.kind(id) {
        NodeKind::Return {
            argument: Some(value),
        } => ControlFlow::Break(*value),
        _ => ControlFlow::Continue(()),
    });
    match flow {
        ControlFlow::Break(value) => Some(value),
        ControlFlow::Continue(()) => None,
    }
}

fn add_property(
    ctx: &FileContext<'_>,
    class: &mut ClassDeclaration,
    property: &PropertyDefinition,
    blocks: &[JsDocBlock],
) {
    let ast = ctx.ast();
    let name = property.key.name();
    let is_static_member = property.modifiers.is_static;

    if is_static_member && name == "observedAttributes" {
        if let Some(value) = property.value {
            observed_attributes(class, string_array(ast, value));
        }
        return;
    }

    // `handler = () => {}` is a method in all but syntax.
    if let Some(value) = property.value.map(|v| ast.unwrap_expression(v)) {
        if let Some(function) = ast
            .kind(value)
            .as_function()
            .filter(|_| ast.kind(value).is_function_expression())
        {
            let parameters = parameters_with_docs(ast, &function.params, blocks);
            let mut record = Method {
                is_static: is_static(is_static_member),
                privacy: privacy_of(&property.modifiers, &property.key),
                parameters: (!parameters.is_empty()).then_some(parameters),
                return_info: return_info(function.return_type.as_deref(), blocks),
                ..Method::new(name)
            };
            apply_common(&mut record, blocks);
            apply_privacy_tags(&mut record.privacy, blocks);
            class.members_mut().push(Member::Method(record));
            return;
        }
    }

    let mut field = Field {
        is_static: is_static(is_static_member),
        privacy: privacy_of(&property.modifiers, &property.key),
        readonly: property.modifiers.readonly.then_some(true),
        type_info: property
            .type_annotation
            .clone()
            .map(TypeInfo::new)
            .or_else(|| property.value.and_then(|v| infer_type(ast, v))),
        default: property.value.map(|v| ast.print(v).to_string()),
        ..Field::new(name)
    };
    apply_field_tags(&mut field, blocks);
    upsert_field(class, field);
}

/// Constructor parameter properties and `this.x = value` assignments.
fn add_constructor(ctx: &FileContext<'_>, class: &mut ClassDeclaration, method: &MethodDefinition) {
    let ast = ctx.ast();

    for &param in &method.params {
        let NodeKind::Parameter(p) = ast.kind(param) else {
            continue;
        };
        let m = &p.modifiers;
        if m.accessibility.is_none() && !m.readonly {
            continue;
        }
        upsert_field(
            class,
            Field {
                privacy: privacy_of(m, &PropertyKey::Identifier(p.name.clone())),
                readonly: m.readonly.then_some(true),
                type_info: p.type_annotation.clone().map(TypeInfo::new),
                default: p.default.map(|d| ast.print(d).to_string()),
                ..Field::new(p.name.clone())
            },
        );
    }

    let Some(body) = method.body else {
        return;
    };
    let _ = ctx.walk(body, WalkOptions::body_scope(), |id| {
        let NodeKind::Assignment { left, right } = ast.kind(id) else {
            return ControlFlow::<()>::Continue(());
        };
        let NodeKind::Member { object, property } = ast.kind(*left) else {
            return ControlFlow::Continue(());
        };
        if !matches!(ast.kind(*object), NodeKind::This) {
            return ControlFlow::Continue(());
        }
        let blocks = ctx.parse_jsdoc(id);
        if has_ignore(&blocks) {
            return ControlFlow::Continue(());
        }
        let mut field = Field {
            privacy: property.starts_with('#').then_some(Privacy::Private),
            type_info: infer_type(ast, *right),
            default: Some(ast.print(*right).to_string()),
            ..Field::new(property.clone())
        };
        apply_field_tags(&mut field, &blocks);
        upsert_field(class, field);
        ControlFlow::Continue(())
    });
}

/// `this.dispatchEvent(new CustomEvent('name'))` anywhere in a member body.
fn add_dispatched_events(ctx: &FileContext<'_>, class: &mut ClassDeclaration, member: NodeId) {
    let ast = ctx.ast();
    let _ = ctx.walk(member, WalkOptions::body_scope(), |id| {
        let NodeKind::Call { callee, arguments } = ast.kind(id) else {
            return ControlFlow::<()>::Continue(());
        };
        let is_dispatch = ast
            .member_path(*callee)
            .is_some_and(|path| path.last() == Some(&"dispatchEvent"));
        if !is_dispatch {
            return ControlFlow::Continue(());
        }
        let Some(event) = arguments.first().map(|a| ast.unwrap_expression(*a)) else {
            return ControlFlow::Continue(());
        };
        let NodeKind::New {
            callee: constructor,
            arguments: event_args,
        } = ast.kind(event)
        else {
            return ControlFlow::Continue(());
        };
        let Some(name) = event_args.first().and_then(|a| ast.string_value(*a)) else {
            return ControlFlow::Continue(());
        };
        let blocks = ctx.parse_jsdoc(id);
        if has_ignore(&blocks) {
            return ControlFlow::Continue(());
        }
        let description = blocks
            .iter()
            .map(|b| b.description.as_str())
            .find(|d| !d.is_empty())
            .unwrap_or_default();
        upsert_event(
            class,
            Event {
                name: name.to_string(),
                description: description.to_string(),
                type_info: ast.identifier_name(*constructor).map(TypeInfo::new),
                inherited_from: None,
            },
        );
        ControlFlow::Continue(())
    });
}

fn upsert_event(class: &mut ClassDeclaration, event: Event) {
    let events = class.events_mut();
    match events.iter_mut().find(|e| e.name == event.name) {
        Some(existing) => {
            if existing.description.is_empty() {
                existing.description = event.description;
            }
            existing.type_info = existing.type_info.take().or(event.type_info);
        }
        None => events.push(event),
    }
}

/// `@fires {Type} name - description`
fn event_from_tag(tag: &JsDocTag) -> Option<Event> {
    (!tag.name.is_empty()).then(|| Event {
        name: tag.name.clone(),
        description: tag.description.clone(),
        type_info: tag.type_text.clone().map(TypeInfo::new),
        inherited_from: None,
    })
}

fn add_fires_tags(class: &mut ClassDeclaration, blocks: &[JsDocBlock]) {
    for tag in blocks.iter().flat_map(|b| b.tags_named(&["fires", "event"])) {
        if let Some(event) = event_from_tag(tag) {
            upsert_event(class, event);
        }
    }
}

fn push_named(items: &mut Option<Vec<NamedItem>>, item: NamedItem) {
    let items = items.get_or_insert_with(Vec::new);
    if !items.iter().any(|i| i.name == item.name) {
        items.push(item);
    }
}

/// Class-level JSDoc: documentation plus element API tags.
pub(crate) fn apply_class_tags(class: &mut ClassDeclaration, blocks: &[JsDocBlock]) {
    apply_common(class, blocks);

    for tag in blocks.iter().flat_map(|b| b.tags.iter()) {
        let named = || NamedItem::new(tag.name.clone(), tag.description.clone());
        match tag.tag.to_ascii_lowercase().as_str() {
            "attr" | "attribute" if !tag.name.is_empty() => upsert_attribute(
                class,
                Attribute {
                    description: tag.description.clone(),
                    type_info: tag.type_text.clone().map(TypeInfo::new),
                    default: tag.default.clone(),
                    ..Attribute::new(tag.name.clone())
                },
            ),
            "prop" | "property" if !tag.name.is_empty() => upsert_field(
                class,
                Field {
                    description: tag.description.clone(),
                    type_info: tag.type_text.clone().map(TypeInfo::new),
                    default: tag.default.clone(),
                    ..Field::new(tag.name.clone())
                },
            ),
            "fires" | "event" => {
                if let Some(event) = event_from_tag(tag) {
                    upsert_event(class, event);
                }
            }
            "slot" => push_named(&mut class.slots, named()),
            "csspart" | "part" if !tag.name.is_empty() => push_named(&mut class.css_parts, named()),
            "cssstate" if !tag.name.is_empty() => push_named(&mut class.css_states, named()),
            "icon" if !tag.name.is_empty() => push_named(&mut class.icons, named()),
            "locale" if !tag.name.is_empty() => push_named(&mut class.locale, named()),
            "cssprop" | "cssproperty" if !tag.name.is_empty() => {
                let properties = class.css_properties.get_or_insert_with(Vec::new);
                if !properties.iter().any(|p| p.name == tag.name) {
                    properties.push(CssProperty {
                        name: tag.name.clone(),
                        description: tag.description.clone(),
                        syntax: tag.type_text.clone(),
                        default: tag.default.clone(),
                        inherited_from: None,
                    });
                }
            }
            "tag" | "tagname" | "customelement" | "element" => {
                let name = if tag.name.is_empty() {
                    tag.description.trim()
                } else {
                    tag.name.as_str()
                };
                if !name.is_empty() {
                    class.tag_name = Some(name.to_string());
                }
            }
            _ => {}
        }
    }
}
