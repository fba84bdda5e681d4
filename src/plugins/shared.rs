//! Helpers used by several plugins.

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::{Accessibility, Ast, Modifiers, NodeId, NodeKind, PropertyKey};
use crate::manifest::{Attribute, ClassDeclaration, Field, Member, Privacy, TypeInfo};

lazy_static! {
    /// Browser-provided base classes that resolve to the `global:` package.
    static ref BROWSER_GLOBAL: Regex =
        Regex::new(r"^(HTML\w*Element|SVG\w*Element|MathMLElement|Element|Node|EventTarget)$")
            .expect("browser global pattern is valid");
}

pub(crate) fn is_browser_global(name: &str) -> bool {
    BROWSER_GLOBAL.is_match(name)
}

/// Coarse type of a literal initializer.
pub(crate) fn infer_type(ast: &Ast, value: NodeId) -> Option<TypeInfo> {
    let text = match ast.kind(ast.unwrap_expression(value)) {
        NodeKind::String { .. } | NodeKind::Template { .. } => "string",
        NodeKind::Number { .. } => "number",
        NodeKind::Boolean { .. } => "boolean",
        NodeKind::Array { .. } => "array",
        NodeKind::Object { .. } => "object",
        _ => return None,
    };
    Some(TypeInfo::new(text))
}

pub(crate) fn privacy_of(modifiers: &Modifiers, key: &PropertyKey) -> Option<Privacy> {
    if key.is_private() {
        return Some(Privacy::Private);
    }
    modifiers.accessibility.map(|a| match a {
        Accessibility::Public => Privacy::Public,
        Accessibility::Private => Privacy::Private,
        Accessibility::Protected => Privacy::Protected,
    })
}

/// `my-long-attr` to `myLongAttr`.
pub(crate) fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' || c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Merge `field` into the class: fill gaps of an existing field with the same
/// name and static-ness, or append it.
pub(crate) fn upsert_field(class: &mut ClassDeclaration, field: Field) {
    let is_static = field.is_static.unwrap_or(false);
    let existing = class.members_mut().iter_mut().find_map(|m| match m {
        Member::Field(f) if f.name == field.name && f.is_static.unwrap_or(false) == is_static => {
            Some(f)
        }
        _ => None,
    });
    match existing {
        Some(existing) => merge_field(existing, field),
        None => class.members_mut().push(Member::Field(field)),
    }
}

/// Fill unset properties of `target` from `source`; the newer description wins.
pub(crate) fn merge_field(target: &mut Field, source: Field) {
    if !source.description.is_empty() {
        target.description = source.description;
    }
    target.summary = target.summary.take().or(source.summary);
    target.deprecated = target.deprecated.take().or(source.deprecated);
    target.type_info = target.type_info.take().or(source.type_info);
    target.default = target.default.take().or(source.default);
    target.privacy = target.privacy.or(source.privacy);
    target.readonly = target.readonly.or(source.readonly);
    target.attribute = target.attribute.take().or(source.attribute);
    target.reflects = target.reflects.or(source.reflects);
}

/// Add an attribute, or fill gaps of an existing one with the same name.
pub(crate) fn upsert_attribute(class: &mut ClassDeclaration, attribute: Attribute) {
    let attributes = class.attributes_mut();
    match attributes.iter_mut().find(|a| a.name == attribute.name) {
        Some(existing) => {
            if existing.description.is_empty() {
                existing.description = attribute.description;
            }
            existing.type_info = existing.type_info.take().or(attribute.type_info);
            existing.default = existing.default.take().or(attribute.default);
            existing.field_name = existing.field_name.take().or(attribute.field_name);
        }
        None => attributes.push(attribute),
    }
}

/// Link attributes and fields in both directions.
///
/// An attribute finds its field by explicit `fieldName`, by a field that names
/// it as its attribute, or by a field with the same or camel-cased name. A field
/// that declares an attribute gets one if it is missing.
pub(crate) fn sync_attributes(class: &mut ClassDeclaration) {
    let members = class.members.get_or_insert_with(Vec::new);
    let attributes = class.attributes.get_or_insert_with(Vec::new);

    for attribute in attributes.iter_mut() {
        let camel = camel_case(&attribute.name);
        let field = members
            .iter_mut()
            .filter_map(|m| match m {
                Member::Field(f) if !f.is_static.unwrap_or(false) => Some(f),
                _ => None,
            })
            .fold(None::<(u8, &mut Field)>, |best, f| {
                let rank = if attribute.field_name.as_deref() == Some(f.name.as_str()) {
                    0
                } else if f.attribute.as_deref() == Some(attribute.name.as_str()) {
                    1
                } else if f.name == attribute.name {
                    2
                } else if f.name == camel {
                    3
                } else {
                    return best;
                };
                match best {
                    Some((r, _)) if r <= rank => best,
                    _ => Some((rank, f)),
                }
            })
            .map(|(_, f)| f);

        if let Some(field) = field {
            attribute.field_name = Some(field.name.clone());
            if field.attribute.is_none() {
                field.attribute = Some(attribute.name.clone());
            }
            if attribute.type_info.is_none() {
                attribute.type_info = field.type_info.clone();
            }
            if attribute.default.is_none() {
                attribute.default = field.default.clone();
            }
            if attribute.description.is_empty() {
                attribute.description = field.description.clone();
            }
        }
    }

    for member in members.iter() {
        let Member::Field(field) = member else {
            continue;
        };
        let Some(name) = &field.attribute else {
            continue;
        };
        if field.is_static.unwrap_or(false) || attributes.iter().any(|a| &a.name == name) {
            continue;
        }
        attributes.push(Attribute {
            name: name.clone(),
            description: field.description.clone(),
            type_info: field.type_info.clone(),
            default: field.default.clone(),
            field_name: Some(field.name.clone()),
            inherited_from: None,
        });
    }
}

/// String elements of an array literal (`['a', 'b']`).
pub(crate) fn string_array(ast: &Ast, node: NodeId) -> Vec<String> {
    match ast.kind(ast.unwrap_expression(node)) {
        NodeKind::Array { elements } => elements
            .iter()
            .filter_map(|e| ast.string_value(*e).map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}
